//! Audio backend using rodio.

use super::{AudioBackend, AudioError, AudioHandle};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// Plays sounds on the default output device.
///
/// The [`OutputStream`] returned by [`RodioBackend::try_default`] must be kept
/// alive by the caller for as long as sounds should be audible.
pub struct RodioBackend {
    stream: OutputStreamHandle,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn try_default() -> Result<(OutputStream, Self), AudioError> {
        let (stream, handle) = OutputStream::try_default().map_err(|e| {
            tracing::warn!("No audio output device: {}", e);
            AudioError::DeviceNotAvailable
        })?;
        Ok((stream, Self { stream: handle }))
    }
}

impl AudioBackend for RodioBackend {
    fn load(&self, path: &Path) -> Result<Box<dyn AudioHandle>, AudioError> {
        let data: Arc<[u8]> = std::fs::read(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AudioError::SoundNotFound(path.display().to_string()),
                _ => AudioError::PlaybackRejected(format!("{}: {}", path.display(), e)),
            })?
            .into();

        // Validate the format once.
        Decoder::new(Cursor::new(Arc::clone(&data)))
            .map_err(|e| AudioError::PlaybackRejected(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("Loaded sound {} ({} bytes)", path.display(), data.len());

        Ok(Box::new(RodioHandle {
            data,
            stream: self.stream.clone(),
            sink: None,
        }))
    }
}

/// A decoded-on-demand sound held in memory.
struct RodioHandle {
    data: Arc<[u8]>,
    stream: OutputStreamHandle,
    sink: Option<Sink>,
}

impl AudioHandle for RodioHandle {
    fn restart(&mut self) -> Result<(), AudioError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }

        let source = Decoder::new(Cursor::new(Arc::clone(&self.data)))
            .map_err(|e| AudioError::PlaybackRejected(e.to_string()))?;
        let sink =
            Sink::try_new(&self.stream).map_err(|e| AudioError::PlaybackRejected(e.to_string()))?;
        sink.append(source);
        self.sink = Some(sink);

        Ok(())
    }
}
