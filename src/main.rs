//! NetWatch Accessibility - command line host
//!
//! Drives the accessibility engine against the on-disk preference store.
//! Announcements are printed to stdout as a screen reader would receive them.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use netwatch_a11y::accessibility::{ClassList, LiveRegion, Politeness};
use netwatch_a11y::audio::{AudioBackend, RodioBackend, SoundCategory};
use netwatch_a11y::input::{FocusTarget, KeyCombo, ShortcutOutcome};
use netwatch_a11y::preferences::{ColorBlindMode, OsPreferences, PreferenceFlag};
use netwatch_a11y::storage::{config, open_with_fallback};
use netwatch_a11y::{dispatch, AccessibilityEngine};

/// Command-line arguments for netwatch-a11y
#[derive(Parser, Debug)]
#[command(name = "netwatch-a11y")]
#[command(about = "Accessibility preferences and profiles for NetWatch")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to config.toml in the data directory)
    #[arg(short, long, env = "NETWATCH_A11Y_CONFIG")]
    config: Option<PathBuf>,

    /// Do not open an audio device
    #[arg(long)]
    no_sound: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the live preferences and the active profile
    Show,
    /// Set a preference, e.g. `set large-text true` or `set color-blind-mode tritanopia`
    Set { flag: PreferenceFlag, value: String },
    /// Toggle a preference (cycles the color blind mode)
    Toggle { flag: PreferenceFlag },
    /// Reset the live preferences to their defaults
    Reset,
    /// Save the live preferences as a profile
    Save { name: String },
    /// Delete a profile
    Delete { name: String },
    /// Activate a profile
    Activate { name: String },
    /// List profiles
    List,
    /// Export a profile as JSON
    Export {
        name: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Import a profile document
    Import { file: PathBuf },
    /// List backups, oldest first
    Backups {
        /// Only backups of this profile
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Restore a backup by index
    Restore { index: usize },
    /// Announce text through the live regions
    Announce {
        text: String,
        /// Use the assertive channel
        #[arg(long)]
        assertive: bool,
    },
    /// Simulate a key press, e.g. `key alt+shift+c`
    Key {
        combo: KeyCombo,
        /// Pretend focus is in a text field
        #[arg(long)]
        in_text_field: bool,
    },
    /// List keyboard shortcuts
    Shortcuts,
    /// Play a sound cue
    Play { category: SoundCategory },
}

/// Live region that prints what a screen reader would announce.
struct ConsoleLiveRegion {
    politeness: Politeness,
}

impl LiveRegion for ConsoleLiveRegion {
    fn set_text(&mut self, text: &str) {
        if !text.is_empty() {
            println!("[{}] {}", self.politeness, text);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    tracing::info!("Starting netwatch-a11y v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    let (storage, fallback) = open_with_fallback(&config.database_path());
    if fallback.is_some() {
        eprintln!("Warning: preference storage unavailable, changes will not be saved.");
    }

    // The output stream must outlive every sound played.
    let (_stream, audio) = if args.no_sound {
        (None, None)
    } else {
        match RodioBackend::try_default() {
            Ok((stream, backend)) => (Some(stream), Some(Arc::new(backend) as Arc<dyn AudioBackend>)),
            Err(e) => {
                tracing::info!("Sound feedback disabled: {}", e);
                (None, None)
            }
        }
    };

    let os = OsPreferences::detect(&config.os);
    let mut engine = AccessibilityEngine::new(&config, storage, os, ClassList::new(), audio);
    for politeness in Politeness::ALL {
        engine
            .announcer()
            .attach_region(politeness, ConsoleLiveRegion { politeness });
    }
    engine.install_global_dispatch();

    let result = run(&engine, args.command);

    engine.flush_announcements().await;
    engine.shutdown();

    result
}

fn run(engine: &AccessibilityEngine, command: Command) -> Result<()> {
    match command {
        Command::Show => show(engine),
        Command::Set { flag, value } => {
            let value = flag
                .parse_value(&value)
                .ok_or_else(|| anyhow!("invalid value {:?} for {}", value, flag))?;
            engine.set_preference(flag, value)?;
        }
        Command::Toggle { flag } => {
            let value = engine.toggle_preference(flag)?;
            println!("{} = {}", flag, value);
        }
        Command::Reset => engine.activator().reset()?,
        Command::Save { name } => {
            let profile = engine
                .repository()
                .save(&name, engine.store().get_all())?;
            dispatch::announce(&format!("Profile {} saved", profile.name), Politeness::Polite);
            dispatch::play_sound(SoundCategory::Success);
        }
        Command::Delete { name } => {
            engine.repository().delete(&name)?;
            dispatch::announce(&format!("Profile {} deleted", name.trim()), Politeness::Polite);
        }
        Command::Activate { name } => {
            let summary = engine.activator().activate(&name)?;
            if !summary.persisted {
                eprintln!("Warning: profile applied for this session only.");
            }
        }
        Command::List => {
            let active = engine.repository().active();
            for profile in engine.repository().list() {
                let marker = if active.as_deref() == Some(profile.name.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {:<24} updated {}",
                    marker,
                    profile.name,
                    profile.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Export { name, out } => {
            let json = engine.repository().export_json(&name)?;
            match out {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
        }
        Command::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let profile = engine.repository().import(&json)?;
            dispatch::announce(&format!("Profile {} imported", profile.name), Politeness::Polite);
        }
        Command::Backups { name } => {
            let all = engine.repository().list_backups(None);
            for (index, backup) in all.iter().enumerate() {
                if name.as_deref().is_some_and(|n| n.trim() != backup.name) {
                    continue;
                }
                println!(
                    "{:>3}  {:<24} {:<9} {}",
                    index,
                    backup.name,
                    backup.reason,
                    backup.date.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
        Command::Restore { index } => {
            let backup = engine
                .repository()
                .restore_backup(index, engine.store())?;
            dispatch::announce(
                &format!("Restored settings from backup of {}", backup.name),
                Politeness::Polite,
            );
        }
        Command::Announce { text, assertive } => {
            let politeness = if assertive {
                Politeness::Assertive
            } else {
                Politeness::Polite
            };
            if !dispatch::announce(&text, politeness) {
                bail!("nothing to announce");
            }
        }
        Command::Key {
            combo,
            in_text_field,
        } => {
            let focus = if in_text_field {
                FocusTarget::TextInput
            } else {
                FocusTarget::None
            };
            match engine.router().handle_key(combo, focus) {
                ShortcutOutcome::Applied { flag, value } => println!("{} = {}", flag, value),
                ShortcutOutcome::ShowHelp => print_shortcuts(engine),
                ShortcutOutcome::Suppressed => println!("{} ignored in text field", combo),
                ShortcutOutcome::Ignored => println!("{} is not a shortcut", combo),
            }
        }
        Command::Shortcuts => print_shortcuts(engine),
        Command::Play { category } => {
            if !dispatch::play_sound(category) {
                println!("No sound played (sound feedback off or unavailable)");
            }
        }
    }
    Ok(())
}

fn show(engine: &AccessibilityEngine) {
    let set = engine.store().get_all();
    for flag in PreferenceFlag::ALL {
        println!("{:<16} {}", flag.storage_name(), set.get(flag));
    }

    println!();
    println!(
        "Active profile:  {}",
        engine
            .repository()
            .active()
            .unwrap_or_else(|| "(none)".to_string())
    );

    let markers: Vec<&str> = PreferenceFlag::ALL
        .iter()
        .filter_map(|flag| flag.marker_class())
        .chain(ColorBlindMode::all_marker_classes())
        .filter(|class| engine.applier().inspect(|root| root.has_class(class)))
        .collect();
    println!("Markers:         {}", markers.join(" "));
    println!(
        "Storage:         {}",
        if engine.store().is_durable() {
            "durable"
        } else {
            "session only"
        }
    );
}

fn print_shortcuts(engine: &AccessibilityEngine) {
    for binding in engine.router().shortcuts() {
        println!("{:<14} {}", binding.combo.to_string(), binding.description);
    }
}
