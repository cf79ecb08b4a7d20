//! Unit tests for profile import and export documents.

use netwatch_a11y::preferences::{ColorBlindMode, PreferenceSet};
use netwatch_a11y::profiles::{ProfileDocument, ProfileError, ProfileRepository};
use netwatch_a11y::storage::MemoryStore;
use std::sync::Arc;

fn repository() -> ProfileRepository {
    ProfileRepository::open(Arc::new(MemoryStore::new()), 10)
}

/// A known key missing from the document takes its default.
#[test]
fn test_import_missing_key_defaults() {
    let json = r#"{
        "formatVersion": 1,
        "name": "Partial",
        "values": { "largeText": true, "colorBlindMode": "deuteranopia" }
    }"#;

    let profile = repository().import(json).unwrap();
    assert!(profile.values.large_text);
    assert_eq!(profile.values.color_blind_mode, ColorBlindMode::Deuteranopia);
    assert!(!profile.values.high_contrast);
    assert!(!profile.values.underline_links);
}

#[test]
fn test_import_ignores_unknown_and_ill_typed_keys() {
    let json = r#"{
        "name": "Odd",
        "values": { "focusMode": "yes please", "sparkles": true, "monochrome": true },
        "author": "someone"
    }"#;

    let profile = repository().import(json).unwrap();
    assert!(!profile.values.focus_mode);
    assert!(profile.values.monochrome);
}

#[test]
fn test_import_trims_name_and_overwrites_with_backup() {
    let repo = repository();
    repo.save("Night", PreferenceSet::default()).unwrap();

    let profile = repo
        .import(r#"{"formatVersion": 1, "name": "  Night ", "values": {"invertColors": true}}"#)
        .unwrap();
    assert_eq!(profile.name, "Night");
    assert!(profile.values.invert_colors);
    assert_eq!(repo.count(), 1);
    assert_eq!(repo.list_backups(Some("Night")).len(), 1);
}

#[test]
fn test_import_errors() {
    let repo = repository();
    assert!(matches!(
        repo.import("{"),
        Err(ProfileError::MalformedProfileDocument(_))
    ));
    assert!(matches!(
        repo.import(r#""just a string""#),
        Err(ProfileError::MalformedProfileDocument(_))
    ));
    assert!(matches!(
        repo.import(r#"{"formatVersion": "one", "name": "X"}"#),
        Err(ProfileError::MalformedProfileDocument(_))
    ));
    assert!(matches!(
        repo.import(r#"{"formatVersion": 7, "name": "X"}"#),
        Err(ProfileError::UnsupportedFormatVersion { found: 7, .. })
    ));
    assert_eq!(repo.count(), 0);
}

#[test]
fn test_export_import_between_repositories() {
    let source = repository();
    let values = PreferenceSet {
        reading_guide: true,
        color_blind_mode: ColorBlindMode::Tritanopia,
        ..Default::default()
    };
    source.save("Shared", values).unwrap();
    let json = source.export_json("Shared").unwrap();

    let target = repository();
    let imported = target.import(&json).unwrap();
    assert_eq!(imported.values, values);
    assert_eq!(ProfileDocument::parse(&json).unwrap().name, "Shared");
}

#[test]
fn test_export_unknown_profile() {
    assert!(matches!(
        repository().export("Ghost"),
        Err(ProfileError::ProfileNotFound(name)) if name == "Ghost"
    ));
}
