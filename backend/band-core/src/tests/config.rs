// Unit tests for panel configuration loading, saving, and validation

use crate::config::PanelConfig;
use crate::error::config::ConfigError;

/// **VALUE**: Pins the default configuration values.
///
/// **WHY THIS MATTERS**: Defaults are what every fresh install runs with.
/// The port window must match what documented controllers derive, and the
/// forward timeout bounds how long a host input event can stall.
///
/// **BUG THIS CATCHES**: Would catch an accidental change to a default while
/// refactoring the serde attributes.
#[test]
fn given_default_config_when_inspected_then_documented_values() {
    let config = PanelConfig::default();

    assert_eq!(config.version, 1);
    assert_eq!(config.channel.port_base, 49152);
    assert_eq!(config.channel.port_range, 16384);
    assert_eq!(config.forward.timeout_ms, 250);
    assert!(config.forward.message_ids.contains(&0x0201));
    assert_eq!(config.render.max_frame_len, 64 * 1024);
    assert!(config.validate().is_ok(), "defaults must validate");
}

/// **VALUE**: Verifies a missing config file loads as defaults, not an error.
///
/// **WHY THIS MATTERS**: First launch has no config file. Failing here would
/// make the panel unusable out of the box.
///
/// **BUG THIS CATCHES**: Would catch a load path that treats file-not-found
/// like a corrupted file.
#[test]
fn given_missing_config_file_when_loaded_then_defaults_returned() {
    // GIVEN: An empty directory
    let dir = tempfile::tempdir().expect("tempdir");

    // WHEN: Loading
    let config = PanelConfig::load(dir.path()).expect("missing file should not error");

    // THEN: Defaults
    assert_eq!(config.forward.timeout_ms, PanelConfig::default().forward.timeout_ms);
}

/// **VALUE**: Verifies save + load round-trips non-default values.
///
/// **WHY THIS MATTERS**: Configuration the user changed must survive a
/// restart; the atomic-write path (temp file + rename) must actually land
/// the content.
///
/// **BUG THIS CATCHES**: Would catch serde field mismatches between
/// serialize and deserialize, or the rename step writing the wrong path.
#[test]
fn given_modified_config_when_saved_and_loaded_then_values_survive() {
    let dir = tempfile::tempdir().expect("tempdir");

    // GIVEN: A modified config
    let mut config = PanelConfig::default();
    config.forward.timeout_ms = 750;
    config.forward.message_ids = vec![0x0100];
    config.channel.port_base = 50000;
    config.channel.port_range = 1000;

    // WHEN: Saving then loading
    config.save(dir.path()).expect("save should succeed");
    let loaded = PanelConfig::load(dir.path()).expect("load should succeed");

    // THEN: The values survive
    assert_eq!(loaded.forward.timeout_ms, 750);
    assert_eq!(loaded.forward.message_ids, vec![0x0100]);
    assert_eq!(loaded.channel.port_base, 50000);
    assert_eq!(loaded.channel.port_range, 1000);
}

/// **VALUE**: Verifies a corrupted config file is a parse error, not a panic
/// and not silent defaults.
///
/// **WHY THIS MATTERS**: Silent defaults would discard user settings on a
/// single bad write; the host deserves a distinguishable error to report.
///
/// **BUG THIS CATCHES**: Would catch a load path that swallows JSON errors.
#[test]
fn given_corrupted_config_file_when_loaded_then_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("config.json"), b"{not json").expect("write");

    let result = PanelConfig::load(dir.path());

    assert!(
        matches!(result, Err(ConfigError::ParseError { .. })),
        "corrupted file must be a ParseError, got {result:?}"
    );
}

/// **VALUE**: Verifies partial config files pick up defaults for missing
/// fields.
///
/// **WHY THIS MATTERS**: Config files written by older versions (or trimmed
/// by hand) must keep loading as the schema grows.
///
/// **BUG THIS CATCHES**: Would catch a field added without `#[serde(default)]`.
#[test]
fn given_partial_config_file_when_loaded_then_missing_fields_defaulted() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("config.json"),
        br#"{ "forward": { "timeout_ms": 500 } }"#,
    )
    .expect("write");

    let config = PanelConfig::load(dir.path()).expect("partial file should load");

    assert_eq!(config.forward.timeout_ms, 500);
    assert_eq!(config.version, 1, "missing version defaults");
    assert_eq!(config.channel.port_base, 49152, "missing section defaults");
}

/// **VALUE**: Verifies validation rejects impossible settings.
///
/// **WHY THIS MATTERS**: A port window past `u16::MAX` would wrap at
/// runtime and bind an unrelated port; a zero range would divide by zero in
/// endpoint derivation; a tiny frame cap would reject every real frame.
///
/// **BUG THIS CATCHES**: Would catch removal of any individual validation
/// clause.
#[test]
fn given_invalid_settings_when_validated_then_rejected() {
    let mut config = PanelConfig::default();
    config.channel.port_base = 65000;
    config.channel.port_range = 16384;
    assert!(config.validate().is_err(), "port window overflow");

    let mut config = PanelConfig::default();
    config.channel.port_range = 0;
    assert!(config.validate().is_err(), "empty port window");

    let mut config = PanelConfig::default();
    config.version = 0;
    assert!(config.validate().is_err(), "version 0");

    let mut config = PanelConfig::default();
    config.render.max_frame_len = 4;
    assert!(config.validate().is_err(), "unusable frame cap");
}
