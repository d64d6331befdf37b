// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Chorus configuration system.

use chorus_config::diagnostic::ConfigError;
use chorus_config::model::ChorusConfig;
use chorus_config::{load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes() {
    let toml = r#"
[agent]
name = "desk"
log_level = "debug"
seed = 42

[features]
part_responses = true
quiet_observer = true
annotations = true

[grounding]
distress_threshold = 4
self_bonus = 50.0

[observer]
part_id = "weaver"

[echo]
chance = 0.25

[storage]
database_path = "/tmp/chorus-test.db"
wal_mode = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "desk");
    assert_eq!(config.agent.seed, Some(42));
    assert!(config.features.part_responses);
    assert!(config.features.quiet_observer);
    assert!(!config.features.echoes);
    assert_eq!(config.grounding.distress_threshold, 4);
    assert_eq!(config.grounding.self_bonus, 50.0);
    assert_eq!(config.grounding.other_penalty, 30.0);
    assert_eq!(config.observer.part_id, "weaver");
    assert_eq!(config.echo.chance, 0.25);
    assert_eq!(config.storage.database_path, "/tmp/chorus-test.db");
    assert!(!config.storage.wal_mode);
}

#[test]
fn empty_toml_uses_documented_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.session.min_text_length, 20);
    assert_eq!(config.session.emotion_cooldown_secs, 30);
    assert_eq!(config.scoring.keyword_weight, 8.0);
    assert_eq!(config.scoring.keyword_cap, 30.0);
    assert_eq!(config.scoring.emotion_bonus, 15.0);
    assert_eq!(config.scoring.jitter_max, 15.0);
    assert_eq!(config.grounding.distress_threshold, 3);
    assert_eq!(config.grounding.auto_exit_minutes, 5);
    assert_eq!(config.grounding.self_bonus, 40.0);
    assert_eq!(config.grounding.other_penalty, 30.0);
    assert_eq!(config.grounding.observer_penalty, 60.0);
    assert_eq!(config.quiet.return_multiplier, 2.0);
    assert_eq!(config.observer.cooldown_entries, 3);
    assert_eq!(config.observer.cooldown_penalty, 100.0);
    assert_eq!(config.ritual.share_threshold, 0.6);
    assert_eq!(config.ritual.word_count_ratio, 1.5);
    assert_eq!(config.disagreement.delay_ms, 2000);
    assert_eq!(config.annotations.max_highlights, 5);
    assert_eq!(config.annotations.ghost_max_chars, 80);
}

#[test]
fn absent_feature_flags_are_off() {
    let config = ChorusConfig::default();
    assert_eq!(config.features, Default::default());
    assert!(!config.features.part_responses);
    assert!(!config.features.emergency_grounding);
}

#[test]
fn unknown_field_is_rejected() {
    let toml = r#"
[grounding]
slef_bonus = 10.0
"#;
    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = err.to_string();
    assert!(
        err_str.contains("unknown field") || err_str.contains("slef_bonus"),
        "got: {err_str}"
    );
}

#[test]
fn unknown_field_diagnostic_suggests_correction() {
    let toml = r#"
[grounding]
slef_bonus = 10.0
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("self_bonus"));
}

#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[echo]
chance = "often"
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("chance")))
    );
}

#[test]
fn semantic_validation_runs_after_parse() {
    let toml = r#"
[silence]
chance = 2.0
"#;
    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("silence.chance")))
    );
}

#[test]
fn dotted_override_layers_over_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: ChorusConfig = Figment::new()
        .merge(Serialized::defaults(ChorusConfig::default()))
        .merge(Toml::string("[features]\nquiet_return = false\n"))
        .merge(("features.quiet_return", true))
        .extract()
        .expect("override should merge");
    assert!(config.features.quiet_return);
}

#[test]
fn missing_config_file_is_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: ChorusConfig = Figment::new()
        .merge(Serialized::defaults(ChorusConfig::default()))
        .merge(Toml::file("/nonexistent/chorus.toml"))
        .extract()
        .expect("missing file should be silently skipped");
    assert_eq!(config.agent.name, "chorus");
}

#[test]
fn sample_config_is_valid() {
    let sample = include_str!("../../../chorus.toml");
    let config = load_and_validate_str(sample).expect("sample config should validate");
    assert!(config.features.part_responses);
}
