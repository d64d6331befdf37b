// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the semantic constraints serde cannot express: probabilities in
//! `[0, 1]`, non-negative weights, positive windows, and non-empty ids.

use crate::diagnostic::ConfigError;
use crate::model::ChorusConfig;

/// Longest grounding session before auto-exit: one day.
pub const MAX_AUTO_EXIT_MINUTES: u64 = 24 * 60;

/// Quiet thresholds beyond ten years are treated as typos.
pub const MAX_QUIET_THRESHOLD_DAYS: i64 = 3650;

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &ChorusConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let chances = [
        ("echo.chance", config.echo.chance),
        ("quote.chance", config.quote.chance),
        ("thread.chance", config.thread.chance),
        ("ritual.chance", config.ritual.chance),
        ("disagreement.chance", config.disagreement.chance),
        ("silence.chance", config.silence.chance),
        ("ritual.share_threshold", config.ritual.share_threshold),
    ];
    for (key, value) in chances {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be between 0 and 1, got {value}"),
            });
        }
    }

    let weights = [
        ("scoring.recency_penalty_first", config.scoring.recency_penalty_first),
        ("scoring.recency_penalty_second", config.scoring.recency_penalty_second),
        ("scoring.keyword_weight", config.scoring.keyword_weight),
        ("scoring.keyword_cap", config.scoring.keyword_cap),
        ("scoring.emotion_bonus", config.scoring.emotion_bonus),
        ("scoring.jitter_max", config.scoring.jitter_max),
        ("grounding.self_bonus", config.grounding.self_bonus),
        ("grounding.other_penalty", config.grounding.other_penalty),
        ("grounding.observer_penalty", config.grounding.observer_penalty),
        ("quiet.low_score_penalty", config.quiet.low_score_penalty),
        ("observer.cooldown_penalty", config.observer.cooldown_penalty),
        ("observer.overlap_weight", config.observer.overlap_weight),
        ("observer.overlap_cap", config.observer.overlap_cap),
        ("observer.pause_mismatch_penalty", config.observer.pause_mismatch_penalty),
    ];
    for (key, value) in weights {
        if !value.is_finite() || value < 0.0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be a non-negative number, got {value}"),
            });
        }
    }

    if !(config.quiet.return_multiplier.is_finite() && config.quiet.return_multiplier > 0.0) {
        errors.push(ConfigError::Validation {
            message: format!(
                "quiet.return_multiplier must be positive, got {}",
                config.quiet.return_multiplier
            ),
        });
    }

    if config.ritual.word_count_ratio <= 1.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "ritual.word_count_ratio must be greater than 1, got {}",
                config.ritual.word_count_ratio
            ),
        });
    }

    if config.grounding.distress_threshold > 5 {
        errors.push(ConfigError::Validation {
            message: format!(
                "grounding.distress_threshold must be between 0 and 5, got {}",
                config.grounding.distress_threshold
            ),
        });
    }

    let positives = [
        ("grounding.auto_exit_minutes", config.grounding.auto_exit_minutes),
        ("quiet.threshold_days", config.quiet.threshold_days.max(0) as u64),
        ("session.max_tokens", u64::from(config.session.max_tokens)),
        ("session.emotion_cooldown_secs", config.session.emotion_cooldown_secs),
        ("echo.window", config.echo.window as u64),
        ("quote.window", config.quote.window as u64),
        ("thread.window", config.thread.window as u64),
        ("ritual.window", config.ritual.window as u64),
        ("annotations.ghost_max_chars", config.annotations.ghost_max_chars as u64),
    ];
    for (key, value) in positives {
        if value == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be greater than zero"),
            });
        }
    }

    if config.grounding.auto_exit_minutes > MAX_AUTO_EXIT_MINUTES {
        errors.push(ConfigError::Validation {
            message: format!(
                "grounding.auto_exit_minutes must be at most {MAX_AUTO_EXIT_MINUTES}, got {}",
                config.grounding.auto_exit_minutes
            ),
        });
    }
    if config.quiet.threshold_days > MAX_QUIET_THRESHOLD_DAYS {
        errors.push(ConfigError::Validation {
            message: format!(
                "quiet.threshold_days must be at most {MAX_QUIET_THRESHOLD_DAYS}, got {}",
                config.quiet.threshold_days
            ),
        });
    }

    if config.ritual.min_sessions > config.ritual.window {
        errors.push(ConfigError::Validation {
            message: format!(
                "ritual.min_sessions ({}) must not exceed ritual.window ({})",
                config.ritual.min_sessions, config.ritual.window
            ),
        });
    }

    if config.features.quiet_observer && config.observer.part_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "observer.part_id must not be empty when features.quiet_observer is on"
                .to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
