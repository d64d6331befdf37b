// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Chorus orchestration engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Every tunable has a compiled default, and every
//! feature flag defaults to off, so `ChorusConfig::default()` is inert.

use serde::{Deserialize, Serialize};

/// Top-level Chorus configuration snapshot.
///
/// Read once per orchestration cycle; the engine never writes it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChorusConfig {
    #[serde(default)]
    pub agent: AgentConfig,

    /// Feature flags. Absent flags are off.
    #[serde(default)]
    pub features: FeaturesConfig,

    #[serde(default)]
    pub session: SessionConfig,

    /// Heuristic scorer weights.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Safety override and grounding mode.
    #[serde(default)]
    pub grounding: GroundingConfig,

    /// Quiet-period tracking and return bonus.
    #[serde(default)]
    pub quiet: QuietConfig,

    /// The designated quiet-observer persona.
    #[serde(default)]
    pub observer: ObserverConfig,

    #[serde(default)]
    pub echo: EchoConfig,

    #[serde(default)]
    pub quote: QuoteConfig,

    #[serde(default)]
    pub thread: ThreadConfig,

    #[serde(default)]
    pub ritual: RitualConfig,

    #[serde(default)]
    pub disagreement: DisagreementConfig,

    #[serde(default)]
    pub silence: SilenceConfig,

    /// Side-channel annotation limits.
    #[serde(default)]
    pub annotations: AnnotationsConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Process identity and logging.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Fixed RNG seed. When unset the orchestrator seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            seed: None,
        }
    }
}

fn default_agent_name() -> String {
    "chorus".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Feature flags gating each behavior. All default to `false`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturesConfig {
    /// Master switch for persona responses on pause events.
    #[serde(default)]
    pub part_responses: bool,

    /// Enables the designated quiet-observer persona.
    #[serde(default)]
    pub quiet_observer: bool,

    /// Lets the periodic distress check activate grounding.
    #[serde(default)]
    pub emergency_grounding: bool,

    #[serde(default)]
    pub echoes: bool,

    #[serde(default)]
    pub quotes: bool,

    #[serde(default)]
    pub threads: bool,

    #[serde(default)]
    pub rituals: bool,

    #[serde(default)]
    pub disagreements: bool,

    #[serde(default)]
    pub silence: bool,

    /// Enables the highlights/ghost-text side channel.
    #[serde(default)]
    pub annotations: bool,

    /// Enables quiet-period tracking and the return bonus.
    #[serde(default)]
    pub quiet_return: bool,
}

impl FeaturesConfig {
    /// Every flag switched on.
    pub fn all_enabled() -> Self {
        Self {
            part_responses: true,
            quiet_observer: true,
            emergency_grounding: true,
            echoes: true,
            quotes: true,
            threads: true,
            rituals: true,
            disagreements: true,
            silence: true,
            annotations: true,
            quiet_return: true,
        }
    }
}

/// Per-session cycle limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Pause events with shorter current text are ignored.
    #[serde(default = "default_min_text_length")]
    pub min_text_length: usize,

    /// Token budget for a single persona response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Generated text must exceed this many characters to become an observation memory.
    #[serde(default = "default_observation_min_length")]
    pub observation_min_length: usize,

    /// Minimum seconds between periodic emotion/distress checks.
    #[serde(default = "default_emotion_cooldown_secs")]
    pub emotion_cooldown_secs: u64,

    /// Memories per persona included in a prompt.
    #[serde(default = "default_prompt_memories")]
    pub prompt_memories: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_text_length: default_min_text_length(),
            max_tokens: default_max_tokens(),
            observation_min_length: default_observation_min_length(),
            emotion_cooldown_secs: default_emotion_cooldown_secs(),
            prompt_memories: default_prompt_memories(),
        }
    }
}

fn default_min_text_length() -> usize {
    20
}

fn default_max_tokens() -> u32 {
    150
}

fn default_observation_min_length() -> usize {
    50
}

fn default_emotion_cooldown_secs() -> u64 {
    30
}

fn default_prompt_memories() -> usize {
    5
}

/// Weights of the general scoring terms.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Penalty when the persona was the most recent speaker.
    #[serde(default = "default_recency_first")]
    pub recency_penalty_first: f64,

    /// Penalty when the persona was the second most recent speaker.
    #[serde(default = "default_recency_second")]
    pub recency_penalty_second: f64,

    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,

    #[serde(default = "default_keyword_cap")]
    pub keyword_cap: f64,

    #[serde(default = "default_emotion_bonus")]
    pub emotion_bonus: f64,

    /// Upper bound (exclusive) of the uniform jitter term.
    #[serde(default = "default_jitter_max")]
    pub jitter_max: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            recency_penalty_first: default_recency_first(),
            recency_penalty_second: default_recency_second(),
            keyword_weight: default_keyword_weight(),
            keyword_cap: default_keyword_cap(),
            emotion_bonus: default_emotion_bonus(),
            jitter_max: default_jitter_max(),
        }
    }
}

fn default_recency_first() -> f64 {
    50.0
}

fn default_recency_second() -> f64 {
    25.0
}

fn default_keyword_weight() -> f64 {
    8.0
}

fn default_keyword_cap() -> f64 {
    30.0
}

fn default_emotion_bonus() -> f64 {
    15.0
}

fn default_jitter_max() -> f64 {
    15.0
}

/// Safety override thresholds and grounding weights.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroundingConfig {
    /// Distress level (0-5) at or above which grounding activates.
    #[serde(default = "default_distress_threshold")]
    pub distress_threshold: u8,

    #[serde(default = "default_auto_exit_minutes")]
    pub auto_exit_minutes: u64,

    #[serde(default = "default_self_bonus")]
    pub self_bonus: f64,

    #[serde(default = "default_other_penalty")]
    pub other_penalty: f64,

    /// Extra penalty for the quiet observer while grounded.
    #[serde(default = "default_observer_penalty")]
    pub observer_penalty: f64,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            distress_threshold: default_distress_threshold(),
            auto_exit_minutes: default_auto_exit_minutes(),
            self_bonus: default_self_bonus(),
            other_penalty: default_other_penalty(),
            observer_penalty: default_observer_penalty(),
        }
    }
}

fn default_distress_threshold() -> u8 {
    3
}

fn default_auto_exit_minutes() -> u64 {
    5
}

fn default_self_bonus() -> f64 {
    40.0
}

fn default_other_penalty() -> f64 {
    30.0
}

fn default_observer_penalty() -> f64 {
    60.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuietConfig {
    /// Days of inactivity after which a persona counts as quiet.
    #[serde(default = "default_quiet_threshold_days")]
    pub threshold_days: i64,

    /// Multiplier applied to a returning persona's final score.
    #[serde(default = "default_return_multiplier")]
    pub return_multiplier: f64,

    /// Quiet personas scoring below this get `low_score_penalty`.
    #[serde(default = "default_low_score_cutoff")]
    pub low_score_cutoff: f64,

    #[serde(default = "default_low_score_penalty")]
    pub low_score_penalty: f64,
}

impl Default for QuietConfig {
    fn default() -> Self {
        Self {
            threshold_days: default_quiet_threshold_days(),
            return_multiplier: default_return_multiplier(),
            low_score_cutoff: default_low_score_cutoff(),
            low_score_penalty: default_low_score_penalty(),
        }
    }
}

fn default_quiet_threshold_days() -> i64 {
    7
}

fn default_return_multiplier() -> f64 {
    2.0
}

fn default_low_score_cutoff() -> f64 {
    30.0
}

fn default_low_score_penalty() -> f64 {
    40.0
}

/// Rules for the avoidance-aware quiet observer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ObserverConfig {
    /// Persona id of the designated observer.
    #[serde(default = "default_observer_part_id")]
    pub part_id: String,

    /// Entries that must elapse before the observer may speak again.
    #[serde(default = "default_cooldown_entries")]
    pub cooldown_entries: usize,

    #[serde(default = "default_cooldown_penalty")]
    pub cooldown_penalty: f64,

    /// Points per avoidance-vocabulary word found in the recent text.
    #[serde(default = "default_overlap_weight")]
    pub overlap_weight: f64,

    #[serde(default = "default_overlap_cap")]
    pub overlap_cap: f64,

    #[serde(default = "default_observer_recency_first")]
    pub recency_penalty_first: f64,

    #[serde(default = "default_observer_recency_second")]
    pub recency_penalty_second: f64,

    /// Penalty when the pause type is not avoidance-relevant.
    #[serde(default = "default_pause_mismatch_penalty")]
    pub pause_mismatch_penalty: f64,

    /// Score returned when the observer feature is off.
    #[serde(default = "default_disabled_score")]
    pub disabled_score: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            part_id: default_observer_part_id(),
            cooldown_entries: default_cooldown_entries(),
            cooldown_penalty: default_cooldown_penalty(),
            overlap_weight: default_overlap_weight(),
            overlap_cap: default_overlap_cap(),
            recency_penalty_first: default_observer_recency_first(),
            recency_penalty_second: default_observer_recency_second(),
            pause_mismatch_penalty: default_pause_mismatch_penalty(),
            disabled_score: default_disabled_score(),
        }
    }
}

fn default_observer_part_id() -> String {
    "watcher".to_string()
}

fn default_cooldown_entries() -> usize {
    3
}

fn default_cooldown_penalty() -> f64 {
    100.0
}

fn default_overlap_weight() -> f64 {
    10.0
}

fn default_overlap_cap() -> f64 {
    30.0
}

fn default_observer_recency_first() -> f64 {
    80.0
}

fn default_observer_recency_second() -> f64 {
    50.0
}

fn default_pause_mismatch_penalty() -> f64 {
    40.0
}

fn default_disabled_score() -> f64 {
    -1000.0
}

/// Direct resurfacing of a past fragment in place of a persona response.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EchoConfig {
    #[serde(default = "default_echo_chance")]
    pub chance: f64,

    /// Only entries at least this old are candidates.
    #[serde(default = "default_echo_min_age_days")]
    pub min_age_days: i64,

    /// Number of recent entries searched.
    #[serde(default = "default_history_window")]
    pub window: usize,

    #[serde(default = "default_echo_max_per_session")]
    pub max_per_session: usize,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            chance: default_echo_chance(),
            min_age_days: default_echo_min_age_days(),
            window: default_history_window(),
            max_per_session: default_echo_max_per_session(),
        }
    }
}

fn default_echo_chance() -> f64 {
    0.1
}

fn default_echo_min_age_days() -> i64 {
    7
}

fn default_history_window() -> usize {
    20
}

fn default_echo_max_per_session() -> usize {
    2
}

/// Past-fragment enrichment injected into the persona prompt.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuoteConfig {
    #[serde(default = "default_quote_chance")]
    pub chance: f64,

    #[serde(default = "default_quote_min_age_days")]
    pub min_age_days: i64,

    #[serde(default = "default_history_window")]
    pub window: usize,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            chance: default_quote_chance(),
            min_age_days: default_quote_min_age_days(),
            window: default_history_window(),
        }
    }
}

fn default_quote_chance() -> f64 {
    0.3
}

fn default_quote_min_age_days() -> i64 {
    1
}

/// Unfinished-thread callbacks.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThreadConfig {
    #[serde(default = "default_thread_chance")]
    pub chance: f64,

    /// Number of recent summaries searched.
    #[serde(default = "default_thread_window")]
    pub window: usize,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            chance: default_thread_chance(),
            window: default_thread_window(),
        }
    }
}

fn default_thread_chance() -> f64 {
    0.2
}

fn default_thread_window() -> usize {
    10
}

/// Writing-ritual detection over session logs.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RitualConfig {
    #[serde(default = "default_ritual_chance")]
    pub chance: f64,

    /// Number of recent session logs analysed.
    #[serde(default = "default_ritual_window")]
    pub window: usize,

    /// Fewer logs than this yields no rituals.
    #[serde(default = "default_ritual_min_sessions")]
    pub min_sessions: usize,

    /// Share of sessions above which a bucket is a ritual.
    #[serde(default = "default_ritual_share_threshold")]
    pub share_threshold: f64,

    /// Ratio of a bucket's mean word count to the other buckets' mean.
    #[serde(default = "default_ritual_word_count_ratio")]
    pub word_count_ratio: f64,
}

impl Default for RitualConfig {
    fn default() -> Self {
        Self {
            chance: default_ritual_chance(),
            window: default_ritual_window(),
            min_sessions: default_ritual_min_sessions(),
            share_threshold: default_ritual_share_threshold(),
            word_count_ratio: default_ritual_word_count_ratio(),
        }
    }
}

fn default_ritual_chance() -> f64 {
    0.15
}

fn default_ritual_window() -> usize {
    20
}

fn default_ritual_min_sessions() -> usize {
    5
}

fn default_ritual_share_threshold() -> f64 {
    0.6
}

fn default_ritual_word_count_ratio() -> f64 {
    1.5
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisagreementConfig {
    #[serde(default = "default_disagreement_chance")]
    pub chance: f64,

    /// Delay before the follow-up generation starts.
    #[serde(default = "default_disagreement_delay_ms")]
    pub delay_ms: u64,
}

impl Default for DisagreementConfig {
    fn default() -> Self {
        Self {
            chance: default_disagreement_chance(),
            delay_ms: default_disagreement_delay_ms(),
        }
    }
}

fn default_disagreement_chance() -> f64 {
    0.2
}

fn default_disagreement_delay_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SilenceConfig {
    #[serde(default = "default_silence_chance")]
    pub chance: f64,

    /// Seconds of uninterrupted writing before silence may trigger.
    #[serde(default = "default_flow_threshold_secs")]
    pub flow_threshold_secs: u64,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            chance: default_silence_chance(),
            flow_threshold_secs: default_flow_threshold_secs(),
        }
    }
}

fn default_silence_chance() -> f64 {
    0.1
}

fn default_flow_threshold_secs() -> u64 {
    300
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationsConfig {
    #[serde(default = "default_max_highlights")]
    pub max_highlights: usize,

    /// Maximum ghost-text length in characters, leading space included.
    #[serde(default = "default_ghost_max_chars")]
    pub ghost_max_chars: usize,
}

impl Default for AnnotationsConfig {
    fn default() -> Self {
        Self {
            max_highlights: default_max_highlights(),
            ghost_max_chars: default_ghost_max_chars(),
        }
    }
}

fn default_max_highlights() -> usize {
    5
}

fn default_ghost_max_chars() -> usize {
    80
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("chorus/chorus.db").display().to_string())
        .unwrap_or_else(|| "chorus.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}
