// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ritual: detect habitual writing times over a window of session logs.
//!
//! A time-of-day, day-of-week, or day-and-time bucket is a ritual when its
//! share of the window exceeds the configured threshold. Separately, a
//! time-of-day bucket whose mean word count exceeds the mean of the other
//! buckets by the configured ratio is reported as a productive time.

use std::collections::BTreeMap;

use chorus_config::model::RitualConfig;
use chorus_core::{ChorusError, PartStore, SessionLog, TimeOfDay};
use chrono::Weekday;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::text::roll;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RitualKind {
    TimeOfDay,
    DayOfWeek,
    DayAndTime,
    WordCount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RitualPattern {
    pub kind: RitualKind,
    /// Stable label such as `time:morning` or `day_time:sunday_evening`.
    pub label: String,
    /// Share of sessions for bucket patterns; mean word-count ratio for
    /// [`RitualKind::WordCount`].
    pub strength: f64,
    /// Sessions that fell into the bucket.
    pub sessions: usize,
}

impl RitualPattern {
    /// One-line description for prompts and reports.
    pub fn describe(&self) -> String {
        let bucket = self
            .label
            .split_once(':')
            .map_or(self.label.as_str(), |(_, b)| b)
            .replace('_', " ");
        match self.kind {
            RitualKind::WordCount => format!(
                "the writer writes about {:.1}x more in the {bucket} than at other times",
                self.strength
            ),
            RitualKind::TimeOfDay => format!(
                "the writer tends to write in the {bucket} ({:.0}% of recent sessions)",
                self.strength * 100.0
            ),
            RitualKind::DayOfWeek => format!(
                "the writer tends to write on {bucket}s ({:.0}% of recent sessions)",
                self.strength * 100.0
            ),
            RitualKind::DayAndTime => format!(
                "the writer tends to write on {bucket} ({:.0}% of recent sessions)",
                self.strength * 100.0
            ),
        }
    }
}

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn share_patterns<K: Ord>(
    logs: &[SessionLog],
    kind: RitualKind,
    threshold: f64,
    key: impl Fn(&SessionLog) -> (K, String),
) -> Vec<RitualPattern> {
    let mut buckets: BTreeMap<K, (String, usize)> = BTreeMap::new();
    for log in logs {
        let (k, label) = key(log);
        buckets.entry(k).or_insert((label, 0)).1 += 1;
    }
    let total = logs.len() as f64;
    buckets
        .into_values()
        .filter_map(|(label, n)| {
            let share = n as f64 / total;
            (share > threshold).then_some(RitualPattern {
                kind,
                label,
                strength: share,
                sessions: n,
            })
        })
        .collect()
}

fn word_count_patterns(logs: &[SessionLog], ratio: f64) -> Vec<RitualPattern> {
    let mut buckets: BTreeMap<TimeOfDay, (u64, usize)> = BTreeMap::new();
    for log in logs {
        let slot = buckets.entry(log.time_of_day).or_default();
        slot.0 += u64::from(log.word_count);
        slot.1 += 1;
    }
    if buckets.len() < 2 {
        return Vec::new();
    }
    let means: Vec<(TimeOfDay, f64, usize)> = buckets
        .into_iter()
        .map(|(tod, (sum, n))| (tod, sum as f64 / n as f64, n))
        .collect();

    let mut out = Vec::new();
    for (i, &(tod, mean, n)) in means.iter().enumerate() {
        let others: Vec<f64> = means
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, m)| m.1)
            .collect();
        let others_mean = others.iter().sum::<f64>() / others.len() as f64;
        if others_mean > 0.0 && mean > ratio * others_mean {
            out.push(RitualPattern {
                kind: RitualKind::WordCount,
                label: format!("words:{tod}"),
                strength: mean / others_mean,
                sessions: n,
            });
        }
    }
    out
}

/// All ritual patterns in `logs`. Empty below the minimum session count.
pub fn detect_rituals(logs: &[SessionLog], config: &RitualConfig) -> Vec<RitualPattern> {
    if logs.is_empty() || logs.len() < config.min_sessions {
        return Vec::new();
    }
    let threshold = config.share_threshold;
    let mut patterns = share_patterns(logs, RitualKind::TimeOfDay, threshold, |l| {
        (l.time_of_day, format!("time:{}", l.time_of_day))
    });
    patterns.extend(share_patterns(logs, RitualKind::DayOfWeek, threshold, |l| {
        (
            l.day_of_week.num_days_from_monday(),
            format!("day:{}", weekday_label(l.day_of_week)),
        )
    }));
    patterns.extend(share_patterns(logs, RitualKind::DayAndTime, threshold, |l| {
        (
            (l.day_of_week.num_days_from_monday(), l.time_of_day),
            format!("day_time:{}_{}", weekday_label(l.day_of_week), l.time_of_day),
        )
    }));
    patterns.extend(word_count_patterns(logs, config.word_count_ratio));
    patterns
}

pub struct RitualEngine<'a> {
    config: &'a RitualConfig,
}

impl<'a> RitualEngine<'a> {
    pub fn new(config: &'a RitualConfig) -> Self {
        Self { config }
    }

    pub fn gate<R: Rng>(&self, enabled: bool, grounding_active: bool, rng: &mut R) -> bool {
        enabled && !grounding_active && roll(rng, self.config.chance)
    }

    /// The strongest ritual in the recent window, if any.
    pub async fn find(&self, store: &dyn PartStore) -> Option<RitualPattern> {
        match self.try_find(store).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "ritual lookup failed");
                None
            }
        }
    }

    async fn try_find(&self, store: &dyn PartStore) -> Result<Option<RitualPattern>, ChorusError> {
        if store.count_session_logs().await? < self.config.min_sessions {
            return Ok(None);
        }
        let logs = store.recent_session_logs(self.config.window).await?;
        let patterns = detect_rituals(&logs, self.config);
        let pick = patterns
            .iter()
            .filter(|p| p.kind != RitualKind::WordCount)
            .max_by(|a, b| a.strength.total_cmp(&b.strength))
            .or_else(|| patterns.first())
            .cloned();
        if let Some(p) = &pick {
            debug!(label = %p.label, strength = p.strength, "ritual found");
        }
        Ok(pick)
    }
}
