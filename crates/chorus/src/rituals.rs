// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chorus rituals` command implementation.

use chorus_config::ChorusConfig;
use chorus_core::{ChorusError, PartStore};
use chorus_engines::{RitualPattern, detect_rituals};
use chorus_storage::SqliteStore;

pub fn render_report(patterns: &[RitualPattern], analysed: usize, min_sessions: usize) -> String {
    if analysed < min_sessions {
        return format!(
            "{analysed} session(s) logged; at least {min_sessions} are needed to detect rituals\n"
        );
    }
    if patterns.is_empty() {
        return format!("no rituals found in the last {analysed} sessions\n");
    }
    let mut out = format!("rituals in the last {analysed} sessions:\n");
    for p in patterns {
        out.push_str(&format!(
            "  {:<32} {:>5.2}  {} session(s)  {}\n",
            p.label,
            p.strength,
            p.sessions,
            p.describe()
        ));
    }
    out
}

/// Run the `chorus rituals` command.
pub async fn run_rituals(config: &ChorusConfig, db: &str) -> Result<(), ChorusError> {
    let store = SqliteStore::open(db).await?;
    let logs = store.recent_session_logs(config.ritual.window).await?;
    let patterns = detect_rituals(&logs, &config.ritual);
    print!(
        "{}",
        render_report(&patterns, logs.len(), config.ritual.min_sessions)
    );
    store.close().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_engines::RitualKind;

    #[test]
    fn too_few_sessions_says_so() {
        let report = render_report(&[], 2, 5);
        assert!(report.contains("at least 5"));
    }

    #[test]
    fn patterns_are_listed_with_descriptions() {
        let patterns = vec![RitualPattern {
            kind: RitualKind::TimeOfDay,
            label: "time:morning".into(),
            strength: 0.8,
            sessions: 8,
        }];
        let report = render_report(&patterns, 10, 5);
        assert!(report.contains("time:morning"));
        assert!(report.contains("tends to write in the morning"));
    }

    #[test]
    fn empty_result_is_reported() {
        assert!(render_report(&[], 10, 5).contains("no rituals"));
    }
}
