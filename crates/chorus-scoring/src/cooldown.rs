// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-entry cooldown for the quiet observer.
//!
//! The count is an approximation over the cached summary window rather than
//! a durable counter: once the real gap exceeds the window it reports the
//! conservative "not found" value.

use chorus_core::EntrySummary;

/// Number of cached summaries searched for the marker.
pub const SUMMARY_WINDOW: usize = 5;

/// Reported when the marker entry has fallen out of the window.
pub const NOT_FOUND_ENTRIES: usize = 3;

/// Reported when no summaries are cached yet.
pub const EMPTY_CACHE_ENTRIES: usize = 1;

/// Entries elapsed since the observer last spoke.
///
/// `summaries` must be newest first. Returns `None` when no adjustment
/// applies: the observer never spoke, or it last spoke in the current entry.
pub fn entries_since_marker(
    marker: Option<&str>,
    current_entry_id: &str,
    summaries: &[EntrySummary],
) -> Option<usize> {
    let marker = marker?;
    if marker == current_entry_id {
        return None;
    }
    if summaries.is_empty() {
        return Some(EMPTY_CACHE_ENTRIES);
    }
    let found = summaries
        .iter()
        .take(SUMMARY_WINDOW)
        .position(|s| s.entry_id == marker);
    Some(found.map_or(NOT_FOUND_ENTRIES, |idx| idx + 1))
}
