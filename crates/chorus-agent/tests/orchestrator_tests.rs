// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end orchestration cycles over mock collaborators.

use chorus_agent::{CycleOutcome, CyclePhase, SkipReason, observer_marker_key};
use chorus_core::{HostEvent, MemoryKind, PauseType};
use chorus_test_utils::fixtures::{self, entry, pause, roster, summary};
use chorus_test_utils::{ENTRY_ID, InMemoryStore, MockClassifier, Script, TestHarness};
use tracing_test::traced_test;

const WRITING: &str = "I sat by the window for a long time before I could start writing today.";

async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}

fn spoke(outcome: &CycleOutcome) -> &str {
    match outcome {
        CycleOutcome::Spoke { part_id, .. } => part_id,
        other => panic!("expected a thought, got {other:?}"),
    }
}

#[tokio::test]
async fn pause_produces_one_persisted_thought() {
    let h = TestHarness::builder().build().await.unwrap();

    let outcome = h.pause(pause(PauseType::SentenceComplete, WRITING)).await;
    let part_id = spoke(&outcome).to_string();

    assert_eq!(h.sink.milestones(), vec!["thought_start", "thought_complete"]);
    let thoughts = h.store.thoughts();
    assert_eq!(thoughts.len(), 1);
    assert_eq!(thoughts[0].part_id, part_id);
    assert_eq!(thoughts[0].entry_id, ENTRY_ID);
    assert_eq!(thoughts[0].content, h.sink.thought_text());
    assert!(!thoughts[0].is_disagreement);
    assert_eq!(h.orchestrator.recent_speakers(), vec![part_id]);
    assert_eq!(h.orchestrator.phase(), CyclePhase::Idle);
    assert!(!h.orchestrator.is_busy());
}

#[tokio::test]
async fn observer_never_speaks_when_disabled() {
    let h = TestHarness::builder().build().await.unwrap();
    for _ in 0..4 {
        let outcome = h.pause(pause(PauseType::LongPause, WRITING)).await;
        assert_ne!(spoke(&outcome), "watcher");
    }
}

#[tokio::test]
async fn disabled_feature_skips_without_calls() {
    let h = TestHarness::builder()
        .configure(|c| c.features.part_responses = false)
        .build()
        .await
        .unwrap();
    let outcome = h.pause(pause(PauseType::LongPause, WRITING)).await;
    assert_eq!(outcome, CycleOutcome::Skipped(SkipReason::FeatureDisabled));
    assert_eq!(h.provider.request_count(), 0);
    assert!(h.sink.events().is_empty());
}

#[tokio::test]
async fn short_text_is_ignored() {
    let h = TestHarness::builder().build().await.unwrap();
    let outcome = h.pause(pause(PauseType::ShortPause, "   just a bit   ")).await;
    assert_eq!(outcome, CycleOutcome::Skipped(SkipReason::TextTooShort));
    assert_eq!(h.provider.request_count(), 0);
    assert!(h.store.thoughts().is_empty());
}

#[tokio::test]
async fn pause_during_generation_is_dropped() {
    let h = TestHarness::builder()
        .with_scripts(vec![Script::Hang(vec!["Wait, ".into()])])
        .build()
        .await
        .unwrap();

    let orchestrator = h.orchestrator.clone();
    let first = tokio::spawn(async move {
        orchestrator
            .handle_pause(pause(PauseType::LongPause, WRITING))
            .await
    });
    wait_until(|| h.provider.request_count() == 1).await;
    assert!(h.orchestrator.is_busy());

    let second = h.pause(pause(PauseType::ParagraphBreak, WRITING)).await;
    assert_eq!(second, CycleOutcome::Skipped(SkipReason::Busy));

    assert!(h.orchestrator.cancel_generation());
    assert_eq!(first.await.unwrap(), CycleOutcome::Cancelled);
    assert_eq!(h.provider.request_count(), 1);
    assert_eq!(h.provider.max_in_flight(), 1);
    assert!(!h.orchestrator.is_busy());
}

#[tokio::test]
async fn cancellation_persists_nothing_and_reports_no_error() {
    let h = TestHarness::builder()
        .with_scripts(vec![Script::Hang(vec!["You could ".into()])])
        .build()
        .await
        .unwrap();

    let orchestrator = h.orchestrator.clone();
    let cycle = tokio::spawn(async move {
        orchestrator
            .handle_pause(pause(PauseType::TrailingOff, WRITING))
            .await
    });
    wait_until(|| h.sink.thought_text() == "You could ").await;
    h.orchestrator.cancel_generation();

    assert_eq!(cycle.await.unwrap(), CycleOutcome::Cancelled);
    assert!(h.store.thoughts().is_empty());
    assert!(!h.sink.kinds().contains(&"error"));
    assert!(h.orchestrator.recent_speakers().is_empty());
    assert!(!h.orchestrator.cancel_generation());
}

#[tokio::test]
#[traced_test]
async fn transport_failure_emits_error_and_persists_nothing() {
    let h = TestHarness::builder()
        .with_scripts(vec![Script::FailAfter {
            chunks: vec!["It seems ".into()],
            message: "connection reset".into(),
        }])
        .build()
        .await
        .unwrap();

    let outcome = h.pause(pause(PauseType::LongPause, WRITING)).await;
    assert_eq!(outcome, CycleOutcome::Failed);
    assert_eq!(h.sink.milestones(), vec!["thought_start", "error"]);
    assert!(h.store.thoughts().is_empty());
    assert!(h.orchestrator.recent_speakers().is_empty());
    assert!(logs_contain("generation failed"));

    // The next pause runs normally.
    let retry = h.pause(pause(PauseType::LongPause, WRITING)).await;
    spoke(&retry);
    assert_eq!(h.store.thoughts().len(), 1);
}

#[tokio::test]
async fn provider_refusing_to_open_fails_the_cycle() {
    let h = TestHarness::builder()
        .with_scripts(vec![Script::FailToOpen("unauthorized".into())])
        .build()
        .await
        .unwrap();
    let outcome = h.pause(pause(PauseType::Question, WRITING)).await;
    assert_eq!(outcome, CycleOutcome::Failed);
    assert!(h.sink.kinds().contains(&"error"));
}

#[tokio::test]
async fn store_failure_while_persisting_fails_the_cycle() {
    let h = TestHarness::builder().build().await.unwrap();
    h.store.set_failing(true);
    let outcome = h.pause(pause(PauseType::LongPause, WRITING)).await;
    assert_eq!(outcome, CycleOutcome::Failed);
    assert!(h.sink.kinds().contains(&"error"));
}

#[tokio::test]
async fn start_fails_when_roster_cannot_load() {
    let store = InMemoryStore::with_parts(roster());
    store.set_failing(true);
    let built = TestHarness::builder().with_store(store).build().await;
    assert!(built.is_err());
}

#[tokio::test]
async fn recency_penalty_rotates_speakers() {
    let h = TestHarness::builder()
        .configure(|c| c.scoring.jitter_max = 0.0)
        .build()
        .await
        .unwrap();
    let first = spoke(&h.pause(pause(PauseType::LongPause, WRITING)).await).to_string();
    let second = spoke(&h.pause(pause(PauseType::LongPause, WRITING)).await).to_string();
    assert_ne!(first, second);
    assert_eq!(h.orchestrator.recent_speakers(), vec![second, first]);
}

#[tokio::test]
async fn recent_speakers_keep_three() {
    let h = TestHarness::builder().build().await.unwrap();
    for _ in 0..5 {
        spoke(&h.pause(pause(PauseType::SentenceComplete, WRITING)).await);
    }
    assert_eq!(h.orchestrator.recent_speakers().len(), 3);
}

#[tokio::test]
async fn crisis_language_grounds_and_center_answers() {
    let h = TestHarness::builder()
        .configure(|c| c.scoring.jitter_max = 0.0)
        .build()
        .await
        .unwrap();
    let text = "I can't breathe and the walls feel like they are closing in on me.";

    let outcome = h.pause(pause(PauseType::LongPause, text)).await;
    assert_eq!(spoke(&outcome), "center");
    assert!(h.orchestrator.grounding().is_active());

    let request = &h.provider.requests()[0];
    assert!(request.messages[0].content.contains("slow breath"));

    wait_until(|| h.sink.kinds().contains(&"grounding_changed")).await;
}

#[tokio::test]
async fn distress_reading_sets_emotion_and_grounds() {
    let h = TestHarness::builder()
        .configure(|c| c.features.emergency_grounding = true)
        .with_classifier(MockClassifier::fixed(chorus_core::EmotionTag::Fearful, 5))
        .build()
        .await
        .unwrap();

    h.pause(pause(PauseType::LongPause, WRITING)).await;
    wait_until(|| h.orchestrator.current_emotion().is_some()).await;

    assert_eq!(
        h.orchestrator.current_emotion(),
        Some(chorus_core::EmotionTag::Fearful)
    );
    assert!(h.orchestrator.grounding().is_active());
    assert!(h.sink.kinds().contains(&"emotion_detected"));
    assert_eq!(h.classifier.calls(), 1);
}

#[tokio::test]
async fn distress_checks_respect_cooldown() {
    let h = TestHarness::builder().build().await.unwrap();
    h.pause(pause(PauseType::LongPause, WRITING)).await;
    h.pause(pause(PauseType::LongPause, WRITING)).await;
    wait_until(|| h.classifier.calls() >= 1).await;
    assert_eq!(h.classifier.calls(), 1);
}

#[tokio::test]
async fn echo_short_circuits_generation_until_capped() {
    let store = InMemoryStore::with_parts(roster());
    store.add_entry(entry(
        "old",
        "We planted roses along the garden wall that spring. Grandmother hummed the whole time.",
        30,
    ));
    let h = TestHarness::builder()
        .configure(|c| {
            c.features.echoes = true;
            c.echo.chance = 1.0;
        })
        .with_store(store)
        .build()
        .await
        .unwrap();
    let text = "Today I walked past a garden full of roses and thought of grandmother.";

    for _ in 0..2 {
        let outcome = h.pause(pause(PauseType::LongPause, text)).await;
        assert_eq!(
            outcome,
            CycleOutcome::Echoed {
                entry_id: "old".into()
            }
        );
    }
    assert_eq!(h.provider.request_count(), 0);
    assert_eq!(h.sink.milestones(), vec!["echo", "echo"]);

    // Session cap reached: the third pause goes to a persona.
    spoke(&h.pause(pause(PauseType::LongPause, text)).await);
    assert_eq!(h.provider.request_count(), 1);
}

#[tokio::test]
async fn long_thought_becomes_an_observation_memory() {
    let long = "You have circled back to that window twice now, and both times the sentence stopped.";
    let h = TestHarness::builder()
        .with_scripts(vec![Script::text(long), Script::text("Keep going.")])
        .build()
        .await
        .unwrap();

    let first = spoke(&h.pause(pause(PauseType::LongPause, WRITING)).await).to_string();
    spoke(&h.pause(pause(PauseType::LongPause, WRITING)).await);

    let memories = h.store.memories();
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0].part_id, first);
    assert_eq!(memories[0].kind, MemoryKind::Observation);
    assert_eq!(memories[0].content, long);
    assert_eq!(memories[0].entry_id, ENTRY_ID);
}

#[tokio::test]
async fn speaking_marks_part_active() {
    let h = TestHarness::builder().build().await.unwrap();
    let part_id = spoke(&h.pause(pause(PauseType::LongPause, WRITING)).await).to_string();

    let stored = h.store.part(&part_id).unwrap();
    assert!(stored.last_active_at.is_some());
    assert!(stored.quiet_since.is_none());
    let in_roster = h
        .orchestrator
        .roster()
        .into_iter()
        .find(|p| p.id == part_id)
        .unwrap();
    assert_eq!(in_roster.last_active_at, stored.last_active_at);
}

#[tokio::test]
async fn quiet_part_is_marked_on_start_and_cleared_when_it_speaks() {
    let mut parts = vec![roster().remove(1)];
    parts[0].last_active_at = Some(fixtures::days_ago(30));
    let store = InMemoryStore::with_parts(parts);
    let h = TestHarness::builder()
        .configure(|c| c.features.quiet_return = true)
        .with_store(store)
        .build()
        .await
        .unwrap();
    assert!(h.store.part("small-one").unwrap().quiet_since.is_some());

    let outcome = h.pause(pause(PauseType::TrailingOff, WRITING)).await;
    assert_eq!(spoke(&outcome), "small-one");
    assert!(h.store.part("small-one").unwrap().quiet_since.is_none());
}

fn watcher_only() -> InMemoryStore {
    InMemoryStore::with_parts(roster().into_iter().filter(|p| p.id == "watcher").collect())
}

#[tokio::test]
async fn observer_records_marker_when_it_speaks() {
    let h = TestHarness::builder()
        .configure(|c| {
            c.features.quiet_observer = true;
            c.scoring.jitter_max = 0.0;
        })
        .with_store(watcher_only())
        .build()
        .await
        .unwrap();

    let outcome = h.pause(pause(PauseType::LongPause, WRITING)).await;
    assert_eq!(spoke(&outcome), "watcher");
    assert_eq!(
        h.store.marker(&observer_marker_key("watcher")).as_deref(),
        Some(ENTRY_ID)
    );
}

#[tokio::test]
async fn observer_cools_down_across_entries() {
    let store = watcher_only();
    store.add_summary(summary("yesterday", 1, &[]));
    store.put_marker(&observer_marker_key("watcher"), "yesterday");
    let h = TestHarness::builder()
        .configure(|c| {
            c.features.quiet_observer = true;
            c.scoring.jitter_max = 0.0;
        })
        .with_store(store)
        .build()
        .await
        .unwrap();

    let outcome = h.pause(pause(PauseType::LongPause, WRITING)).await;
    assert_eq!(outcome, CycleOutcome::NoResponse);
    assert_eq!(h.provider.request_count(), 0);
}

#[tokio::test]
async fn intention_reaches_the_prompt() {
    let h = TestHarness::builder().build().await.unwrap();
    h.orchestrator
        .set_intention(Some("finish the letter to my sister".into()));
    h.pause(pause(PauseType::ParagraphBreak, WRITING)).await;

    let request = &h.provider.requests()[0];
    assert!(
        request.messages[0]
            .content
            .contains("finish the letter to my sister")
    );

    h.orchestrator.set_intention(None);
    h.pause(pause(PauseType::ParagraphBreak, WRITING)).await;
    assert!(!h.provider.requests()[1].messages[0].content.contains("intention"));
}

#[tokio::test]
async fn annotations_stay_out_of_visible_text() {
    let h = TestHarness::builder()
        .configure(|c| c.features.annotations = true)
        .with_scripts(vec![Script::text(
            "That window again.\n---annotations---\n{\"highlights\":[\"window\"],\"ghostText\":\"And then I\"}",
        )])
        .build()
        .await
        .unwrap();

    spoke(&h.pause(pause(PauseType::LongPause, WRITING)).await);
    assert_eq!(h.sink.thought_text(), "That window again.");
    assert_eq!(
        h.sink.milestones(),
        vec!["thought_start", "thought_complete", "annotations"]
    );
    assert_eq!(h.store.thoughts()[0].content, "That window again.");
}

#[tokio::test(start_paused = true)]
async fn disagreement_follows_after_delay() {
    let store = InMemoryStore::with_parts(
        roster()
            .into_iter()
            .filter(|p| p.id == "planner" || p.id == "spark")
            .collect(),
    );
    let h = TestHarness::builder()
        .configure(|c| {
            c.features.disagreements = true;
            c.disagreement.chance = 1.0;
        })
        .with_scripts(vec![
            Script::text("Make a list first."),
            Script::text("Or just walk away from it for a bit."),
        ])
        .with_store(store)
        .build()
        .await
        .unwrap();

    let outcome = h.pause(pause(PauseType::SentenceComplete, WRITING)).await;
    let CycleOutcome::Spoke {
        part_id,
        disagreement: Some(challenger),
    } = outcome.clone()
    else {
        panic!("expected a disagreement, got {outcome:?}");
    };
    assert_ne!(part_id, challenger);

    assert_eq!(
        h.sink.milestones(),
        vec![
            "thought_start",
            "thought_complete",
            "disagreement_start",
            "disagreement_complete"
        ]
    );
    let thoughts = h.store.thoughts();
    assert_eq!(thoughts.len(), 2);
    assert!(thoughts[1].is_disagreement);
    assert_eq!(thoughts[1].responding_to_part_id.as_deref(), Some(part_id.as_str()));
    assert_eq!(h.orchestrator.recent_speakers(), vec![challenger, part_id]);
}

#[tokio::test]
async fn disagreement_is_suppressed_while_grounded() {
    let h = TestHarness::builder()
        .configure(|c| {
            c.features.disagreements = true;
            c.disagreement.chance = 1.0;
            c.disagreement.delay_ms = 0;
        })
        .build()
        .await
        .unwrap();
    h.orchestrator
        .grounding()
        .activate(chorus_safety::GroundingTrigger::Manual);

    let outcome = h.pause(pause(PauseType::LongPause, WRITING)).await;
    assert!(matches!(
        outcome,
        CycleOutcome::Spoke {
            disagreement: None,
            ..
        }
    ));
    assert_eq!(h.provider.request_count(), 1);
}

#[tokio::test]
async fn silence_holds_after_long_flow_then_resets() {
    let h = TestHarness::builder()
        .configure(|c| {
            c.features.silence = true;
            c.silence.chance = 1.0;
            c.silence.flow_threshold_secs = 1;
        })
        .build()
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let outcome = h.pause(pause(PauseType::LongPause, WRITING)).await;
    let held_by = match outcome {
        CycleOutcome::Silenced { part_id } => part_id,
        other => panic!("expected silence, got {other:?}"),
    };
    assert_ne!(held_by, "watcher");
    assert_eq!(h.provider.request_count(), 0);
    assert!(h.store.thoughts().is_empty());
    assert_eq!(h.sink.milestones(), vec!["silence"]);
    let silences: Vec<_> = h
        .sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            HostEvent::Silence(payload) => Some(payload.part_id),
            _ => None,
        })
        .collect();
    assert_eq!(silences, vec![held_by]);

    // Flow restarted, so the next pause gets a spoken thought.
    let outcome = h.pause(pause(PauseType::LongPause, WRITING)).await;
    spoke(&outcome);
    assert_eq!(h.provider.request_count(), 1);
}
