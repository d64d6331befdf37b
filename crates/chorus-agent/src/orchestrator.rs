// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-session orchestrator: one pause event in, at most one thought out.
//!
//! A cycle runs in a fixed order: feature gate, busy gate, length gate,
//! safety screen, echo, silence, enrichment lookups and scoring, streamed
//! generation, finalization, then an optional delayed disagreement. A pause
//! that arrives while a cycle is running is dropped, not queued.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chorus_config::ChorusConfig;
use chorus_core::{
    ChorusError, EmotionClassifier, EmotionTag, EventSink, GenerationProvider, HostEvent,
    MemoryKind, PartMemory, PartStore, PartThought, PauseEvent, Persona,
};
use chorus_engines::text::sentences;
use chorus_engines::{
    DisagreementEngine, EchoEngine, QuietTracker, QuoteEngine, RitualEngine, SilenceEngine,
    ThreadEngine,
};
use chorus_safety::{
    DistressMonitor, DistressPolicy, GroundingController, GroundingTrigger,
    detect_crisis_language,
};
use chorus_scoring::{HeuristicScorer, ScoreContext, entries_since_marker, select};
use chorus_stream::{
    AnnotationLimits, GenerationCoordinator, GenerationJob, GenerationKind, GenerationResult,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::memory_cache::SessionMemoryCache;
use crate::prompt::{Enrichments, PromptInput, build_disagreement_request, build_thought_request};
use crate::session::{CyclePhase, SessionState};

/// Anchor text is the last sentence of the recent window, capped.
const ANCHOR_MAX_CHARS: usize = 120;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(PoisonError::into_inner)
}

/// Marker key recording the entry at which a persona last spoke.
pub fn observer_marker_key(part_id: &str) -> String {
    format!("last_spoke_entry:{part_id}")
}

/// The injected collaborators.
#[derive(Clone)]
pub struct Collaborators {
    pub provider: Arc<dyn GenerationProvider>,
    pub classifier: Arc<dyn EmotionClassifier>,
    pub store: Arc<dyn PartStore>,
    pub sink: Arc<dyn EventSink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    FeatureDisabled,
    /// Another cycle is in flight.
    Busy,
    TextTooShort,
}

/// What a call to [`Orchestrator::handle_pause`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Skipped(SkipReason),
    Echoed { entry_id: String },
    Silenced { part_id: String },
    /// No persona scored above zero.
    NoResponse,
    Spoke {
        part_id: String,
        /// The persona that pushed back afterwards, if one did.
        disagreement: Option<String>,
    },
    /// The host cancelled the generation.
    Cancelled,
    /// The generation failed; the host was sent an error event.
    Failed,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Orchestrator {
    entry_id: String,
    config: RwLock<Arc<ChorusConfig>>,
    store: Arc<dyn PartStore>,
    sink: Arc<dyn EventSink>,
    coordinator: GenerationCoordinator,
    grounding: GroundingController,
    distress: Arc<DistressMonitor>,
    session: Arc<Mutex<SessionState>>,
    cache: RwLock<SessionMemoryCache>,
    roster: RwLock<Vec<Persona>>,
    busy: AtomicBool,
    rng: Mutex<StdRng>,
    cancel: Mutex<Option<CancellationToken>>,
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

impl Orchestrator {
    /// Create an orchestrator for the session writing `entry_id`.
    ///
    /// Call [`start`](Self::start) before the first pause.
    pub fn new(
        config: ChorusConfig,
        collaborators: Collaborators,
        entry_id: impl Into<String>,
    ) -> Self {
        let grounding =
            GroundingController::new(auto_exit(&config));
        let distress = Arc::new(DistressMonitor::new(
            collaborators.classifier,
            grounding.clone(),
            Duration::from_secs(config.session.emotion_cooldown_secs),
        ));
        let rng = match config.agent.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let coordinator = GenerationCoordinator::new(
            collaborators.provider,
            Arc::clone(&collaborators.store),
            Arc::clone(&collaborators.sink),
        );
        Self {
            entry_id: entry_id.into(),
            config: RwLock::new(Arc::new(config)),
            store: collaborators.store,
            sink: collaborators.sink,
            coordinator,
            grounding,
            distress,
            session: Arc::new(Mutex::new(SessionState::new(Instant::now()))),
            cache: RwLock::new(SessionMemoryCache::default()),
            roster: RwLock::new(Vec::new()),
            busy: AtomicBool::new(false),
            rng: Mutex::new(rng),
            cancel: Mutex::new(None),
            forwarder: Mutex::new(None),
        }
    }

    /// Load the roster and session memory, mark quiet personas, and start
    /// forwarding grounding changes to the host.
    pub async fn start(&self) -> Result<(), ChorusError> {
        let config = self.config();
        let mut roster = self.store.list_parts().await?;
        if config.features.quiet_return {
            let marked = QuietTracker::new(&config.quiet)
                .mark_quiet(&*self.store, &mut roster, Utc::now())
                .await;
            debug!(marked, "quiet parts marked");
        }
        let cache = SessionMemoryCache::load(&*self.store).await;
        let parts = roster.len();
        *write(&self.roster) = roster;
        *write(&self.cache) = cache;

        let mut rx = self.grounding.subscribe();
        let sink = Arc::clone(&self.sink);
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let active = *rx.borrow_and_update();
                sink.emit(HostEvent::GroundingChanged { active });
            }
        });
        if let Some(old) = lock(&self.forwarder).replace(handle) {
            old.abort();
        }

        info!(entry_id = %self.entry_id, parts, "session started");
        Ok(())
    }

    /// Cancel any in-flight generation and stop background forwarding.
    pub fn shutdown(&self) {
        self.cancel_generation();
        if let Some(handle) = lock(&self.forwarder).take() {
            handle.abort();
        }
    }

    pub fn config(&self) -> Arc<ChorusConfig> {
        Arc::clone(&read(&self.config))
    }

    /// Replace the config snapshot. Applies from the next cycle; the
    /// grounding auto-exit and emotion cooldown keep their start values.
    pub fn set_config(&self, config: ChorusConfig) {
        *write(&self.config) = Arc::new(config);
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn grounding(&self) -> &GroundingController {
        &self.grounding
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> CyclePhase {
        lock(&self.session).phase
    }

    pub fn recent_speakers(&self) -> Vec<String> {
        lock(&self.session).recent_speakers.as_slice().to_vec()
    }

    pub fn current_emotion(&self) -> Option<EmotionTag> {
        lock(&self.session).current_emotion
    }

    pub fn roster(&self) -> Vec<Persona> {
        read(&self.roster).clone()
    }

    /// Set or clear the writer's focus for this session.
    pub fn set_intention(&self, intention: Option<String>) {
        let intention = intention.filter(|i| !i.trim().is_empty());
        debug!(set = intention.is_some(), "session intention updated");
        lock(&self.session).intention = intention;
    }

    /// Abort the in-flight generation, if any. Returns whether one was running.
    pub fn cancel_generation(&self) -> bool {
        match lock(&self.cancel).take() {
            Some(token) => {
                token.cancel();
                info!("generation cancelled by host");
                true
            }
            None => false,
        }
    }

    fn set_phase(&self, phase: CyclePhase) {
        lock(&self.session).phase = phase;
    }

    fn cycle_rng(&self) -> StdRng {
        StdRng::seed_from_u64(lock(&self.rng).next_u64())
    }

    fn install_cancel(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *lock(&self.cancel) = Some(token.clone());
        token
    }

    fn clear_cancel(&self) {
        lock(&self.cancel).take();
    }

    /// Run one orchestration cycle for `event`.
    pub async fn handle_pause(&self, event: PauseEvent) -> CycleOutcome {
        let config = self.config();
        if !config.features.part_responses {
            return CycleOutcome::Skipped(SkipReason::FeatureDisabled);
        }
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            debug!(pause = %event.pause_type, "cycle in flight, pause dropped");
            return CycleOutcome::Skipped(SkipReason::Busy);
        };

        let outcome = self.run_cycle(&config, &event).await;
        self.clear_cancel();
        self.set_phase(CyclePhase::Idle);
        debug!(?outcome, "cycle finished");
        outcome
    }

    async fn run_cycle(&self, config: &ChorusConfig, event: &PauseEvent) -> CycleOutcome {
        if event.current_text.trim().chars().count() < config.session.min_text_length {
            return CycleOutcome::Skipped(SkipReason::TextTooShort);
        }

        self.set_phase(CyclePhase::Screening);
        self.screen(config, event);

        let mut rng = self.cycle_rng();
        let now = Utc::now();
        let grounding = self.grounding.is_active();
        let store = &*self.store;
        let observer_id = config.observer.part_id.as_str();

        let echo = EchoEngine::new(&config.echo);
        let echoes_shown = lock(&self.session).echoes_shown;
        if echo.gate(config.features.echoes, grounding, echoes_shown, &mut rng)
            && let Some(payload) = echo
                .find(store, &event.current_text, &self.entry_id, now)
                .await
        {
            lock(&self.session).echoes_shown += 1;
            let entry_id = payload.entry_id.clone();
            info!(entry_id = %entry_id, days_ago = payload.days_ago, "echo surfaced");
            self.sink.emit(HostEvent::Echo(payload));
            return CycleOutcome::Echoed { entry_id };
        }

        let roster = self.roster();
        let silence = SilenceEngine::new(&config.silence);
        let flow = lock(&self.session).flow(Instant::now());
        if silence.gate(config.features.silence, grounding, flow, &mut rng)
            && let Some(payload) = silence.pick(&roster, observer_id, &mut rng)
        {
            lock(&self.session).flow_since = Instant::now();
            let part_id = payload.part_id.clone();
            info!(part_id = %part_id, flow_secs = flow.as_secs(), "silence held");
            self.sink.emit(HostEvent::Silence(payload));
            return CycleOutcome::Silenced { part_id };
        }

        self.set_phase(CyclePhase::Scoring);
        let quote_engine = QuoteEngine::new(&config.quote);
        let thread_engine = ThreadEngine::new(&config.thread);
        let ritual_engine = RitualEngine::new(&config.ritual);
        let want_quote = quote_engine.gate(config.features.quotes, &mut rng);
        let want_thread = thread_engine.gate(config.features.threads, &mut rng);
        let want_ritual = ritual_engine.gate(config.features.rituals, grounding, &mut rng);
        let marker_key = observer_marker_key(observer_id);

        let (quote, thread, ritual, marker) = tokio::join!(
            async {
                if want_quote {
                    quote_engine
                        .find(store, &event.current_text, &self.entry_id, now)
                        .await
                } else {
                    None
                }
            },
            async {
                if want_thread {
                    thread_engine
                        .find(store, &event.current_text, &self.entry_id, now)
                        .await
                } else {
                    None
                }
            },
            async {
                if want_ritual {
                    ritual_engine.find(store).await
                } else {
                    None
                }
            },
            async {
                if !config.features.quiet_observer || observer_id.is_empty() {
                    return None;
                }
                store.get_marker(&marker_key).await.unwrap_or_else(|e| {
                    warn!(error = %e, "failed to read observer marker");
                    None
                })
            },
        );

        let quiet = QuietTracker::new(&config.quiet);
        let quiet_ids = if config.features.quiet_return {
            quiet.quiet_set(&roster, now)
        } else {
            BTreeSet::new()
        };
        let (recent_speakers, current_emotion, intention) = {
            let session = lock(&self.session);
            (
                session.recent_speakers.as_slice().to_vec(),
                session.current_emotion,
                session.intention.clone(),
            )
        };
        let cache = read(&self.cache).clone();
        let observer_gap = entries_since_marker(marker.as_deref(), &self.entry_id, cache.summaries());

        let ctx = ScoreContext {
            pause_type: event.pause_type,
            recent_text: &event.recent_text,
            recent_speakers: &recent_speakers,
            current_emotion,
            grounding_active: grounding,
            quiet_part_ids: &quiet_ids,
            avoidance_patterns: cache.avoidance_patterns(),
            entries_since_observer_spoke: observer_gap,
        };
        let ranking = HeuristicScorer::new(config).rank(&roster, &ctx, &mut rng);
        for b in &ranking {
            debug!(part_id = %b.part_id, score = b.total, "part scored");
        }
        let Some(top) = select(&ranking) else {
            info!(pause = %event.pause_type, "no part above zero");
            return CycleOutcome::NoResponse;
        };
        let Some(persona) = roster.iter().find(|p| p.id == top.part_id).cloned() else {
            return CycleOutcome::NoResponse;
        };
        info!(part_id = %persona.id, score = top.total, grounding, "part selected");

        let memories = store
            .memories_for_part(&persona.id, config.session.prompt_memories)
            .await
            .unwrap_or_else(|e| {
                warn!(part_id = %persona.id, error = %e, "failed to load memories");
                Vec::new()
            });
        let enrichments = Enrichments {
            quote,
            thread,
            ritual,
            quiet_days: if config.features.quiet_return {
                quiet.days_quiet(&persona, now)
            } else {
                None
            },
        };
        let request = build_thought_request(&PromptInput {
            persona: &persona,
            event,
            memories: &memories,
            enrichments: &enrichments,
            intention: intention.as_deref(),
            grounding_active: grounding,
            annotations: config.features.annotations,
            max_tokens: config.session.max_tokens,
        });
        let job = GenerationJob {
            speaker: persona.clone(),
            entry_id: self.entry_id.clone(),
            anchor_text: anchor_text(&event.recent_text),
            anchor_offset: event.cursor_position,
            preceding_text: event
                .current_text
                .chars()
                .take(event.cursor_position)
                .collect(),
            request,
            annotations: config.features.annotations.then_some(AnnotationLimits {
                max_highlights: config.annotations.max_highlights,
                ghost_max_chars: config.annotations.ghost_max_chars,
            }),
            kind: GenerationKind::Thought,
        };

        self.set_phase(CyclePhase::Generating);
        let cancel = self.install_cancel();
        let generated = match self.coordinator.run(job, &cancel).await {
            Ok(Some(generated)) => generated,
            Ok(None) => return CycleOutcome::NoResponse,
            Err(ChorusError::Cancelled) => return CycleOutcome::Cancelled,
            Err(_) => return CycleOutcome::Failed,
        };
        self.finalize(config, &persona, &generated.thought).await;

        let disagreement = self
            .follow_up(config, &persona, &generated, event, &roster, &cancel, &mut rng)
            .await;
        CycleOutcome::Spoke {
            part_id: persona.id,
            disagreement,
        }
    }

    /// Fast-path crisis screen, then a cooldown-gated background distress check.
    fn screen(&self, config: &ChorusConfig, event: &PauseEvent) {
        let latest = if event.recent_text.trim().is_empty() {
            &event.current_text
        } else {
            &event.recent_text
        };
        if detect_crisis_language(latest) && self.grounding.activate(GroundingTrigger::CrisisLanguage)
        {
            warn!("crisis language detected, grounding activated");
        }

        let policy = DistressPolicy {
            emergency_grounding: config.features.emergency_grounding,
            threshold: config.grounding.distress_threshold,
        };
        let session = Arc::clone(&self.session);
        let sink = Arc::clone(&self.sink);
        let spawned = self
            .distress
            .spawn_check(event.current_text.clone(), policy, move |reading| {
                lock(&session).current_emotion = Some(reading.emotion);
                sink.emit(HostEvent::EmotionDetected(reading.emotion));
            });
        if spawned.is_some() {
            debug!("distress check scheduled");
        }
    }

    /// Post-thought bookkeeping. The thought is already persisted; failures
    /// here are logged and do not undo it.
    async fn finalize(&self, config: &ChorusConfig, persona: &Persona, thought: &PartThought) {
        let now = Utc::now();
        lock(&self.session).record_thought(&persona.id, Instant::now());

        if thought.content.chars().count() > config.session.observation_min_length {
            let memory = PartMemory {
                id: uuid::Uuid::new_v4().to_string(),
                part_id: persona.id.clone(),
                entry_id: self.entry_id.clone(),
                content: thought.content.clone(),
                kind: MemoryKind::Observation,
                timestamp: now,
            };
            if let Err(e) = self.store.append_memory(&memory).await {
                warn!(part_id = %persona.id, error = %e, "failed to append observation");
            }
        }

        let mut updated = persona.clone();
        match QuietTracker::new(&config.quiet)
            .mark_active(&*self.store, &mut updated, now)
            .await
        {
            Ok(()) => {
                if let Some(slot) = write(&self.roster).iter_mut().find(|p| p.id == updated.id) {
                    *slot = updated;
                }
            }
            Err(e) => warn!(part_id = %persona.id, error = %e, "failed to update part timestamps"),
        }

        if !config.observer.part_id.is_empty() && persona.id == config.observer.part_id {
            let key = observer_marker_key(&persona.id);
            if let Err(e) = self.store.set_marker(&key, &self.entry_id).await {
                warn!(part_id = %persona.id, error = %e, "failed to record observer marker");
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn follow_up(
        &self,
        config: &ChorusConfig,
        speaker: &Persona,
        spoken: &GenerationResult,
        event: &PauseEvent,
        roster: &[Persona],
        cancel: &CancellationToken,
        rng: &mut StdRng,
    ) -> Option<String> {
        let engine = DisagreementEngine::new(&config.disagreement);
        if !engine.gate(config.features.disagreements, self.grounding.is_active(), rng) {
            return None;
        }
        let challenger = engine
            .pick_challenger(speaker, roster, &config.observer.part_id, rng)?
            .clone();

        self.set_phase(CyclePhase::FollowUp);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(engine.delay()) => {}
        }
        debug!(part_id = %challenger.id, responding_to = %speaker.id, "disagreement starting");

        let job = GenerationJob {
            speaker: challenger.clone(),
            entry_id: self.entry_id.clone(),
            anchor_text: spoken.thought.anchor_text.clone(),
            anchor_offset: spoken.thought.anchor_offset,
            preceding_text: String::new(),
            request: build_disagreement_request(
                &challenger,
                speaker,
                &spoken.thought.content,
                event,
                config.session.max_tokens,
            ),
            annotations: None,
            kind: GenerationKind::Disagreement {
                responding_to: speaker.id.clone(),
            },
        };
        let result = self.coordinator.run(job, cancel).await.ok().flatten()?;
        self.finalize(config, &challenger, &result.thought).await;
        Some(challenger.id)
    }
}

fn auto_exit(config: &ChorusConfig) -> Duration {
    Duration::from_secs(config.grounding.auto_exit_minutes.saturating_mul(60))
}

/// Last sentence of the recent window, capped at [`ANCHOR_MAX_CHARS`].
fn anchor_text(recent: &str) -> String {
    let last = sentences(recent).last().copied().unwrap_or("");
    let count = last.chars().count();
    if count <= ANCHOR_MAX_CHARS {
        return last.to_string();
    }
    last.chars().skip(count - ANCHOR_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_exit_saturates_on_huge_values() {
        let mut config = ChorusConfig::default();
        config.grounding.auto_exit_minutes = u64::MAX;
        assert_eq!(auto_exit(&config), Duration::from_secs(u64::MAX));
        config.grounding.auto_exit_minutes = 5;
        assert_eq!(auto_exit(&config), Duration::from_secs(300));
    }

    #[test]
    fn busy_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(BusyGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[test]
    fn anchor_is_last_sentence() {
        assert_eq!(anchor_text("First thing. Then the second"), "Then the second");
        assert_eq!(anchor_text(""), "");
        let long = "word ".repeat(60);
        assert_eq!(anchor_text(&long).chars().count(), ANCHOR_MAX_CHARS);
    }

    #[test]
    fn marker_key_names_the_part() {
        assert_eq!(observer_marker_key("watcher"), "last_spoke_entry:watcher");
    }
}
