// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grounding mode: a session-wide flag that reweights persona selection
//! toward calming voices and suppresses some ancillary engines.
//!
//! Activation is idempotent. Re-activating while active only restarts the
//! auto-exit timer. The flag is published on a `watch` channel.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Why grounding was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundingTrigger {
    /// The fast-path screen matched crisis language.
    CrisisLanguage,
    /// The periodic classifier reported distress at or above the threshold.
    Distress { level: u8 },
    /// The host asked for it.
    Manual,
}

impl fmt::Display for GroundingTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroundingTrigger::CrisisLanguage => write!(f, "crisis_language"),
            GroundingTrigger::Distress { level } => write!(f, "distress({level})"),
            GroundingTrigger::Manual => write!(f, "manual"),
        }
    }
}

struct Inner {
    state: watch::Sender<bool>,
    /// Token of the pending auto-exit timer, if any.
    timer: Mutex<Option<CancellationToken>>,
    auto_exit: Duration,
}

/// Cheaply cloneable handle to one session's grounding state.
#[derive(Clone)]
pub struct GroundingController {
    inner: Arc<Inner>,
}

impl GroundingController {
    pub fn new(auto_exit: Duration) -> Self {
        let (state, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state,
                timer: Mutex::new(None),
                auto_exit,
            }),
        }
    }

    pub fn is_active(&self) -> bool {
        *self.inner.state.borrow()
    }

    /// Receiver that observes every activation and deactivation.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.state.subscribe()
    }

    /// Activate grounding and (re)start the auto-exit timer.
    ///
    /// Returns `true` if grounding was not already active. Must be called
    /// from within a Tokio runtime.
    pub fn activate(&self, trigger: GroundingTrigger) -> bool {
        let token = CancellationToken::new();
        let newly_active = {
            let mut timer = self.inner.timer.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(previous) = timer.replace(token.clone()) {
                previous.cancel();
            }
            self.set_state(true)
        };

        if newly_active {
            info!(trigger = %trigger, minutes = self.inner.auto_exit.as_secs() / 60, "grounding activated");
        } else {
            debug!(trigger = %trigger, "grounding re-triggered, auto-exit timer reset");
        }

        let inner = Arc::clone(&self.inner);
        let auto_exit = inner.auto_exit;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(auto_exit) => {
                    let mut timer = inner.timer.lock().unwrap_or_else(|e| e.into_inner());
                    // A newer activation replaced and cancelled this token.
                    if token.is_cancelled() {
                        return;
                    }
                    timer.take();
                    if inner.state.send_if_modified(|active| std::mem::replace(active, false)) {
                        info!("grounding auto-exited");
                    }
                }
            }
        });

        newly_active
    }

    /// Clear the flag and cancel the pending timer. Returns `true` if it was active.
    pub fn deactivate(&self) -> bool {
        let mut timer = self.inner.timer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = timer.take() {
            token.cancel();
        }
        let was_active = self
            .inner
            .state
            .send_if_modified(|active| std::mem::replace(active, false));
        if was_active {
            info!("grounding deactivated");
        }
        was_active
    }

    fn set_state(&self, value: bool) -> bool {
        self.inner
            .state
            .send_if_modified(|active| std::mem::replace(active, value) != value)
    }
}
