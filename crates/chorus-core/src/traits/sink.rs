// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound event channel to the host UI.

use tokio::sync::mpsc;

use crate::events::HostEvent;

/// Receives engine events in emission order.
///
/// Emission is fire-and-forget: a host that has gone away must not stall
/// or fail an orchestration cycle.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: HostEvent);
}

impl EventSink for mpsc::UnboundedSender<HostEvent> {
    fn emit(&self, event: HostEvent) {
        // Receiver dropped means the host closed; nothing to deliver to.
        let _ = self.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unbounded_sender_preserves_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.emit(HostEvent::ThoughtToken("a".into()));
        tx.emit(HostEvent::ThoughtToken("b".into()));
        assert_eq!(rx.recv().await, Some(HostEvent::ThoughtToken("a".into())));
        assert_eq!(rx.recv().await, Some(HostEvent::ThoughtToken("b".into())));
    }

    #[test]
    fn emit_after_receiver_dropped_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        tx.emit(HostEvent::GroundingChanged { active: true });
    }
}
