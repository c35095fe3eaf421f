//! Engine events for observers.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::state::TestSessionState;

const EVENT_CAPACITY: usize = 64;

/// How a processing run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessingOutcome {
	Resolved(TestSessionState),
	TimedOut,
	Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum SessionEvent {
	StateChanged { from: TestSessionState, to: TestSessionState },
	PollAttempt { attempt: u32, resolved: usize, uploaded: usize, total: usize },
	RecordingUploaded { target_id: String },
	ProcessingFinished { outcome: ProcessingOutcome },
}

/// Lossy fan-out of [`SessionEvent`]s.
///
/// Sending never blocks; with no subscribers the event is dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
	tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
	pub fn new() -> Self {
		let (tx, _) = broadcast::channel(EVENT_CAPACITY);
		Self { tx }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
		self.tx.subscribe()
	}

	pub fn emit(&self, event: SessionEvent) {
		let _ = self.tx.send(event);
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn emit_without_subscribers_is_dropped() {
		EventBus::new().emit(SessionEvent::RecordingUploaded { target_id: "u1".into() });
	}

	#[test]
	fn subscribers_receive_events_in_order() {
		let bus = EventBus::new();
		let mut rx = bus.subscribe();

		bus.emit(SessionEvent::RecordingUploaded { target_id: "u1".into() });
		bus.emit(SessionEvent::ProcessingFinished {
			outcome: ProcessingOutcome::TimedOut,
		});

		assert_eq!(rx.try_recv().unwrap(), SessionEvent::RecordingUploaded { target_id: "u1".into() });
		assert_eq!(
			rx.try_recv().unwrap(),
			SessionEvent::ProcessingFinished {
				outcome: ProcessingOutcome::TimedOut
			}
		);
	}
}
