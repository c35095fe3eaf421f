//! Polling constants, phases, and response sequencing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::session::TestSession;

/// Delay between two retrievals of an unresolved session.
pub const POLLING_INTERVAL: Duration = Duration::from_millis(800);

/// Retrievals allowed per processing run before it times out.
pub const TIMEOUT_THRESHOLD: u32 = 10;

/// Where the polling state machine currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PollPhase {
	#[default]
	Idle,
	Polling,
	Resolved,
	TimedOut,
	Failed,
}

/// Counts compared after each retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollProgress {
	/// Tests in `Complete` or `Error`.
	pub resolved: usize,
	/// Upload targets consumed by this engine, not the pool size.
	pub uploaded: usize,
	pub total: usize,
}

impl PollProgress {
	pub fn of(session: &TestSession, uploaded: usize) -> Self {
		Self {
			resolved: session.resolved_count(),
			uploaded,
			total: session.tests.len(),
		}
	}

	/// Every upload has a test and every test has an outcome.
	pub fn is_settled(&self) -> bool {
		self.resolved == self.uploaded && self.resolved == self.total
	}
}

/// Monotonic ticket source for retrieval requests.
///
/// Each retrieval takes a ticket before it is sent. A response is merged only
/// when its ticket is newer than the last merged one.
#[derive(Debug, Default)]
pub struct RequestSequence {
	last_issued: AtomicU64,
}

impl RequestSequence {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn next_ticket(&self) -> u64 {
		self.last_issued.fetch_add(1, Ordering::SeqCst) + 1
	}
}

/// Advances `last_applied` to `ticket` if the ticket is newer.
pub fn accept_ticket(last_applied: &mut u64, ticket: u64) -> bool {
	if ticket > *last_applied {
		*last_applied = ticket;
		true
	} else {
		false
	}
}

#[cfg(test)]
mod tests {
	use chrono::Utc;
	use wing_protocol::{ReferenceMetric, Test, TestStatus};

	use super::*;

	#[test]
	fn constants() {
		assert_eq!(POLLING_INTERVAL, Duration::from_millis(800));
		assert_eq!(TIMEOUT_THRESHOLD, 10);
	}

	#[test]
	fn progress_requires_uploads_tests_and_outcomes_to_agree() {
		let mut session = TestSession::new("s1", Utc::now(), ReferenceMetric::Pef);
		session.tests = vec![Test::new("t1", TestStatus::Complete), Test::new("t2", TestStatus::Processing)];

		assert!(!PollProgress::of(&session, 2).is_settled());

		session.tests[1].status = TestStatus::Error;
		assert!(PollProgress::of(&session, 2).is_settled());
		assert!(!PollProgress::of(&session, 3).is_settled());
	}

	#[test]
	fn tickets_increase() {
		let sequence = RequestSequence::new();
		let first = sequence.next_ticket();
		let second = sequence.next_ticket();
		assert!(second > first);
	}

	#[test]
	fn stale_tickets_are_rejected() {
		let mut last_applied = 0;
		assert!(accept_ticket(&mut last_applied, 2));
		assert!(!accept_ticket(&mut last_applied, 1));
		assert!(!accept_ticket(&mut last_applied, 2));
		assert!(accept_ticket(&mut last_applied, 3));
		assert_eq!(last_applied, 3);
	}
}
