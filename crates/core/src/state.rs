//! Clinical state of a session, derived from its test outcomes.

use std::fmt;

use serde::Serialize;
use wing_protocol::{BestTestChoice, Test, TestStatus};

use crate::session::TestSession;

/// Errored tests after which a session is finished as not processed.
pub const FAILED_TESTS_THRESHOLD: usize = 2;

/// Local failures after which the caller should stop offering retries.
pub const LOCAL_FAILURE_THRESHOLD: u32 = 2;

/// Why a session was interrupted on the device side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InterruptionReason {
	SensorDisconnected,
	NetworkDisconnected,
	/// The recording was too weak to be worth uploading.
	LocalProcessingThresholdNotMet,
}

impl fmt::Display for InterruptionReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::SensorDisconnected => "sensor disconnected",
			Self::NetworkDisconnected => "network disconnected",
			Self::LocalProcessingThresholdNotMet => "local processing threshold not met",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "reason")]
pub enum TestSessionState {
	#[default]
	NoTest,
	FirstTestGood,
	FirstTestNotProcessed,
	FirstTwoTestsNotReproducible,
	FinishedNotReproducible,
	FinishedReproducible,
	FinishedNotProcessed,
	Interrupted(InterruptionReason),
}

impl TestSessionState {
	/// Returns `true` once no further tests should be taken.
	pub fn is_finished(&self) -> bool {
		matches!(self, Self::FinishedNotReproducible | Self::FinishedReproducible | Self::FinishedNotProcessed)
	}
}

impl fmt::Display for TestSessionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NoTest => f.write_str("no test yet"),
			Self::FirstTestGood => f.write_str("first test good"),
			Self::FirstTestNotProcessed => f.write_str("first test not processed"),
			Self::FirstTwoTestsNotReproducible => f.write_str("first two tests not reproducible"),
			Self::FinishedNotReproducible => f.write_str("finished, not reproducible"),
			Self::FinishedReproducible => f.write_str("finished, reproducible"),
			Self::FinishedNotProcessed => f.write_str("finished, not processed"),
			Self::Interrupted(reason) => write!(f, "interrupted: {reason}"),
		}
	}
}

/// Derives the clinical state of `session`.
///
/// A best-test choice reported by the service settles the session outright.
/// Without one, the most recent test by `taken_at` decides; tests with no
/// timestamp rank below any timestamped test and ties go to the later list
/// position. Whenever the table below has no entry, `current` is returned.
///
/// | most recent | count of that status | state |
/// |-------------|----------------------|-------|
/// | error       | >= 2                 | finished, not processed |
/// | error       | 1                    | first test not processed |
/// | complete    | 1                    | first test good |
/// | complete    | 2                    | first two tests not reproducible |
pub fn derive_state(session: &TestSession, current: TestSessionState) -> TestSessionState {
	match session.best_test_choice {
		Some(BestTestChoice::Reproducible) => return TestSessionState::FinishedReproducible,
		Some(BestTestChoice::HighestReference) => return TestSessionState::FinishedNotReproducible,
		None => {}
	}

	let Some(latest) = most_recent(&session.tests) else {
		return current;
	};

	match latest.status {
		TestStatus::Error => {
			if session.count_with_status(TestStatus::Error) >= FAILED_TESTS_THRESHOLD {
				TestSessionState::FinishedNotProcessed
			} else {
				TestSessionState::FirstTestNotProcessed
			}
		}
		TestStatus::Complete => match session.count_with_status(TestStatus::Complete) {
			1 => TestSessionState::FirstTestGood,
			2 => TestSessionState::FirstTwoTestsNotReproducible,
			_ => current,
		},
		_ => current,
	}
}

fn most_recent(tests: &[Test]) -> Option<&Test> {
	tests
		.iter()
		.enumerate()
		.max_by(|(ia, a), (ib, b)| a.taken_at.cmp(&b.taken_at).then(ia.cmp(ib)))
		.map(|(_, test)| test)
}
