//! Top-level orchestration of one test session.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use wing_protocol::{PatientData, UploadTarget};
use wing_runtime::{ServiceError, SessionService};

use crate::error::{Error, Result};
use crate::events::{EventBus, ProcessingOutcome, SessionEvent};
use crate::poll::{POLLING_INTERVAL, PollPhase, PollProgress, RequestSequence, TIMEOUT_THRESHOLD, accept_ticket};
use crate::pool::UploadTargetPool;
use crate::session::TestSession;
use crate::state::{InterruptionReason, LOCAL_FAILURE_THRESHOLD, TestSessionState, derive_state};

struct Inner {
	session: TestSession,
	state: TestSessionState,
	pool: UploadTargetPool,
	attempts: u32,
	phase: PollPhase,
	local_failures: u32,
	last_applied: u64,
	/// Tests from an earlier run with no linked upload target.
	carried: usize,
}

impl Inner {
	fn uploaded(&self) -> usize {
		self.pool.used_count() + self.carried
	}
}

/// Drives one test session: hands out upload targets, uploads recordings,
/// and polls the service until every upload has been processed.
///
/// All mutable state sits behind one lock that is never held across an
/// await, so a manager can be shared between tasks through an `Arc`.
pub struct TestSessionManager {
	service: Arc<dyn SessionService>,
	session_id: String,
	inner: Mutex<Inner>,
	sequence: RequestSequence,
	events: EventBus,
}

impl TestSessionManager {
	pub fn new(service: Arc<dyn SessionService>, session: TestSession) -> Self {
		Self {
			service,
			session_id: session.id.clone(),
			inner: Mutex::new(Inner {
				session,
				state: TestSessionState::NoTest,
				pool: UploadTargetPool::new(),
				attempts: 0,
				phase: PollPhase::Idle,
				local_failures: 0,
				last_applied: 0,
				carried: 0,
			}),
			sequence: RequestSequence::new(),
			events: EventBus::new(),
		}
	}

	/// Continues a session that may already hold tests from an earlier run.
	///
	/// Upload targets linked to existing tests are marked used so they are
	/// never handed out again, and every existing test counts as uploaded
	/// when deciding whether the session has settled. The starting state is
	/// derived from the existing tests.
	pub fn resume(service: Arc<dyn SessionService>, session: TestSession) -> Self {
		let manager = Self::new(service, session);
		{
			let mut inner = manager.inner.lock();
			let Inner { session, pool, carried, state, .. } = &mut *inner;
			for test in &session.tests {
				match test.upload_target_id.as_deref() {
					Some(id) if pool.mark_used(id) => {}
					_ => *carried += 1,
				}
			}
			*state = derive_state(session, *state);
			debug!(
				target = "wing.session",
				session_id = %manager.session_id,
				prior_tests = session.tests.len(),
				state = %state,
				"resuming test session"
			);
		}
		manager
	}

	/// Creates a session for `patient` on the service and wraps it.
	pub async fn start(service: Arc<dyn SessionService>, patient: &PatientData) -> Result<Self> {
		let payload = service.create_session(patient).await?;
		info!(target = "wing.session", session_id = %payload.id, patient_id = %patient.id, "test session created");
		Ok(Self::new(service, payload.into()))
	}

	pub fn session_id(&self) -> &str {
		&self.session_id
	}

	pub fn state(&self) -> TestSessionState {
		self.inner.lock().state
	}

	/// Snapshot of the locally held session.
	pub fn session(&self) -> TestSession {
		self.inner.lock().session.clone()
	}

	pub fn processing_attempts(&self) -> u32 {
		self.inner.lock().attempts
	}

	pub fn poll_phase(&self) -> PollPhase {
		self.inner.lock().phase
	}

	pub fn used_upload_target_ids(&self) -> Vec<String> {
		self.inner.lock().pool.used_ids().to_vec()
	}

	/// Recordings uploaded to this session, including those carried over by
	/// [`TestSessionManager::resume`].
	pub fn uploaded_count(&self) -> usize {
		self.inner.lock().uploaded()
	}

	pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
		self.events.subscribe()
	}

	/// Marks the session interrupted by a device-side failure.
	pub fn record_local_failure(&self, reason: InterruptionReason) {
		let from = {
			let mut inner = self.inner.lock();
			inner.local_failures += 1;
			let from = inner.state;
			inner.state = TestSessionState::Interrupted(reason);
			from
		};
		warn!(target = "wing.session", session_id = %self.session_id, %reason, "test interrupted locally");
		self.transition(from, TestSessionState::Interrupted(reason));
	}

	/// Whether local failures reached [`LOCAL_FAILURE_THRESHOLD`].
	pub fn local_failures_exceeded(&self) -> bool {
		self.inner.lock().local_failures >= LOCAL_FAILURE_THRESHOLD
	}

	/// Hands out an upload target this engine has never used.
	///
	/// An unused target already granted to the session is preferred; otherwise
	/// a new one is requested from the service. The returned target counts as
	/// used from this point on, whether or not an upload to it succeeds.
	pub async fn acquire_upload_target(&self) -> Result<UploadTarget> {
		let pooled = {
			let mut inner = self.inner.lock();
			let Inner { session, pool, .. } = &mut *inner;
			pool.take_pooled(&session.upload_targets)
		};
		if let Some(target) = pooled {
			debug!(target = "wing.upload", session_id = %self.session_id, target_id = %target.id, "reusing pooled upload target");
			return Ok(target);
		}

		debug!(target = "wing.upload", session_id = %self.session_id, "requesting new upload target");
		let created = self.service.create_upload_target(&self.session_id).await.map_err(|err| {
			warn!(target = "wing.upload", session_id = %self.session_id, error = %err, "upload target creation failed");
			normalize(err, Error::UploadTargetCreationFailed)
		})?;

		let mut inner = self.inner.lock();
		let Inner { session, pool, .. } = &mut *inner;
		pool.claim_created(&mut session.upload_targets, created)
	}

	/// Uploads the recording at `path` to a fresh upload target.
	///
	/// Any failure of the upload itself is reported as
	/// [`Error::RecordingUploadFailed`]; the target stays used, so a retry
	/// goes to a different one.
	pub async fn submit_recording(&self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		let target = self.acquire_upload_target().await?;

		if let Err(err) = self.service.upload_recording(path, &target).await {
			warn!(
				target = "wing.upload",
				session_id = %self.session_id,
				target_id = %target.id,
				path = %path.display(),
				error = %err,
				"recording upload failed"
			);
			return Err(Error::RecordingUploadFailed);
		}

		debug!(target = "wing.upload", session_id = %self.session_id, target_id = %target.id, "recording uploaded");
		self.events.emit(SessionEvent::RecordingUploaded { target_id: target.id });
		Ok(())
	}

	/// Polls the service until every uploaded recording has been processed.
	///
	/// Returns the derived state once the session is settled. A retrieval
	/// failure ends the run immediately; so does running out of
	/// [`TIMEOUT_THRESHOLD`] attempts. Either way the attempt counter is reset
	/// so the next call starts with a full budget.
	pub async fn process_session(&self) -> Result<TestSessionState> {
		loop {
			if self.begin_attempt() {
				warn!(target = "wing.poll", session_id = %self.session_id, attempts = TIMEOUT_THRESHOLD, "session processing timed out");
				self.events.emit(SessionEvent::ProcessingFinished {
					outcome: ProcessingOutcome::TimedOut,
				});
				return Err(Error::ProcessingTimeout);
			}

			let ticket = self.sequence.next_ticket();
			let remote = match self.service.retrieve_session(&self.session_id).await {
				Ok(payload) => TestSession::from(payload),
				Err(err) => {
					self.finish_polling(PollPhase::Failed);
					warn!(target = "wing.poll", session_id = %self.session_id, error = %err, "session retrieval failed");
					self.events.emit(SessionEvent::ProcessingFinished {
						outcome: ProcessingOutcome::Failed,
					});
					return Err(normalize(err, Error::RetrieveSessionFailed));
				}
			};

			if let Some((from, to)) = self.apply_response(ticket, remote) {
				self.transition(from, to);
				self.events.emit(SessionEvent::ProcessingFinished {
					outcome: ProcessingOutcome::Resolved(to),
				});
				return Ok(to);
			}

			tokio::time::sleep(POLLING_INTERVAL).await;
		}
	}

	/// Enters `Polling`, or resets and reports `true` when the budget is spent.
	fn begin_attempt(&self) -> bool {
		let mut inner = self.inner.lock();
		if inner.attempts >= TIMEOUT_THRESHOLD {
			inner.attempts = 0;
			inner.phase = PollPhase::TimedOut;
			return true;
		}
		inner.phase = PollPhase::Polling;
		false
	}

	fn finish_polling(&self, phase: PollPhase) {
		let mut inner = self.inner.lock();
		inner.attempts = 0;
		inner.phase = phase;
	}

	/// Merges one retrieved snapshot and checks whether the session settled.
	///
	/// Returns the state transition when it did; otherwise counts the attempt.
	fn apply_response(&self, ticket: u64, remote: TestSession) -> Option<(TestSessionState, TestSessionState)> {
		let mut inner = self.inner.lock();
		if accept_ticket(&mut inner.last_applied, ticket) {
			inner.session.merge(remote);
		} else {
			debug!(target = "wing.poll", session_id = %self.session_id, ticket, "discarding stale session response");
		}

		let progress = PollProgress::of(&inner.session, inner.uploaded());
		let attempt = inner.attempts + 1;
		debug!(
			target = "wing.poll",
			session_id = %self.session_id,
			attempt,
			resolved = progress.resolved,
			uploaded = progress.uploaded,
			total = progress.total,
			"polled session"
		);
		self.events.emit(SessionEvent::PollAttempt {
			attempt,
			resolved: progress.resolved,
			uploaded: progress.uploaded,
			total: progress.total,
		});

		if !progress.is_settled() {
			inner.attempts = attempt;
			return None;
		}

		let from = inner.state;
		let to = derive_state(&inner.session, from);
		inner.state = to;
		inner.attempts = 0;
		inner.phase = PollPhase::Resolved;
		Some((from, to))
	}

	fn transition(&self, from: TestSessionState, to: TestSessionState) {
		if from != to {
			info!(target = "wing.session", session_id = %self.session_id, %from, %to, "session state changed");
			self.events.emit(SessionEvent::StateChanged { from, to });
		}
	}
}

/// Folds malformed-payload errors into `kind` and forwards everything else.
fn normalize(err: ServiceError, kind: Error) -> Error {
	if err.is_malformed_response() { kind } else { Error::Service(err) }
}
