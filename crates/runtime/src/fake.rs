//! Scripted in-memory session service for unit testing the engine.
//!
//! Responses are queued per operation; when a queue runs dry the fake falls
//! back to a sticky default. Every call is recorded so tests can assert on
//! what the engine asked for and in which order.
//!
//! # Example
//!
//! ```ignore
//! let fake = FakeSessionService::new();
//! fake.respond_retrieve(payload);
//! fake.push_upload_target(Ok(UploadTarget::new("u1", "k1", "b1")));
//!
//! let manager = TestSessionManager::new(Arc::new(fake.clone()), session);
//! manager.submit_recording(path).await?;
//! assert_eq!(fake.create_upload_target_count(), 1);
//! ```

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use wing_protocol::{PatientData, TestSessionPayload, UploadTarget};

use crate::error::{Result, ServiceError};
use crate::service::SessionService;

/// One call observed by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
	CreateSession { patient_id: String },
	RetrieveSession { session_id: String },
	CreateUploadTarget { session_id: String },
	UploadRecording { path: PathBuf, target_id: String },
}

#[derive(Default)]
struct FakeState {
	created_session: Option<TestSessionPayload>,
	retrieve_queue: VecDeque<(Option<Duration>, Result<TestSessionPayload>)>,
	sticky_session: Option<TestSessionPayload>,
	upload_target_queue: VecDeque<Result<UploadTarget>>,
	upload_queue: VecDeque<Result<()>>,
	generated_targets: usize,
	latency: Option<Duration>,
	calls: Vec<FakeCall>,
}

/// In-memory [`SessionService`] whose responses are scripted by the test.
///
/// Clones share state, so a test can keep one handle for scripting and
/// inspection while the engine owns another.
#[derive(Clone, Default)]
pub struct FakeSessionService {
	state: Arc<Mutex<FakeState>>,
}

impl FakeSessionService {
	pub fn new() -> Self {
		Self::default()
	}

	/// Delays every operation by `latency` before it answers.
	pub fn with_latency(self, latency: Duration) -> Self {
		self.state.lock().latency = Some(latency);
		self
	}

	/// Session returned by `create_session`.
	pub fn set_created_session(&self, payload: TestSessionPayload) {
		self.state.lock().created_session = Some(payload);
	}

	/// Session returned by `retrieve_session` whenever the queue is empty.
	pub fn respond_retrieve(&self, payload: TestSessionPayload) {
		self.state.lock().sticky_session = Some(payload);
	}

	/// Queues a one-shot `retrieve_session` result.
	pub fn push_retrieve(&self, result: Result<TestSessionPayload>) {
		self.state.lock().retrieve_queue.push_back((None, result));
	}

	/// Queues a one-shot `retrieve_session` result that answers after `delay`.
	///
	/// Lets a later call overtake an earlier one.
	pub fn push_retrieve_delayed(&self, delay: Duration, result: Result<TestSessionPayload>) {
		self.state.lock().retrieve_queue.push_back((Some(delay), result));
	}

	/// Queues a one-shot `create_upload_target` result.
	///
	/// With an empty queue the fake grants generated targets
	/// `generated-1`, `generated-2`, and so on.
	pub fn push_upload_target(&self, result: Result<UploadTarget>) {
		self.state.lock().upload_target_queue.push_back(result);
	}

	/// Queues a one-shot `upload_recording` result. Uploads succeed by default.
	pub fn push_upload_result(&self, result: Result<()>) {
		self.state.lock().upload_queue.push_back(result);
	}

	/// All calls observed so far, oldest first.
	pub fn calls(&self) -> Vec<FakeCall> {
		self.state.lock().calls.clone()
	}

	pub fn retrieve_count(&self) -> usize {
		self.count(|call| matches!(call, FakeCall::RetrieveSession { .. }))
	}

	pub fn create_upload_target_count(&self) -> usize {
		self.count(|call| matches!(call, FakeCall::CreateUploadTarget { .. }))
	}

	pub fn upload_count(&self) -> usize {
		self.count(|call| matches!(call, FakeCall::UploadRecording { .. }))
	}

	/// Target ids passed to `upload_recording`, in call order.
	pub fn uploaded_target_ids(&self) -> Vec<String> {
		self.state
			.lock()
			.calls
			.iter()
			.filter_map(|call| match call {
				FakeCall::UploadRecording { target_id, .. } => Some(target_id.clone()),
				_ => None,
			})
			.collect()
	}

	fn count(&self, predicate: impl Fn(&FakeCall) -> bool) -> usize {
		self.state.lock().calls.iter().filter(|call| predicate(call)).count()
	}

	async fn record(&self, call: FakeCall) {
		let latency = {
			let mut state = self.state.lock();
			state.calls.push(call);
			state.latency
		};
		if let Some(latency) = latency {
			tokio::time::sleep(latency).await;
		}
	}
}

#[async_trait]
impl SessionService for FakeSessionService {
	async fn create_session(&self, patient: &PatientData) -> Result<TestSessionPayload> {
		self.record(FakeCall::CreateSession {
			patient_id: patient.id.clone(),
		})
		.await;
		self.state.lock().created_session.clone().ok_or(ServiceError::InvalidResponse)
	}

	async fn retrieve_session(&self, session_id: &str) -> Result<TestSessionPayload> {
		self.record(FakeCall::RetrieveSession {
			session_id: session_id.to_string(),
		})
		.await;
		let (delay, result) = {
			let mut state = self.state.lock();
			match state.retrieve_queue.pop_front() {
				Some(queued) => queued,
				None => (None, state.sticky_session.clone().ok_or(ServiceError::InvalidResponse)),
			}
		};
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}
		result
	}

	async fn create_upload_target(&self, session_id: &str) -> Result<UploadTarget> {
		self.record(FakeCall::CreateUploadTarget {
			session_id: session_id.to_string(),
		})
		.await;
		let mut state = self.state.lock();
		match state.upload_target_queue.pop_front() {
			Some(result) => result,
			None => {
				state.generated_targets += 1;
				let n = state.generated_targets;
				Ok(UploadTarget::new(format!("generated-{n}"), format!("key-{n}"), "fake-bucket"))
			}
		}
	}

	async fn upload_recording(&self, path: &Path, target: &UploadTarget) -> Result<()> {
		self.record(FakeCall::UploadRecording {
			path: path.to_path_buf(),
			target_id: target.id.clone(),
		})
		.await;
		self.state.lock().upload_queue.pop_front().unwrap_or(Ok(()))
	}
}
