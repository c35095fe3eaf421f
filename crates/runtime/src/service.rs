//! The operations the orchestration engine consumes from the service.

use std::path::Path;

use async_trait::async_trait;
use wing_protocol::{PatientData, TestSessionPayload, UploadTarget};

use crate::error::Result;

/// Request/response operations of the remote session service.
///
/// Implementations own authentication and the wire format. Each call may
/// fail with a transport, decoding, or domain error (see
/// [`ServiceError`](crate::ServiceError)).
#[async_trait]
pub trait SessionService: Send + Sync {
	/// Creates a new test session for the patient.
	async fn create_session(&self, patient: &PatientData) -> Result<TestSessionPayload>;

	/// Fetches the current state of a session.
	async fn retrieve_session(&self, session_id: &str) -> Result<TestSessionPayload>;

	/// Grants a fresh upload target for the session.
	async fn create_upload_target(&self, session_id: &str) -> Result<UploadTarget>;

	/// Writes the recording at `path` into the target's bucket and key.
	async fn upload_recording(&self, path: &Path, target: &UploadTarget) -> Result<()>;
}
