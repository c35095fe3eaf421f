//! Engine-level error kinds.
//!
//! Transport and domain failures from the session service are forwarded
//! through [`Error::Service`] untouched. Malformed payloads are folded into
//! the operation-specific kinds so callers only need to know which step
//! failed.

use thiserror::Error;
use wing_runtime::ServiceError;

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Service(#[from] ServiceError),

	#[error("failed to retrieve test session")]
	RetrieveSessionFailed,

	#[error("failed to create upload target")]
	UploadTargetCreationFailed,

	/// The attempt budget ran out before every upload was processed.
	#[error("session processing timed out")]
	ProcessingTimeout,

	#[error("failed to upload recording")]
	RecordingUploadFailed,
}

impl Error {
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::ProcessingTimeout)
	}

	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Service(ServiceError::Unauthorized))
	}

	/// HTTP status carried by a forwarded service error.
	pub fn status_code(&self) -> Option<u16> {
		match self {
			Self::Service(err) => err.status_code(),
			_ => None,
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
