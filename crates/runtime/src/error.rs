//! Errors raised while talking to the remote session service.

use thiserror::Error;

/// Failure of a single service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
	/// No credential is configured for an operation that needs one.
	#[error("client is not authorized; configure a token or OAuth credentials")]
	Unauthorized,

	#[error("invalid request URL: {0}")]
	InvalidUrl(String),

	/// The response body was empty or not a JSON object.
	#[error("invalid response from service")]
	InvalidResponse,

	/// The response body did not match the expected shape.
	#[error("failed to decode response: {0}")]
	Decoding(String),

	#[error("service responded with unacceptable status code {0}")]
	UnacceptableStatusCode(u16),

	/// Connection-level failure (unreachable host, reset, timeout).
	#[error("transport error: {0}")]
	Transport(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("configuration error: {0}")]
	Config(String),
}

impl ServiceError {
	/// Returns `true` for failures caused by a malformed response payload.
	pub fn is_malformed_response(&self) -> bool {
		matches!(self, Self::InvalidResponse | Self::Decoding(_))
	}

	/// Status code carried by an [`ServiceError::UnacceptableStatusCode`].
	pub fn status_code(&self) -> Option<u16> {
		match self {
			Self::UnacceptableStatusCode(code) => Some(*code),
			_ => None,
		}
	}
}

impl From<serde_json::Error> for ServiceError {
	fn from(err: serde_json::Error) -> Self {
		Self::Decoding(err.to_string())
	}
}

impl From<reqwest::Error> for ServiceError {
	fn from(err: reqwest::Error) -> Self {
		match err.status() {
			Some(status) => Self::UnacceptableStatusCode(status.as_u16()),
			None => Self::Transport(err.to_string()),
		}
	}
}

pub type Result<T> = std::result::Result<T, ServiceError>;
