//! REST endpoints of the session service.

use reqwest::Method;

/// One addressable service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
	Authenticate,
	CreateSession,
	RetrieveSession { session_id: &'a str },
	CreateUploadTarget { session_id: &'a str },
}

impl Endpoint<'_> {
	/// Path relative to the configured base URL.
	pub fn path(&self) -> String {
		match self {
			Self::Authenticate => "/authenticate".to_string(),
			Self::CreateSession => "/test-sessions".to_string(),
			Self::RetrieveSession { session_id } => format!("/test-sessions/{session_id}"),
			Self::CreateUploadTarget { session_id } => format!("/test-sessions/{session_id}/upload"),
		}
	}

	pub fn method(&self) -> Method {
		match self {
			Self::Authenticate | Self::CreateSession => Method::POST,
			Self::RetrieveSession { .. } | Self::CreateUploadTarget { .. } => Method::GET,
		}
	}

	/// Whether the endpoint needs an access token.
	pub fn requires_token(&self) -> bool {
		!matches!(self, Self::Authenticate)
	}
}
