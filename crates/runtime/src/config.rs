//! Client configuration threaded into the service constructor.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};

pub const DEFAULT_BASE_URL: &str = "https://api-development.mywing.io/api/v2";
pub const DEFAULT_STORAGE_URL: &str = "https://s3.amazonaws.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// OAuth client credentials exchanged for an access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthCredentials {
	pub id: String,
	pub secret: String,
}

impl OAuthCredentials {
	pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			secret: secret.into(),
		}
	}
}

impl std::fmt::Debug for OAuthCredentials {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OAuthCredentials").field("id", &self.id).field("secret", &"<redacted>").finish()
	}
}

/// Settings for one service client.
///
/// Loaded from a camelCase JSON file; absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
	/// API root that endpoint paths are appended to.
	pub base_url: String,
	/// Object storage root that `{bucket}/{key}` is appended to.
	pub storage_url: String,
	pub token: Option<String>,
	pub oauth: Option<OAuthCredentials>,
	pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			storage_url: DEFAULT_STORAGE_URL.to_string(),
			token: None,
			oauth: None,
			request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
		}
	}
}

impl ClientConfig {
	/// Reads configuration from a JSON file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)?;
		serde_json::from_str(&content).map_err(|err| ServiceError::Config(format!("{}: {err}", path.display())))
	}

	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	pub fn with_storage_url(mut self, storage_url: impl Into<String>) -> Self {
		self.storage_url = storage_url.into();
		self
	}

	pub fn with_token(mut self, token: impl Into<String>) -> Self {
		self.token = Some(token.into());
		self
	}

	pub fn with_oauth(mut self, oauth: OAuthCredentials) -> Self {
		self.oauth = Some(oauth);
		self
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn load_fills_missing_fields_with_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, r#"{{"token": "abc", "requestTimeoutSecs": 5}}"#).unwrap();

		let config = ClientConfig::load(file.path()).unwrap();

		assert_eq!(config.token.as_deref(), Some("abc"));
		assert_eq!(config.request_timeout(), Duration::from_secs(5));
		assert_eq!(config.base_url, DEFAULT_BASE_URL);
		assert_eq!(config.oauth, None);
	}

	#[test]
	fn load_reports_malformed_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "not json").unwrap();

		let err = ClientConfig::load(file.path()).unwrap_err();
		assert!(matches!(err, ServiceError::Config(_)));
	}

	#[test]
	fn load_reports_missing_file() {
		let err = ClientConfig::load(Path::new("/nonexistent/wing.json")).unwrap_err();
		assert!(matches!(err, ServiceError::Io(_)));
	}

	#[test]
	fn debug_output_redacts_secret() {
		let oauth = OAuthCredentials::new("client", "hunter2");
		assert!(!format!("{oauth:?}").contains("hunter2"));
	}
}
