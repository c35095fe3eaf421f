//! reqwest-backed implementation of [`SessionService`].

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;
use wing_protocol::{PatientData, TestSessionPayload, UploadTarget};

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::{Result, ServiceError};
use crate::service::SessionService;

/// HTTP client for the Wing REST API and its recording storage.
pub struct HttpSessionService {
	http: reqwest::Client,
	config: ClientConfig,
	token: RwLock<Option<String>>,
}

impl HttpSessionService {
	/// Builds a client from explicit configuration.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let http = reqwest::Client::builder()
			.timeout(config.request_timeout())
			.build()
			.map_err(|err| ServiceError::Config(err.to_string()))?;
		let token = RwLock::new(config.token.clone());
		Ok(Self { http, config, token })
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Current access token, if any.
	pub fn token(&self) -> Option<String> {
		self.token.read().clone()
	}

	pub fn set_token(&self, token: Option<String>) {
		*self.token.write() = token;
	}

	/// Exchanges the configured OAuth credentials for an access token.
	///
	/// On success the token is kept for subsequent requests and returned.
	pub async fn authenticate(&self) -> Result<String> {
		let Some(oauth) = self.config.oauth.as_ref() else {
			return Err(ServiceError::Unauthorized);
		};

		let body = json!({ "id": oauth.id, "secret": oauth.secret });
		let value = self.send_json(self.request(Endpoint::Authenticate)?.json(&body)).await?;
		let token = value.get("token").and_then(Value::as_str).ok_or(ServiceError::InvalidResponse)?.to_string();

		debug!(target = "wing.client", "authenticated with service");
		self.set_token(Some(token.clone()));
		Ok(token)
	}

	fn url(&self, path: &str) -> Result<Url> {
		let raw = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
		Url::parse(&raw).map_err(|_| ServiceError::InvalidUrl(raw))
	}

	fn storage_url(&self, target: &UploadTarget) -> Result<Url> {
		let raw = format!("{}/{}/{}", self.config.storage_url.trim_end_matches('/'), target.bucket, target.key);
		Url::parse(&raw).map_err(|_| ServiceError::InvalidUrl(raw))
	}

	/// Prepares a request with the default headers for `endpoint`.
	///
	/// Fails with [`ServiceError::Unauthorized`] before anything is sent when
	/// the endpoint needs a token and none is configured.
	fn request(&self, endpoint: Endpoint<'_>) -> Result<RequestBuilder> {
		let token = self.token();
		if endpoint.requires_token() && token.is_none() {
			return Err(ServiceError::Unauthorized);
		}

		let mut builder = self
			.http
			.request(endpoint.method(), self.url(&endpoint.path())?)
			.header(ACCEPT, "application/json")
			.header(CONTENT_TYPE, "application/json");
		if let Some(token) = token {
			builder = builder.header(AUTHORIZATION, token);
		}
		Ok(builder)
	}

	async fn send_json(&self, builder: RequestBuilder) -> Result<Value> {
		let response = check_status(builder.send().await?)?;
		let bytes = response.bytes().await?;
		let value: Value = serde_json::from_slice(&bytes).map_err(|_| ServiceError::InvalidResponse)?;
		if !value.is_object() {
			return Err(ServiceError::InvalidResponse);
		}
		Ok(value)
	}

	async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
		let value = self.send_json(builder).await?;
		Ok(serde_json::from_value(value)?)
	}
}

fn check_status(response: Response) -> Result<Response> {
	let status = response.status();
	if status.is_success() {
		Ok(response)
	} else {
		Err(ServiceError::UnacceptableStatusCode(status.as_u16()))
	}
}

#[async_trait]
impl SessionService for HttpSessionService {
	async fn create_session(&self, patient: &PatientData) -> Result<TestSessionPayload> {
		let body = patient
			.create_session_body(Utc::now())
			.ok_or_else(|| ServiceError::Config(format!("age {} is out of range", patient.age)))?;
		let request = self.request(Endpoint::CreateSession)?.json(&body);
		self.fetch(request).await
	}

	async fn retrieve_session(&self, session_id: &str) -> Result<TestSessionPayload> {
		let request = self.request(Endpoint::RetrieveSession { session_id })?;
		self.fetch(request).await
	}

	async fn create_upload_target(&self, session_id: &str) -> Result<UploadTarget> {
		let request = self.request(Endpoint::CreateUploadTarget { session_id })?;
		self.fetch(request).await
	}

	async fn upload_recording(&self, path: &Path, target: &UploadTarget) -> Result<()> {
		let bytes = tokio::fs::read(path).await?;
		let url = self.storage_url(target)?;
		debug!(target = "wing.client", %url, bytes = bytes.len(), "uploading recording");

		let response = self.http.request(Method::PUT, url).header(CONTENT_TYPE, "audio/wav").body(bytes).send().await?;
		if let Err(err) = check_status(response) {
			warn!(target = "wing.client", target_id = %target.id, error = %err, "storage rejected recording");
			return Err(err);
		}
		Ok(())
	}
}
