//! HttpSessionService against an in-process axum server.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use wing_protocol::{BiologicalSex, Ethnicity, PatientData, TestStatus, UploadTarget};
use wing_runtime::{ClientConfig, HttpSessionService, OAuthCredentials, ServiceError, SessionService};

const TOKEN: &str = "token-abc";

#[derive(Clone, Default)]
struct Recorded {
	uploads: Arc<Mutex<Vec<(String, Option<String>, Vec<u8>)>>>,
	create_bodies: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
	headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(TOKEN)
}

fn session_json(id: &str) -> Value {
	json!({
		"id": id,
		"startedAt": "2017-11-02T09:58:00Z",
		"referenceMetric": "PEF",
		"tests": [{ "id": "t1", "status": "Complete", "takenAt": "2017-11-02T10:00:00Z", "upload": "u1" }],
		"uploads": [{ "id": "u1", "key": "k1", "bucket": "b1" }]
	})
}

async fn authenticate(Json(body): Json<Value>) -> Response {
	if body["id"] == "client" && body["secret"] == "shh" {
		Json(json!({ "token": TOKEN })).into_response()
	} else if body["id"] == "tokenless" {
		Json(json!({ "expires": 0 })).into_response()
	} else {
		StatusCode::UNAUTHORIZED.into_response()
	}
}

async fn create_session(State(recorded): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
	if !authorized(&headers) {
		return StatusCode::UNAUTHORIZED.into_response();
	}
	recorded.create_bodies.lock().push(body);
	Json(session_json("created-1")).into_response()
}

async fn retrieve_session(headers: HeaderMap, Path(id): Path<String>) -> Response {
	if !authorized(&headers) {
		return StatusCode::UNAUTHORIZED.into_response();
	}
	match id.as_str() {
		"broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
		"garbled" => Json(json!({ "id": 5 })).into_response(),
		"listed" => Json(json!([])).into_response(),
		"empty" => StatusCode::OK.into_response(),
		_ => Json(session_json(&id)).into_response(),
	}
}

async fn create_upload_target(headers: HeaderMap, Path(id): Path<String>) -> Response {
	if !authorized(&headers) {
		return StatusCode::UNAUTHORIZED.into_response();
	}
	Json(json!({ "id": format!("{id}-target"), "key": "recordings/1.wav", "bucket": "wing-audio" })).into_response()
}

async fn store(State(recorded): State<Recorded>, Path((bucket, key)): Path<(String, String)>, headers: HeaderMap, body: Bytes) -> StatusCode {
	if bucket == "full" {
		return StatusCode::SERVICE_UNAVAILABLE;
	}
	let content_type = headers.get("content-type").and_then(|v| v.to_str().ok()).map(str::to_string);
	recorded.uploads.lock().push((format!("{bucket}/{key}"), content_type, body.to_vec()));
	StatusCode::OK
}

async fn spawn_server() -> (String, Recorded) {
	let recorded = Recorded::default();
	let app = Router::new()
		.route("/api/authenticate", post(authenticate))
		.route("/api/test-sessions", post(create_session))
		.route("/api/test-sessions/{id}", get(retrieve_session))
		.route("/api/test-sessions/{id}/upload", get(create_upload_target))
		.route("/storage/{bucket}/{key}", put(store))
		.with_state(recorded.clone());

	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		axum::serve(listener, app).await.unwrap();
	});
	(format!("http://{addr}"), recorded)
}

fn client(root: &str, token: Option<&str>) -> HttpSessionService {
	let mut config = ClientConfig::default().with_base_url(format!("{root}/api")).with_storage_url(format!("{root}/storage"));
	if let Some(token) = token {
		config = config.with_token(token);
	}
	HttpSessionService::new(config).unwrap()
}

#[tokio::test]
async fn retrieves_session_with_token() {
	let (root, _) = spawn_server().await;
	let service = client(&root, Some(TOKEN));

	let session = service.retrieve_session("s1").await.unwrap();

	assert_eq!(session.id, "s1");
	let tests = session.tests.unwrap();
	assert_eq!(tests[0].status, TestStatus::Complete);
	assert_eq!(tests[0].upload_target_id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn missing_token_fails_before_sending() {
	let service = client("http://127.0.0.1:9", None);
	let err = service.retrieve_session("s1").await.unwrap_err();
	assert!(matches!(err, ServiceError::Unauthorized));
}

#[tokio::test]
async fn maps_error_status_and_bodies() {
	let (root, _) = spawn_server().await;
	let service = client(&root, Some(TOKEN));

	let broken = service.retrieve_session("broken").await.unwrap_err();
	assert_eq!(broken.status_code(), Some(500));

	let garbled = service.retrieve_session("garbled").await.unwrap_err();
	assert!(matches!(garbled, ServiceError::Decoding(_)));

	let listed = service.retrieve_session("listed").await.unwrap_err();
	assert!(matches!(listed, ServiceError::InvalidResponse));

	let empty = service.retrieve_session("empty").await.unwrap_err();
	assert!(matches!(empty, ServiceError::InvalidResponse));

	let rejected = client(&root, Some("wrong")).retrieve_session("s1").await.unwrap_err();
	assert_eq!(rejected.status_code(), Some(401));
}

#[tokio::test]
async fn authenticate_stores_token() {
	let (root, _) = spawn_server().await;
	let config = ClientConfig::default()
		.with_base_url(format!("{root}/api"))
		.with_oauth(OAuthCredentials::new("client", "shh"));
	let service = HttpSessionService::new(config).unwrap();

	assert_eq!(service.authenticate().await.unwrap(), TOKEN);
	assert_eq!(service.token().as_deref(), Some(TOKEN));
	assert!(service.retrieve_session("s1").await.is_ok());
}

#[tokio::test]
async fn authenticate_requires_credentials_and_token() {
	let (root, _) = spawn_server().await;

	let anonymous = client(&root, None);
	assert!(matches!(anonymous.authenticate().await, Err(ServiceError::Unauthorized)));

	let config = ClientConfig::default()
		.with_base_url(format!("{root}/api"))
		.with_oauth(OAuthCredentials::new("tokenless", "x"));
	let tokenless = HttpSessionService::new(config).unwrap();
	assert!(matches!(tokenless.authenticate().await, Err(ServiceError::InvalidResponse)));
}

#[tokio::test]
async fn creates_session_and_upload_target() {
	let (root, recorded) = spawn_server().await;
	let service = client(&root, Some(TOKEN));
	let patient = PatientData {
		id: "patient-1".to_string(),
		biological_sex: BiologicalSex::Male,
		ethnicity: Ethnicity::Asian,
		height: 70,
		age: 40,
	};

	let session = service.create_session(&patient).await.unwrap();
	let target = service.create_upload_target(&session.id).await.unwrap();

	assert_eq!(session.id, "created-1");
	assert_eq!(target, UploadTarget::new("created-1-target", "recordings/1.wav", "wing-audio"));
	let bodies = recorded.create_bodies.lock();
	assert_eq!(bodies[0]["patient"]["externalId"], "patient-1");
	assert_eq!(bodies[0]["patient"]["biologicalSex"], "male");
}

#[tokio::test]
async fn uploads_recording_bytes() {
	let (root, recorded) = spawn_server().await;
	let service = client(&root, Some(TOKEN));
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("blow.wav");
	std::fs::write(&path, b"RIFF....WAVE").unwrap();

	service.upload_recording(&path, &UploadTarget::new("u1", "blow.wav", "wing-audio")).await.unwrap();

	let uploads = recorded.uploads.lock();
	assert_eq!(uploads.len(), 1);
	assert_eq!(uploads[0].0, "wing-audio/blow.wav");
	assert_eq!(uploads[0].1.as_deref(), Some("audio/wav"));
	assert_eq!(uploads[0].2, b"RIFF....WAVE");
}

#[tokio::test]
async fn upload_failures_surface_status_and_io() {
	let (root, _) = spawn_server().await;
	let service = client(&root, Some(TOKEN));
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("blow.wav");
	std::fs::write(&path, b"data").unwrap();

	let rejected = service.upload_recording(&path, &UploadTarget::new("u1", "k", "full")).await.unwrap_err();
	assert_eq!(rejected.status_code(), Some(503));

	let missing = service.upload_recording(&dir.path().join("absent.wav"), &UploadTarget::new("u2", "k", "b")).await.unwrap_err();
	assert!(matches!(missing, ServiceError::Io(_)));
}
