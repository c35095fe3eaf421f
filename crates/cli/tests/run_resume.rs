use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use wing::protocol::TestSessionPayload;
use wing::{TestSession, TestSessionManager, TestSessionState};
use wing_cli::commands::run::submit_all;
use wing_runtime::fake::FakeSessionService;

fn session(tests: serde_json::Value) -> TestSessionPayload {
	TestSessionPayload::from_json(json!({
		"id": "session-1",
		"startedAt": "2017-11-02T09:58:00Z",
		"referenceMetric": "PEF",
		"tests": tests
	}))
	.unwrap()
}

fn complete(id: &str, minute: u32, upload: &str) -> serde_json::Value {
	json!({ "id": id, "status": "Complete", "takenAt": format!("2017-11-02T10:{minute:02}:00Z"), "upload": upload })
}

#[tokio::test]
async fn second_run_continues_a_session_with_prior_tests() {
	let fake = FakeSessionService::new();
	let manager = TestSessionManager::resume(Arc::new(fake.clone()), TestSession::from(session(json!([complete("t1", 0, "u0")]))));
	fake.respond_retrieve(session(json!([complete("t1", 0, "u0"), complete("t2", 1, "generated-1")])));

	submit_all(&manager, &[PathBuf::from("blow-2.wav")]).await.unwrap();

	assert_eq!(manager.state(), TestSessionState::FirstTwoTestsNotReproducible);
	assert_eq!(fake.retrieve_count(), 1);
}

#[tokio::test]
async fn finished_session_uploads_nothing() {
	let fake = FakeSessionService::new();
	let mut finished = session(json!([complete("t1", 0, "u0"), complete("t2", 1, "u1")]));
	finished.best_test_choice = Some(wing::protocol::BestTestChoice::Reproducible);
	let manager = TestSessionManager::resume(Arc::new(fake.clone()), TestSession::from(finished));

	submit_all(&manager, &[PathBuf::from("blow-3.wav")]).await.unwrap();

	assert_eq!(fake.upload_count(), 0);
	assert_eq!(fake.retrieve_count(), 0);
}
