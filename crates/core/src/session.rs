//! Locally held test session and the rules for folding remote snapshots into it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use wing_protocol::{BestTestChoice, LungFunctionZone, ReferenceMetric, RespiratoryState, Test, TestSessionPayload, TestStatus, UploadTarget};

/// One measurement encounter as tracked by the engine.
///
/// `id` and `started_at` are fixed by the service when the session is
/// created and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSession {
	pub id: String,
	pub started_at: DateTime<Utc>,
	pub reference_metric: ReferenceMetric,
	pub ended_at: Option<DateTime<Utc>>,
	pub lung_function_zone: Option<LungFunctionZone>,
	pub respiratory_state: Option<RespiratoryState>,
	pub best_test_choice: Option<BestTestChoice>,
	pub best_test: Option<Test>,
	pub tests: Vec<Test>,
	pub upload_targets: Vec<UploadTarget>,
	pub pef_predicted: Option<f64>,
	pub fev1_predicted: Option<f64>,
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
	pub altitude: Option<f64>,
	pub floor: Option<f64>,
}

impl TestSession {
	pub fn new(id: impl Into<String>, started_at: DateTime<Utc>, reference_metric: ReferenceMetric) -> Self {
		Self {
			id: id.into(),
			started_at,
			reference_metric,
			ended_at: None,
			lung_function_zone: None,
			respiratory_state: None,
			best_test_choice: None,
			best_test: None,
			tests: Vec::new(),
			upload_targets: Vec::new(),
			pef_predicted: None,
			fev1_predicted: None,
			latitude: None,
			longitude: None,
			altitude: None,
			floor: None,
		}
	}

	/// Folds a freshly retrieved snapshot into this session.
	///
	/// Session-level classification (end time, zones, best-test choice) is
	/// always taken from `remote`, including when it is absent there. Location
	/// data, the best test, and the `tests`/`upload_targets` lists are only
	/// adopted when `remote` actually carries them; an omitted or empty value
	/// keeps what is known locally.
	pub fn merge(&mut self, remote: TestSession) {
		self.ended_at = remote.ended_at;
		self.lung_function_zone = remote.lung_function_zone;
		self.respiratory_state = remote.respiratory_state;
		self.best_test_choice = remote.best_test_choice;

		adopt_present(&mut self.latitude, remote.latitude);
		adopt_present(&mut self.longitude, remote.longitude);
		adopt_present(&mut self.altitude, remote.altitude);
		adopt_present(&mut self.floor, remote.floor);
		adopt_present(&mut self.best_test, remote.best_test);

		if !remote.tests.is_empty() {
			self.tests = remote.tests;
		}
		if !remote.upload_targets.is_empty() {
			self.upload_targets = dedup_targets(remote.upload_targets);
		}
	}

	/// Tests that reached `Complete` or `Error`.
	pub fn resolved_count(&self) -> usize {
		self.tests.iter().filter(|test| test.is_resolved()).count()
	}

	pub fn count_with_status(&self, status: TestStatus) -> usize {
		self.tests.iter().filter(|test| test.status == status).count()
	}

	pub fn upload_target(&self, id: &str) -> Option<&UploadTarget> {
		self.upload_targets.iter().find(|target| target.id == id)
	}
}

fn adopt_present<T>(local: &mut Option<T>, remote: Option<T>) {
	if remote.is_some() {
		*local = remote;
	}
}

/// Drops repeated ids, keeping the first occurrence.
fn dedup_targets(targets: Vec<UploadTarget>) -> Vec<UploadTarget> {
	let mut unique: Vec<UploadTarget> = Vec::with_capacity(targets.len());
	for target in targets {
		if !unique.iter().any(|seen| seen.id == target.id) {
			unique.push(target);
		}
	}
	unique
}

impl From<TestSessionPayload> for TestSession {
	fn from(payload: TestSessionPayload) -> Self {
		let metadata = payload.metadata.unwrap_or_default();
		Self {
			id: payload.id,
			started_at: payload.started_at,
			reference_metric: payload.reference_metric,
			ended_at: payload.ended_at,
			lung_function_zone: payload.lung_function_zone,
			respiratory_state: payload.respiratory_state,
			best_test_choice: payload.best_test_choice,
			best_test: payload.best_test,
			tests: payload.tests.unwrap_or_default(),
			upload_targets: dedup_targets(payload.upload_targets.unwrap_or_default()),
			pef_predicted: payload.pef_predicted,
			fev1_predicted: payload.fev1_predicted,
			latitude: metadata.latitude,
			longitude: metadata.longitude,
			altitude: metadata.altitude,
			floor: metadata.floor,
		}
	}
}
