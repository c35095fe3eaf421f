//! Test session payloads as returned by the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::test_record::Test;
use crate::types::{BestTestChoice, LungFunctionZone, ReferenceMetric, RespiratoryState};
use crate::upload::UploadTarget;

/// Device location captured when the session started.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
	#[serde(default)]
	pub latitude: Option<f64>,
	#[serde(default)]
	pub longitude: Option<f64>,
	#[serde(default)]
	pub altitude: Option<f64>,
	#[serde(default)]
	pub floor: Option<f64>,
}

/// A test session as decoded from one service response.
///
/// Every optional field keeps its presence: `None` means the service did not
/// report the field in this response, which intermediate polls routinely do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSessionPayload {
	pub id: String,
	pub started_at: DateTime<Utc>,
	pub reference_metric: ReferenceMetric,
	#[serde(default, deserialize_with = "lenient::timestamp")]
	pub ended_at: Option<DateTime<Utc>>,
	#[serde(default, deserialize_with = "lenient::enum_value")]
	pub lung_function_zone: Option<LungFunctionZone>,
	#[serde(default, deserialize_with = "lenient::enum_value")]
	pub respiratory_state: Option<RespiratoryState>,
	#[serde(default, deserialize_with = "lenient::enum_value")]
	pub best_test_choice: Option<BestTestChoice>,
	#[serde(default)]
	pub best_test: Option<Test>,
	#[serde(default)]
	pub tests: Option<Vec<Test>>,
	#[serde(default, rename = "uploads")]
	pub upload_targets: Option<Vec<UploadTarget>>,
	#[serde(default)]
	pub pef_predicted: Option<f64>,
	#[serde(default)]
	pub fev1_predicted: Option<f64>,
	#[serde(default)]
	pub metadata: Option<SessionMetadata>,
}

impl TestSessionPayload {
	/// Decodes a payload from a JSON value.
	pub fn from_json(value: serde_json::Value) -> serde_json::Result<Self> {
		serde_json::from_value(value)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::types::TestStatus;

	fn sample_test(id: &str) -> serde_json::Value {
		json!({
			"id": id,
			"status": "Complete",
			"takenAt": "2017-11-02T10:00:00Z",
			"pef": 2.5,
			"fev1": 1.9,
			"upload": "uploadId1"
		})
	}

	#[test]
	fn decodes_full_session() {
		let payload = TestSessionPayload::from_json(json!({
			"id": "session-1",
			"startedAt": "2017-11-02T09:58:00.000Z",
			"endedAt": "2017-11-02T10:05:00Z",
			"referenceMetric": "PEF",
			"lungFunctionZone": "yellow zone",
			"respiratoryState": "green zone",
			"bestTestChoice": "reproducible",
			"pefPredicted": 8.1,
			"metadata": { "latitude": 3.0, "longitude": 4.0, "altitude": 5.0, "floor": 6.0 },
			"bestTest": sample_test("testid1"),
			"tests": [sample_test("testid1"), sample_test("testid2")],
			"uploads": [{ "id": "uploadId1", "key": "k", "bucket": "b" }]
		}))
		.unwrap();

		assert_eq!(payload.id, "session-1");
		assert_eq!(payload.reference_metric, ReferenceMetric::Pef);
		assert_eq!(payload.lung_function_zone, Some(LungFunctionZone::Yellow));
		assert_eq!(payload.respiratory_state, Some(RespiratoryState::Green));
		assert_eq!(payload.best_test_choice, Some(BestTestChoice::Reproducible));
		assert_eq!(payload.best_test.as_ref().map(|t| t.status), Some(TestStatus::Complete));
		assert_eq!(payload.tests.as_ref().map(Vec::len), Some(2));
		assert_eq!(payload.upload_targets.as_ref().map(Vec::len), Some(1));
		let metadata = payload.metadata.unwrap();
		assert_eq!(metadata.floor, Some(6.0));
		assert_eq!(payload.fev1_predicted, None);
	}

	#[test]
	fn omitted_fields_stay_absent() {
		let payload = TestSessionPayload::from_json(json!({
			"id": "session-1",
			"startedAt": "2017-11-02T09:58:00Z",
			"referenceMetric": "FEV1",
			"lungFunctionZone": "purple zone"
		}))
		.unwrap();

		assert_eq!(payload.lung_function_zone, None);
		assert_eq!(payload.tests, None);
		assert_eq!(payload.upload_targets, None);
		assert_eq!(payload.metadata, None);
	}

	#[test]
	fn rejects_session_without_required_fields() {
		assert!(TestSessionPayload::from_json(json!({ "id": "session-1", "referenceMetric": "PEF" })).is_err());
		assert!(TestSessionPayload::from_json(json!({ "id": "session-1", "startedAt": "2017-11-02T09:58:00Z" })).is_err());
	}

	#[test]
	fn one_undecodable_test_fails_the_session() {
		let result = TestSessionPayload::from_json(json!({
			"id": "session-1",
			"startedAt": "2017-11-02T09:58:00Z",
			"referenceMetric": "PEF",
			"tests": [sample_test("ok"), { "status": "Complete" }]
		}));
		assert!(result.is_err());
	}

	#[test]
	fn errored_test_with_null_measurements_decodes() {
		let payload = TestSessionPayload::from_json(json!({
			"id": "session-1",
			"startedAt": "2017-11-02T09:58:00Z",
			"referenceMetric": "PEF",
			"tests": [{
				"id": "t1",
				"status": "Error",
				"pef": null,
				"fev1": null,
				"totalVolume": null,
				"breathDuration": null,
				"exhaleCurve": null
			}]
		}))
		.unwrap();

		let tests = payload.tests.unwrap();
		assert_eq!(tests[0].status, TestStatus::Error);
		assert_eq!(tests[0].pef, 0.0);
		assert!(tests[0].exhale_curve.is_empty());
	}
}
