//! A single recorded lung function test.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient;
use crate::types::TestStatus;

/// One `(time, volume)` sample of the exhale curve.
pub type ExhaleSample = (f64, f64);

/// One recording attempt within a test session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
	pub id: String,
	#[serde(default, deserialize_with = "status")]
	pub status: TestStatus,
	#[serde(default, deserialize_with = "lenient::timestamp")]
	pub taken_at: Option<DateTime<Utc>>,
	/// Seconds the patient exhaled into the sensor.
	#[serde(default, deserialize_with = "lenient::number_or_default")]
	pub breath_duration: f64,
	#[serde(default, deserialize_with = "lenient::curve_or_default")]
	pub exhale_curve: Vec<ExhaleSample>,
	/// Total exhaled volume in liters.
	#[serde(default, deserialize_with = "lenient::number_or_default")]
	pub total_volume: f64,
	#[serde(default, deserialize_with = "lenient::number_or_default")]
	pub pef: f64,
	#[serde(default, deserialize_with = "lenient::number_or_default")]
	pub fev1: f64,
	/// Identifier of the upload target the recording was written to.
	#[serde(default, rename = "upload")]
	pub upload_target_id: Option<String>,
}

impl Test {
	/// Creates a test in the given status with every measurement zeroed.
	pub fn new(id: impl Into<String>, status: TestStatus) -> Self {
		Self {
			id: id.into(),
			status,
			taken_at: None,
			breath_duration: 0.0,
			exhale_curve: Vec::new(),
			total_volume: 0.0,
			pef: 0.0,
			fev1: 0.0,
			upload_target_id: None,
		}
	}

	/// Sets the time the recording was taken.
	pub fn with_taken_at(mut self, taken_at: DateTime<Utc>) -> Self {
		self.taken_at = Some(taken_at);
		self
	}

	/// Links the test to the upload target its recording went to.
	pub fn with_upload_target(mut self, upload_target_id: impl Into<String>) -> Self {
		self.upload_target_id = Some(upload_target_id.into());
		self
	}

	/// Returns `true` once processing reached a terminal outcome.
	pub fn is_resolved(&self) -> bool {
		self.status.is_resolved()
	}
}

fn status<'de, D>(deserializer: D) -> Result<TestStatus, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(lenient::enum_value(deserializer)?.unwrap_or_default())
}
