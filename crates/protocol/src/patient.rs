//! Patient demographics sent when a session is created.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Biological sex used for predicted reference values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiologicalSex {
	Male,
	Female,
}

/// Ethnicity categories accepted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ethnicity {
	#[serde(rename = "other")]
	Other,
	#[serde(rename = "american indian or alaskan native")]
	NativeAmerican,
	#[serde(rename = "asian")]
	Asian,
	#[serde(rename = "black or african american")]
	Black,
	#[serde(rename = "native hawaiian or pacific islander")]
	PacificIslander,
	#[serde(rename = "white (non-hispanic)")]
	WhiteNonHispanic,
	#[serde(rename = "white (hispanic)")]
	WhiteHispanic,
	#[serde(rename = "two or more")]
	TwoOrMore,
}

/// Demographics of the patient a session is created for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientData {
	/// Caller-side identifier for the patient.
	pub id: String,
	pub biological_sex: BiologicalSex,
	pub ethnicity: Ethnicity,
	/// Height in inches.
	pub height: u32,
	/// Age in years.
	pub age: u32,
}

impl PatientData {
	/// Approximate birth date: `now` minus the patient's age in whole years.
	///
	/// Returns `None` when the subtraction leaves the representable range.
	pub fn birth_date(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
		now.checked_sub_months(Months::new(self.age.checked_mul(12)?))
	}

	/// Builds the create-session request body.
	///
	/// Returns `None` when the birth date cannot be computed.
	pub fn create_session_body(&self, now: DateTime<Utc>) -> Option<Value> {
		let dob = self.birth_date(now)?;
		Some(json!({
			"patient": {
				"externalId": self.id,
				"biologicalSex": self.biological_sex,
				"ethnicity": self.ethnicity,
				"dob": dob.to_rfc3339(),
				"height": self.height,
			},
			"localTimezone": now.to_rfc3339(),
		}))
	}
}
