//! Single-use storage destinations for recordings.

use serde::{Deserialize, Serialize};

/// A write destination for exactly one recording's raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadTarget {
	pub id: String,
	/// Object key within the bucket.
	pub key: String,
	pub bucket: String,
}

impl UploadTarget {
	pub fn new(id: impl Into<String>, key: impl Into<String>, bucket: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			key: key.into(),
			bucket: bucket.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn decodes_when_all_fields_present() {
		let target: UploadTarget = serde_json::from_value(json!({ "id": "u1", "key": "k1", "bucket": "b1" })).unwrap();
		assert_eq!(target, UploadTarget::new("u1", "k1", "b1"));
	}

	#[test]
	fn rejects_partial_target() {
		assert!(serde_json::from_value::<UploadTarget>(json!({ "id": "u1" })).is_err());
	}
}
