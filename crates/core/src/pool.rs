//! Single-use bookkeeping for upload targets.
//!
//! The pool never talks to the service itself. The manager asks it for a
//! free pooled target first and only requests a new one when
//! [`UploadTargetPool::take_pooled`] comes back empty. Both steps run under
//! the manager's lock so concurrent submissions cannot claim the same target.

use wing_protocol::UploadTarget;

use crate::error::{Error, Result};

/// Ids of the upload targets this engine instance has handed out.
#[derive(Debug, Default, Clone)]
pub struct UploadTargetPool {
	used: Vec<String>,
}

impl UploadTargetPool {
	pub fn new() -> Self {
		Self::default()
	}

	/// Claims the first target in `targets` that has not been used yet.
	pub fn take_pooled(&mut self, targets: &[UploadTarget]) -> Option<UploadTarget> {
		let target = targets.iter().find(|target| !self.is_used(&target.id))?.clone();
		self.used.push(target.id.clone());
		Some(target)
	}

	/// Records a freshly created target in `targets` and claims it.
	///
	/// A created id that was already handed out is refused; reusing it would
	/// write two recordings to one destination.
	pub fn claim_created(&mut self, targets: &mut Vec<UploadTarget>, created: UploadTarget) -> Result<UploadTarget> {
		if self.is_used(&created.id) {
			return Err(Error::UploadTargetCreationFailed);
		}
		if !targets.iter().any(|target| target.id == created.id) {
			targets.push(created.clone());
		}
		self.used.push(created.id.clone());
		Ok(created)
	}

	/// Marks `id` used without handing it out. Returns `false` if it already was.
	pub fn mark_used(&mut self, id: &str) -> bool {
		if self.is_used(id) {
			return false;
		}
		self.used.push(id.to_string());
		true
	}

	pub fn is_used(&self, id: &str) -> bool {
		self.used.iter().any(|used| used == id)
	}

	/// Used ids in the order they were claimed.
	pub fn used_ids(&self) -> &[String] {
		&self.used
	}

	pub fn used_count(&self) -> usize {
		self.used.len()
	}
}
