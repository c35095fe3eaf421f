use std::sync::Arc;

use anyhow::Result;
use wing::{TestSessionManager, protocol::BiologicalSex, protocol::Ethnicity, protocol::PatientData};

use crate::context::CommandContext;

pub async fn execute(ctx: &CommandContext, patient_id: String, sex: BiologicalSex, ethnicity: Ethnicity, height: u32, age: u32) -> Result<()> {
	let patient = PatientData {
		id: patient_id,
		biological_sex: sex,
		ethnicity,
		height,
		age,
	};
	let manager = TestSessionManager::start(Arc::new(ctx.service()?), &patient).await?;
	println!("{}", serde_json::to_string_pretty(&manager.session())?);
	Ok(())
}
