use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use wing::{SessionEvent, SessionService, TestSessionManager};

use crate::context::CommandContext;

pub async fn execute(ctx: &CommandContext, session_id: &str, recordings: &[PathBuf]) -> Result<()> {
	let service = Arc::new(ctx.service()?);
	let payload = service.retrieve_session(session_id).await.with_context(|| format!("failed to retrieve session {session_id}"))?;
	let manager = TestSessionManager::resume(service, payload.into());

	let progress = spawn_progress_log(&manager);
	let result = submit_all(&manager, recordings).await;
	progress.abort();
	result?;

	println!("{}", serde_json::to_string_pretty(&manager.session())?);
	Ok(())
}

/// Submits and processes each recording in order, stopping once the session is finished.
pub async fn submit_all(manager: &TestSessionManager, recordings: &[PathBuf]) -> Result<()> {
	if manager.state().is_finished() {
		println!("session already finished: {}", manager.state());
		return Ok(());
	}

	for recording in recordings {
		info!(target = "wing", recording = %recording.display(), "submitting recording");
		manager
			.submit_recording(recording)
			.await
			.with_context(|| format!("failed to submit {}", recording.display()))?;
		let state = manager.process_session().await?;
		println!("{}: {state}", recording.display());

		if state.is_finished() {
			break;
		}
	}
	Ok(())
}

fn spawn_progress_log(manager: &TestSessionManager) -> JoinHandle<()> {
	let mut events = manager.subscribe();
	tokio::spawn(async move {
		loop {
			match events.recv().await {
				Ok(SessionEvent::PollAttempt {
					attempt,
					resolved,
					uploaded,
					total,
				}) => {
					debug!(target = "wing", attempt, resolved, uploaded, total, "waiting for processing");
				}
				Ok(_) => {}
				Err(RecvError::Lagged(skipped)) => {
					debug!(target = "wing", skipped, "progress log fell behind");
				}
				Err(RecvError::Closed) => break,
			}
		}
	})
}
