use anyhow::Result;
use wing_runtime::{HttpSessionService, OAuthCredentials};

use crate::context::CommandContext;

pub async fn execute(ctx: CommandContext, client_id: String, client_secret: String) -> Result<()> {
	let config = ctx.config().clone().with_oauth(OAuthCredentials::new(client_id, client_secret));
	let service = HttpSessionService::new(config)?;
	let token = service.authenticate().await?;
	println!("{token}");
	Ok(())
}
