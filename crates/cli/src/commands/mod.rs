mod authenticate;
mod create;
pub mod run;

use anyhow::Result;

use crate::cli::Commands;
use crate::context::CommandContext;

pub async fn dispatch(command: Commands, ctx: CommandContext) -> Result<()> {
	match command {
		Commands::Authenticate { client_id, client_secret } => authenticate::execute(ctx, client_id, client_secret).await,
		Commands::Create {
			patient_id,
			sex,
			ethnicity,
			height,
			age,
		} => create::execute(&ctx, patient_id, sex.into(), ethnicity.into(), height, age).await,
		Commands::Run { session_id, recordings } => run::execute(&ctx, &session_id, &recordings).await,
	}
}
