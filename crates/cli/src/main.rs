use clap::Parser;
use tracing::error;
use wing_cli::{cli::Cli, commands, context::CommandContext, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let result = match CommandContext::new(cli.config.as_deref(), cli.base_url, cli.token) {
		Ok(ctx) => commands::dispatch(cli.command, ctx).await,
		Err(err) => Err(err),
	};

	if let Err(err) = result {
		error!(target = "wing", error = %format!("{err:#}"), "command failed");
		std::process::exit(1);
	}
}
