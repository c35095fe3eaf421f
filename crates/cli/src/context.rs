use std::path::Path;

use anyhow::{Context, Result};
use wing_runtime::{ClientConfig, HttpSessionService};

/// Resolved client configuration shared by every command.
pub struct CommandContext {
	config: ClientConfig,
}

impl CommandContext {
	/// Loads `config_path` when given, then applies flag overrides on top.
	pub fn new(config_path: Option<&Path>, base_url: Option<String>, token: Option<String>) -> Result<Self> {
		let mut config = match config_path {
			Some(path) => ClientConfig::load(path).with_context(|| format!("failed to load config from {}", path.display()))?,
			None => ClientConfig::default(),
		};
		if let Some(base_url) = base_url {
			config = config.with_base_url(base_url);
		}
		if let Some(token) = token {
			config = config.with_token(token);
		}
		Ok(Self { config })
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	pub fn service(&self) -> Result<HttpSessionService> {
		Ok(HttpSessionService::new(self.config.clone())?)
	}
}
