use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use wing_protocol::{BiologicalSex, Ethnicity};

#[derive(Parser, Debug)]
#[command(name = "wing")]
#[command(about = "Wing CLI - run lung function test sessions against the Wing API")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v debug, -vv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Client configuration file (JSON)
	#[arg(long, global = true, value_name = "FILE", env = "WING_CONFIG")]
	pub config: Option<PathBuf>,

	/// API root, overriding the configuration file
	#[arg(long, global = true, value_name = "URL", env = "WING_BASE_URL")]
	pub base_url: Option<String>,

	/// Access token, overriding the configuration file
	#[arg(long, global = true, env = "WING_TOKEN", hide_env_values = true)]
	pub token: Option<String>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Exchange OAuth client credentials for an access token
	#[command(alias = "auth")]
	Authenticate {
		#[arg(long)]
		client_id: String,
		#[arg(long, env = "WING_CLIENT_SECRET", hide_env_values = true)]
		client_secret: String,
	},

	/// Create a test session for a patient
	Create {
		#[arg(long)]
		patient_id: String,
		#[arg(long, value_enum)]
		sex: SexArg,
		#[arg(long, value_enum, default_value = "other")]
		ethnicity: EthnicityArg,
		/// Height in inches
		#[arg(long)]
		height: u32,
		/// Age in years
		#[arg(long)]
		age: u32,
	},

	/// Upload recordings to a session and process each one
	Run {
		#[arg(long = "session", value_name = "ID")]
		session_id: String,
		/// WAV recordings, processed in order
		#[arg(required = true)]
		recordings: Vec<PathBuf>,
	},
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SexArg {
	Male,
	Female,
}

impl From<SexArg> for BiologicalSex {
	fn from(arg: SexArg) -> Self {
		match arg {
			SexArg::Male => Self::Male,
			SexArg::Female => Self::Female,
		}
	}
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EthnicityArg {
	Other,
	NativeAmerican,
	Asian,
	Black,
	PacificIslander,
	WhiteNonHispanic,
	WhiteHispanic,
	TwoOrMore,
}

impl From<EthnicityArg> for Ethnicity {
	fn from(arg: EthnicityArg) -> Self {
		match arg {
			EthnicityArg::Other => Self::Other,
			EthnicityArg::NativeAmerican => Self::NativeAmerican,
			EthnicityArg::Asian => Self::Asian,
			EthnicityArg::Black => Self::Black,
			EthnicityArg::PacificIslander => Self::PacificIslander,
			EthnicityArg::WhiteNonHispanic => Self::WhiteNonHispanic,
			EthnicityArg::WhiteHispanic => Self::WhiteHispanic,
			EthnicityArg::TwoOrMore => Self::TwoOrMore,
		}
	}
}
