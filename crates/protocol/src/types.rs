//! Clinical classification enums shared by sessions and tests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a raw wire string names no known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unknown variant `{}`", self.0)
	}
}

impl std::error::Error for UnknownVariant {}

macro_rules! wire_enum {
	($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $raw:literal),+ $(,)? }) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		pub enum $name {
			$($(#[$vmeta])* #[serde(rename = $raw)] $variant),+
		}

		impl $name {
			/// Raw value as it appears on the wire.
			pub fn as_str(&self) -> &'static str {
				match self {
					$(Self::$variant => $raw),+
				}
			}
		}

		impl FromStr for $name {
			type Err = UnknownVariant;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				match s {
					$($raw => Ok(Self::$variant),)+
					other => Err(UnknownVariant(other.to_string())),
				}
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(self.as_str())
			}
		}
	};
}

wire_enum! {
	/// How the service picked the representative test of a session.
	BestTestChoice {
		/// Two tests agreed closely enough to be considered reproducible.
		Reproducible => "reproducible",
		/// No reproducible pair existed, so the highest-reference test was used.
		HighestReference => "highest reference",
	}
}

wire_enum! {
	/// Peak-flow zone bands used in asthma action plans.
	LungFunctionZone {
		/// 80 to 100 percent of the usual peak flow.
		Green => "green zone",
		/// 50 to 79 percent of the usual peak flow.
		Yellow => "yellow zone",
		/// Below 50 percent of the usual peak flow.
		Red => "red zone",
	}
}

wire_enum! {
	/// Respiratory state band derived server-side.
	RespiratoryState {
		Green => "green zone",
		Yellow => "yellow zone",
		Red => "red zone",
		Critical => "critical zone",
	}
}

wire_enum! {
	/// Metric used to rank tests when choosing the best one.
	ReferenceMetric {
		/// Peak expiratory flow.
		Pef => "PEF",
		/// Forced expiratory volume in the first second.
		Fev1 => "FEV1",
	}
}

impl ReferenceMetric {
	/// Display unit for the metric.
	pub fn unit(&self) -> &'static str {
		match self {
			Self::Fev1 => "L",
			Self::Pef => "L/min",
		}
	}

	/// Formats a raw service value for display.
	///
	/// FEV1 values are liters rounded to two decimals. PEF values arrive in
	/// liters per second and are shown as whole liters per minute.
	pub fn format_value(&self, value: f64, include_unit: bool) -> String {
		let mut formatted = match self {
			Self::Fev1 => format!("{:.2}", (value * 100.0).round() / 100.0),
			Self::Pef => format!("{}", (value * 60.0).round() as i64),
		};

		if include_unit {
			formatted.push(' ');
			formatted.push_str(self.unit());
		}

		formatted
	}
}

wire_enum! {
	/// Processing status of a single test.
	///
	/// Statuses only move forward: started, uploaded, processing, then one of
	/// the terminal outcomes complete or error.
	#[derive(Default)]
	TestStatus {
		#[default]
		Started => "Started",
		Uploaded => "Uploaded",
		Processing => "Processing",
		Complete => "Complete",
		Error => "Error",
	}
}

impl TestStatus {
	/// Returns `true` for terminal statuses.
	pub fn is_resolved(&self) -> bool {
		matches!(self, Self::Complete | Self::Error)
	}
}
