use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Legal track a procurement record was published under.
///
/// Ordering is `A < B`; it only matters as the last relevance tie-break.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Regime {
	#[serde(rename = "regime-A")]
	A,
	#[serde(rename = "regime-B")]
	B,
}
impl Regime {
	pub const ALL: [Self; 2] = [Self::A, Self::B];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::A => "regime-A",
			Self::B => "regime-B",
		}
	}
}
impl fmt::Display for Regime {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for Regime {
	type Err = ParseRegimeError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw {
			"regime-A" => Ok(Self::A),
			"regime-B" => Ok(Self::B),
			other => Err(ParseRegimeError(other.to_string())),
		}
	}
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown regime '{0}'.")]
pub struct ParseRegimeError(pub String);

/// Identity of a procurement record. Record ids are only unique within a regime.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct RecordKey {
	pub regime: Regime,
	pub record_id: i64,
}
impl RecordKey {
	pub fn new(regime: Regime, record_id: i64) -> Self {
		Self { regime, record_id }
	}
}
impl fmt::Display for RecordKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.regime, self.record_id)
	}
}
