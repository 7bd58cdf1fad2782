//! The interest override ledger.
//!
//! Document matching writes one row per record. A person may later set or clear the flag; a
//! flag that is already set is never replaced by a new match result.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, InterestOverride, MatchWrite, ProcuraService, Result};
use procura_domain::{InterestFlag, RecordKey};

/// Outcome of matching a record's documents against the user's interests.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MatchResult {
	pub key: RecordKey,
	pub match_count: i32,
	pub match_percentage: f32,
	pub error_reason: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub processed_at: OffsetDateTime,
}
impl MatchResult {
	/// The flag automation would set for this result, given the interesting threshold.
	pub fn derived_flag(&self, threshold_percent: f32) -> Option<bool> {
		if self.error_reason.is_some() {
			return None;
		}
		if self.match_count == 0 {
			return Some(false);
		}

		Some(self.match_percentage >= threshold_percent)
	}

	fn validate(&self) -> Result<()> {
		if !self.match_percentage.is_finite() || !(0.0..=100.0).contains(&self.match_percentage) {
			return Err(Error::InvalidRequest {
				message: format!(
					"match_percentage must be within 0..=100, got {}.",
					self.match_percentage
				),
			});
		}
		if self.match_count < 0 {
			return Err(Error::InvalidRequest {
				message: "match_count must not be negative.".to_string(),
			});
		}

		Ok(())
	}
}

impl ProcuraService {
	pub async fn record_match_result(&self, result: MatchResult) -> Result<InterestOverride> {
		result.validate()?;

		let derived_flag = result.derived_flag(self.cfg.overrides.interesting_threshold_percent);
		let write = MatchWrite {
			key: result.key,
			derived_flag,
			match_count: result.match_count,
			match_percentage: result.match_percentage,
			processed_at: result.processed_at,
			error_reason: result.error_reason.filter(|reason| !reason.trim().is_empty()),
		};
		let stored = self.store.upsert_match_result(&write).await?;

		if stored.flag.as_bool() != derived_flag {
			tracing::debug!(
				key = %stored.key,
				?derived_flag,
				stored = ?stored.flag,
				"Kept existing interest flag."
			);
		}

		Ok(stored)
	}

	/// Sets, replaces or clears (`None`) the flag by hand.
	pub async fn set_interest(
		&self,
		key: RecordKey,
		flag: Option<bool>,
	) -> Result<InterestOverride> {
		let stored = self.store.set_interest(key, flag).await?;

		tracing::info!(key = %key, ?flag, "Interest flag set.");

		Ok(stored)
	}

	pub async fn interest_override(&self, key: RecordKey) -> Result<Option<InterestOverride>> {
		self.store.get_override(key).await
	}

	/// Flag for `key`; a record with no override row is [`InterestFlag::Unset`].
	pub async fn interest_flag(&self, key: RecordKey) -> Result<InterestFlag> {
		Ok(self.store.get_override(key).await?.map(|row| row.flag).unwrap_or_default())
	}
}
