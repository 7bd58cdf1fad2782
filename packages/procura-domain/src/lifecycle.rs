use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

/// Lifecycle state persisted on a procurement record.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
	New,
	UnderReview,
	Awarded,
	Rejected,
}
impl LifecycleState {
	pub const ALL: [Self; 4] = [Self::New, Self::UnderReview, Self::Awarded, Self::Rejected];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::New => "new",
			Self::UnderReview => "under_review",
			Self::Awarded => "awarded",
			Self::Rejected => "rejected",
		}
	}
}
impl fmt::Display for LifecycleState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for LifecycleState {
	type Err = ParseStateError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"new" => Ok(Self::New),
			"under_review" => Ok(Self::UnderReview),
			"awarded" => Ok(Self::Awarded),
			"rejected" => Ok(Self::Rejected),
			_ => Err(ParseStateError(raw.to_string())),
		}
	}
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown lifecycle state '{0}'.")]
pub struct ParseStateError(pub String);

/// The temporal inputs the classifier reads from a record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TemporalFields {
	pub end_date: Option<Date>,
	pub delivery_end_date: Option<Date>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LifecycleWindows {
	pub awarded_delivery_days: i64,
	pub review_window_days: i64,
}
impl LifecycleWindows {
	pub fn from_config(cfg: &procura_config::Lifecycle) -> Self {
		Self {
			awarded_delivery_days: cfg.awarded_delivery_days,
			review_window_days: cfg.review_window_days,
		}
	}

	/// Resolves the windows against a concrete date.
	///
	/// A bound that falls outside the representable calendar becomes `None`, which the rules
	/// read as "no date can reach it" (upper) or "every date clears it" (lower).
	pub fn resolve(&self, today: Date) -> Thresholds {
		Thresholds {
			today,
			awarded_from: days(self.awarded_delivery_days).and_then(|span| today.checked_add(span)),
			review_from: days(self.review_window_days).and_then(|span| today.checked_sub(span)),
		}
	}
}
impl Default for LifecycleWindows {
	fn default() -> Self {
		Self { awarded_delivery_days: 90, review_window_days: 90 }
	}
}

// `Duration::days` panics past `i64::MAX` seconds.
fn days(count: i64) -> Option<Duration> {
	count.checked_mul(86_400).map(Duration::seconds)
}

#[derive(Clone, Copy, Debug)]
pub struct Thresholds {
	today: Date,
	awarded_from: Option<Date>,
	review_from: Option<Date>,
}

type Rule = fn(&TemporalFields, &Thresholds) -> bool;

// Evaluated in order; the first match wins.
const RULES: [(LifecycleState, Rule); 4] = [
	(LifecycleState::Awarded, is_awarded),
	(LifecycleState::UnderReview, is_under_review),
	(LifecycleState::New, is_new),
	(LifecycleState::Rejected, |_, _| true),
];

pub fn classify(fields: &TemporalFields, thresholds: &Thresholds) -> LifecycleState {
	RULES
		.iter()
		.find(|(_, rule)| rule(fields, thresholds))
		.map(|(state, _)| *state)
		.unwrap_or(LifecycleState::Rejected)
}

fn is_awarded(fields: &TemporalFields, thresholds: &Thresholds) -> bool {
	match (fields.delivery_end_date, thresholds.awarded_from) {
		(Some(delivery_end), Some(awarded_from)) => delivery_end >= awarded_from,
		_ => false,
	}
}

fn is_under_review(fields: &TemporalFields, thresholds: &Thresholds) -> bool {
	if fields.delivery_end_date.is_some() {
		return false;
	}

	let Some(end_date) = fields.end_date else {
		return false;
	};

	end_date < thresholds.today && thresholds.review_from.is_none_or(|from| end_date >= from)
}

fn is_new(fields: &TemporalFields, thresholds: &Thresholds) -> bool {
	fields.end_date.is_some_and(|end_date| end_date >= thresholds.today)
}

/// Per-state tallies.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StateCounts {
	pub new: u64,
	pub under_review: u64,
	pub awarded: u64,
	pub rejected: u64,
}
impl StateCounts {
	pub fn add(&mut self, state: LifecycleState, amount: u64) {
		*self.slot_mut(state) += amount;
	}

	pub fn get(&self, state: LifecycleState) -> u64 {
		match state {
			LifecycleState::New => self.new,
			LifecycleState::UnderReview => self.under_review,
			LifecycleState::Awarded => self.awarded,
			LifecycleState::Rejected => self.rejected,
		}
	}

	pub fn total(&self) -> u64 {
		self.new + self.under_review + self.awarded + self.rejected
	}

	pub fn merge(&mut self, other: &Self) {
		for state in LifecycleState::ALL {
			self.add(state, other.get(state));
		}
	}

	fn slot_mut(&mut self, state: LifecycleState) -> &mut u64 {
		match state {
			LifecycleState::New => &mut self.new,
			LifecycleState::UnderReview => &mut self.under_review,
			LifecycleState::Awarded => &mut self.awarded,
			LifecycleState::Rejected => &mut self.rejected,
		}
	}
}
