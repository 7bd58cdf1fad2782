use serde::Serialize;
use time::{Date, OffsetDateTime};

use procura_domain::{InterestFlag, LifecycleState, RecordKey, Regime, TemporalFields};

/// A procurement record as the classifier and query engine see it.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
	pub key: RecordKey,
	pub start_date: Option<Date>,
	pub end_date: Option<Date>,
	pub delivery_end_date: Option<Date>,
	pub code_id: Option<i64>,
	pub region_id: Option<i64>,
	pub title: String,
	pub initial_price: Option<f64>,
	pub contract_price: Option<f64>,
	pub lifecycle_state: Option<LifecycleState>,
}
impl Record {
	pub fn temporal(&self) -> TemporalFields {
		TemporalFields { end_date: self.end_date, delivery_end_date: self.delivery_end_date }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterestOverride {
	pub key: RecordKey,
	pub flag: InterestFlag,
	pub match_count: i32,
	pub match_percentage: f32,
	pub processed_at: Option<OffsetDateTime>,
	/// Set when document matching failed for this record. Informational only.
	pub error_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InterestBinding {
	pub binding_id: i64,
	pub user_id: i64,
	pub code: String,
	pub category_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Category {
	pub category_id: i64,
	pub user_id: i64,
	pub name: String,
}

/// Store-side scan filter. Results are ordered by `(regime, record_id)` ascending.
#[derive(Clone, Debug)]
pub struct RecordFilter {
	pub regime: Option<Regime>,
	pub states: Option<Vec<LifecycleState>>,
	pub region_id: Option<i64>,
	pub code_ids: Option<Vec<i64>>,
	/// Exclusive cursor: the key of the last record already seen.
	pub after: Option<RecordKey>,
	pub limit: u32,
}

#[derive(Clone, Debug)]
pub struct MatchWrite {
	pub key: RecordKey,
	pub derived_flag: Option<bool>,
	pub match_count: i32,
	pub match_percentage: f32,
	pub processed_at: OffsetDateTime,
	pub error_reason: Option<String>,
}
