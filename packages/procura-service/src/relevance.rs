//! The relevance query engine.
//!
//! Every public operation goes through [`ProcuraService::eligible`], so a page and its count are
//! always drawn from the same candidate list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, InterestOverride, ProcuraService, Record, RecordFilter, Result};
use procura_domain::{
	Eligibility, EligibilityCandidate, EligibilityPredicate, InterestFlag, LifecycleState,
	RecordKey, Regime, RelevanceKey, StateCounts, StateSet, dedupe_and_order, paginate,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RelevanceFilter {
	pub user_id: i64,
	pub category_id: Option<i64>,
	pub region_id: Option<i64>,
	/// `None` searches both regimes.
	pub regime: Option<Regime>,
	pub states: Vec<LifecycleState>,
}
impl RelevanceFilter {
	/// Records in the `New` state for `user_id`, across every category and region.
	pub fn new_records(user_id: i64) -> Self {
		Self {
			user_id,
			category_id: None,
			region_id: None,
			regime: None,
			states: vec![LifecycleState::New],
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLimit {
	/// `relevance.default_page_size`.
	#[default]
	Default,
	Size(u32),
	/// No limit. Used to read the full result set.
	All,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Page {
	pub offset: u64,
	pub limit: PageLimit,
}
impl Page {
	pub fn first(size: u32) -> Self {
		Self { offset: 0, limit: PageLimit::Size(size) }
	}

	pub fn all() -> Self {
		Self { offset: 0, limit: PageLimit::All }
	}
}

/// Record summary returned to callers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RelevantRecord {
	pub key: RecordKey,
	pub title: String,
	pub lifecycle_state: LifecycleState,
	#[serde(with = "crate::time_serde::date")]
	pub start_date: Option<Date>,
	#[serde(with = "crate::time_serde::date")]
	pub end_date: Option<Date>,
	#[serde(with = "crate::time_serde::date")]
	pub delivery_end_date: Option<Date>,
	pub code_id: Option<i64>,
	pub region_id: Option<i64>,
	pub initial_price: Option<f64>,
	pub contract_price: Option<f64>,
	pub interest: InterestFlag,
	pub match_percentage: Option<f32>,
	#[serde(with = "crate::time_serde::option")]
	pub processed_at: Option<OffsetDateTime>,
	pub error_reason: Option<String>,
}
impl RelevantRecord {
	fn new(record: Record, state: LifecycleState, row: Option<&InterestOverride>) -> Self {
		Self {
			key: record.key,
			title: record.title,
			lifecycle_state: state,
			start_date: record.start_date,
			end_date: record.end_date,
			delivery_end_date: record.delivery_end_date,
			code_id: record.code_id,
			region_id: record.region_id,
			initial_price: record.initial_price,
			contract_price: record.contract_price,
			interest: row.map(|row| row.flag).unwrap_or_default(),
			match_percentage: row.map(|row| row.match_percentage),
			processed_at: row.and_then(|row| row.processed_at),
			error_reason: row.and_then(|row| row.error_reason.clone()),
		}
	}

	fn relevance_key(&self) -> RelevanceKey {
		RelevanceKey { processed_at: self.processed_at, start_date: self.start_date, key: self.key }
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RelevancePage {
	pub items: Vec<RelevantRecord>,
	/// Size of the full, unpaged result set.
	pub total: u64,
}

/// Parses user-supplied state labels, rejecting unknown ones.
pub fn parse_states<I, S>(labels: I) -> Result<Vec<LifecycleState>>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	labels
		.into_iter()
		.map(|label| {
			label.as_ref().parse::<LifecycleState>().map_err(|err| Error::InvalidFilter {
				message: err.to_string(),
			})
		})
		.collect()
}

impl ProcuraService {
	pub async fn query_relevant(
		&self,
		filter: &RelevanceFilter,
		page: Page,
	) -> Result<Vec<RelevantRecord>> {
		let limit = self.page_limit(page.limit)?;
		let records = self.eligible(filter).await?;

		Ok(paginate(records, offset(page.offset), limit))
	}

	pub async fn count_relevant(&self, filter: &RelevanceFilter) -> Result<u64> {
		Ok(self.eligible(filter).await?.len() as u64)
	}

	/// One page plus the total, computed from a single scan.
	pub async fn relevance_page(
		&self,
		filter: &RelevanceFilter,
		page: Page,
	) -> Result<RelevancePage> {
		let limit = self.page_limit(page.limit)?;
		let records = self.eligible(filter).await?;
		let total = records.len() as u64;

		Ok(RelevancePage { items: paginate(records, offset(page.offset), limit), total })
	}

	/// Relevant record counts per lifecycle state.
	pub async fn relevance_summary(
		&self,
		user_id: i64,
		category_id: Option<i64>,
		region_id: Option<i64>,
	) -> Result<StateCounts> {
		let filter = RelevanceFilter {
			user_id,
			category_id,
			region_id,
			regime: None,
			states: LifecycleState::ALL.to_vec(),
		};
		let mut counts = StateCounts::default();

		for record in self.eligible(&filter).await? {
			counts.add(record.lifecycle_state, 1);
		}

		Ok(counts)
	}

	fn page_limit(&self, limit: PageLimit) -> Result<Option<usize>> {
		let size = match limit {
			PageLimit::All => return Ok(None),
			PageLimit::Default => self.cfg.relevance.default_page_size,
			PageLimit::Size(size) => size,
		};

		if size == 0 || size > self.cfg.relevance.max_page_size {
			return Err(Error::InvalidFilter {
				message: format!(
					"Page size must be within 1..={}, got {size}.",
					self.cfg.relevance.max_page_size
				),
			});
		}

		Ok(Some(size as usize))
	}

	/// The full eligible set for `filter`, deduplicated and in result order.
	async fn eligible(&self, filter: &RelevanceFilter) -> Result<Vec<RelevantRecord>> {
		let Some(states) = StateSet::new(filter.states.iter().copied()) else {
			return Err(Error::InvalidFilter {
				message: "At least one lifecycle state is required.".to_string(),
			});
		};
		let categories = self.category_codes(filter.user_id, filter.category_id).await?;

		if categories.is_empty() {
			return Ok(Vec::new());
		}

		let predicate = EligibilityPredicate {
			states,
			categories,
			stop_words: self.stop_words(filter.user_id).await?,
		};
		let batch = self.cfg.relevance.scan_batch_size.max(1);
		let mut scan = RecordFilter {
			regime: filter.regime,
			states: Some(predicate.states.iter().collect()),
			region_id: filter.region_id,
			code_ids: Some(predicate.categories.to_sorted_vec()),
			after: None,
			limit: batch,
		};
		let mut eligible = Vec::new();
		let mut excluded = 0_u64;

		loop {
			let records = self.store.scan_records(&scan).await?;
			let last = records.last().map(|record| record.key);
			let full = records.len() >= batch as usize;
			let overrides = self.overrides_for(&records).await?;

			for record in records {
				let Some(state) = record.lifecycle_state else {
					excluded += 1;

					continue;
				};
				let row = overrides.get(&record.key);
				let candidate = EligibilityCandidate {
					state: Some(state),
					code_id: record.code_id,
					title: &record.title,
					flag: row.map(|row| row.flag).unwrap_or_default(),
				};

				match predicate.evaluate(&candidate) {
					Eligibility::Eligible => eligible.push(RelevantRecord::new(record, state, row)),
					Eligibility::Excluded(_) => excluded += 1,
				}
			}

			match last {
				Some(last) if full => scan.after = Some(last),
				_ => break,
			}
		}

		tracing::debug!(
			user_id = filter.user_id,
			eligible = eligible.len(),
			excluded,
			"Relevance scan finished."
		);

		Ok(dedupe_and_order(eligible, RelevantRecord::relevance_key))
	}

	async fn overrides_for(
		&self,
		records: &[Record],
	) -> Result<HashMap<RecordKey, InterestOverride>> {
		let mut by_key = HashMap::new();

		for regime in Regime::ALL {
			let ids = records
				.iter()
				.filter(|record| record.key.regime == regime)
				.map(|record| record.key.record_id)
				.collect::<Vec<_>>();

			if ids.is_empty() {
				continue;
			}

			for row in self.store.get_overrides(regime, &ids).await? {
				by_key.insert(row.key, row);
			}
		}

		Ok(by_key)
	}
}

fn offset(offset: u64) -> usize {
	usize::try_from(offset).unwrap_or(usize::MAX)
}
