use std::{cmp::Ordering, collections::HashSet};

use time::{Date, OffsetDateTime};

use crate::record::RecordKey;

/// Sort key for relevance results.
///
/// Output order is descending on every component: override processing time (missing last),
/// then start date (missing last), then record id, then regime. The record key makes the
/// order total so pages never shift between identical calls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RelevanceKey {
	pub processed_at: Option<OffsetDateTime>,
	pub start_date: Option<Date>,
	pub key: RecordKey,
}
impl Ord for RelevanceKey {
	fn cmp(&self, other: &Self) -> Ordering {
		desc_nulls_last(self.processed_at, other.processed_at)
			.then_with(|| desc_nulls_last(self.start_date, other.start_date))
			.then_with(|| other.key.record_id.cmp(&self.key.record_id))
			.then_with(|| other.key.regime.cmp(&self.key.regime))
	}
}
impl PartialOrd for RelevanceKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

fn desc_nulls_last<T: Ord>(left: Option<T>, right: Option<T>) -> Ordering {
	match (left, right) {
		(Some(left), Some(right)) => right.cmp(&left),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}

/// Drops repeated record keys (first occurrence wins) and sorts by [`RelevanceKey`].
pub fn dedupe_and_order<T, F>(items: Vec<T>, key_of: F) -> Vec<T>
where
	F: Fn(&T) -> RelevanceKey,
{
	let mut seen = HashSet::with_capacity(items.len());
	let mut kept = items
		.into_iter()
		.filter_map(|item| {
			let key = key_of(&item);

			seen.insert(key.key).then_some((key, item))
		})
		.collect::<Vec<_>>();

	kept.sort_by(|(a, _), (b, _)| a.cmp(b));

	kept.into_iter().map(|(_, item)| item).collect()
}

/// `limit = None` returns everything after `offset`.
pub fn paginate<T>(items: Vec<T>, offset: usize, limit: Option<usize>) -> Vec<T> {
	let iter = items.into_iter().skip(offset);

	match limit {
		Some(limit) => iter.take(limit).collect(),
		None => iter.collect(),
	}
}
