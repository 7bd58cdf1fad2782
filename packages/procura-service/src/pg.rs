use procura_domain::{InterestFlag, LifecycleState, RecordKey, Regime};
use procura_storage::{
	db::Db,
	lock::AdvisoryLock,
	models::{ProcurementRecord, UserCategory, UserInterestBinding},
	overrides::{self, MatchResultWrite},
	preferences,
	queries::{self, RecordScan},
};

use crate::{
	BoxFuture, Error, RecordStore, Result, RunLock,
	models::{Category, InterestBinding, InterestOverride, MatchWrite, Record, RecordFilter},
};

const CLASSIFIER_LOCK_ID: i64 = 1_000_001;

/// [`RecordStore`] over the Postgres schema in `sql/`.
pub struct PgStore {
	pub db: Db,
}
impl PgStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	async fn scan(&self, filter: &RecordFilter) -> Result<Vec<Record>> {
		let states = filter.states.as_ref().map(|states| {
			states.iter().map(|state| state.as_str().to_string()).collect::<Vec<_>>()
		});
		let after = filter.after.map(|key| (key.regime.as_str(), key.record_id));
		let scan = RecordScan {
			regime: filter.regime.map(Regime::as_str),
			states: states.as_deref(),
			region_id: filter.region_id,
			code_ids: filter.code_ids.as_deref(),
			after,
			limit: i64::from(filter.limit),
		};
		let rows = queries::scan_records(&self.db, &scan).await?;

		rows.into_iter().map(record_from_row).collect()
	}

	async fn acquire_run_lock(&self) -> Result<Option<Box<dyn RunLock>>> {
		let lock = AdvisoryLock::try_acquire(&self.db, CLASSIFIER_LOCK_ID).await?;

		Ok(lock.map(|lock| Box::new(lock) as Box<dyn RunLock>))
	}
}

// Dropping an unreleased `AdvisoryLock` closes its session, which frees the lock.
impl RunLock for AdvisoryLock {
	fn release(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
		Box::pin(async move {
			let lock_id = self.lock_id();

			if !AdvisoryLock::release(*self).await? {
				tracing::warn!(lock_id, "Classifier lock was not held on release.");
			}

			Ok(())
		})
	}
}

impl RecordStore for PgStore {
	fn scan_records<'a>(&'a self, filter: &'a RecordFilter) -> BoxFuture<'a, Result<Vec<Record>>> {
		Box::pin(self.scan(filter))
	}

	fn update_lifecycle_state(
		&self,
		key: RecordKey,
		state: LifecycleState,
	) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			let changed = queries::update_lifecycle_state(
				&self.db,
				key.regime.as_str(),
				key.record_id,
				state.as_str(),
			)
			.await?;

			Ok(changed)
		})
	}

	fn get_user_bindings(
		&self,
		user_id: i64,
		category_id: Option<i64>,
	) -> BoxFuture<'_, Result<Vec<InterestBinding>>> {
		Box::pin(async move {
			let rows = preferences::get_user_bindings(&self.db, user_id, category_id).await?;

			Ok(rows.into_iter().map(binding_from_row).collect())
		})
	}

	fn find_code_ids<'a>(&'a self, values: &'a [String]) -> BoxFuture<'a, Result<Vec<i64>>> {
		Box::pin(async move { Ok(queries::find_code_ids(&self.db, values).await?) })
	}

	fn get_stop_words(&self, user_id: i64) -> BoxFuture<'_, Result<Vec<String>>> {
		Box::pin(async move { Ok(preferences::get_stop_words(&self.db, user_id).await?) })
	}

	fn get_override(&self, key: RecordKey) -> BoxFuture<'_, Result<Option<InterestOverride>>> {
		Box::pin(async move {
			let row = overrides::get_override(&self.db, key.regime.as_str(), key.record_id).await?;

			row.map(override_from_row).transpose()
		})
	}

	fn get_overrides<'a>(
		&'a self,
		regime: Regime,
		record_ids: &'a [i64],
	) -> BoxFuture<'a, Result<Vec<InterestOverride>>> {
		Box::pin(async move {
			let rows = overrides::get_overrides(&self.db, regime.as_str(), record_ids).await?;

			rows.into_iter().map(override_from_row).collect()
		})
	}

	fn try_acquire_run_lock(&self) -> BoxFuture<'_, Result<Option<Box<dyn RunLock>>>> {
		Box::pin(self.acquire_run_lock())
	}

	fn get_category(
		&self,
		user_id: i64,
		category_id: i64,
	) -> BoxFuture<'_, Result<Option<Category>>> {
		Box::pin(async move {
			let row = preferences::get_category(&self.db, user_id, category_id).await?;

			Ok(row.map(category_from_row))
		})
	}

	fn create_category<'a>(
		&'a self,
		user_id: i64,
		name: &'a str,
	) -> BoxFuture<'a, Result<Category>> {
		Box::pin(async move {
			let row = preferences::create_category(&self.db, user_id, name).await?;

			Ok(category_from_row(row))
		})
	}

	fn delete_category(&self, user_id: i64, category_id: i64) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move {
			Ok(preferences::delete_category(&self.db, user_id, category_id).await?)
		})
	}

	fn upsert_binding<'a>(
		&'a self,
		user_id: i64,
		code: &'a str,
		category_id: Option<i64>,
	) -> BoxFuture<'a, Result<InterestBinding>> {
		Box::pin(async move {
			let row = preferences::upsert_binding(&self.db, user_id, code, category_id).await?;

			Ok(binding_from_row(row))
		})
	}

	fn delete_binding<'a>(&'a self, user_id: i64, code: &'a str) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move { Ok(preferences::delete_binding(&self.db, user_id, code).await?) })
	}

	fn insert_stop_word<'a>(
		&'a self,
		user_id: i64,
		word: &'a str,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move { Ok(preferences::insert_stop_word(&self.db, user_id, word).await?) })
	}

	fn delete_stop_word<'a>(
		&'a self,
		user_id: i64,
		word: &'a str,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move { Ok(preferences::delete_stop_word(&self.db, user_id, word).await?) })
	}

	fn upsert_match_result<'a>(
		&'a self,
		write: &'a MatchWrite,
	) -> BoxFuture<'a, Result<InterestOverride>> {
		Box::pin(async move {
			let row = overrides::upsert_match_result(
				&self.db,
				&MatchResultWrite {
					regime: write.key.regime.as_str(),
					record_id: write.key.record_id,
					derived_flag: write.derived_flag,
					match_count: write.match_count,
					match_percentage: write.match_percentage,
					processed_at: write.processed_at,
					error_reason: write.error_reason.as_deref(),
				},
			)
			.await?;

			override_from_row(row)
		})
	}

	fn set_interest(
		&self,
		key: RecordKey,
		flag: Option<bool>,
	) -> BoxFuture<'_, Result<InterestOverride>> {
		Box::pin(async move {
			let row =
				overrides::set_interest(&self.db, key.regime.as_str(), key.record_id, flag).await?;

			override_from_row(row)
		})
	}
}

fn parse_regime(raw: &str) -> Result<Regime> {
	raw.parse().map_err(|err: procura_domain::ParseRegimeError| Error::InvalidData {
		message: err.to_string(),
	})
}

fn record_from_row(row: ProcurementRecord) -> Result<Record> {
	let lifecycle_state = row
		.lifecycle_state
		.as_deref()
		.map(str::parse::<LifecycleState>)
		.transpose()
		.map_err(|err| Error::InvalidData { message: err.to_string() })?;

	Ok(Record {
		key: RecordKey::new(parse_regime(&row.regime)?, row.record_id),
		start_date: row.start_date,
		end_date: row.end_date,
		delivery_end_date: row.delivery_end_date,
		code_id: row.code_id,
		region_id: row.region_id,
		title: row.title,
		initial_price: row.initial_price,
		contract_price: row.contract_price,
		lifecycle_state,
	})
}

fn override_from_row(row: procura_storage::models::InterestOverride) -> Result<InterestOverride> {
	Ok(InterestOverride {
		key: RecordKey::new(parse_regime(&row.regime)?, row.record_id),
		flag: InterestFlag::from(row.is_interesting),
		match_count: row.match_count,
		match_percentage: row.match_percentage,
		processed_at: row.processed_at,
		error_reason: row.error_reason,
	})
}

fn binding_from_row(row: UserInterestBinding) -> InterestBinding {
	InterestBinding {
		binding_id: row.binding_id,
		user_id: row.user_id,
		code: row.code,
		category_id: row.category_id,
	}
}

fn category_from_row(row: UserCategory) -> Category {
	Category { category_id: row.category_id, user_id: row.user_id, name: row.name }
}
