pub mod categories;
pub mod classify;
pub mod models;
pub mod overrides;
pub mod pg;
pub mod preferences;
pub mod relevance;
pub mod stop_words;
pub mod time_serde;

mod error;

pub use error::{Error, Result};

use std::{future::Future, pin::Pin, sync::Arc};

use procura_config::Config;
use procura_domain::{LifecycleState, RecordKey, Regime};
use procura_storage::db::Db;

pub use classify::{ClassifyOutcome, ClassifyReport, RegimeReport};
pub use models::{Category, InterestBinding, InterestOverride, MatchWrite, Record, RecordFilter};
pub use overrides::MatchResult;
pub use pg::PgStore;
pub use relevance::{Page, PageLimit, RelevanceFilter, RelevancePage, RelevantRecord};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Durable storage the classifier and query engine run against.
///
/// Reads may interleave freely with classifier writes; callers never rely on a multi-record
/// snapshot.
pub trait RecordStore
where
	Self: Send + Sync,
{
	fn scan_records<'a>(&'a self, filter: &'a RecordFilter) -> BoxFuture<'a, Result<Vec<Record>>>;

	/// Returns whether the stored state changed. Writing the current value is a no-op.
	fn update_lifecycle_state(
		&self,
		key: RecordKey,
		state: LifecycleState,
	) -> BoxFuture<'_, Result<bool>>;

	fn get_user_bindings(
		&self,
		user_id: i64,
		category_id: Option<i64>,
	) -> BoxFuture<'_, Result<Vec<InterestBinding>>>;

	/// Ids of codes whose main or sub code equals any of `values`.
	fn find_code_ids<'a>(&'a self, values: &'a [String]) -> BoxFuture<'a, Result<Vec<i64>>>;

	fn get_stop_words(&self, user_id: i64) -> BoxFuture<'_, Result<Vec<String>>>;

	fn get_override(&self, key: RecordKey) -> BoxFuture<'_, Result<Option<InterestOverride>>>;

	fn get_overrides<'a>(
		&'a self,
		regime: Regime,
		record_ids: &'a [i64],
	) -> BoxFuture<'a, Result<Vec<InterestOverride>>>;

	/// Non-blocking. Returns `None` when a classification run already holds the lock.
	///
	/// The lock lasts as long as the returned guard: dropping it without
	/// [`RunLock::release`] must free the lock as well.
	fn try_acquire_run_lock(&self) -> BoxFuture<'_, Result<Option<Box<dyn RunLock>>>>;

	fn get_category(
		&self,
		user_id: i64,
		category_id: i64,
	) -> BoxFuture<'_, Result<Option<Category>>>;

	fn create_category<'a>(
		&'a self,
		user_id: i64,
		name: &'a str,
	) -> BoxFuture<'a, Result<Category>>;

	fn delete_category(&self, user_id: i64, category_id: i64) -> BoxFuture<'_, Result<bool>>;

	fn upsert_binding<'a>(
		&'a self,
		user_id: i64,
		code: &'a str,
		category_id: Option<i64>,
	) -> BoxFuture<'a, Result<InterestBinding>>;

	fn delete_binding<'a>(&'a self, user_id: i64, code: &'a str) -> BoxFuture<'a, Result<bool>>;

	/// Returns `false` when the user already has the word in any letter case.
	fn insert_stop_word<'a>(
		&'a self,
		user_id: i64,
		word: &'a str,
	) -> BoxFuture<'a, Result<bool>>;

	fn delete_stop_word<'a>(
		&'a self,
		user_id: i64,
		word: &'a str,
	) -> BoxFuture<'a, Result<bool>>;

	/// Upserts the override row. An existing non-null flag must be kept.
	fn upsert_match_result<'a>(
		&'a self,
		write: &'a MatchWrite,
	) -> BoxFuture<'a, Result<InterestOverride>>;

	fn set_interest(
		&self,
		key: RecordKey,
		flag: Option<bool>,
	) -> BoxFuture<'_, Result<InterestOverride>>;
}

/// Guard for the classifier run lock, owned by the run that took it.
pub trait RunLock
where
	Self: Send,
{
	fn release(self: Box<Self>) -> BoxFuture<'static, Result<()>>;
}

pub struct ProcuraService {
	pub cfg: Config,
	pub store: Arc<dyn RecordStore>,
}
impl ProcuraService {
	pub fn new(cfg: Config, store: Arc<dyn RecordStore>) -> Self {
		Self { cfg, store }
	}

	pub fn with_postgres(cfg: Config, db: Db) -> Self {
		Self::new(cfg, Arc::new(PgStore::new(db)))
	}
}
