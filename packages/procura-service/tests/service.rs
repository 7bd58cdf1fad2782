use std::{
	collections::HashMap,
	future,
	sync::{
		Arc, Mutex,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration as StdDuration,
};

use time::{
	Date, Duration, OffsetDateTime,
	macros::{date, datetime},
};

use procura_config::{Config, Lifecycle, Overrides, Postgres, Relevance, Service, Storage};
use procura_domain::{InterestFlag, LifecycleState, RecordKey, Regime};
use procura_service::{
	BoxFuture, Category, ClassifyOutcome, Error, InterestBinding, InterestOverride, MatchResult,
	MatchWrite, Page, PageLimit, ProcuraService, Record, RecordFilter, RecordStore,
	RelevanceFilter, Result, RunLock,
};

const TODAY: Date = date!(2026 - 03 - 10);
const USER: i64 = 1;

#[derive(Default)]
struct State {
	records: Vec<Record>,
	// (code_id, main_code, sub_code)
	codes: Vec<(i64, String, Option<String>)>,
	bindings: Vec<InterestBinding>,
	categories: Vec<Category>,
	stop_words: Vec<(i64, String)>,
	overrides: HashMap<RecordKey, InterestOverride>,
	fail_scans: bool,
	// Lifecycle writes never complete while set.
	stall_updates: bool,
	writes: u64,
	next_id: i64,
}

struct MemoryRunLock {
	held: Arc<AtomicBool>,
}
impl RunLock for MemoryRunLock {
	fn release(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
		ready(Ok(()))
	}
}
impl Drop for MemoryRunLock {
	fn drop(&mut self) {
		self.held.store(false, Ordering::SeqCst);
	}
}

#[derive(Default)]
struct MemoryStore {
	state: Mutex<State>,
	run_lock: Arc<AtomicBool>,
}
impl MemoryStore {
	fn lock_held(&self) -> bool {
		self.run_lock.load(Ordering::SeqCst)
	}

	fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
		let mut state = self.state.lock().expect("store mutex");

		f(&mut state)
	}
}

fn ready<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, T> {
	Box::pin(future::ready(value))
}

fn empty_override(key: RecordKey) -> InterestOverride {
	InterestOverride {
		key,
		flag: InterestFlag::Unset,
		match_count: 0,
		match_percentage: 0.0,
		processed_at: None,
		error_reason: None,
	}
}

impl RecordStore for MemoryStore {
	fn scan_records<'a>(&'a self, filter: &'a RecordFilter) -> BoxFuture<'a, Result<Vec<Record>>> {
		let result = self.with(|state| {
			if state.fail_scans {
				return Err(Error::StoreUnavailable { message: "scan failed".to_string() });
			}

			let mut rows = state
				.records
				.iter()
				.filter(|record| filter.regime.is_none_or(|regime| record.key.regime == regime))
				.filter(|record| match &filter.states {
					Some(states) => record.lifecycle_state.is_some_and(|s| states.contains(&s)),
					None => true,
				})
				.filter(|record| filter.region_id.is_none_or(|id| record.region_id == Some(id)))
				.filter(|record| match &filter.code_ids {
					Some(ids) => record.code_id.is_some_and(|id| ids.contains(&id)),
					None => true,
				})
				.filter(|record| {
					filter.after.is_none_or(|after| {
						(record.key.regime, record.key.record_id) > (after.regime, after.record_id)
					})
				})
				.cloned()
				.collect::<Vec<_>>();

			rows.sort_by_key(|record| (record.key.regime, record.key.record_id));
			rows.truncate(filter.limit as usize);

			Ok(rows)
		});

		ready(result)
	}

	fn update_lifecycle_state(
		&self,
		key: RecordKey,
		state: LifecycleState,
	) -> BoxFuture<'_, Result<bool>> {
		if self.with(|store| store.stall_updates) {
			return Box::pin(future::pending());
		}

		let changed = self.with(|store| {
			let Some(record) = store.records.iter_mut().find(|record| record.key == key) else {
				return false;
			};

			if record.lifecycle_state == Some(state) {
				return false;
			}

			record.lifecycle_state = Some(state);
			store.writes += 1;

			true
		});

		ready(Ok(changed))
	}

	fn get_user_bindings(
		&self,
		user_id: i64,
		category_id: Option<i64>,
	) -> BoxFuture<'_, Result<Vec<InterestBinding>>> {
		let rows = self.with(|state| {
			state
				.bindings
				.iter()
				.filter(|binding| binding.user_id == user_id)
				.filter(|binding| category_id.is_none() || binding.category_id == category_id)
				.cloned()
				.collect()
		});

		ready(Ok(rows))
	}

	fn find_code_ids<'a>(&'a self, values: &'a [String]) -> BoxFuture<'a, Result<Vec<i64>>> {
		let ids = self.with(|state| {
			state
				.codes
				.iter()
				.filter(|(_, main, sub)| {
					values.iter().any(|value| value == main || sub.as_ref() == Some(value))
				})
				.map(|(id, _, _)| *id)
				.collect()
		});

		ready(Ok(ids))
	}

	fn get_stop_words(&self, user_id: i64) -> BoxFuture<'_, Result<Vec<String>>> {
		let words = self.with(|state| {
			state
				.stop_words
				.iter()
				.filter(|(owner, _)| *owner == user_id)
				.map(|(_, word)| word.clone())
				.collect()
		});

		ready(Ok(words))
	}

	fn get_override(&self, key: RecordKey) -> BoxFuture<'_, Result<Option<InterestOverride>>> {
		ready(Ok(self.with(|state| state.overrides.get(&key).cloned())))
	}

	fn get_overrides<'a>(
		&'a self,
		regime: Regime,
		record_ids: &'a [i64],
	) -> BoxFuture<'a, Result<Vec<InterestOverride>>> {
		let rows = self.with(|state| {
			record_ids
				.iter()
				.filter_map(|id| state.overrides.get(&RecordKey::new(regime, *id)).cloned())
				.collect()
		});

		ready(Ok(rows))
	}

	fn try_acquire_run_lock(&self) -> BoxFuture<'_, Result<Option<Box<dyn RunLock>>>> {
		if self.run_lock.swap(true, Ordering::SeqCst) {
			return ready(Ok(None));
		}

		let lock: Box<dyn RunLock> = Box::new(MemoryRunLock { held: self.run_lock.clone() });

		ready(Ok(Some(lock)))
	}

	fn get_category(
		&self,
		user_id: i64,
		category_id: i64,
	) -> BoxFuture<'_, Result<Option<Category>>> {
		let row = self.with(|state| {
			state
				.categories
				.iter()
				.find(|category| category.user_id == user_id && category.category_id == category_id)
				.cloned()
		});

		ready(Ok(row))
	}

	fn create_category<'a>(
		&'a self,
		user_id: i64,
		name: &'a str,
	) -> BoxFuture<'a, Result<Category>> {
		let category = self.with(|state| {
			state.next_id += 1;

			let category =
				Category { category_id: state.next_id, user_id, name: name.to_string() };

			state.categories.push(category.clone());

			category
		});

		ready(Ok(category))
	}

	fn delete_category(&self, user_id: i64, category_id: i64) -> BoxFuture<'_, Result<bool>> {
		let deleted = self.with(|state| {
			let before = state.categories.len();

			state.categories.retain(|category| {
				!(category.user_id == user_id && category.category_id == category_id)
			});

			if state.categories.len() == before {
				return false;
			}

			for binding in &mut state.bindings {
				if binding.category_id == Some(category_id) {
					binding.category_id = None;
				}
			}

			true
		});

		ready(Ok(deleted))
	}

	fn upsert_binding<'a>(
		&'a self,
		user_id: i64,
		code: &'a str,
		category_id: Option<i64>,
	) -> BoxFuture<'a, Result<InterestBinding>> {
		let binding = self.with(|state| {
			if let Some(existing) = state
				.bindings
				.iter_mut()
				.find(|binding| binding.user_id == user_id && binding.code == code)
			{
				existing.category_id = category_id;

				return existing.clone();
			}

			state.next_id += 1;

			let binding = InterestBinding {
				binding_id: state.next_id,
				user_id,
				code: code.to_string(),
				category_id,
			};

			state.bindings.push(binding.clone());

			binding
		});

		ready(Ok(binding))
	}

	fn delete_binding<'a>(&'a self, user_id: i64, code: &'a str) -> BoxFuture<'a, Result<bool>> {
		let deleted = self.with(|state| {
			let before = state.bindings.len();

			state.bindings.retain(|binding| !(binding.user_id == user_id && binding.code == code));

			state.bindings.len() != before
		});

		ready(Ok(deleted))
	}

	fn insert_stop_word<'a>(
		&'a self,
		user_id: i64,
		word: &'a str,
	) -> BoxFuture<'a, Result<bool>> {
		let inserted = self.with(|state| {
			let lowered = word.to_lowercase();

			if state
				.stop_words
				.iter()
				.any(|(owner, existing)| *owner == user_id && existing.to_lowercase() == lowered)
			{
				return false;
			}

			state.stop_words.push((user_id, word.to_string()));

			true
		});

		ready(Ok(inserted))
	}

	fn delete_stop_word<'a>(
		&'a self,
		user_id: i64,
		word: &'a str,
	) -> BoxFuture<'a, Result<bool>> {
		let deleted = self.with(|state| {
			let lowered = word.to_lowercase();
			let before = state.stop_words.len();

			state.stop_words.retain(|(owner, existing)| {
				!(*owner == user_id && existing.to_lowercase() == lowered)
			});

			state.stop_words.len() != before
		});

		ready(Ok(deleted))
	}

	fn upsert_match_result<'a>(
		&'a self,
		write: &'a MatchWrite,
	) -> BoxFuture<'a, Result<InterestOverride>> {
		let row = self.with(|state| {
			let row = state.overrides.entry(write.key).or_insert_with(|| empty_override(write.key));

			if row.flag == InterestFlag::Unset {
				row.flag = InterestFlag::from(write.derived_flag);
			}

			row.match_count = write.match_count;
			row.match_percentage = write.match_percentage;
			row.processed_at = Some(write.processed_at);
			row.error_reason = write.error_reason.clone();

			row.clone()
		});

		ready(Ok(row))
	}

	fn set_interest(
		&self,
		key: RecordKey,
		flag: Option<bool>,
	) -> BoxFuture<'_, Result<InterestOverride>> {
		let row = self.with(|state| {
			let row = state.overrides.entry(key).or_insert_with(|| empty_override(key));

			row.flag = InterestFlag::from(flag);

			row.clone()
		});

		ready(Ok(row))
	}
}

fn config(batch: u32) -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		storage: Storage {
			postgres: Postgres {
				dsn: "postgres://unused".to_string(),
				pool_max_conns: 1,
			},
		},
		lifecycle: Lifecycle {
			awarded_delivery_days: 90,
			review_window_days: 90,
			scan_batch_size: batch,
			run_interval_seconds: 60,
		},
		relevance: Relevance { default_page_size: 2, max_page_size: 50, scan_batch_size: batch },
		overrides: Overrides { interesting_threshold_percent: 85.0 },
	}
}

fn record(regime: Regime, id: i64, end: Option<i64>, delivery: Option<i64>) -> Record {
	Record {
		key: RecordKey::new(regime, id),
		start_date: Some(TODAY - Duration::days(30)),
		end_date: end.map(|days| TODAY + Duration::days(days)),
		delivery_end_date: delivery.map(|days| TODAY + Duration::days(days)),
		code_id: Some(100),
		region_id: Some(77),
		title: format!("Поставка оборудования {id}"),
		initial_price: Some(1_000.0),
		contract_price: None,
		lifecycle_state: None,
	}
}

struct Fixture {
	store: Arc<MemoryStore>,
	service: ProcuraService,
}

fn fixture(batch: u32, records: Vec<Record>) -> Fixture {
	let store = Arc::new(MemoryStore::default());

	store.with(|state| {
		state.records = records;
		state.codes = vec![
			(100, "26".to_string(), Some("26.20".to_string())),
			(200, "27".to_string(), Some("26.20".to_string())),
			(300, "28".to_string(), None),
		];
		state.bindings.push(InterestBinding {
			binding_id: 1,
			user_id: USER,
			code: "26".to_string(),
			category_id: None,
		});
		state.next_id = 1_000;
	});

	let service = ProcuraService::new(config(batch), store.clone());

	Fixture { store, service }
}

async fn classify(service: &ProcuraService) -> procura_service::ClassifyReport {
	match service.classify_all(TODAY).await.expect("classification") {
		ClassifyOutcome::Completed(report) => report,
		ClassifyOutcome::Skipped => panic!("classification was skipped"),
	}
}

fn keys(records: &[procura_service::RelevantRecord]) -> Vec<RecordKey> {
	records.iter().map(|record| record.key).collect()
}

#[tokio::test]
async fn scenario_classifies_and_filters_records() {
	let fx = fixture(10, vec![
		record(Regime::A, 1, Some(5), None),
		record(Regime::A, 2, Some(-5), Some(95)),
		record(Regime::A, 3, Some(5), None),
	]);
	let report = classify(&fx.service).await;
	let assigned = report.assigned();

	assert_eq!(assigned.get(LifecycleState::New), 2);
	assert_eq!(assigned.get(LifecycleState::Awarded), 1);

	fx.service.set_interest(RecordKey::new(Regime::A, 3), Some(false)).await.expect("set flag");

	let found = fx
		.service
		.query_relevant(&RelevanceFilter::new_records(USER), Page::all())
		.await
		.expect("query");

	assert_eq!(keys(&found), vec![RecordKey::new(Regime::A, 1)]);
	assert_eq!(found[0].lifecycle_state, LifecycleState::New);

	let json = serde_json::to_value(&found[0]).expect("serialize");

	assert_eq!(json["key"]["regime"], "regime-A");
	assert_eq!(json["lifecycle_state"], "new");
	assert_eq!(json["end_date"], "2026-03-15");
	assert_eq!(json["interest"], "unset");
	assert!(json["processed_at"].is_null());
}

#[tokio::test]
async fn classification_is_idempotent() {
	let fx = fixture(2, vec![
		record(Regime::A, 1, Some(5), None),
		record(Regime::A, 2, Some(-5), None),
		record(Regime::A, 3, Some(-200), None),
		record(Regime::B, 1, None, Some(120)),
		record(Regime::B, 2, None, None),
	]);
	let first = classify(&fx.service).await;
	let writes = fx.store.with(|state| state.writes);
	let second = classify(&fx.service).await;

	assert_eq!(first.scanned(), 5);
	assert_eq!(first.updated().total(), 5);
	assert_eq!(second.assigned(), first.assigned());
	assert_eq!(second.updated().total(), 0);
	assert_eq!(fx.store.with(|state| state.writes), writes);

	let states = fx.store.with(|state| {
		state.records.iter().map(|record| record.lifecycle_state).collect::<Vec<_>>()
	});

	assert_eq!(states, vec![
		Some(LifecycleState::New),
		Some(LifecycleState::UnderReview),
		Some(LifecycleState::Rejected),
		Some(LifecycleState::Awarded),
		Some(LifecycleState::Rejected),
	]);
}

#[tokio::test]
async fn classification_reports_per_regime() {
	let fx = fixture(10, vec![
		record(Regime::A, 1, Some(5), None),
		record(Regime::B, 1, Some(5), None),
		record(Regime::B, 2, Some(5), Some(90)),
	]);
	let report = classify(&fx.service).await;

	assert_eq!(report.regimes.len(), 2);
	assert_eq!(report.regimes[0].regime, Regime::A);
	assert_eq!(report.regimes[0].scanned, 1);
	assert_eq!(report.regimes[1].assigned.get(LifecycleState::Awarded), 1);
	assert_eq!(report.regimes[1].assigned.get(LifecycleState::New), 1);
}

#[tokio::test]
async fn held_run_lock_skips_classification() {
	let fx = fixture(10, vec![record(Regime::A, 1, Some(5), None)]);

	fx.store.run_lock.store(true, Ordering::SeqCst);

	let outcome = fx.service.classify_all(TODAY).await.expect("classification");

	assert_eq!(outcome, ClassifyOutcome::Skipped);
	assert_eq!(fx.store.with(|state| state.writes), 0);
}

#[tokio::test]
async fn cancelled_run_does_not_block_the_next_one() {
	let fx = fixture(10, vec![record(Regime::A, 1, Some(5), None)]);

	fx.store.with(|state| state.stall_updates = true);

	let cancelled =
		tokio::time::timeout(StdDuration::from_millis(50), fx.service.classify_all(TODAY)).await;

	assert!(cancelled.is_err());
	assert!(!fx.store.lock_held());

	fx.store.with(|state| state.stall_updates = false);

	let report = classify(&fx.service).await;

	assert_eq!(report.updated().get(LifecycleState::New), 1);
}

#[tokio::test]
async fn failed_run_releases_the_lock() {
	let fx = fixture(10, vec![record(Regime::A, 1, Some(5), None)]);

	fx.store.with(|state| state.fail_scans = true);

	let err = fx.service.classify_all(TODAY).await.expect_err("scan failure");

	assert!(matches!(err, Error::StoreUnavailable { .. }));
	assert!(!fx.store.lock_held());
}

#[tokio::test]
async fn sub_code_binding_matches_other_main_codes() {
	let mut other = record(Regime::A, 2, Some(5), None);

	other.code_id = Some(200);

	let mut unrelated = record(Regime::A, 3, Some(5), None);

	unrelated.code_id = Some(300);

	let fx = fixture(10, vec![record(Regime::A, 1, Some(5), None), other, unrelated]);

	fx.store.with(|state| state.bindings[0].code = "26.20".to_string());
	classify(&fx.service).await;

	let codes = fx.service.category_codes(USER, None).await.expect("codes");

	assert!(codes.contains(Some(100)));
	assert!(codes.contains(Some(200)));
	assert!(!codes.contains(Some(300)));

	let found = fx
		.service
		.query_relevant(&RelevanceFilter::new_records(USER), Page::all())
		.await
		.expect("query");

	assert_eq!(keys(&found), vec![RecordKey::new(Regime::A, 2), RecordKey::new(Regime::A, 1)]);
}

#[tokio::test]
async fn stop_words_exclude_titles_ignoring_case() {
	let mut pump = record(Regime::A, 1, Some(5), None);

	pump.title = "Насосное оборудование".to_string();

	let fx = fixture(10, vec![pump, record(Regime::A, 2, Some(5), None)]);

	classify(&fx.service).await;

	assert_eq!(fx.service.add_stop_words(USER, ["насос", " НАСОС ", "  "]).await.expect("add"), 1);
	assert!(fx.service.excludes_title(USER, "Насосное оборудование").await.expect("check"));

	let found = fx
		.service
		.query_relevant(&RelevanceFilter::new_records(USER), Page::all())
		.await
		.expect("query");

	assert_eq!(keys(&found), vec![RecordKey::new(Regime::A, 2)]);
	assert!(fx.service.remove_stop_word(USER, "Насос").await.expect("remove"));
	assert_eq!(
		fx.service.count_relevant(&RelevanceFilter::new_records(USER)).await.expect("count"),
		2
	);
}

#[tokio::test]
async fn only_a_false_flag_vetoes() {
	let fx = fixture(10, vec![
		record(Regime::A, 1, Some(5), None),
		record(Regime::A, 2, Some(5), None),
		record(Regime::A, 3, Some(5), None),
		record(Regime::A, 4, Some(5), None),
	]);

	classify(&fx.service).await;
	fx.service.set_interest(RecordKey::new(Regime::A, 1), Some(true)).await.expect("flag");
	fx.service.set_interest(RecordKey::new(Regime::A, 2), Some(false)).await.expect("flag");
	fx.service
		.record_match_result(MatchResult {
			key: RecordKey::new(Regime::A, 3),
			match_count: 2,
			match_percentage: 40.0,
			error_reason: Some("document unreadable".to_string()),
			processed_at: datetime!(2026-03-09 12:00 UTC),
		})
		.await
		.expect("match result");

	let found = fx
		.service
		.query_relevant(&RelevanceFilter::new_records(USER), Page::all())
		.await
		.expect("query");
	let mut found = keys(&found);

	found.sort_by_key(|key| key.record_id);

	assert_eq!(found, vec![
		RecordKey::new(Regime::A, 1),
		RecordKey::new(Regime::A, 3),
		RecordKey::new(Regime::A, 4),
	]);
}

#[tokio::test]
async fn automation_never_overwrites_a_set_flag() {
	let fx = fixture(10, vec![record(Regime::B, 9, Some(5), None)]);
	let key = RecordKey::new(Regime::B, 9);
	let strong = MatchResult {
		key,
		match_count: 5,
		match_percentage: 95.0,
		error_reason: None,
		processed_at: datetime!(2026-03-09 12:00 UTC),
	};

	fx.service.set_interest(key, Some(false)).await.expect("flag");

	let stored = fx.service.record_match_result(strong.clone()).await.expect("match");

	assert_eq!(stored.flag, InterestFlag::NotInteresting);
	assert_eq!(stored.match_count, 5);
	assert_eq!(stored.processed_at, Some(strong.processed_at));

	fx.service.set_interest(key, None).await.expect("reset");

	let stored = fx.service.record_match_result(strong).await.expect("match");

	assert_eq!(stored.flag, InterestFlag::Interesting);
	assert_eq!(fx.service.interest_flag(key).await.expect("flag"), InterestFlag::Interesting);
	assert_eq!(
		fx.service.interest_flag(RecordKey::new(Regime::A, 9)).await.expect("flag"),
		InterestFlag::Unset
	);
}

#[tokio::test]
async fn invalid_match_percentage_is_rejected() {
	let fx = fixture(10, Vec::new());
	let err = fx
		.service
		.record_match_result(MatchResult {
			key: RecordKey::new(Regime::A, 1),
			match_count: 1,
			match_percentage: 140.0,
			error_reason: None,
			processed_at: datetime!(2026-03-09 12:00 UTC),
		})
		.await
		.expect_err("out of range");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert!(fx.store.with(|state| state.overrides.is_empty()));
}

#[tokio::test]
async fn count_matches_unpaged_query_and_pages_partition_it() {
	let records = (1..=7)
		.flat_map(|id| {
			[record(Regime::A, id, Some(id), None), record(Regime::B, id, Some(id), None)]
		})
		.collect::<Vec<_>>();
	let fx = fixture(3, records);

	classify(&fx.service).await;

	let filter = RelevanceFilter::new_records(USER);
	let all = fx.service.query_relevant(&filter, Page::all()).await.expect("query");
	let count = fx.service.count_relevant(&filter).await.expect("count");

	assert_eq!(count, 14);
	assert_eq!(all.len() as u64, count);

	let mut paged = Vec::new();

	for offset in (0..14).step_by(4) {
		let page = Page { offset, limit: PageLimit::Size(4) };
		let result = fx.service.relevance_page(&filter, page).await.expect("page");

		assert_eq!(result.total, count);

		paged.extend(result.items);
	}

	assert_eq!(keys(&paged), keys(&all));

	let default_page = fx.service.query_relevant(&filter, Page::default()).await.expect("page");

	assert_eq!(default_page.len(), 2);
}

#[tokio::test]
async fn results_are_ordered_with_a_total_tie_break() {
	let mut records = vec![
		record(Regime::A, 5, Some(5), None),
		record(Regime::B, 5, Some(5), None),
		record(Regime::A, 6, Some(5), None),
		record(Regime::A, 7, Some(5), None),
		record(Regime::A, 8, Some(5), None),
	];

	records[3].start_date = Some(TODAY);
	records[4].start_date = None;

	let fx = fixture(10, records);

	classify(&fx.service).await;
	fx.service
		.record_match_result(MatchResult {
			key: RecordKey::new(Regime::A, 5),
			match_count: 1,
			match_percentage: 10.0,
			error_reason: Some("timeout".to_string()),
			processed_at: OffsetDateTime::now_utc(),
		})
		.await
		.expect("match");

	let found = fx
		.service
		.query_relevant(&RelevanceFilter::new_records(USER), Page::all())
		.await
		.expect("query");

	assert_eq!(keys(&found), vec![
		RecordKey::new(Regime::A, 5),
		RecordKey::new(Regime::A, 7),
		RecordKey::new(Regime::A, 6),
		RecordKey::new(Regime::B, 5),
		RecordKey::new(Regime::A, 8),
	]);
}

#[tokio::test]
async fn unclassified_records_are_never_relevant() {
	let fx = fixture(10, vec![record(Regime::A, 1, Some(5), None)]);
	let mut filter = RelevanceFilter::new_records(USER);

	filter.states = LifecycleState::ALL.to_vec();

	assert_eq!(fx.service.count_relevant(&filter).await.expect("count"), 0);
}

#[tokio::test]
async fn invalid_filters_are_rejected() {
	let fx = fixture(10, vec![record(Regime::A, 1, Some(5), None)]);
	let mut filter = RelevanceFilter::new_records(USER);

	for size in [0, 51] {
		let err = fx
			.service
			.query_relevant(&filter, Page::first(size))
			.await
			.expect_err("bad page size");

		assert!(matches!(err, Error::InvalidFilter { .. }));
	}

	filter.category_id = Some(4_242);

	let err = fx.service.count_relevant(&filter).await.expect_err("foreign category");

	assert!(matches!(err, Error::InvalidFilter { .. }));

	filter.category_id = None;
	filter.states.clear();

	let err = fx.service.count_relevant(&filter).await.expect_err("empty states");

	assert!(matches!(err, Error::InvalidFilter { .. }));
}

#[tokio::test]
async fn user_without_bindings_gets_an_empty_result() {
	let fx = fixture(10, vec![record(Regime::A, 1, Some(5), None)]);

	classify(&fx.service).await;

	let filter = RelevanceFilter::new_records(USER + 1);
	let page = fx.service.relevance_page(&filter, Page::default()).await.expect("page");

	assert!(page.items.is_empty());
	assert_eq!(page.total, 0);
}

#[tokio::test]
async fn summary_counts_each_state() {
	let fx = fixture(10, vec![
		record(Regime::A, 1, Some(5), None),
		record(Regime::A, 2, Some(-5), None),
		record(Regime::B, 3, Some(5), Some(100)),
		record(Regime::B, 4, Some(6), None),
	]);

	classify(&fx.service).await;

	let summary = fx.service.relevance_summary(USER, None, None).await.expect("summary");

	assert_eq!(summary.get(LifecycleState::New), 2);
	assert_eq!(summary.get(LifecycleState::UnderReview), 1);
	assert_eq!(summary.get(LifecycleState::Awarded), 1);
	assert_eq!(summary.total(), 4);

	let mut filter = RelevanceFilter::new_records(USER);

	filter.regime = Some(Regime::B);

	assert_eq!(fx.service.count_relevant(&filter).await.expect("count"), 1);
}

#[tokio::test]
async fn categories_scope_queries_and_survive_deletion() {
	let mut tools = record(Regime::A, 2, Some(5), None);

	tools.code_id = Some(300);

	let fx = fixture(10, vec![record(Regime::A, 1, Some(5), None), tools]);

	classify(&fx.service).await;

	let category = fx.service.create_category(USER, " Инструменты ").await.expect("category");

	assert_eq!(category.name, "Инструменты");

	fx.service.bind_code(USER, " 28 ", Some(category.category_id)).await.expect("bind");

	let mut filter = RelevanceFilter::new_records(USER);

	filter.category_id = Some(category.category_id);

	let found = fx.service.query_relevant(&filter, Page::all()).await.expect("query");

	assert_eq!(keys(&found), vec![RecordKey::new(Regime::A, 2)]);

	let err = fx
		.service
		.bind_code(USER + 1, "28", Some(category.category_id))
		.await
		.expect_err("foreign category");

	assert!(matches!(err, Error::InvalidRequest { .. }));

	fx.service.delete_category(USER, category.category_id).await.expect("delete");

	let bindings = fx.store.with(|state| state.bindings.clone());

	assert!(bindings.iter().any(|binding| binding.code == "28" && binding.category_id.is_none()));
	assert_eq!(
		fx.service.count_relevant(&RelevanceFilter::new_records(USER)).await.expect("count"),
		2
	);
	assert!(fx.service.unbind_code(USER, "28").await.expect("unbind"));
	assert!(matches!(
		fx.service.delete_category(USER, category.category_id).await,
		Err(Error::NotFound { .. })
	));
}
