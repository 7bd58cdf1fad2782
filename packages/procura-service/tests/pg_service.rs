use time::{Duration, macros::date};

use procura_config::{Config, Lifecycle, Overrides, Postgres, Relevance, Service, Storage};
use procura_domain::{InterestFlag, LifecycleState, RecordKey, Regime};
use procura_service::{ClassifyOutcome, MatchResult, Page, ProcuraService, RelevanceFilter};
use procura_storage::{
	db::Db,
	lock::AdvisoryLock,
	models::{ClassificationCode, ProcurementRecord},
	queries,
};
use procura_testkit::TestDatabase;

fn config(dsn: &str) -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		storage: Storage { postgres: Postgres { dsn: dsn.to_string(), pool_max_conns: 4 } },
		lifecycle: Lifecycle {
			awarded_delivery_days: 90,
			review_window_days: 90,
			scan_batch_size: 2,
			run_interval_seconds: 60,
		},
		relevance: Relevance { default_page_size: 10, max_page_size: 100, scan_batch_size: 2 },
		overrides: Overrides { interesting_threshold_percent: 85.0 },
	}
}

async fn seed(db: &Db, today: time::Date) {
	queries::upsert_code(
		db,
		&ClassificationCode {
			code_id: 1,
			main_code: "26".to_string(),
			sub_code: Some("26.20".to_string()),
			name: Some("Computers".to_string()),
		},
	)
	.await
	.expect("Failed to insert code.");

	let rows = [
		("regime-A", 1, Some(5), None),
		("regime-A", 2, Some(-5), Some(95)),
		("regime-A", 3, Some(5), None),
		("regime-B", 1, Some(-10), None),
	];

	for (regime, record_id, end, delivery) in rows {
		let record = ProcurementRecord {
			regime: regime.to_string(),
			record_id,
			start_date: Some(today - Duration::days(20)),
			end_date: end.map(|days: i64| today + Duration::days(days)),
			delivery_end_date: delivery.map(|days: i64| today + Duration::days(days)),
			code_id: Some(1),
			region_id: Some(77),
			title: format!("Поставка {record_id}"),
			initial_price: Some(500.0),
			contract_price: None,
			lifecycle_state: None,
			lifecycle_updated_at: None,
		};

		queries::upsert_record(db, &record).await.expect("Failed to insert record.");
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PROCURA_PG_DSN to run."]
async fn postgres_classification_feeds_relevance_queries() {
	let Some(base_dsn) = procura_testkit::env_dsn() else {
		eprintln!("Skipping postgres_classification_feeds_relevance_queries; set PROCURA_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = config(test_db.dsn());
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");
	let today = date!(2026 - 05 - 04);

	db.ensure_schema().await.expect("Failed to ensure schema.");
	seed(&db, today).await;

	let service = ProcuraService::with_postgres(cfg, db.clone());

	service.bind_code(7, "26.20", None).await.expect("Failed to bind code.");

	let ClassifyOutcome::Completed(report) = service.classify_all(today).await.expect("classify")
	else {
		panic!("Classification must not be skipped.");
	};

	assert_eq!(report.scanned(), 4);
	assert_eq!(report.updated().get(LifecycleState::New), 2);
	assert_eq!(report.updated().get(LifecycleState::Awarded), 1);
	assert_eq!(report.updated().get(LifecycleState::UnderReview), 1);

	let vetoed = RecordKey::new(Regime::A, 3);

	service.set_interest(vetoed, Some(false)).await.expect("Failed to set flag.");

	let stored = service
		.record_match_result(MatchResult {
			key: vetoed,
			match_count: 4,
			match_percentage: 99.0,
			error_reason: None,
			processed_at: time::OffsetDateTime::now_utc(),
		})
		.await
		.expect("Failed to record match result.");

	assert_eq!(stored.flag, InterestFlag::NotInteresting);

	let filter = RelevanceFilter::new_records(7);
	let page = service.relevance_page(&filter, Page::all()).await.expect("query");

	assert_eq!(page.total, 1);
	assert_eq!(page.items[0].key, RecordKey::new(Regime::A, 1));

	let rerun = service.classify_all(today).await.expect("classify");

	assert!(matches!(rerun, ClassifyOutcome::Completed(report) if report.updated().total() == 0));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PROCURA_PG_DSN to run."]
async fn concurrent_run_is_skipped_while_lock_is_held() {
	let Some(base_dsn) = procura_testkit::env_dsn() else {
		eprintln!("Skipping concurrent_run_is_skipped_while_lock_is_held; set PROCURA_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = config(test_db.dsn());
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let held = AdvisoryLock::try_acquire(&db, 1_000_001).await.expect("lock").expect("acquired");
	let service = ProcuraService::with_postgres(cfg, db);
	let today = date!(2026 - 05 - 04);

	assert_eq!(service.classify_all(today).await.expect("classify"), ClassifyOutcome::Skipped);
	assert!(held.release().await.expect("release"));
	assert!(matches!(service.classify_all(today).await, Ok(ClassifyOutcome::Completed(_))));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
