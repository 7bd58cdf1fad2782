use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub lifecycle: Lifecycle,
	pub relevance: Relevance,
	pub overrides: Overrides,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Windows and batching for the lifecycle classifier.
#[derive(Clone, Debug, Deserialize)]
pub struct Lifecycle {
	/// A delivery end date at least this many days ahead marks a record as awarded.
	#[serde(default = "default_awarded_delivery_days")]
	pub awarded_delivery_days: i64,
	/// How far back a closed end date still counts as under review.
	#[serde(default = "default_review_window_days")]
	pub review_window_days: i64,
	pub scan_batch_size: u32,
	pub run_interval_seconds: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Relevance {
	pub default_page_size: u32,
	pub max_page_size: u32,
	pub scan_batch_size: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Overrides {
	/// Document match percentage at or above which automation marks a record interesting.
	#[serde(default = "default_interesting_threshold_percent")]
	pub interesting_threshold_percent: f32,
}

fn default_awarded_delivery_days() -> i64 {
	90
}

fn default_review_window_days() -> i64 {
	90
}

fn default_interesting_threshold_percent() -> f32 {
	85.0
}
