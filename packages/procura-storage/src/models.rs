use time::{Date, OffsetDateTime};

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ProcurementRecord {
	pub regime: String,
	pub record_id: i64,
	pub start_date: Option<Date>,
	pub end_date: Option<Date>,
	pub delivery_end_date: Option<Date>,
	pub code_id: Option<i64>,
	pub region_id: Option<i64>,
	pub title: String,
	pub initial_price: Option<f64>,
	pub contract_price: Option<f64>,
	pub lifecycle_state: Option<String>,
	pub lifecycle_updated_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ClassificationCode {
	pub code_id: i64,
	pub main_code: String,
	pub sub_code: Option<String>,
	pub name: Option<String>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct UserCategory {
	pub category_id: i64,
	pub user_id: i64,
	pub name: String,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct UserInterestBinding {
	pub binding_id: i64,
	pub user_id: i64,
	pub code: String,
	pub category_id: Option<i64>,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct InterestOverride {
	pub regime: String,
	pub record_id: i64,
	pub is_interesting: Option<bool>,
	pub match_count: i32,
	pub match_percentage: f32,
	pub processed_at: Option<OffsetDateTime>,
	pub error_reason: Option<String>,
}
