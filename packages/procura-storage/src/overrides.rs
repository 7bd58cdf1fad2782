use time::OffsetDateTime;

use crate::{Result, db::Db, models::InterestOverride};

const OVERRIDE_COLUMNS: &str = "\
regime, record_id, is_interesting, match_count, match_percentage, processed_at, error_reason";

pub async fn get_override(
	db: &Db,
	regime: &str,
	record_id: i64,
) -> Result<Option<InterestOverride>> {
	let sql = format!(
		"SELECT {OVERRIDE_COLUMNS} FROM interest_overrides WHERE regime = $1 AND record_id = $2"
	);
	let row = sqlx::query_as(&sql).bind(regime).bind(record_id).fetch_optional(&db.pool).await?;

	Ok(row)
}

pub async fn get_overrides(
	db: &Db,
	regime: &str,
	record_ids: &[i64],
) -> Result<Vec<InterestOverride>> {
	if record_ids.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!(
		"SELECT {OVERRIDE_COLUMNS} FROM interest_overrides WHERE regime = $1 AND record_id = ANY($2)"
	);
	let rows = sqlx::query_as(&sql).bind(regime).bind(record_ids).fetch_all(&db.pool).await?;

	Ok(rows)
}

pub struct MatchResultWrite<'a> {
	pub regime: &'a str,
	pub record_id: i64,
	pub derived_flag: Option<bool>,
	pub match_count: i32,
	pub match_percentage: f32,
	pub processed_at: OffsetDateTime,
	pub error_reason: Option<&'a str>,
}

/// Upserts a document-match result. An existing non-null flag is kept as is.
pub async fn upsert_match_result(
	db: &Db,
	write: &MatchResultWrite<'_>,
) -> Result<InterestOverride> {
	let sql = format!(
		"\
INSERT INTO interest_overrides (
	regime,
	record_id,
	is_interesting,
	match_count,
	match_percentage,
	processed_at,
	error_reason
)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (regime, record_id) DO UPDATE
SET
	is_interesting = COALESCE(interest_overrides.is_interesting, EXCLUDED.is_interesting),
	match_count = EXCLUDED.match_count,
	match_percentage = EXCLUDED.match_percentage,
	processed_at = EXCLUDED.processed_at,
	error_reason = EXCLUDED.error_reason
RETURNING {OVERRIDE_COLUMNS}"
	);
	let row = sqlx::query_as(&sql)
		.bind(write.regime)
		.bind(write.record_id)
		.bind(write.derived_flag)
		.bind(write.match_count)
		.bind(write.match_percentage)
		.bind(write.processed_at)
		.bind(write.error_reason)
		.fetch_one(&db.pool)
		.await?;

	Ok(row)
}

/// Sets, replaces or clears the flag, creating the row when absent.
pub async fn set_interest(
	db: &Db,
	regime: &str,
	record_id: i64,
	flag: Option<bool>,
) -> Result<InterestOverride> {
	let sql = format!(
		"\
INSERT INTO interest_overrides (regime, record_id, is_interesting)
VALUES ($1, $2, $3)
ON CONFLICT (regime, record_id) DO UPDATE
SET is_interesting = EXCLUDED.is_interesting
RETURNING {OVERRIDE_COLUMNS}"
	);
	let row =
		sqlx::query_as(&sql).bind(regime).bind(record_id).bind(flag).fetch_one(&db.pool).await?;

	Ok(row)
}
