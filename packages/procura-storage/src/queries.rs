use sqlx::QueryBuilder;

use crate::{
	Result,
	db::Db,
	models::{ClassificationCode, ProcurementRecord},
};

const RECORD_COLUMNS: &str = "\
regime, record_id, start_date, end_date, delivery_end_date, code_id, region_id, title, \
initial_price, contract_price, lifecycle_state, lifecycle_updated_at";

/// Filter for a cursor-paginated record scan ordered by `(regime, record_id)`.
#[derive(Clone, Debug, Default)]
pub struct RecordScan<'a> {
	pub regime: Option<&'a str>,
	pub states: Option<&'a [String]>,
	pub region_id: Option<i64>,
	pub code_ids: Option<&'a [i64]>,
	/// Exclusive lower bound, the key of the last row of the previous batch.
	pub after: Option<(&'a str, i64)>,
	pub limit: i64,
}

pub async fn scan_records(db: &Db, scan: &RecordScan<'_>) -> Result<Vec<ProcurementRecord>> {
	if scan.limit <= 0 {
		return Err(crate::Error::InvalidArgument("scan limit must be positive.".to_string()));
	}

	let mut builder = QueryBuilder::new("SELECT ");

	builder.push(RECORD_COLUMNS);
	builder.push(" FROM procurement_records WHERE TRUE");

	if let Some(regime) = scan.regime {
		builder.push(" AND regime = ");
		builder.push_bind(regime);
	}
	if let Some(states) = scan.states {
		builder.push(" AND lifecycle_state = ANY(");
		builder.push_bind(states);
		builder.push(")");
	}
	if let Some(region_id) = scan.region_id {
		builder.push(" AND region_id = ");
		builder.push_bind(region_id);
	}
	if let Some(code_ids) = scan.code_ids {
		builder.push(" AND code_id = ANY(");
		builder.push_bind(code_ids);
		builder.push(")");
	}
	if let Some((regime, record_id)) = scan.after {
		builder.push(" AND (regime, record_id) > (");
		builder.push_bind(regime);
		builder.push(", ");
		builder.push_bind(record_id);
		builder.push(")");
	}

	builder.push(" ORDER BY regime ASC, record_id ASC LIMIT ");
	builder.push_bind(scan.limit);

	let records = builder.build_query_as().fetch_all(&db.pool).await?;

	Ok(records)
}

/// Writes `state` unless the record already carries it. Returns whether a row changed.
pub async fn update_lifecycle_state(
	db: &Db,
	regime: &str,
	record_id: i64,
	state: &str,
) -> Result<bool> {
	let result = sqlx::query(
		"\
UPDATE procurement_records
SET
	lifecycle_state = $1,
	lifecycle_updated_at = now()
WHERE regime = $2
	AND record_id = $3
	AND lifecycle_state IS DISTINCT FROM $1",
	)
	.bind(state)
	.bind(regime)
	.bind(record_id)
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() > 0)
}

/// Ids of every code whose main or sub code equals one of `values`.
pub async fn find_code_ids(db: &Db, values: &[String]) -> Result<Vec<i64>> {
	if values.is_empty() {
		return Ok(Vec::new());
	}

	let ids = sqlx::query_scalar(
		"\
SELECT code_id
FROM classification_codes
WHERE main_code = ANY($1) OR sub_code = ANY($1)
ORDER BY code_id",
	)
	.bind(values)
	.fetch_all(&db.pool)
	.await?;

	Ok(ids)
}

pub async fn upsert_code(db: &Db, code: &ClassificationCode) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO classification_codes (code_id, main_code, sub_code, name)
VALUES ($1, $2, $3, $4)
ON CONFLICT (code_id) DO UPDATE
SET
	main_code = EXCLUDED.main_code,
	sub_code = EXCLUDED.sub_code,
	name = EXCLUDED.name",
	)
	.bind(code.code_id)
	.bind(code.main_code.as_str())
	.bind(code.sub_code.as_deref())
	.bind(code.name.as_deref())
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Ingestion-side write. Leaves `lifecycle_state` to the classifier.
pub async fn upsert_record(db: &Db, record: &ProcurementRecord) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO procurement_records (
	regime,
	record_id,
	start_date,
	end_date,
	delivery_end_date,
	code_id,
	region_id,
	title,
	initial_price,
	contract_price
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
ON CONFLICT (regime, record_id) DO UPDATE
SET
	start_date = EXCLUDED.start_date,
	end_date = EXCLUDED.end_date,
	delivery_end_date = EXCLUDED.delivery_end_date,
	code_id = EXCLUDED.code_id,
	region_id = EXCLUDED.region_id,
	title = EXCLUDED.title,
	initial_price = EXCLUDED.initial_price,
	contract_price = EXCLUDED.contract_price",
	)
	.bind(record.regime.as_str())
	.bind(record.record_id)
	.bind(record.start_date)
	.bind(record.end_date)
	.bind(record.delivery_end_date)
	.bind(record.code_id)
	.bind(record.region_id)
	.bind(record.title.as_str())
	.bind(record.initial_price)
	.bind(record.contract_price)
	.execute(&db.pool)
	.await?;

	Ok(())
}
