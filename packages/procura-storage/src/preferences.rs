use crate::{
	Result,
	db::Db,
	models::{UserCategory, UserInterestBinding},
};

pub async fn get_user_bindings(
	db: &Db,
	user_id: i64,
	category_id: Option<i64>,
) -> Result<Vec<UserInterestBinding>> {
	let bindings = sqlx::query_as(
		"\
SELECT binding_id, user_id, code, category_id, created_at
FROM user_interest_bindings
WHERE user_id = $1
	AND ($2::bigint IS NULL OR category_id = $2)
ORDER BY code",
	)
	.bind(user_id)
	.bind(category_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(bindings)
}

/// Binds `code` to the user, moving an existing binding to `category_id`.
pub async fn upsert_binding(
	db: &Db,
	user_id: i64,
	code: &str,
	category_id: Option<i64>,
) -> Result<UserInterestBinding> {
	let binding = sqlx::query_as(
		"\
INSERT INTO user_interest_bindings (user_id, code, category_id)
VALUES ($1, $2, $3)
ON CONFLICT (user_id, code) DO UPDATE
SET category_id = EXCLUDED.category_id
RETURNING binding_id, user_id, code, category_id, created_at",
	)
	.bind(user_id)
	.bind(code)
	.bind(category_id)
	.fetch_one(&db.pool)
	.await?;

	Ok(binding)
}

pub async fn delete_binding(db: &Db, user_id: i64, code: &str) -> Result<bool> {
	let result = sqlx::query("DELETE FROM user_interest_bindings WHERE user_id = $1 AND code = $2")
		.bind(user_id)
		.bind(code)
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn create_category(db: &Db, user_id: i64, name: &str) -> Result<UserCategory> {
	let category = sqlx::query_as(
		"\
INSERT INTO user_categories (user_id, name)
VALUES ($1, $2)
RETURNING category_id, user_id, name, created_at",
	)
	.bind(user_id)
	.bind(name)
	.fetch_one(&db.pool)
	.await?;

	Ok(category)
}

pub async fn get_category(
	db: &Db,
	user_id: i64,
	category_id: i64,
) -> Result<Option<UserCategory>> {
	let category = sqlx::query_as(
		"\
SELECT category_id, user_id, name, created_at
FROM user_categories
WHERE user_id = $1 AND category_id = $2",
	)
	.bind(user_id)
	.bind(category_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(category)
}

/// Bindings in the category fall back to no category through the foreign key.
pub async fn delete_category(db: &Db, user_id: i64, category_id: i64) -> Result<bool> {
	let result =
		sqlx::query("DELETE FROM user_categories WHERE user_id = $1 AND category_id = $2")
			.bind(user_id)
			.bind(category_id)
			.execute(&db.pool)
			.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn get_stop_words(db: &Db, user_id: i64) -> Result<Vec<String>> {
	let words =
		sqlx::query_scalar("SELECT word FROM user_stop_words WHERE user_id = $1 ORDER BY word")
			.bind(user_id)
			.fetch_all(&db.pool)
			.await?;

	Ok(words)
}

/// Case-folding key for stop words. Matches the folding used when filtering titles.
pub fn stop_word_key(word: &str) -> String {
	word.trim().to_lowercase()
}

/// Returns `false` when the user already has the word in any letter case.
pub async fn insert_stop_word(db: &Db, user_id: i64, word: &str) -> Result<bool> {
	let result = sqlx::query(
		"\
INSERT INTO user_stop_words (user_id, word, word_key)
VALUES ($1, $2, $3)
ON CONFLICT (user_id, word_key) DO NOTHING",
	)
	.bind(user_id)
	.bind(word)
	.bind(stop_word_key(word))
	.execute(&db.pool)
	.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn delete_stop_word(db: &Db, user_id: i64, word: &str) -> Result<bool> {
	let result = sqlx::query("DELETE FROM user_stop_words WHERE user_id = $1 AND word_key = $2")
		.bind(user_id)
		.bind(stop_word_key(word))
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected() > 0)
}
