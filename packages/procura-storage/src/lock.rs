use sqlx::{Postgres, pool::PoolConnection};

use crate::{Result, db::Db};

/// A session-level advisory lock pinned to one pooled connection.
///
/// Dropping the guard without [`AdvisoryLock::release`] detaches and closes the connection,
/// which makes Postgres drop the lock with the session.
pub struct AdvisoryLock {
	lock_id: i64,
	conn: Option<PoolConnection<Postgres>>,
}
impl AdvisoryLock {
	/// Returns `None` when another session holds `lock_id`.
	pub async fn try_acquire(db: &Db, lock_id: i64) -> Result<Option<Self>> {
		let mut conn = db.pool.acquire().await?;
		let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_lock($1)")
			.bind(lock_id)
			.fetch_one(&mut *conn)
			.await?;

		if !acquired {
			return Ok(None);
		}

		Ok(Some(Self { lock_id, conn: Some(conn) }))
	}

	pub fn lock_id(&self) -> i64 {
		self.lock_id
	}

	/// Returns whether Postgres reported the lock as held by this session.
	pub async fn release(mut self) -> Result<bool> {
		let Some(mut conn) = self.conn.take() else {
			return Ok(false);
		};
		let result: std::result::Result<bool, sqlx::Error> =
			sqlx::query_scalar("SELECT pg_advisory_unlock($1)")
				.bind(self.lock_id)
				.fetch_one(&mut *conn)
				.await;

		match result {
			Ok(released) => Ok(released),
			Err(err) => {
				drop(conn.detach());

				Err(err.into())
			},
		}
	}
}
impl Drop for AdvisoryLock {
	fn drop(&mut self) {
		if let Some(conn) = self.conn.take() {
			tracing::warn!(lock_id = self.lock_id, "Advisory lock dropped without release.");

			drop(conn.detach());
		}
	}
}
