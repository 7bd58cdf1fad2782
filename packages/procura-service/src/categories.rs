use crate::{Error, ProcuraService, Result};
use procura_domain::CategorySet;

impl ProcuraService {
	/// Resolves a user's bindings into classification-code ids.
	///
	/// A binding matches a code when its value equals either the main or the sub code, so a
	/// binding to `"26.20"` reaches codes filed under any main code with that sub code.
	pub async fn category_codes(
		&self,
		user_id: i64,
		category_id: Option<i64>,
	) -> Result<CategorySet> {
		if let Some(category_id) = category_id {
			self.require_category(user_id, category_id).await?;
		}

		let bindings = self.store.get_user_bindings(user_id, category_id).await?;

		if bindings.is_empty() {
			return Ok(CategorySet::default());
		}

		let mut values = bindings.into_iter().map(|binding| binding.code).collect::<Vec<_>>();

		values.sort();
		values.dedup();

		let code_ids = self.store.find_code_ids(&values).await?;

		tracing::debug!(
			user_id,
			?category_id,
			bindings = values.len(),
			codes = code_ids.len(),
			"Resolved category codes."
		);

		Ok(CategorySet::new(code_ids))
	}

	pub(crate) async fn require_category(&self, user_id: i64, category_id: i64) -> Result<()> {
		if self.store.get_category(user_id, category_id).await?.is_none() {
			return Err(Error::InvalidFilter {
				message: format!("Category {category_id} does not belong to user {user_id}."),
			});
		}

		Ok(())
	}
}
