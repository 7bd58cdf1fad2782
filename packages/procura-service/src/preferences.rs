use crate::{Category, Error, InterestBinding, ProcuraService, Result};

impl ProcuraService {
	pub async fn create_category(&self, user_id: i64, name: &str) -> Result<Category> {
		let name = name.trim();

		if name.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Category name must not be empty.".to_string(),
			});
		}

		self.store.create_category(user_id, name).await
	}

	/// Deletes the category. Its bindings stay, with the category cleared.
	pub async fn delete_category(&self, user_id: i64, category_id: i64) -> Result<()> {
		if !self.store.delete_category(user_id, category_id).await? {
			return Err(Error::NotFound { message: format!("Category {category_id} not found.") });
		}

		Ok(())
	}

	/// Binds `code` to the user. Binding the same code again only moves it between categories.
	pub async fn bind_code(
		&self,
		user_id: i64,
		code: &str,
		category_id: Option<i64>,
	) -> Result<InterestBinding> {
		let code = code.trim();

		if code.is_empty() {
			return Err(Error::InvalidRequest { message: "Code must not be empty.".to_string() });
		}
		if let Some(category_id) = category_id {
			self.require_category(user_id, category_id).await.map_err(|err| match err {
				Error::InvalidFilter { message } => Error::InvalidRequest { message },
				other => other,
			})?;
		}

		self.store.upsert_binding(user_id, code, category_id).await
	}

	pub async fn unbind_code(&self, user_id: i64, code: &str) -> Result<bool> {
		self.store.delete_binding(user_id, code.trim()).await
	}
}
