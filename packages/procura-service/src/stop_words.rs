use crate::{Error, ProcuraService, Result};
use procura_domain::StopWords;

impl ProcuraService {
	pub async fn stop_words(&self, user_id: i64) -> Result<StopWords> {
		let words = self.store.get_stop_words(user_id).await?;

		Ok(StopWords::new(words))
	}

	/// Whether any of the user's stop words occurs in `title`, ignoring case.
	pub async fn excludes_title(&self, user_id: i64, title: &str) -> Result<bool> {
		Ok(self.stop_words(user_id).await?.excludes(title))
	}

	/// Adds each non-blank word the user does not already have. Returns how many were inserted.
	pub async fn add_stop_words<I, S>(&self, user_id: i64, words: I) -> Result<u64>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut inserted = 0;

		for word in words {
			let word = word.as_ref().trim();

			if word.is_empty() {
				continue;
			}
			if self.store.insert_stop_word(user_id, word).await? {
				inserted += 1;
			}
		}

		Ok(inserted)
	}

	pub async fn remove_stop_word(&self, user_id: i64, word: &str) -> Result<bool> {
		let word = word.trim();

		if word.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Stop word must not be empty.".to_string(),
			});
		}

		self.store.delete_stop_word(user_id, word).await
	}
}
