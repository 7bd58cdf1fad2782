pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Store unavailable: {message}")]
	StoreUnavailable { message: String },
	#[error("Invalid filter: {message}")]
	InvalidFilter { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Invalid stored data: {message}")]
	InvalidData { message: String },
}
impl From<procura_storage::Error> for Error {
	fn from(err: procura_storage::Error) -> Self {
		match err {
			procura_storage::Error::Sqlx(inner) =>
				Self::StoreUnavailable { message: inner.to_string() },
			procura_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}
