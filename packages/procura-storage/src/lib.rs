pub mod db;
pub mod lock;
pub mod models;
pub mod overrides;
pub mod preferences;
pub mod queries;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
