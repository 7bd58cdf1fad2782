mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Lifecycle, Overrides, Postgres, Relevance, Service, Storage};

use std::{fs, path::Path};

/// Upper bound for the lifecycle windows, roughly a century.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	for (key, days) in [
		("awarded_delivery_days", cfg.lifecycle.awarded_delivery_days),
		("review_window_days", cfg.lifecycle.review_window_days),
	] {
		if days <= 0 {
			return Err(Error::Validation {
				message: format!("lifecycle.{key} must be greater than zero."),
			});
		}
		if days > MAX_WINDOW_DAYS {
			return Err(Error::Validation {
				message: format!("lifecycle.{key} must be at most {MAX_WINDOW_DAYS}."),
			});
		}
	}
	if cfg.lifecycle.scan_batch_size == 0 {
		return Err(Error::Validation {
			message: "lifecycle.scan_batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.lifecycle.run_interval_seconds == 0 {
		return Err(Error::Validation {
			message: "lifecycle.run_interval_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.relevance.default_page_size == 0 {
		return Err(Error::Validation {
			message: "relevance.default_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.relevance.max_page_size < cfg.relevance.default_page_size {
		return Err(Error::Validation {
			message: "relevance.max_page_size must be at least relevance.default_page_size."
				.to_string(),
		});
	}
	if cfg.relevance.scan_batch_size == 0 {
		return Err(Error::Validation {
			message: "relevance.scan_batch_size must be greater than zero.".to_string(),
		});
	}

	let threshold = cfg.overrides.interesting_threshold_percent;

	if !threshold.is_finite() {
		return Err(Error::Validation {
			message: "overrides.interesting_threshold_percent must be a finite number.".to_string(),
		});
	}
	if !(0.0..=100.0).contains(&threshold) {
		return Err(Error::Validation {
			message: "overrides.interesting_threshold_percent must be in the range 0.0-100.0."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let level = cfg.service.log_level.trim();

	cfg.service.log_level = if level.is_empty() { "info".to_string() } else { level.to_string() };
}
