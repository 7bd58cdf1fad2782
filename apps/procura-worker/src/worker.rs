use std::time::Duration;

use color_eyre::Result;
use time::{Date, OffsetDateTime};
use tokio::time as tokio_time;

use procura_service::{ClassifyOutcome, ProcuraService};

#[derive(Clone, Copy, Debug)]
pub struct Schedule {
	pub once: bool,
	/// Fixed classification date. `None` uses the UTC date at the start of each run.
	pub today: Option<Date>,
	pub interval_seconds: u64,
}

pub async fn run_worker(service: &ProcuraService, schedule: Schedule) -> Result<()> {
	if schedule.once {
		run_once(service, schedule.today).await?;

		return Ok(());
	}

	let mut ticker = tokio_time::interval(Duration::from_secs(schedule.interval_seconds.max(1)));

	ticker.set_missed_tick_behavior(tokio_time::MissedTickBehavior::Delay);

	loop {
		ticker.tick().await;

		if let Err(err) = run_once(service, schedule.today).await {
			tracing::error!(error = %err, "Lifecycle classification failed.");
		}
	}
}

async fn run_once(service: &ProcuraService, today: Option<Date>) -> Result<ClassifyOutcome> {
	let today = today.unwrap_or_else(|| OffsetDateTime::now_utc().date());
	let outcome = service.classify_all(today).await?;

	match &outcome {
		ClassifyOutcome::Completed(report) => {
			let updated = report.updated();

			tracing::info!(
				%today,
				scanned = report.scanned(),
				new = updated.new,
				under_review = updated.under_review,
				awarded = updated.awarded,
				rejected = updated.rejected,
				"Lifecycle classification run completed."
			);
		},
		ClassifyOutcome::Skipped => {
			tracing::debug!(%today, "Waiting for the next tick.");
		},
	}

	Ok(outcome)
}
