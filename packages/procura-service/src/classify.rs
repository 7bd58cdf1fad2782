//! Batch lifecycle classification.

use serde::Serialize;
use time::Date;

use crate::{ProcuraService, Result, models::RecordFilter};
use procura_domain::{LifecycleWindows, RecordKey, Regime, StateCounts, classify};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegimeReport {
	pub regime: Regime,
	pub scanned: u64,
	/// States the rules produced, including records that already carried them.
	pub assigned: StateCounts,
	/// Subset of `assigned` that actually changed in the store.
	pub updated: StateCounts,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClassifyReport {
	pub regimes: Vec<RegimeReport>,
}
impl RegimeReport {
	pub fn new(regime: Regime) -> Self {
		Self {
			regime,
			scanned: 0,
			assigned: StateCounts::default(),
			updated: StateCounts::default(),
		}
	}
}

impl ClassifyReport {
	pub fn assigned(&self) -> StateCounts {
		self.regimes.iter().fold(StateCounts::default(), |mut acc, report| {
			acc.merge(&report.assigned);

			acc
		})
	}

	pub fn updated(&self) -> StateCounts {
		self.regimes.iter().fold(StateCounts::default(), |mut acc, report| {
			acc.merge(&report.updated);

			acc
		})
	}

	pub fn scanned(&self) -> u64 {
		self.regimes.iter().map(|report| report.scanned).sum()
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClassifyOutcome {
	Completed(ClassifyReport),
	/// Another run held the classifier lock.
	Skipped,
}

impl ProcuraService {
	/// Reclassifies every record in every regime against `today`.
	///
	/// Runs are serialized through the store's run lock; a concurrent call returns
	/// [`ClassifyOutcome::Skipped`] without touching any record.
	pub async fn classify_all(&self, today: Date) -> Result<ClassifyOutcome> {
		self.classify_regimes(&Regime::ALL, today).await
	}

	/// Same as [`ProcuraService::classify_all`], limited to one regime.
	pub async fn classify_regime(&self, regime: Regime, today: Date) -> Result<ClassifyOutcome> {
		self.classify_regimes(&[regime], today).await
	}

	async fn classify_regimes(&self, regimes: &[Regime], today: Date) -> Result<ClassifyOutcome> {
		// Held by this frame only, so a cancelled run drops and frees it.
		let Some(lock) = self.store.try_acquire_run_lock().await? else {
			tracing::warn!(%today, "Classification already running. Skipping.");

			return Ok(ClassifyOutcome::Skipped);
		};
		let result = self.run_locked(regimes, today).await;
		let released = lock.release().await;
		let report = result?;

		released?;

		Ok(ClassifyOutcome::Completed(report))
	}

	async fn run_locked(&self, regimes: &[Regime], today: Date) -> Result<ClassifyReport> {
		let thresholds = LifecycleWindows::from_config(&self.cfg.lifecycle).resolve(today);
		let batch = self.cfg.lifecycle.scan_batch_size.max(1);
		let mut report = ClassifyReport::default();

		for &regime in regimes {
			let mut regime_report = RegimeReport::new(regime);
			let mut after: Option<RecordKey> = None;

			loop {
				let filter = RecordFilter {
					regime: Some(regime),
					states: None,
					region_id: None,
					code_ids: None,
					after,
					limit: batch,
				};
				let records = self.store.scan_records(&filter).await?;

				for record in &records {
					let state = classify(&record.temporal(), &thresholds);

					regime_report.scanned += 1;
					regime_report.assigned.add(state, 1);

					if record.lifecycle_state == Some(state) {
						continue;
					}
					if self.store.update_lifecycle_state(record.key, state).await? {
						regime_report.updated.add(state, 1);
					}
				}

				let Some(last) = records.last() else {
					break;
				};

				if records.len() < batch as usize {
					break;
				}

				after = Some(last.key);
			}

			tracing::info!(
				regime = %regime,
				scanned = regime_report.scanned,
				new = regime_report.assigned.new,
				under_review = regime_report.assigned.under_review,
				awarded = regime_report.assigned.awarded,
				rejected = regime_report.assigned.rejected,
				updated = regime_report.updated.total(),
				"Lifecycle classification finished for regime."
			);

			report.regimes.push(regime_report);
		}

		Ok(report)
	}
}
