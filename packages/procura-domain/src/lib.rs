pub mod eligibility;
pub mod lifecycle;
pub mod ranking;
pub mod record;

pub use eligibility::{
	CategorySet, Eligibility, EligibilityCandidate, EligibilityPredicate, Exclusion, InterestFlag,
	StateSet, StopWords,
};
pub use lifecycle::{
	LifecycleState, LifecycleWindows, ParseStateError, StateCounts, TemporalFields, Thresholds,
	classify,
};
pub use ranking::{RelevanceKey, dedupe_and_order, paginate};
pub use record::{ParseRegimeError, RecordKey, Regime};
