//! The relevance eligibility predicate.
//!
//! Each signal is a standalone type with its own check so it can be exercised in isolation;
//! [`EligibilityPredicate`] only composes them in a fixed order.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::lifecycle::LifecycleState;

/// Classification-code ids a user is interested in.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CategorySet {
	code_ids: HashSet<i64>,
}
impl CategorySet {
	pub fn new(code_ids: impl IntoIterator<Item = i64>) -> Self {
		Self { code_ids: code_ids.into_iter().collect() }
	}

	pub fn contains(&self, code_id: Option<i64>) -> bool {
		code_id.is_some_and(|id| self.code_ids.contains(&id))
	}

	pub fn is_empty(&self) -> bool {
		self.code_ids.is_empty()
	}

	pub fn len(&self) -> usize {
		self.code_ids.len()
	}

	/// Ids in ascending order, for building store filters.
	pub fn to_sorted_vec(&self) -> Vec<i64> {
		let mut ids = self.code_ids.iter().copied().collect::<Vec<_>>();

		ids.sort_unstable();

		ids
	}
}

/// A user's banned title substrings, lower-cased once on construction.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StopWords {
	words: Vec<String>,
}
impl StopWords {
	pub fn new<I, S>(words: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut words = words
			.into_iter()
			.map(|word| word.as_ref().trim().to_lowercase())
			.filter(|word| !word.is_empty())
			.collect::<Vec<_>>();

		words.sort();
		words.dedup();

		Self { words }
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	/// Returns the first stop word found in `title`, if any.
	pub fn matched<'a>(&'a self, title: &str) -> Option<&'a str> {
		if self.words.is_empty() {
			return None;
		}

		let title = title.to_lowercase();

		self.words.iter().find(|word| title.contains(word.as_str())).map(String::as_str)
	}

	pub fn excludes(&self, title: &str) -> bool {
		self.matched(title).is_some()
	}
}

/// Tri-state interest flag written by document matching or by a person.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestFlag {
	#[default]
	Unset,
	Interesting,
	NotInteresting,
}
impl InterestFlag {
	pub fn vetoes(self) -> bool {
		matches!(self, Self::NotInteresting)
	}

	pub fn as_bool(self) -> Option<bool> {
		match self {
			Self::Unset => None,
			Self::Interesting => Some(true),
			Self::NotInteresting => Some(false),
		}
	}
}
impl From<Option<bool>> for InterestFlag {
	fn from(value: Option<bool>) -> Self {
		match value {
			None => Self::Unset,
			Some(true) => Self::Interesting,
			Some(false) => Self::NotInteresting,
		}
	}
}

/// Non-empty set of lifecycle states a caller asks for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateSet {
	states: BTreeSet<LifecycleState>,
}
impl StateSet {
	/// Returns `None` when `states` is empty.
	pub fn new(states: impl IntoIterator<Item = LifecycleState>) -> Option<Self> {
		let states = states.into_iter().collect::<BTreeSet<_>>();

		if states.is_empty() { None } else { Some(Self { states }) }
	}

	pub fn only(state: LifecycleState) -> Self {
		Self { states: BTreeSet::from([state]) }
	}

	/// `New` plus `UnderReview`.
	pub fn active() -> Self {
		Self { states: BTreeSet::from([LifecycleState::New, LifecycleState::UnderReview]) }
	}

	pub fn contains(&self, state: Option<LifecycleState>) -> bool {
		state.is_some_and(|state| self.states.contains(&state))
	}

	pub fn iter(&self) -> impl Iterator<Item = LifecycleState> + '_ {
		self.states.iter().copied()
	}
}

/// The per-record view the predicate needs.
#[derive(Clone, Copy, Debug)]
pub struct EligibilityCandidate<'a> {
	pub state: Option<LifecycleState>,
	pub code_id: Option<i64>,
	pub title: &'a str,
	pub flag: InterestFlag,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Exclusion {
	State,
	Category,
	StopWord { word: String },
	Veto,
}
impl Exclusion {
	pub fn reason(&self) -> &'static str {
		match self {
			Self::State => "state.not_requested",
			Self::Category => "category.no_match",
			Self::StopWord { .. } => "stop_word.matched",
			Self::Veto => "override.not_interesting",
		}
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Eligibility {
	Eligible,
	Excluded(Exclusion),
}
impl Eligibility {
	pub fn is_eligible(&self) -> bool {
		matches!(self, Self::Eligible)
	}
}

#[derive(Clone, Debug)]
pub struct EligibilityPredicate {
	pub states: StateSet,
	pub categories: CategorySet,
	pub stop_words: StopWords,
}
impl EligibilityPredicate {
	pub fn evaluate(&self, candidate: &EligibilityCandidate<'_>) -> Eligibility {
		if !self.states.contains(candidate.state) {
			return Eligibility::Excluded(Exclusion::State);
		}
		if !self.categories.contains(candidate.code_id) {
			return Eligibility::Excluded(Exclusion::Category);
		}
		if let Some(word) = self.stop_words.matched(candidate.title) {
			return Eligibility::Excluded(Exclusion::StopWord { word: word.to_string() });
		}
		if candidate.flag.vetoes() {
			return Eligibility::Excluded(Exclusion::Veto);
		}

		Eligibility::Eligible
	}
}
