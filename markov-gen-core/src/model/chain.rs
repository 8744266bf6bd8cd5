use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::state::State;
use super::vocabulary::{TokenId, Vocabulary};
use crate::error::ModelError;
use crate::text::TokenizePolicy;

/// Fixed-order word-level Markov chain.
///
/// The `Chain` maps every window of `order` tokens seen in the corpus to the
/// bag of tokens that followed it.
///
/// # Responsibilities
/// - Intern tokens and accumulate transitions unit by unit
/// - Look up the bag of a state
/// - Enumerate states in a stable order (first insertion)
/// - Persist itself to a compact binary cache
///
/// # Invariants
/// - `order` is always >= 1
/// - Every stored state has a key of exactly `order` tokens and a
///   non-empty bag
/// - `index[key]` is the position of that state in `states`
/// - Every token id in a key or a bag belongs to `vocabulary`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Chain {
	/// Number of tokens in a state.
	order: usize,

	/// Policy the units were cut with, kept so a cached chain can be checked.
	policy: TokenizePolicy,

	/// Free-form description of the corpus the chain was built from.
	source: Option<String>,

	vocabulary: Vocabulary,

	/// States in first-insertion order.
	states: Vec<State>,

	/// Key lookup into `states`.
	index: HashMap<Box<[TokenId]>, usize>,
}

/// Summary numbers describing a chain.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainStats {
	pub order: usize,
	pub policy: TokenizePolicy,
	/// Distinct states (keys).
	pub states: usize,
	/// Observed transitions, duplicates included.
	pub transitions: usize,
	/// Distinct tokens seen in states or bags.
	pub vocabulary: usize,
}

impl Chain {
	/// Creates an empty chain of the given order.
	///
	/// # Errors
	/// Returns `ModelError::InvalidOrder` if `order` is 0.
	pub fn new(order: usize, policy: TokenizePolicy) -> Result<Self, ModelError> {
		if order == 0 {
			return Err(ModelError::InvalidOrder(order));
		}
		Ok(Self {
			order,
			policy,
			source: None,
			vocabulary: Vocabulary::default(),
			states: Vec::new(),
			index: HashMap::new(),
		})
	}

	/// Adds one unit (a sentence, or the whole corpus) to the chain.
	///
	/// For every window of `order + 1` tokens, the first `order` tokens form
	/// the state and the last one is appended to its bag.
	///
	/// # Notes
	/// - Units with `order` tokens or fewer contribute nothing.
	/// - Windows never span two calls, so a unit boundary is never crossed.
	pub fn add_sentence(&mut self, tokens: &[&str]) {
		if tokens.len() <= self.order {
			return;
		}

		let ids: Vec<TokenId> = tokens.iter().map(|t| self.vocabulary.intern(t)).collect();
		for window in ids.windows(self.order + 1) {
			let (key, next) = window.split_at(self.order);
			self.add_transition(key, next[0]);
		}
	}

	fn add_transition(&mut self, key: &[TokenId], next: TokenId) {
		match self.index.get(key) {
			Some(&position) => self.states[position].add_transition(next),
			None => {
				self.index.insert(key.into(), self.states.len());
				self.states.push(State::new(key, next));
			}
		}
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn policy(&self) -> TokenizePolicy {
		self.policy
	}

	pub fn source(&self) -> Option<&str> {
		self.source.as_deref()
	}

	pub fn set_source(&mut self, source: impl Into<String>) {
		self.source = Some(source.into());
	}

	/// Number of distinct states.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Returns the state stored at `position` in insertion order.
	pub(crate) fn state_at(&self, position: usize) -> &State {
		&self.states[position]
	}

	/// Returns the bag of `key`, or `None` when the window was never observed.
	pub(crate) fn bag(&self, key: &[TokenId]) -> Option<&State> {
		self.index.get(key).map(|&position| &self.states[position])
	}

	pub(crate) fn token(&self, id: TokenId) -> &str {
		self.vocabulary.token(id)
	}

	/// Returns every token observed after the given window, duplicates and
	/// observation order preserved.
	pub fn transitions(&self, key: &[&str]) -> Option<Vec<&str>> {
		if key.len() != self.order {
			return None;
		}
		let ids = key
			.iter()
			.map(|t| self.vocabulary.id(t))
			.collect::<Option<Vec<_>>>()?;
		let state = self.bag(&ids)?;
		Some(state.bag().iter().map(|&id| self.token(id)).collect())
	}

	/// Iterates over all state keys, in insertion order.
	pub fn keys(&self) -> impl Iterator<Item = Vec<&str>> {
		self.states
			.iter()
			.map(|state| state.key().iter().map(|&id| self.token(id)).collect())
	}

	pub fn stats(&self) -> ChainStats {
		ChainStats {
			order: self.order,
			policy: self.policy,
			states: self.states.len(),
			transitions: self.states.iter().map(|s| s.bag().len()).sum(),
			vocabulary: self.vocabulary.len(),
		}
	}

	/// Writes the chain to `path` using `postcard`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
		let bytes = postcard::to_stdvec(self)?;
		fs::write(path, bytes)?;
		Ok(())
	}

	/// Reads a chain previously written by [`Chain::save`].
	///
	/// # Errors
	/// - `ModelError::Serialization` if the bytes are not a chain
	/// - `ModelError::InvalidCache` if they decode to a chain breaking one of
	///   the invariants above
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
		let bytes = fs::read(path)?;
		let chain: Chain = postcard::from_bytes(&bytes)?;
		chain.check()?;
		Ok(chain)
	}

	fn check(&self) -> Result<(), ModelError> {
		if self.order == 0 {
			return Err(ModelError::InvalidCache("order is 0"));
		}
		if !self.vocabulary.is_consistent() {
			return Err(ModelError::InvalidCache("vocabulary ids do not match its tokens"));
		}
		if self.index.len() != self.states.len() {
			return Err(ModelError::InvalidCache("index and states differ in size"));
		}

		let known = |id: &TokenId| (*id as usize) < self.vocabulary.len();
		for (position, state) in self.states.iter().enumerate() {
			if state.key().len() != self.order {
				return Err(ModelError::InvalidCache("state key does not match the order"));
			}
			if state.bag().is_empty() {
				return Err(ModelError::InvalidCache("state has an empty bag"));
			}
			if !state.key().iter().chain(state.bag()).all(known) {
				return Err(ModelError::InvalidCache("token id outside the vocabulary"));
			}
			if self.index.get(state.key()) != Some(&position) {
				return Err(ModelError::InvalidCache("index does not point at its state"));
			}
		}
		Ok(())
	}
}
