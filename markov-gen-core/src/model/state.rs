use rand::Rng;

use serde::{Deserialize, Serialize};

use super::vocabulary::TokenId;

/// Represents a state of the chain.
///
/// A `State` is a window of `order` consecutive tokens (`key`) together with
/// every token observed right after that window.
///
/// Conceptually, this is a node in a Markov chain whose outgoing edges are
/// weighted by how often they were observed. Weights are not stored as
/// counts: the bag keeps one entry per observation, so a uniform draw over
/// the bag is a frequency-weighted draw over distinct next tokens.
///
/// ## Invariants
/// - `key.len()` equals the order of the owning chain
/// - `bag` is never empty once the state is stored in a chain
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct State {
	/// Identifier of the state (`order` token ids).
	key: Box<[TokenId]>,
	/// Observed next tokens, duplicates included, in observation order.
	bag: Vec<TokenId>,
}

impl State {
	/// Creates a state holding its first observed transition.
	pub fn new(key: &[TokenId], next: TokenId) -> Self {
		Self {
			key: key.into(),
			bag: vec![next],
		}
	}

	/// Records one more occurrence of a transition toward `next`.
	pub fn add_transition(&mut self, next: TokenId) {
		self.bag.push(next);
	}

	pub fn key(&self) -> &[TokenId] {
		&self.key
	}

	pub fn bag(&self) -> &[TokenId] {
		&self.bag
	}

	/// Draws the next token uniformly from the bag.
	///
	/// Consumes exactly one draw from `rng`.
	pub fn predict<R: Rng>(&self, rng: &mut R) -> TokenId {
		self.bag[rng.random_range(0..self.bag.len())]
	}
}
