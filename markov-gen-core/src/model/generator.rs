use log::trace;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::chain::Chain;
use super::vocabulary::TokenId;
use crate::error::GenerateError;
use crate::text::normalize;

/// Upper bound of the up-front token buffer; longer outputs grow on demand.
const PREALLOCATED: usize = 4096;

/// Seeded sequence generator over a borrowed chain.
///
/// # Responsibilities
/// - Pick a random starting state
/// - Walk the chain, drawing each next token from the current state's bag
/// - Restart from a fresh random state on dead ends
///
/// The generator never mutates the chain and every call owns its random
/// source, so one chain can serve any number of generators on any number of
/// threads at once.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
	chain: &'a Chain,
}

/// Tokens produced by one [`Generator::generate`] call, borrowed from the
/// chain's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSequence<'a> {
	tokens: Vec<&'a str>,
}

impl<'a> GeneratedSequence<'a> {
	pub fn tokens(&self) -> &[&'a str] {
		&self.tokens
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Joins the tokens with single spaces, without any normalization.
	pub fn join(&self) -> String {
		self.tokens.join(" ")
	}

	/// Joins the tokens and runs the normalizer over the result.
	pub fn to_text(&self) -> String {
		normalize(&self.join())
	}
}

impl<'a> Generator<'a> {
	pub fn new(chain: &'a Chain) -> Self {
		Self { chain }
	}

	/// Appends the key of a uniformly drawn state to `out`.
	///
	/// States are enumerated in insertion order, which does not depend on
	/// the seed nor on hashing, so the same draw always lands on the same
	/// state.
	fn restart(&self, rng: &mut ChaCha8Rng, out: &mut Vec<TokenId>) {
		let position = rng.random_range(0..self.chain.len());
		out.extend_from_slice(self.chain.state_at(position).key());
	}

	/// Generates at least `length` tokens from `seed`.
	///
	/// # Behavior
	/// - Starts from a random state (its `order` tokens are the first output)
	/// - While fewer than `length` tokens were produced, looks up the last
	///   `order` tokens: a known state yields one more token drawn from its
	///   bag, an unknown one triggers a restart from a new random state
	/// - A restart appends a whole state, so the result may exceed `length`
	///   by up to `order - 1` tokens. Output length is always in
	///   `length..length + order`.
	///
	/// # Errors
	/// - `GenerateError::EmptyModel` if the chain has no states
	/// - `GenerateError::ZeroLength` if `length` is 0
	///
	/// # Notes
	/// The result depends only on the chain, `seed` and `length`.
	pub fn generate(&self, seed: u64, length: usize) -> Result<GeneratedSequence<'a>, GenerateError> {
		if self.chain.is_empty() {
			return Err(GenerateError::EmptyModel);
		}
		if length == 0 {
			return Err(GenerateError::ZeroLength);
		}

		let order = self.chain.order();
		let mut rng = ChaCha8Rng::seed_from_u64(seed);
		let mut ids: Vec<TokenId> = Vec::with_capacity(length.min(PREALLOCATED).saturating_add(order));
		let mut restarts = 0usize;

		self.restart(&mut rng, &mut ids);
		while ids.len() < length {
			let current = &ids[ids.len() - order..];
			match self.chain.bag(current) {
				Some(state) => {
					let next = state.predict(&mut rng);
					ids.push(next);
				}
				None => {
					restarts += 1;
					self.restart(&mut rng, &mut ids);
				}
			}
		}
		trace!("seed {seed}: {} tokens, {restarts} restarts", ids.len());

		let chain: &'a Chain = self.chain;
		Ok(GeneratedSequence {
			tokens: ids.iter().map(|&id| chain.token(id)).collect(),
		})
	}
}
