use log::debug;

use super::chain::Chain;
use crate::error::ModelError;
use crate::text::{clean, tokenizer, TokenizePolicy};

/// Builds chains from raw text with a fixed order and tokenize policy.
///
/// The same builder can be used for any number of corpora: a chain is
/// built from scratch by [`ChainBuilder::build`], or grown unit by unit with
/// [`ChainBuilder::extend`] (one title per call, for example).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainBuilder {
	order: usize,
	policy: TokenizePolicy,
}

impl ChainBuilder {
	/// # Errors
	/// Returns `ModelError::InvalidOrder` if `order` is 0.
	pub fn new(order: usize, policy: TokenizePolicy) -> Result<Self, ModelError> {
		if order == 0 {
			return Err(ModelError::InvalidOrder(order));
		}
		Ok(Self { order, policy })
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn policy(&self) -> TokenizePolicy {
		self.policy
	}

	/// Creates an empty chain matching this builder.
	pub fn empty(&self) -> Chain {
		// Impossible to panic, order was checked in `new`
		Chain::new(self.order, self.policy).unwrap()
	}

	/// Cleans `corpus`, cuts it into units and builds a fresh chain.
	///
	/// A corpus too short for the order yields an empty chain, not an error.
	pub fn build(&self, corpus: &str) -> Chain {
		let mut chain = self.empty();
		self.extend(&mut chain, corpus);
		debug!(
			"built chain: order={} policy={} states={} vocabulary={}",
			self.order,
			self.policy,
			chain.len(),
			chain.stats().vocabulary
		);
		chain
	}

	/// Feeds more text into an existing chain.
	///
	/// Windows never reach back into text given by an earlier call.
	pub fn extend(&self, chain: &mut Chain, corpus: &str) {
		let cleaned = clean(corpus);
		for unit in tokenizer::units(&cleaned, self.policy) {
			chain.add_sentence(&unit);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const STORY: &str = "The cat sat. The dog ran. The cat sat again.";

	#[test]
	fn sentence_scoped_keeps_duplicate_transitions() {
		let chain = ChainBuilder::new(2, TokenizePolicy::SentenceScoped).unwrap().build(STORY);
		assert_eq!(chain.transitions(&["The", "cat"]), Some(vec!["sat.", "sat"]));
		assert_eq!(chain.transitions(&["cat", "sat"]), Some(vec!["again."]));
		assert_eq!(chain.transitions(&["cat", "sat."]), None);
	}

	#[test]
	fn corpus_flat_crosses_sentences() {
		let chain = ChainBuilder::new(2, TokenizePolicy::CorpusFlat).unwrap().build(STORY);
		assert_eq!(chain.transitions(&["cat", "sat."]), Some(vec!["The"]));
		assert_eq!(chain.transitions(&["sat.", "The"]), Some(vec!["dog"]));
	}

	#[test]
	fn duplicate_sentences_weigh_twice() {
		let chain = ChainBuilder::new(2, TokenizePolicy::SentenceScoped)
			.unwrap()
			.build("The cat sat. The dog ran. The cat sat.");
		assert_eq!(chain.transitions(&["The", "cat"]), Some(vec!["sat.", "sat."]));
	}

	#[test]
	fn too_short_corpus_is_an_empty_chain() {
		let builder = ChainBuilder::new(3, TokenizePolicy::SentenceScoped).unwrap();
		assert!(builder.build("Hi.").is_empty());
		assert!(builder.build("").is_empty());
		assert!(builder.build("1984, 2001 --").is_empty());
	}

	#[test]
	fn extend_does_not_bridge_calls() {
		let builder = ChainBuilder::new(1, TokenizePolicy::CorpusFlat).unwrap();
		let mut chain = builder.empty();
		builder.extend(&mut chain, "War and Peace");
		builder.extend(&mut chain, "Pride and Prejudice");
		assert_eq!(chain.transitions(&["and"]), Some(vec!["Peace", "Prejudice"]));
		assert_eq!(chain.transitions(&["Peace"]), None);
	}

	#[test]
	fn every_key_has_the_order_width() {
		for order in 1..=4 {
			let chain = ChainBuilder::new(order, TokenizePolicy::CorpusFlat).unwrap().build(STORY);
			assert!(chain.keys().all(|key| key.len() == order));
		}
	}
}
