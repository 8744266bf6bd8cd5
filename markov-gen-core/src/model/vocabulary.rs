use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Interned token identifier.
pub type TokenId = u32;

/// Two-way mapping between tokens and their identifiers.
///
/// Identifiers are handed out in first-seen order, so building the same
/// corpus twice always yields the same ids.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Vocabulary {
	tokens: Vec<String>,
	ids: HashMap<String, TokenId>,
}

impl Vocabulary {
	/// Returns the id of `token`, interning it if unseen.
	pub fn intern(&mut self, token: &str) -> TokenId {
		if let Some(id) = self.ids.get(token) {
			return *id;
		}
		let id = self.tokens.len() as TokenId;
		self.tokens.push(token.to_owned());
		self.ids.insert(token.to_owned(), id);
		id
	}

	/// Looks up an already interned token.
	pub fn id(&self, token: &str) -> Option<TokenId> {
		self.ids.get(token).copied()
	}

	/// Resolves an id back to its token.
	///
	/// Ids only come from `intern` (or a cache checked by `Chain::load`),
	/// hence they are always in range.
	pub fn token(&self, id: TokenId) -> &str {
		&self.tokens[id as usize]
	}

	/// Both directions of the mapping agree.
	pub(crate) fn is_consistent(&self) -> bool {
		self.tokens.len() == self.ids.len()
			&& self
				.tokens
				.iter()
				.enumerate()
				.all(|(position, token)| self.ids.get(token).is_some_and(|&id| id as usize == position))
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}
