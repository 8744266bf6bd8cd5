use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::text::TokenizePolicy;

/// Generation settings shared by the binaries.
///
/// Every field has a default, so a settings file only needs the values it
/// overrides:
///
/// ```toml
/// order = 2
/// length = 800
/// policy = "corpus-flat"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	/// Order of the body chain.
	pub order: usize,

	/// Target length of a generated body, in tokens.
	pub length: usize,

	/// Largest length a caller may request.
	pub max_length: usize,

	/// Seed of the first book; book `i` uses `seed + i`.
	pub seed: u64,

	pub policy: TokenizePolicy,

	/// Number of books generated by a batch.
	pub books: usize,

	/// Order of the title and author side-chains.
	pub title_order: usize,
	pub author_order: usize,

	/// Target lengths of synthesized titles and authors.
	pub title_length: usize,
	pub author_length: usize,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			order: 3,
			length: 5000,
			max_length: 1_000_000,
			seed: 0,
			policy: TokenizePolicy::SentenceScoped,
			books: 1,
			title_order: 1,
			author_order: 1,
			title_length: 4,
			author_length: 2,
		}
	}
}

impl Settings {
	/// Reads settings from a TOML file and validates them.
	pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
		let contents = fs::read_to_string(path)?;
		Self::from_toml_str(&contents)
	}

	pub fn from_toml_str(contents: &str) -> Result<Self, ModelError> {
		let settings: Settings = toml::from_str(contents)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Checks that every order and length is positive.
	pub fn validate(&self) -> Result<(), ModelError> {
		for order in [self.order, self.title_order, self.author_order] {
			if order == 0 {
				return Err(ModelError::InvalidOrder(order));
			}
		}
		for length in [self.length, self.title_length, self.author_length] {
			if length == 0 {
				return Err(ModelError::InvalidLength(length));
			}
		}
		self.check_length(self.length)?;
		Ok(())
	}

	/// Rejects lengths above `max_length`.
	pub fn check_length(&self, length: usize) -> Result<usize, ModelError> {
		if length > self.max_length {
			return Err(ModelError::LengthTooLarge { length, max: self.max_length });
		}
		Ok(length)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_valid() {
		let settings = Settings::default();
		assert_eq!(settings.order, 3);
		assert_eq!(settings.policy, TokenizePolicy::SentenceScoped);
		assert!(settings.validate().is_ok());
	}

	#[test]
	fn partial_file_keeps_defaults() {
		let settings = Settings::from_toml_str("order = 2\npolicy = \"corpus-flat\"\nseed = 7\n").unwrap();
		assert_eq!(settings.order, 2);
		assert_eq!(settings.policy, TokenizePolicy::CorpusFlat);
		assert_eq!(settings.seed, 7);
		assert_eq!(settings.length, 5000);
	}

	#[test]
	fn lengths_are_capped() {
		let settings = Settings { max_length: 100, ..Settings::default() };
		assert_eq!(settings.check_length(100).unwrap(), 100);
		assert!(matches!(
			settings.check_length(usize::MAX),
			Err(ModelError::LengthTooLarge { max: 100, .. })
		));
		assert!(matches!(
			Settings::from_toml_str("length = 50\nmax_length = 10"),
			Err(ModelError::LengthTooLarge { length: 50, max: 10 })
		));
	}

	#[test]
	fn rejects_zero_and_unknown_fields() {
		assert!(matches!(Settings::from_toml_str("order = 0"), Err(ModelError::InvalidOrder(0))));
		assert!(matches!(Settings::from_toml_str("title_length = 0"), Err(ModelError::InvalidLength(0))));
		assert!(matches!(Settings::from_toml_str("colour = \"red\""), Err(ModelError::Config(_))));
	}
}
