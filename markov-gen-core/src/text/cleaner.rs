use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
	/// Anything that is not an ASCII letter, whitespace or a sentence terminal.
	static ref FORBIDDEN: Regex = Regex::new(r"[^A-Za-z\s.!?]").unwrap();
	static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Corpus text reduced to letters, single spaces and `.`, `!`, `?`.
///
/// The only way to obtain one is [`clean`], so every `CleanedText` upholds
/// the alphabet restriction: no leading or trailing whitespace, and words
/// separated by exactly one space.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CleanedText(String);

impl CleanedText {
	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the whitespace-separated tokens.
	pub fn tokens(&self) -> impl Iterator<Item = &str> {
		self.0.split(' ').filter(|t| !t.is_empty())
	}
}

/// Normalizes raw corpus text.
///
/// - Every character outside the alphabet becomes a space
/// - Runs of whitespace collapse to a single space
/// - Leading and trailing whitespace is removed
///
/// Punctuation stays glued to the word before it, so `"sat."` survives as a
/// single token.
pub fn clean(raw: &str) -> CleanedText {
	let replaced = FORBIDDEN.replace_all(raw, " ");
	let collapsed = WHITESPACE_RUN.replace_all(&replaced, " ");
	CleanedText(collapsed.trim().to_owned())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_input_stays_empty() {
		assert!(clean("").is_empty());
		assert!(clean("  \n\t ").is_empty());
		assert!(clean("1234 ,;:").is_empty());
	}

	#[test]
	fn keeps_letters_and_sentence_terminals() {
		let cleaned = clean("Hello, world! Is it 9 o'clock?\n\nYes.");
		assert_eq!(cleaned.as_str(), "Hello world! Is it o clock? Yes.");
	}

	#[test]
	fn punctuation_is_never_split_from_its_word() {
		let cleaned = clean("The cat sat.  The dog ran!");
		let tokens: Vec<&str> = cleaned.tokens().collect();
		assert_eq!(tokens, vec!["The", "cat", "sat.", "The", "dog", "ran!"]);
	}

	#[test]
	fn non_ascii_letters_become_separators() {
		assert_eq!(clean("café au lait").as_str(), "caf au lait");
	}
}
