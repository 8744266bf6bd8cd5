use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cleaner::CleanedText;

/// How cleaned text is cut into units before windows are taken.
///
/// # Variants
/// - `SentenceScoped`: one unit per sentence; transitions never cross a
///   sentence boundary.
/// - `CorpusFlat`: the whole text is one unit; transitions may run from the
///   end of one sentence into the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenizePolicy {
	#[default]
	SentenceScoped,
	CorpusFlat,
}

impl fmt::Display for TokenizePolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenizePolicy::SentenceScoped => f.write_str("sentence-scoped"),
			TokenizePolicy::CorpusFlat => f.write_str("corpus-flat"),
		}
	}
}

impl FromStr for TokenizePolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"sentence" | "sentence-scoped" | "sentence_scoped" => Ok(TokenizePolicy::SentenceScoped),
			"flat" | "corpus-flat" | "corpus_flat" => Ok(TokenizePolicy::CorpusFlat),
			other => Err(format!("unknown policy '{other}', expected 'sentence-scoped' or 'corpus-flat'")),
		}
	}
}

/// Returns true when the token closes a sentence.
///
/// Cleaned text separates tokens with exactly one space, so "terminal
/// character followed by whitespace" is the same as "token ending with a
/// terminal character".
fn ends_sentence(token: &str) -> bool {
	token.ends_with(['.', '!', '?'])
}

/// Splits cleaned text into sentences of tokens.
///
/// The terminal punctuation stays on the last token of each sentence.
pub fn sentences(text: &CleanedText) -> Vec<Vec<&str>> {
	let mut sentences = Vec::new();
	let mut current = Vec::new();

	for token in text.tokens() {
		current.push(token);
		if ends_sentence(token) {
			sentences.push(std::mem::take(&mut current));
		}
	}
	if !current.is_empty() {
		sentences.push(current);
	}

	sentences
}

/// Cuts cleaned text into the units windows are taken from, per `policy`.
pub fn units(text: &CleanedText, policy: TokenizePolicy) -> Vec<Vec<&str>> {
	match policy {
		TokenizePolicy::SentenceScoped => sentences(text),
		TokenizePolicy::CorpusFlat => {
			let tokens: Vec<&str> = text.tokens().collect();
			if tokens.is_empty() { Vec::new() } else { vec![tokens] }
		}
	}
}
