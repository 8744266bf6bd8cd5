use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
	static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?]\s+").unwrap();
	static ref LONE_PRONOUN: Regex = Regex::new(r"\bi\b").unwrap();
}

/// Byte offsets where a sentence starts: the beginning of the text and the
/// position right after every terminal-plus-whitespace run.
fn sentence_starts(text: &str) -> Vec<usize> {
	let mut starts = vec![0];
	starts.extend(SENTENCE_BREAK.find_iter(text).map(|m| m.end()));
	starts
}

/// Upper-cases the first alphabetic character of each sentence.
///
/// Only one character per sentence is touched; the rest of the word keeps
/// its original case.
fn capitalize_sentences(text: &str) -> String {
	let starts = sentence_starts(text);
	let mut out = String::with_capacity(text.len());
	let mut next_start = 1;
	let mut pending = true;

	for (offset, c) in text.char_indices() {
		if next_start < starts.len() && offset >= starts[next_start] {
			pending = true;
			next_start += 1;
		}
		if pending && c.is_alphabetic() {
			out.extend(c.to_uppercase());
			pending = false;
		} else {
			out.push(c);
		}
	}

	out
}

/// Post-processes generated text.
///
/// - Sentence-initial letters are upper-cased (see [`capitalize_sentences`])
/// - The standalone pronoun `i` becomes `I`; words merely containing an
///   `i` are left alone
pub fn normalize(text: &str) -> String {
	let capitalized = capitalize_sentences(text);
	LONE_PRONOUN.replace_all(&capitalized, "I").into_owned()
}
