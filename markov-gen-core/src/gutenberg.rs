use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
	static ref HEADER: Regex = Regex::new(r"(?s)\*\*\* START OF THIS PROJECT GUTENBERG EBOOK.*?\*\*\*").unwrap();
	static ref FOOTER: Regex = Regex::new(r"(?s)\*\*\* END OF THIS PROJECT GUTENBERG EBOOK.*?\*\*\*").unwrap();
	static ref BLURB: Regex =
		Regex::new(r"(?s)This ebook is for the use of anyone anywhere.*?before using this eBook\.").unwrap();
}

/// Removes Project Gutenberg boilerplate from a downloaded book.
///
/// Strips the `*** START OF THIS PROJECT GUTENBERG EBOOK ... ***` and
/// `*** END OF ... ***` markers and the licence blurb, then trims the
/// result. Text without boilerplate only gets trimmed.
pub fn strip_disclaimers(text: &str) -> String {
	let text = HEADER.replace_all(text, "");
	let text = FOOTER.replace_all(&text, "");
	let text = BLURB.replace_all(&text, "");
	text.trim().to_owned()
}
