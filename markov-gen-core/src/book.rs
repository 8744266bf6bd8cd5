use std::fmt::Write;

/// Synthesized title and author of a book.
///
/// A side-chain that cannot generate anything leaves its field empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookHeader {
	pub title: Option<String>,
	pub author: Option<String>,
}

/// A generated book, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
	/// Present only when metadata synthesis is enabled.
	pub header: Option<BookHeader>,
	/// Normalized body text.
	pub body: String,
}

impl Book {
	/// Renders the book as plain text.
	///
	/// With a header, the body is preceded by:
	/// ```text
	/// Title: <title or empty>
	/// Author: <author or empty>
	///
	/// ```
	pub fn render(&self) -> String {
		let mut out = String::with_capacity(self.body.len() + 64);
		if let Some(header) = &self.header {
			// Writing into a String cannot fail
			let _ = writeln!(out, "Title: {}", header.title.as_deref().unwrap_or_default());
			let _ = writeln!(out, "Author: {}", header.author.as_deref().unwrap_or_default());
			out.push('\n');
		}
		out.push_str(&self.body);
		out
	}
}
