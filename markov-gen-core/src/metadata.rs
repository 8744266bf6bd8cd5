use std::io::Read;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::book::BookHeader;
use crate::error::ModelError;
use crate::model::{Chain, ChainBuilder, Generator};
use crate::settings::Settings;

/// One row of the metadata table: a corpus file with its title and author.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
	pub filename: String,
	pub title: String,
	pub author: String,
}

/// Reads a CSV metadata table with a `filename,title,author` header.
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Result<Vec<MetadataRow>, ModelError> {
	let reader = csv::Reader::from_path(path)?;
	collect_rows(reader)
}

/// Same as [`read_metadata`], from any reader.
pub fn parse_metadata<R: Read>(input: R) -> Result<Vec<MetadataRow>, ModelError> {
	collect_rows(csv::Reader::from_reader(input))
}

fn collect_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<MetadataRow>, ModelError> {
	let mut rows = Vec::new();
	for row in reader.deserialize() {
		rows.push(row?);
	}
	Ok(rows)
}

/// Side-chains used to synthesize a title and an author for each book.
///
/// Each title (and each author) is its own unit, so windows never run from
/// one book's title into the next.
#[derive(Debug, Clone)]
pub struct MetadataChains {
	title: Chain,
	author: Chain,
	title_length: usize,
	author_length: usize,
}

impl MetadataChains {
	/// Builds both side-chains using the title/author orders and lengths of
	/// `settings`.
	pub fn build(rows: &[MetadataRow], settings: &Settings) -> Result<Self, ModelError> {
		let title_builder = ChainBuilder::new(settings.title_order, settings.policy)?;
		let author_builder = ChainBuilder::new(settings.author_order, settings.policy)?;

		let mut title = title_builder.empty();
		let mut author = author_builder.empty();
		for row in rows {
			title_builder.extend(&mut title, &row.title);
			author_builder.extend(&mut author, &row.author);
		}
		debug!("metadata chains: {} title states, {} author states", title.len(), author.len());

		Ok(Self {
			title,
			author,
			title_length: settings.title_length,
			author_length: settings.author_length,
		})
	}

	pub fn title_chain(&self) -> &Chain {
		&self.title
	}

	pub fn author_chain(&self) -> &Chain {
		&self.author
	}

	/// Generates a title and an author for `seed`.
	///
	/// An empty side-chain yields an empty field instead of an error.
	pub fn synthesize(&self, seed: u64) -> BookHeader {
		BookHeader {
			title: Self::sample(&self.title, seed, self.title_length),
			author: Self::sample(&self.author, seed, self.author_length),
		}
	}

	fn sample(chain: &Chain, seed: u64, length: usize) -> Option<String> {
		match Generator::new(chain).generate(seed, length) {
			Ok(sequence) => Some(sequence.to_text()),
			Err(e) => {
				debug!("no metadata for seed {seed}: {e}");
				None
			}
		}
	}
}
