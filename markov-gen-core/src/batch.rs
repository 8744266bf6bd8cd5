use std::sync::mpsc;
use std::thread;

use log::warn;

use crate::book::Book;
use crate::error::GenerateError;
use crate::metadata::MetadataChains;
use crate::model::{Chain, Generator};
use crate::settings::Settings;

/// Parameters of a batch of books generated from one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRequest {
	/// Number of books.
	pub count: usize,
	/// Seed of the first book; book `i` uses `base_seed + i`.
	pub base_seed: u64,
	/// Target body length in tokens.
	pub length: usize,
	/// Worker threads, `0` for one per CPU.
	pub workers: usize,
}

impl BatchRequest {
	pub fn from_settings(settings: &Settings) -> Self {
		Self {
			count: settings.books,
			base_seed: settings.seed,
			length: settings.length,
			workers: 0,
		}
	}

	/// Seed used for book `index`.
	pub fn seed_of(&self, index: usize) -> u64 {
		self.base_seed.wrapping_add(index as u64)
	}
}

/// Result of generating one book of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookOutcome {
	pub index: usize,
	pub seed: u64,
	/// File name (without extension) the book is meant to be saved under.
	pub name: String,
	pub result: Result<Book, GenerateError>,
}

/// Name of book `index` generated with `seed`.
///
/// Example: index `0`, seed `42` → `Generated_Book_1_Seed_42`
pub fn book_name(index: usize, seed: u64) -> String {
	format!("Generated_Book_{}_Seed_{}", index + 1, seed)
}

/// Generates a single book: normalized body plus, when `metadata` is given,
/// a synthesized title and author drawn with the same seed.
pub fn generate_book(
	chain: &Chain,
	metadata: Option<&MetadataChains>,
	seed: u64,
	length: usize,
) -> Result<Book, GenerateError> {
	let body = Generator::new(chain).generate(seed, length)?.to_text();
	Ok(Book {
		header: metadata.map(|m| m.synthesize(seed)),
		body,
	})
}

/// Generates `request.count` books from a shared chain.
///
/// # Behavior
/// - Books are spread over worker threads that only read the chain
/// - Outcomes come back over a channel and are sorted by book index, so the
///   result does not depend on the number of workers
/// - A failed book (empty chain) is reported in its outcome and logged; the
///   other books are still generated
pub fn generate_books(
	chain: &Chain,
	metadata: Option<&MetadataChains>,
	request: &BatchRequest,
) -> Vec<BookOutcome> {
	let workers = match request.workers {
		0 => num_cpus::get(),
		n => n,
	}
	.clamp(1, request.count.max(1));

	let (tx, rx) = mpsc::channel();
	thread::scope(|scope| {
		for worker in 0..workers {
			let tx = tx.clone();
			scope.spawn(move || {
				for index in (worker..request.count).step_by(workers) {
					let seed = request.seed_of(index);
					let outcome = BookOutcome {
						index,
						seed,
						name: book_name(index, seed),
						result: generate_book(chain, metadata, seed, request.length),
					};
					// The receiver outlives the scope, sending cannot fail
					let _ = tx.send(outcome);
				}
			});
		}
	});
	drop(tx);

	let mut outcomes: Vec<BookOutcome> = rx.iter().collect();
	outcomes.sort_by_key(|o| o.index);

	for outcome in &outcomes {
		if let Err(e) = &outcome.result {
			warn!("failed to generate {}: {e}", outcome.name);
		}
	}

	outcomes
}
