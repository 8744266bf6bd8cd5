use std::path::{Path, PathBuf};

use clap::Parser;
use log::{info, warn};

use markov_gen_core::batch::{generate_books, BatchRequest};
use markov_gen_core::io::{normalize_folder, read_corpus, save_text};
use markov_gen_core::metadata::{read_metadata, MetadataChains};
use markov_gen_core::{Chain, ChainBuilder, ModelError, Settings, TokenizePolicy};

/// Generates a batch of books from a folder of text files.
#[derive(Parser, Debug)]
#[command(about = "Generates books from a word-level Markov chain")]
struct Args {
	/// Folder of `.txt` files used as the corpus
	corpus: String,

	/// TOML settings file; flags below override it
	#[arg(long)]
	config: Option<String>,

	/// Number of books to generate
	#[arg(long)]
	books: Option<usize>,

	/// Length of each book, in words
	#[arg(long)]
	length: Option<usize>,

	/// Seed of the first book, each next book uses the next seed
	#[arg(long)]
	seed: Option<u64>,

	#[arg(long)]
	order: Option<usize>,

	/// `sentence-scoped` or `corpus-flat`
	#[arg(long)]
	policy: Option<TokenizePolicy>,

	/// CSV table (filename,title,author) enabling the Title/Author header
	#[arg(long)]
	metadata: Option<String>,

	/// Output folder, defaults to a timestamped `*_generated_books` folder
	#[arg(long)]
	output: Option<PathBuf>,

	/// Binary chain cache, reused when built from the same corpus with the
	/// same order and policy
	#[arg(long)]
	cache: Option<PathBuf>,

	/// Worker threads, 0 for one per CPU
	#[arg(long, default_value_t = 0)]
	workers: usize,

	/// Remove Project Gutenberg boilerplate from corpus files
	#[arg(long)]
	strip_gutenberg: bool,
}

impl Args {
	/// Settings file (if any) with command-line overrides applied.
	fn settings(&self) -> Result<Settings, ModelError> {
		let mut settings = match &self.config {
			Some(path) => Settings::from_toml_file(path)?,
			None => Settings::default(),
		};
		if let Some(books) = self.books {
			settings.books = books;
		}
		if let Some(length) = self.length {
			settings.length = length;
		}
		if let Some(seed) = self.seed {
			settings.seed = seed;
		}
		if let Some(order) = self.order {
			settings.order = order;
		}
		if let Some(policy) = self.policy {
			settings.policy = policy;
		}
		settings.validate()?;
		Ok(settings)
	}
}

/// Describes the corpus a chain is built from, stored in the cache.
fn corpus_source(args: &Args) -> String {
	let folder = normalize_folder(&args.corpus);
	if args.strip_gutenberg {
		format!("{} (gutenberg stripped)", folder.display())
	} else {
		folder.display().to_string()
	}
}

/// Loads the chain from `cache` when it matches `builder` and the corpus,
/// otherwise builds it from the corpus folder and refreshes the cache.
fn load_chain(args: &Args, builder: &ChainBuilder, cache: Option<&Path>) -> Result<Chain, ModelError> {
	let source = corpus_source(args);
	if let Some(path) = cache.filter(|p| p.exists()) {
		match Chain::load(path) {
			Ok(chain)
				if chain.order() == builder.order()
					&& chain.policy() == builder.policy()
					&& chain.source() == Some(source.as_str()) =>
			{
				info!("loaded cached chain of {source} from {}", path.display());
				return Ok(chain);
			}
			Ok(chain) => info!(
				"cache {} was built from {} with order {} ({}), rebuilding",
				path.display(),
				chain.source().unwrap_or("an unknown corpus"),
				chain.order(),
				chain.policy()
			),
			Err(e) => warn!("ignoring unreadable cache {}: {e}", path.display()),
		}
	}

	let corpus = read_corpus(normalize_folder(&args.corpus), args.strip_gutenberg)?;
	let mut chain = builder.build(&corpus);
	chain.set_source(source);

	if let Some(path) = cache {
		chain.save(path)?;
		info!("cached chain to {}", path.display());
	}
	Ok(chain)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	let settings = args.settings()?;

	let builder = ChainBuilder::new(settings.order, settings.policy)?;
	let chain = load_chain(&args, &builder, args.cache.as_deref())?;
	let stats = chain.stats();
	info!(
		"chain: order={} policy={} states={} transitions={} vocabulary={}",
		stats.order, stats.policy, stats.states, stats.transitions, stats.vocabulary
	);

	let metadata = match &args.metadata {
		Some(path) => Some(MetadataChains::build(&read_metadata(path)?, &settings)?),
		None => None,
	};

	let output_folder = args.output.clone().unwrap_or_else(|| {
		PathBuf::from(chrono::Local::now().format("%Y%m%d_%H%M%S_generated_books").to_string())
	});

	let mut request = BatchRequest::from_settings(&settings);
	request.workers = args.workers;

	let mut written = 0usize;
	for outcome in generate_books(&chain, metadata.as_ref(), &request) {
		match outcome.result {
			Ok(book) => {
				let path = save_text(&output_folder, &outcome.name, &book.render())?;
				info!("generated {} with seed {}", path.display(), outcome.seed);
				written += 1;
			}
			// Already logged by the batch, the other books go on
			Err(_) => continue,
		}
	}

	info!("{written}/{} books saved in folder: {}", request.count, output_folder.display());
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn flags_override_defaults() {
		let args = Args::try_parse_from(["books", "corpus", "--books", "4", "--seed", "9", "--policy", "flat"]).unwrap();
		let settings = args.settings().unwrap();
		assert_eq!(settings.books, 4);
		assert_eq!(settings.seed, 9);
		assert_eq!(settings.policy, TokenizePolicy::CorpusFlat);
		assert_eq!(settings.order, 3);
	}

	#[test]
	fn zero_order_is_rejected() {
		let args = Args::try_parse_from(["books", "corpus", "--order", "0"]).unwrap();
		assert!(matches!(args.settings(), Err(ModelError::InvalidOrder(0))));
	}

	#[test]
	fn cache_is_written_then_reused() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("a.txt"), "the cat sat on the mat. the dog sat on the log.").unwrap();
		let cache = dir.path().join("chain.bin");
		let corpus = dir.path().to_string_lossy().to_string();

		let args = Args::try_parse_from(["books", corpus.as_str(), "--order", "1"]).unwrap();
		let builder = ChainBuilder::new(1, TokenizePolicy::SentenceScoped).unwrap();
		let built = load_chain(&args, &builder, Some(cache.as_path())).unwrap();
		assert!(cache.is_file());

		// The corpus is gone, only the cache can provide the chain now
		std::fs::remove_file(dir.path().join("a.txt")).unwrap();
		let cached = load_chain(&args, &builder, Some(cache.as_path())).unwrap();
		assert_eq!(cached.stats(), built.stats());

		let other = ChainBuilder::new(2, TokenizePolicy::SentenceScoped).unwrap();
		assert!(load_chain(&args, &other, Some(cache.as_path())).unwrap().is_empty());
	}

	#[test]
	fn cache_of_another_corpus_is_rebuilt() {
		let first = tempfile::tempdir().unwrap();
		let second = tempfile::tempdir().unwrap();
		std::fs::write(first.path().join("a.txt"), "the cat sat on the mat.").unwrap();
		std::fs::write(second.path().join("b.txt"), "a bird sang on the log.").unwrap();
		let cache = first.path().join("chain.bin");
		let builder = ChainBuilder::new(1, TokenizePolicy::SentenceScoped).unwrap();

		let first_corpus = first.path().to_string_lossy().to_string();
		let args = Args::try_parse_from(["books", first_corpus.as_str(), "--order", "1"]).unwrap();
		load_chain(&args, &builder, Some(cache.as_path())).unwrap();

		let second_corpus = second.path().to_string_lossy().to_string();
		let args = Args::try_parse_from(["books", second_corpus.as_str(), "--order", "1"]).unwrap();
		let chain = load_chain(&args, &builder, Some(cache.as_path())).unwrap();
		assert_eq!(chain.transitions(&["bird"]), Some(vec!["sang"]));
		assert_eq!(chain.transitions(&["cat"]), None);

		let stripped = Args::try_parse_from(["books", second_corpus.as_str(), "--order", "1", "--strip-gutenberg"]).unwrap();
		assert_ne!(corpus_source(&stripped), corpus_source(&args));
		assert_eq!(Chain::load(&cache).unwrap().source(), Some(corpus_source(&args).as_str()));
	}
}
