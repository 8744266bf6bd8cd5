use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building, configuring, persisting or loading a model.
///
/// Generation itself never returns a `ModelError`; see [`GenerateError`].
#[derive(Debug, Error)]
pub enum ModelError {
	/// The order of a chain must be at least 1.
	#[error("order must be >= 1, got {0}")]
	InvalidOrder(usize),

	/// A generation length must be at least 1 token.
	#[error("length must be >= 1, got {0}")]
	InvalidLength(usize),

	/// A generation length above the configured ceiling.
	#[error("length must be <= {max}, got {length}")]
	LengthTooLarge { length: usize, max: usize },

	/// A folder was expected but the path is missing or is a file.
	#[error("expected a directory, got: {}", .0.display())]
	NotADirectory(PathBuf),

	#[error(transparent)]
	Io(#[from] io::Error),

	/// Binary chain cache could not be encoded or decoded.
	#[error("chain cache: {0}")]
	Serialization(#[from] postcard::Error),

	/// Chain cache decoded fine but does not describe a valid chain.
	#[error("chain cache is inconsistent: {0}")]
	InvalidCache(&'static str),

	/// Metadata table (filename, title, author) could not be read.
	#[error("metadata table: {0}")]
	Metadata(#[from] csv::Error),

	/// Settings file is not valid TOML or has unexpected fields.
	#[error("settings: {0}")]
	Config(#[from] toml::de::Error),
}

/// Per-call generation failures.
///
/// These never abort a batch: callers skip the failed item and carry on.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GenerateError {
	/// The chain has no states, so there is nowhere to start from.
	#[error("the chain is empty, nothing to generate from")]
	EmptyModel,

	/// Zero tokens were requested.
	#[error("requested length must be >= 1")]
	ZeroLength,
}
