//! Word-level Markov chain text generation library.
//!
//! This crate provides:
//! - Corpus cleaning, sentence splitting and tokenization
//! - Fixed-order chain construction with two tokenize policies
//! - Deterministic, seed-driven generation with dead-end restarts
//! - Normalization of generated text (capitalization, lone pronoun)
//! - Collaborators around the core: corpus loading, metadata side-chains,
//!   book rendering and batch generation over worker threads
//!
//! Typical flow:
//! raw text → `text::clean` → `model::ChainBuilder` → `model::Chain`
//! → `model::Generator` → `text::normalize`.

/// Cleaning, tokenization and normalization.
pub mod text;

/// Chains, their construction and seeded generation.
pub mod model;

/// Error types for construction (`ModelError`) and generation (`GenerateError`).
pub mod error;

/// Settings shared by the binaries (orders, lengths, seed, policy).
pub mod settings;

/// Corpus folder loading and book file writing.
pub mod io;

/// Project Gutenberg boilerplate removal.
pub mod gutenberg;

/// Title/author metadata table and its side-chains.
pub mod metadata;

/// Generated book and its optional header.
pub mod book;

/// Parallel generation of many books from one chain.
pub mod batch;

pub use error::{GenerateError, ModelError};
pub use model::{Chain, ChainBuilder, Generator};
pub use settings::Settings;
pub use text::TokenizePolicy;
