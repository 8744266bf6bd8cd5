//! Word-level Markov chain and seeded generation.
//!
//! This module provides:
//! - Token interning (`Vocabulary`)
//! - Fixed-order chains (`Chain`) and their states (`State`)
//! - Chain construction from raw text (`ChainBuilder`)
//! - Deterministic, seed-driven generation (`Generator`)

/// Fixed-order chain: states in insertion order plus key lookup.
///
/// Handles unit ingestion, transition recording, statistics and the binary
/// cache format.
pub mod chain;

/// Builds chains from raw text according to an order and a tokenize policy.
pub mod builder;

/// Seeded generation loop with its dead-end restart policy.
pub mod generator;

/// A single chain state (window of tokens) with its bag of next tokens.
///
/// Not exposed publicly.
mod state;

/// Token interning.
pub mod vocabulary;

pub use builder::ChainBuilder;
pub use chain::{Chain, ChainStats};
pub use generator::{GeneratedSequence, Generator};
