//! Text processing around the chain.
//!
//! - Cleaning raw corpus text (`cleaner`)
//! - Cutting cleaned text into sentences and tokens (`tokenizer`)
//! - Normalizing generated text (`normalizer`)

pub mod cleaner;
pub mod normalizer;
pub mod tokenizer;

pub use cleaner::{clean, CleanedText};
pub use normalizer::normalize;
pub use tokenizer::TokenizePolicy;
