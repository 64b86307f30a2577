//! Text to sign-image translation pipeline.
//!
//! Raw text is tokenized, each token is resolved against the word and
//! letter example indexes, and the resolved entries are composed into a
//! fixed-size frame sequence for timed playback.

pub mod examples; // Example-index loader
pub mod playback; // Frame composition and playback scheduling
pub mod resolve; // Sign-sequence resolver
pub mod token; // Tokenizer
