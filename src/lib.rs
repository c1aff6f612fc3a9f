//! # reply-normalizer
//!
//! Recovers a clean, human-readable answer from a noisy, incrementally
//! arriving response body produced by an agent workflow, and reveals it to
//! a consumer at a steady pace while it streams.
//!
//! Response bodies arrive as NDJSON lines, concatenated JSON objects, a
//! legacy `{"reply": ...}` object, or plain text, frequently interleaved
//! with reasoning traces, tool-call logs and internal identifiers.
//!
//! ## Features
//!
//! - **Fragment extraction**: balanced JSON values recovered from noisy text
//! - **Origin-aware selection**: final-answer content preferred over
//!   intermediate reasoning via a pluggable classifier
//! - **Noise filtering**: agent traces and identifiers stripped from prose
//! - **Deduplication**: re-sent and growing fragments merged into one answer
//! - **Paced reveal**: grapheme-aware typing effect decoupled from network
//!   arrival
//! - **Exchange driver**: one POST per message with a classified error
//!   taxonomy and a fixed fallback answer

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod error;
pub mod exchange;
pub mod io;
pub mod normalize;
pub mod reveal;

// Re-export commonly used types at crate root
pub use error::{Error, ExchangeError, Result, StatusClass};

// Re-export core domain types
pub use core::{CandidateText, Fragment, Origin, RawBuffer};

// Re-export normalization types
pub use normalize::{
    FALLBACK_ANSWER, MergePolicy, Normalizer, OriginClassifier, Phase, create_classifier,
};

// Re-export reveal types
pub use reveal::{RevealPacing, RevealScheduler};

// Re-export exchange types
pub use exchange::{ChatRequest, Exchange, ExchangeConfig, HttpTransport, Transport};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
