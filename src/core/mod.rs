//! Core domain models for reply-normalizer.
//!
//! The per-exchange raw buffer and the tagged candidate text produced from
//! it. These are pure data types with no I/O dependencies.

pub mod buffer;
pub mod candidate;

pub use buffer::RawBuffer;
pub use candidate::{CandidateText, Fragment, Origin};
