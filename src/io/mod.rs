//! I/O utilities for reply-normalizer.
//!
//! Provides body readers for captured responses, along with the Unicode
//! helpers used by the reveal scheduler.

pub mod reader;
pub mod unicode;

pub use reader::{read_body_file, read_body_input, read_body_stdin};
pub use unicode::{advance_graphemes, find_char_boundary, grapheme_count};
