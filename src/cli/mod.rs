//! CLI layer for reply-normalizer.
//!
//! Provides the command-line interface using clap, with commands for
//! asking a live endpoint and for normalizing captured response bodies.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
