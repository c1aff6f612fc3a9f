//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default session identifier for `ask`.
pub const DEFAULT_SESSION_ID: &str = "reply-normalizer-cli";

/// reply-normalizer: recover clean answers from noisy streamed responses.
///
/// Sends a message to a chat webhook and reveals the answer as it streams,
/// or normalizes a captured response body offline.
#[derive(Parser, Debug)]
#[command(name = "reply-normalizer")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a message and reveal the answer as it arrives.
    Ask {
        /// The message to send.
        message: String,

        /// Endpoint URL receiving the POST.
        #[arg(short, long, env = "REPLY_NORMALIZER_ENDPOINT")]
        endpoint: String,

        /// Session identifier sent with the message.
        #[arg(short, long, env = "REPLY_NORMALIZER_SESSION_ID", default_value = DEFAULT_SESSION_ID)]
        session_id: String,

        /// Wait for the complete body instead of streaming it.
        #[arg(long)]
        no_stream: bool,

        /// Milliseconds between reveal ticks.
        #[arg(long, env = "REPLY_NORMALIZER_TICK_MS", default_value = "30")]
        tick_ms: u64,

        /// Graphemes revealed per tick before catch-up.
        #[arg(long, default_value = "2")]
        step: usize,

        /// Connect timeout in seconds.
        #[arg(long, env = "REPLY_NORMALIZER_CONNECT_TIMEOUT", default_value = "10")]
        connect_timeout: u64,

        /// Overall request timeout in seconds (0 = none).
        #[arg(long, env = "REPLY_NORMALIZER_TIMEOUT", default_value = "0")]
        timeout: u64,

        /// Origin classifier (vocabulary, none).
        #[arg(short, long, default_value = "vocabulary")]
        classifier: String,
    },

    /// Normalize a captured response body and print the answer.
    Normalize {
        /// Body file (reads stdin when omitted).
        file: Option<PathBuf>,

        /// Origin classifier (vocabulary, none).
        #[arg(short, long, default_value = "vocabulary")]
        classifier: String,
    },

    /// Show recovered fragments, candidates and origins for a body.
    Inspect {
        /// Body file (reads stdin when omitted).
        file: Option<PathBuf>,

        /// Origin classifier (vocabulary, none).
        #[arg(short, long, default_value = "vocabulary")]
        classifier: String,
    },

    /// List available origin classifiers.
    Classifiers,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ask_defaults() {
        let cli = Cli::try_parse_from([
            "reply-normalizer",
            "ask",
            "What is VAT?",
            "--endpoint",
            "http://localhost:5678/webhook/chat",
        ])
        .unwrap();
        let Commands::Ask {
            message,
            session_id,
            no_stream,
            tick_ms,
            classifier,
            ..
        } = cli.command
        else {
            panic!("expected ask");
        };
        assert_eq!(message, "What is VAT?");
        assert!(!no_stream);
        assert_eq!(tick_ms, 30);
        assert_eq!(classifier, "vocabulary");
        assert!(!session_id.is_empty());
    }

    #[test]
    fn test_global_format() {
        let cli = Cli::try_parse_from(["reply-normalizer", "normalize", "--format", "json"]).unwrap();
        assert_eq!(cli.format, "json");
        assert!(matches!(cli.command, Commands::Normalize { file: None, .. }));
    }
}
