//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::cli::output::{OutputFormat, format_answer, format_classifiers, format_report};
use crate::cli::parser::{Cli, Commands};
use crate::error::Result;
use crate::exchange::{ChatRequest, ExchangeConfig, http_exchange};
use crate::io::read_body_input;
use crate::normalize::{MergePolicy, Normalizer, available_classifiers, create_classifier};
use crate::reveal::RevealPacing;
use std::io::{self, Write as IoWrite};
use std::path::Path;
use std::time::Duration;

/// Settings for the `ask` command.
#[derive(Debug, Clone)]
pub struct AskOptions {
    /// Message to send.
    pub message: String,
    /// Endpoint URL.
    pub endpoint: String,
    /// Session identifier.
    pub session_id: String,
    /// Stream the body.
    pub streaming: bool,
    /// Reveal tick.
    pub tick: Duration,
    /// Graphemes per tick.
    pub step: usize,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Overall request timeout.
    pub timeout: Option<Duration>,
    /// Classifier name.
    pub classifier: String,
}

impl AskOptions {
    fn exchange_config(&self) -> ExchangeConfig {
        ExchangeConfig::new(self.endpoint.clone())
            .streaming(self.streaming)
            .connect_timeout(self.connect_timeout)
            .request_timeout(self.timeout)
            .pacing(RevealPacing::default().tick(self.tick).base_step(self.step))
    }
}

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Ask {
            message,
            endpoint,
            session_id,
            no_stream,
            tick_ms,
            step,
            connect_timeout,
            timeout,
            classifier,
        } => {
            let options = AskOptions {
                message: message.clone(),
                endpoint: endpoint.clone(),
                session_id: session_id.clone(),
                streaming: !no_stream,
                tick: Duration::from_millis(*tick_ms),
                step: *step,
                connect_timeout: Duration::from_secs(*connect_timeout),
                timeout: (*timeout > 0).then(|| Duration::from_secs(*timeout)),
                classifier: classifier.clone(),
            };
            cmd_ask(&options, format)
        }
        Commands::Normalize { file, classifier } => {
            cmd_normalize(file.as_deref(), classifier, format)
        }
        Commands::Inspect { file, classifier } => cmd_inspect(file.as_deref(), classifier, format),
        Commands::Classifiers => Ok(format_classifiers(&available_classifiers(), format)),
    }
}

/// Builds a normalizer for a classifier name.
fn build_normalizer(classifier: &str) -> Result<Normalizer> {
    Ok(Normalizer::new(
        create_classifier(classifier)?,
        MergePolicy::default(),
    ))
}

/// Sends one message and reveals the answer.
///
/// In text mode revealed text is written to stdout as it grows and the
/// returned string is empty; in JSON mode only the final answer is
/// returned.
fn cmd_ask(options: &AskOptions, format: OutputFormat) -> Result<String> {
    let normalizer = build_normalizer(&options.classifier)?;
    let exchange = http_exchange(&options.exchange_config(), normalizer)?;
    let request = ChatRequest::new(options.message.clone(), options.session_id.clone());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match format {
        OutputFormat::Text => {
            let mut sink = TerminalSink::new(io::stdout());
            let answer =
                runtime.block_on(exchange.run(&request, &mut |text: &str| sink.update(text)))?;
            sink.finish(&answer);
            Ok(String::new())
        }
        OutputFormat::Json => {
            let answer = runtime.block_on(exchange.run(&request, &mut |_: &str| {}))?;
            Ok(format_answer(&answer, Some(&options.session_id), format))
        }
    }
}

/// Normalizes a captured body and returns the answer.
fn cmd_normalize(file: Option<&Path>, classifier: &str, format: OutputFormat) -> Result<String> {
    let normalizer = build_normalizer(classifier)?;
    let body = read_body_input(file)?;
    let answer = normalizer.finalize(&body);
    Ok(format_answer(&answer, None, format))
}

/// Reports every pipeline stage for a captured body.
fn cmd_inspect(file: Option<&Path>, classifier: &str, format: OutputFormat) -> Result<String> {
    let normalizer = build_normalizer(classifier)?;
    let body = read_body_input(file)?;
    let report = normalizer.inspect(&body);
    Ok(format_report(&report, normalizer.classifier_name(), format))
}

/// Writes revealed text progressively to a terminal-like writer.
///
/// Growth is written as suffixes. When an update no longer extends what is
/// on screen (the final flush replaced it), the full text is written on a
/// fresh paragraph.
struct TerminalSink<W: IoWrite> {
    out: W,
    printed: String,
}

impl<W: IoWrite> TerminalSink<W> {
    const fn new(out: W) -> Self {
        Self {
            out,
            printed: String::new(),
        }
    }

    fn update(&mut self, text: &str) {
        let written = match text.strip_prefix(self.printed.as_str()) {
            Some(suffix) => self.out.write_all(suffix.as_bytes()),
            None => {
                tracing::debug!("final answer replaced revealed text");
                write!(self.out, "\n\n{text}")
            }
        };
        log_write_error(written.and_then(|()| self.out.flush()));
        text.clone_into(&mut self.printed);
    }

    fn finish(&mut self, answer: &str) {
        if self.printed != answer {
            self.update(answer);
        }
        log_write_error(writeln!(self.out).and_then(|()| self.out.flush()));
    }
}

fn log_write_error(result: io::Result<()>) {
    if let Err(e) = result {
        tracing::debug!(error = %e, "failed to write revealed text");
    }
}
