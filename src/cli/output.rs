//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::Error;
use crate::normalize::NormalizeReport;
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Serialize)]
struct AnswerOutput<'a> {
    answer: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

/// Formats a final answer.
#[must_use]
pub fn format_answer(answer: &str, session_id: Option<&str>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = answer.to_string();
            if !output.ends_with('\n') {
                output.push('\n');
            }
            output
        }
        OutputFormat::Json => {
            let mut output = format_json(&AnswerOutput { answer, session_id });
            output.push('\n');
            output
        }
    }
}

/// Formats a normalization report.
#[must_use]
pub fn format_report(report: &NormalizeReport, classifier: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_report_text(report, classifier),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ReportOutput<'a> {
                classifier: &'a str,
                #[serde(flatten)]
                report: &'a NormalizeReport,
            }
            let mut output = format_json(&ReportOutput { classifier, report });
            output.push('\n');
            output
        }
    }
}

fn format_report_text(report: &NormalizeReport, classifier: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Classifier:  {classifier}");
    let _ = writeln!(output, "Fragments:   {}", report.fragment_count);
    let _ = writeln!(
        output,
        "Raw text:    {}",
        if report.raw_text { "yes" } else { "no" }
    );

    if !report.fragment_origins.is_empty() {
        output.push_str("\nFragments:\n");
        for (i, origin) in report.fragment_origins.iter().enumerate() {
            let label = origin.map_or("-", |o| o.as_str());
            let _ = writeln!(output, "  [{i}] {label}");
        }
    }

    output.push('\n');
    if report.candidates.is_empty() {
        output.push_str("No candidates found.\n");
    } else {
        output.push_str("Candidates:\n");
        let _ = writeln!(output, "{:<6} {:<13} Content", "Index", "Origin");
        output.push_str(&"-".repeat(70));
        output.push('\n');
        for (i, candidate) in report.candidates.iter().enumerate() {
            let preview = truncate(&candidate.content.replace('\n', "\\n"), 50);
            let _ = writeln!(output, "{:<6} {:<13} {}", i, candidate.origin, preview);
        }
    }

    output.push_str("\nAnswer:\n");
    if report.answer.is_empty() {
        output.push_str("(none)\n");
    } else {
        output.push_str(&report.answer);
        output.push('\n');
    }
    output
}

/// Formats the classifier list.
#[must_use]
pub fn format_classifiers(names: &[&str], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("Available classifiers:\n");
            for name in names {
                let _ = writeln!(output, "  {name}");
            }
            output
        }
        OutputFormat::Json => {
            let mut output = format_json(&names);
            output.push('\n');
            output
        }
    }
}

/// Formats an error for display.
///
/// Text output uses the end-user message; JSON output also carries the
/// technical description and, for HTTP failures, the status code.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.user_message(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
                detail: String,
                #[serde(skip_serializing_if = "Option::is_none")]
                status: Option<u16>,
            }
            let status = match error {
                Error::Exchange(crate::error::ExchangeError::HttpStatus { status, .. }) => {
                    Some(*status)
                }
                _ => None,
            };
            format_json(&ErrorOutput {
                error: error.user_message(),
                detail: error.to_string(),
                status,
            })
        }
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Truncates a string to at most `max_chars` characters with ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{head}...")
    }
}
