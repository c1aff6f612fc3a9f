//! Input reading for captured response bodies.
//!
//! Bodies are read as raw bytes and decoded through [`RawBuffer`], so a
//! capture with stray invalid bytes still normalizes instead of failing.

use crate::core::RawBuffer;
use crate::error::{IoError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Maximum body size accepted from a file or stdin (64MB).
const MAX_BODY_SIZE: u64 = 64 * 1024 * 1024;

/// Reads a captured body from a file.
///
/// # Errors
///
/// Returns an error if the file doesn't exist, can't be read, or exceeds
/// the maximum body size.
pub fn read_body_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    if !path_ref.exists() {
        return Err(IoError::FileNotFound { path: path_str }.into());
    }

    let file = File::open(path_ref).map_err(|e| IoError::ReadFailed {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;

    let size = file
        .metadata()
        .map_err(|e| IoError::ReadFailed {
            path: path_str.clone(),
            reason: e.to_string(),
        })?
        .len();
    if size > MAX_BODY_SIZE {
        return Err(IoError::ReadFailed {
            path: path_str,
            reason: format!("file too large: {size} bytes (max: {MAX_BODY_SIZE} bytes)"),
        }
        .into());
    }

    read_body(file, &path_str)
}

/// Reads a captured body from stdin.
///
/// # Errors
///
/// Returns an error if stdin can't be read.
pub fn read_body_stdin() -> Result<String> {
    read_body(std::io::stdin().lock(), "<stdin>")
}

/// Reads a body from a file path, or stdin when no path is given.
///
/// # Errors
///
/// Returns an error if reading fails.
pub fn read_body_input(path: Option<&Path>) -> Result<String> {
    path.map_or_else(read_body_stdin, read_body_file)
}

fn read_body<R: Read>(reader: R, label: &str) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .take(MAX_BODY_SIZE + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| IoError::ReadFailed {
            path: label.to_string(),
            reason: e.to_string(),
        })?;

    if bytes.len() as u64 > MAX_BODY_SIZE {
        return Err(IoError::ReadFailed {
            path: label.to_string(),
            reason: format!("input exceeds {MAX_BODY_SIZE} bytes"),
        }
        .into());
    }

    let mut buffer = RawBuffer::new();
    buffer.push_bytes(&bytes);
    buffer.finish();
    Ok(buffer.as_str().to_string())
}
