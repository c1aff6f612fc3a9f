//! Raw response buffer for a single exchange.
//!
//! The buffer is append-only: every chunk read from the transport is pushed
//! onto it and the normalizer re-scans the whole text on each push. Bytes
//! are decoded incrementally so that a multi-byte character split across
//! two network chunks is held back until it completes.

/// Append-only text buffer scoped to one exchange.
///
/// # Examples
///
/// ```
/// use reply_normalizer::core::RawBuffer;
///
/// let mut buffer = RawBuffer::new();
/// buffer.push_bytes("Naïve".as_bytes());
/// assert_eq!(buffer.as_str(), "Naïve");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBuffer {
    /// Decoded text received so far.
    text: String,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    /// Number of chunks pushed.
    chunks: usize,
}

impl RawBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of raw bytes.
    ///
    /// Complete characters are decoded immediately. An incomplete sequence
    /// at the end of the chunk waits for the next push; invalid bytes are
    /// replaced with U+FFFD.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.chunks += 1;
        self.pending.extend_from_slice(bytes);

        let mut consumed = 0;
        loop {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    consumed = self.pending.len();
                    break;
                }
                Err(err) => {
                    let valid_end = consumed + err.valid_up_to();
                    // valid_up_to guarantees this range decodes
                    self.text.push_str(
                        std::str::from_utf8(&self.pending[consumed..valid_end]).unwrap_or_default(),
                    );
                    match err.error_len() {
                        Some(bad) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            consumed = valid_end + bad;
                        }
                        None => {
                            consumed = valid_end;
                            break;
                        }
                    }
                }
            }
        }
        self.pending.drain(..consumed);
    }

    /// Flushes any held-back bytes, lossily, at end of stream.
    pub fn finish(&mut self) {
        if !self.pending.is_empty() {
            let tail = String::from_utf8_lossy(&self.pending).into_owned();
            self.text.push_str(&tail);
            self.pending.clear();
        }
    }

    /// Returns the decoded text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the decoded size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Checks if nothing has been decoded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the number of chunks pushed.
    #[must_use]
    pub const fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Returns true if bytes of an incomplete character are held back.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
