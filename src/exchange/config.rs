//! Exchange configuration.

use crate::error::{Error, Result};
use crate::reveal::RevealPacing;
use std::time::Duration;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for one exchange against the answer endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Endpoint URL receiving the POST.
    pub endpoint: String,
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
    /// Overall request timeout, including reading the body (None = no limit).
    pub request_timeout: Option<Duration>,
    /// Read the body as a stream; when false, wait for the complete body.
    pub streaming: bool,
    /// Reveal pacing for streamed answers.
    pub pacing: RevealPacing,
}

impl ExchangeConfig {
    /// Creates a streaming configuration for an endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: None,
            streaming: true,
            pacing: RevealPacing::default(),
        }
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the overall request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets whether the body is streamed.
    #[must_use]
    pub const fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Sets reveal pacing.
    #[must_use]
    pub const fn pacing(mut self, pacing: RevealPacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the endpoint is not an http(s) URL, the
    /// tick interval is zero, or the base step is zero.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.endpoint).map_err(|e| Error::Config {
            message: format!("invalid endpoint '{}': {e}", self.endpoint),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("endpoint must be http or https, got '{}'", url.scheme()),
            });
        }
        if self.pacing.tick.is_zero() {
            return Err(Error::Config {
                message: "reveal tick must be > 0".to_string(),
            });
        }
        if self.pacing.base_step == 0 {
            return Err(Error::Config {
                message: "reveal base step must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
