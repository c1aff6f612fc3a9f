//! Transport seam for the exchange driver.
//!
//! The driver only needs "send one request, get back either a byte stream
//! or a complete body". [`HttpTransport`] does that over reqwest; tests
//! plug in scripted transports.

use crate::error::ExchangeError;
use crate::exchange::config::ExchangeConfig;
use crate::exchange::request::ChatRequest;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::pin::Pin;

/// Accept header sent with every request.
pub const ACCEPT_VALUE: &str = "application/json, text/plain, */*";

/// Incremental response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ExchangeError>> + Send>>;

/// Response body as exposed by a transport.
pub enum ResponseBody {
    /// Bytes arriving over time.
    Stream(ByteStream),
    /// The complete body, already read.
    Complete(String),
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("ResponseBody::Stream(..)"),
            Self::Complete(body) => f.debug_tuple("ResponseBody::Complete").field(body).finish(),
        }
    }
}

/// Issues the single outgoing call of an exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::Connectivity`] when no response arrives and
    /// [`ExchangeError::HttpStatus`] for non-2xx responses.
    async fn send(&self, request: &ChatRequest) -> Result<ResponseBody, ExchangeError>;

    /// Returns the transport name, for logs.
    fn name(&self) -> &'static str;
}

/// reqwest-backed HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    streaming: bool,
}

impl HttpTransport {
    /// Builds a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ExchangeConfig) -> crate::error::Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| crate::error::Error::Config {
            message: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            streaming: config.streaming,
        })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ResponseBody, ExchangeError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            session_id = %request.session_id,
            message_len = request.message.len(),
            "sending chat request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ExchangeError::Connectivity {
                reason: e.to_string(),
            })?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        if self.streaming {
            let stream = response.bytes_stream().map(|chunk| {
                chunk.map_err(|e| ExchangeError::StreamRead {
                    reason: e.to_string(),
                })
            });
            Ok(ResponseBody::Stream(Box::pin(stream)))
        } else {
            let body = response.text().await.map_err(ExchangeError::from)?;
            Ok(ResponseBody::Complete(body))
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(HttpTransport::new(&ExchangeConfig::new("nope")).is_err());
    }

    #[test]
    fn test_new_keeps_endpoint() {
        let transport = HttpTransport::new(&ExchangeConfig::new("http://127.0.0.1:9/chat")).unwrap();
        assert_eq!(transport.endpoint(), "http://127.0.0.1:9/chat");
        assert_eq!(transport.name(), "http");
    }

    #[test]
    fn test_response_body_debug() {
        let body = ResponseBody::Complete("x".to_string());
        assert!(format!("{body:?}").contains("Complete"));
    }
}
