//! Request/response exchange with the answer endpoint.
//!
//! - [`ChatRequest`]: the outgoing payload
//! - [`Transport`]: the seam issuing the call, with [`HttpTransport`] over reqwest
//! - [`Exchange`]: the driver feeding arriving bytes through normalization
//!   and reveal

pub mod config;
pub mod driver;
pub mod request;
pub mod transport;

pub use config::{DEFAULT_CONNECT_TIMEOUT, ExchangeConfig};
pub use driver::Exchange;
pub use request::ChatRequest;
pub use transport::{ByteStream, HttpTransport, ResponseBody, Transport};

use crate::error::Result;
use crate::normalize::Normalizer;

/// Builds an HTTP exchange from configuration.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn http_exchange(config: &ExchangeConfig, normalizer: Normalizer) -> Result<Exchange<HttpTransport>> {
    let transport = HttpTransport::new(config)?;
    Ok(Exchange::new(transport)
        .with_normalizer(normalizer)
        .with_pacing(config.pacing))
}
