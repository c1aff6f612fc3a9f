//! Outgoing chat request payload.

use serde::{Deserialize, Serialize};

/// Body of the single POST issued per exchange.
///
/// `chatInput` duplicates `message` for workflows that read either field.
///
/// # Examples
///
/// ```
/// use reply_normalizer::exchange::ChatRequest;
///
/// let request = ChatRequest::new("What is the VAT rate?", "session-1");
/// let json = serde_json::to_value(&request).unwrap();
/// assert_eq!(json["chatInput"], "What is the VAT rate?");
/// assert_eq!(json["sessionId"], "session-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Copy of `message`.
    pub chat_input: String,
    /// Caller-supplied session identifier.
    pub session_id: String,
}

impl ChatRequest {
    /// Creates a request for a message within a session.
    #[must_use]
    pub fn new(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            chat_input: message.clone(),
            message,
            session_id: session_id.into(),
        }
    }
}
