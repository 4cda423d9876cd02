use crate::context::SlotName;

/// A user-fixable problem with the current slot values.
///
/// Carries the slot the platform should re-elicit and the prompt to show.
/// Never logged as a system fault; it only steers the dialogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub slot: SlotName,
    pub message: String,
}

impl ValidationError {
    pub fn new(slot: SlotName, message: impl Into<String>) -> Self {
        Self { slot, message: message.into() }
    }
}

/// Fatal turn failures. These indicate a deployment or host-platform
/// mismatch, not something the end user can fix.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("intent '{0}' is not supported")]
    UnsupportedIntent(String),
}

/// Failures talking to an external collaborator.
///
/// `Malformed` is deliberately distinct from `Transport`: a response that
/// arrived but does not match the documented shape points at the
/// collaborator, not the network.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed with status {status}: {body}")]
    Status { service: &'static str, status: reqwest::StatusCode, body: String },

    #[error("malformed {service} response: {source}")]
    Malformed {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
