use std::fmt;

use thiserror::Error;

use crate::view_state::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    ForeignOrigin,
    MissingHeight,
    EmptyElementId,
    InvalidHeight,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DropReason::ForeignOrigin => "sender origin differs from the page origin",
            DropReason::MissingHeight => "payload has fewer than two components",
            DropReason::EmptyElementId => "element id is empty",
            DropReason::InvalidHeight => "height is not a pixel count",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("authentication with {domain} failed: {reason}")]
    AuthenticationFailure { domain: String, reason: String },

    #[error("malformed frame message: {0}")]
    MalformedFrameMessage(DropReason),

    #[error("delete request for {url} returned status {status}")]
    DeleteRequestFailure { url: String, status: u16 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{action} is not allowed while {state:?}")]
    InvalidState {
        action: &'static str,
        state: ViewState,
    },

    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("could not decode server response: {0}")]
    Decode(String),

    #[error("local storage unavailable: {0}")]
    Storage(String),

    #[error("invalid page config: {0}")]
    Config(String),
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::Decode(err.to_string())
    }
}
