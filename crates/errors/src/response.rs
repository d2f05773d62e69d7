//! Update-check response error types

use std::borrow::Cow;

use thiserror::Error;

use crate::UserFacingError;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResponseError {
    /// The response declares an update but carries no usable download URL.
    #[error("no usable download URL in update response")]
    NoUsableUrl,

    #[error("malformed update response: {message}")]
    Malformed { message: String },

    #[error("missing field in update response: {field}")]
    MissingField { field: String },
}

impl UserFacingError for ResponseError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoUsableUrl => Some("The update server sent a response without payload URLs."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        // A malformed response may be a transient server-side problem.
        true
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::NoUsableUrl => Some("response.no_usable_url"),
            Self::Malformed { .. } => Some("response.malformed"),
            Self::MissingField { .. } => Some("response.missing_field"),
        }
    }
}
