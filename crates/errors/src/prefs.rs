//! Preference store error types

use thiserror::Error;

use crate::UserFacingError;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrefsError {
    #[error("failed to read preference {key}: {message}")]
    ReadFailed { key: String, message: String },

    #[error("failed to write preference {key}: {message}")]
    WriteFailed { key: String, message: String },

    #[error("preference {key} holds invalid data: {message}")]
    InvalidValue { key: String, message: String },

    #[error("invalid preference key: {key}")]
    InvalidKey { key: String },

    #[error("preference directory unavailable: {path}")]
    DirectoryUnavailable { path: String },
}

impl UserFacingError for PrefsError {
    fn user_message(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.to_string())
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ReadFailed { .. } | Self::WriteFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::ReadFailed { .. } => Some("prefs.read_failed"),
            Self::WriteFailed { .. } => Some("prefs.write_failed"),
            Self::InvalidValue { .. } => Some("prefs.invalid_value"),
            Self::InvalidKey { .. } => Some("prefs.invalid_key"),
            Self::DirectoryUnavailable { .. } => Some("prefs.directory_unavailable"),
        }
    }
}
