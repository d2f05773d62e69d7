//! Completion codes for the response-handling stage

use serde::{Deserialize, Serialize};

/// Outcome reported to the pipeline once per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionCode {
    /// An install plan was built and handed off.
    Success,
    /// The server offered no update, or policy declined it. Benign.
    NoUpdate,
    /// The response exists but is unusable.
    InvalidResponse,
    /// The local install/kernel device could not be resolved.
    DeviceLookupFailed,
}

impl CompletionCode {
    /// Whether this code represents a failure the pipeline should surface.
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Self::InvalidResponse | Self::DeviceLookupFailed)
    }
}

impl std::fmt::Display for CompletionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::NoUpdate => write!(f, "no_update"),
            Self::InvalidResponse => write!(f, "invalid_response"),
            Self::DeviceLookupFailed => write!(f, "device_lookup_failed"),
        }
    }
}
