//! Platform and hardware lookup error types

use thiserror::Error;

use crate::UserFacingError;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlatformError {
    /// The boot or kernel device for the inactive slot could not be derived.
    #[error("device lookup failed for {device}: {message}")]
    DeviceLookupFailed { device: String, message: String },

    #[error("boot device unavailable: {message}")]
    BootDeviceUnavailable { message: String },

    #[error("filesystem operation failed: {operation} - {message}")]
    FilesystemOperationFailed { operation: String, message: String },
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> std::borrow::Cow<'_, str> {
        std::borrow::Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::DeviceLookupFailed { .. } => Some("platform.device_lookup_failed"),
            Self::BootDeviceUnavailable { .. } => Some("platform.boot_device_unavailable"),
            Self::FilesystemOperationFailed { .. } => Some("platform.filesystem_failed"),
        }
    }
}
