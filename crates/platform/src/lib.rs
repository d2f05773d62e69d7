#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Hardware abstraction for the otad update client
//!
//! The response-handling core never talks to the system directly; it reads
//! hardware facts through the narrow [`Hardware`] capability and derives
//! slot devices with the pure functions in [`partition`]. Device
//! enumeration itself happens outside this workspace - the host constructs
//! a [`StaticHardware`] from whatever it detected at startup.

pub mod partition;

pub use partition::{install_device_of_boot_device, kernel_device_of_boot_device};

use otad_errors::{Error, PlatformError};

/// Read-only hardware facts consulted while planning an update.
pub trait Hardware: Send + Sync {
    /// Whether this device runs an official (signed, released) build.
    fn is_official_build(&self) -> bool;

    /// The root partition the device booted from, e.g. `/dev/sda3`.
    ///
    /// # Errors
    ///
    /// Returns an error if the boot device is not known to the host.
    fn boot_device(&self) -> Result<String, Error>;
}

/// Hardware capability backed by values captured at startup.
///
/// Keeping these as plain values (instead of a live system probe) makes
/// every policy decision reproducible and trivially fakeable in tests.
#[derive(Debug, Clone)]
pub struct StaticHardware {
    official_build: bool,
    boot_device: Option<String>,
}

impl StaticHardware {
    /// Create a hardware view from explicit values.
    #[must_use]
    pub fn new(official_build: bool, boot_device: impl Into<String>) -> Self {
        Self {
            official_build,
            boot_device: Some(boot_device.into()),
        }
    }

    /// Create a hardware view with no known boot device.
    #[must_use]
    pub fn without_boot_device(official_build: bool) -> Self {
        Self {
            official_build,
            boot_device: None,
        }
    }
}

impl Hardware for StaticHardware {
    fn is_official_build(&self) -> bool {
        self.official_build
    }

    fn boot_device(&self) -> Result<String, Error> {
        self.boot_device.clone().ok_or_else(|| {
            PlatformError::BootDeviceUnavailable {
                message: "no boot device captured at startup".to_string(),
            }
            .into()
        })
    }
}
