#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Persistent preference store for the otad update client
//!
//! A small key-value store holding download bookkeeping that must survive
//! process restarts: the expected payload hash of an in-progress download,
//! its progress counter, rollback history, and attempt accounting. The
//! response-handling core only sees the [`Prefs`] and [`PayloadState`]
//! capabilities; storage lives behind them.

mod file;
mod memory;
mod payload_state;
pub mod resume;

pub use file::FilePrefs;
pub use memory::MemoryPrefs;
pub use payload_state::{PayloadState, PrefsPayloadState};

use async_trait::async_trait;
use otad_errors::{Error, PrefsError};

/// Well-known preference keys.
pub mod keys {
    /// Hash of the response an in-progress download belongs to.
    pub const UPDATE_CHECK_RESPONSE_HASH: &str = "update-check-response-hash";
    /// Monotonic progress counter for the in-progress download.
    pub const UPDATE_STATE_PROGRESS: &str = "update-state-progress";
    /// Version the device was deliberately rolled back from; absent if none.
    pub const ROLLBACK_VERSION: &str = "rollback-version";
    /// Whether the current attempt downloads from a local peer.
    pub const P2P_USED: &str = "p2p-used";
    /// Number of download attempt cycles started for the current payload.
    pub const PAYLOAD_ATTEMPT_NUMBER: &str = "payload-attempt-number";
}

/// Read/write access to the persistent preference store.
///
/// Each key maps to one independently written value; the store guarantees
/// that a single write is atomic, callers get no multi-key transactions.
#[async_trait]
pub trait Prefs: Send + Sync {
    /// Read a string value, `None` when the key was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the store cannot be read.
    async fn get_string(&self, key: &str) -> Result<Option<String>, Error>;

    /// Write a string value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the store cannot be written.
    async fn set_string(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Read an integer value, `None` when the key was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid, the store cannot be read, or
    /// the stored value is not an integer.
    async fn get_i64(&self, key: &str) -> Result<Option<i64>, Error>;

    /// Write an integer value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the store cannot be written.
    async fn set_i64(&self, key: &str, value: i64) -> Result<(), Error>;

    /// Whether a key has ever been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid.
    async fn exists(&self, key: &str) -> Result<bool, Error>;

    /// Remove a key; removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the store cannot be written.
    async fn remove(&self, key: &str) -> Result<(), Error>;
}

/// Reject keys that would escape the store's flat namespace.
pub(crate) fn validate_key(key: &str) -> Result<(), Error> {
    if key.is_empty() || key.contains(['/', '\\', '\0']) || key.starts_with('.') {
        return Err(PrefsError::InvalidKey {
            key: key.to_string(),
        }
        .into());
    }
    Ok(())
}
