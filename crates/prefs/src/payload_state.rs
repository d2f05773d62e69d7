//! Payload attempt accounting
//!
//! Tracks facts about the payload currently being pursued: the version
//! history that feeds the rollback guard, whether a local peer serves the
//! bytes, and how many attempt cycles have started. The planning core
//! only sees the [`PayloadState`] capability.

use std::sync::Arc;

use async_trait::async_trait;
use otad_errors::Error;
use otad_types::UpdateResponse;

use crate::{keys, Prefs};

/// Accounting capability for the payload currently in flight.
#[async_trait]
pub trait PayloadState: Send + Sync {
    /// Version the device was deliberately rolled back from; empty if none.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    async fn rollback_version(&self) -> Result<String, Error>;

    /// URL the download stage currently prefers for this response.
    ///
    /// URL ranking (failover between candidates) happens in the download
    /// stage; by default the server's first candidate is in effect.
    fn current_url(&self, response: &UpdateResponse) -> String {
        response.payload_urls.first().cloned().unwrap_or_default()
    }

    /// Record whether the effective download source is a local peer.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    async fn set_using_p2p(&self, used_p2p: bool) -> Result<(), Error>;

    /// An interrupted download of the same payload continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    async fn update_resumed(&self) -> Result<(), Error>;

    /// A fresh attempt cycle starts for this payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    async fn update_restarted(&self) -> Result<(), Error>;
}

/// [`PayloadState`] persisted through the preference store.
#[derive(Clone)]
pub struct PrefsPayloadState {
    prefs: Arc<dyn Prefs>,
}

impl PrefsPayloadState {
    /// Create payload-state accounting on top of a preference store.
    #[must_use]
    pub fn new(prefs: Arc<dyn Prefs>) -> Self {
        Self { prefs }
    }

    /// Number of attempt cycles started for the current payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn attempt_number(&self) -> Result<i64, Error> {
        Ok(self
            .prefs
            .get_i64(keys::PAYLOAD_ATTEMPT_NUMBER)
            .await?
            .unwrap_or(0))
    }
}

#[async_trait]
impl PayloadState for PrefsPayloadState {
    async fn rollback_version(&self) -> Result<String, Error> {
        Ok(self
            .prefs
            .get_string(keys::ROLLBACK_VERSION)
            .await?
            .unwrap_or_default())
    }

    async fn set_using_p2p(&self, used_p2p: bool) -> Result<(), Error> {
        self.prefs
            .set_string(keys::P2P_USED, if used_p2p { "1" } else { "0" })
            .await
    }

    async fn update_resumed(&self) -> Result<(), Error> {
        // The attempt counter tracks cycles, not continuations.
        Ok(())
    }

    async fn update_restarted(&self) -> Result<(), Error> {
        let next = self.attempt_number().await? + 1;
        self.prefs.set_i64(keys::PAYLOAD_ATTEMPT_NUMBER, next).await
    }
}
