use serde::{Deserialize, Serialize};

use otad_types::CompletionCode;

/// Update-pipeline events surfaced while handling an update-check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UpdateEvent {
    /// A decoded response entered the planning stage
    ResponseReceived {
        update_exists: bool,
        version: String,
    },

    /// The server declared no update available
    NoUpdateAvailable,

    /// The offered version matches one the device was rolled back from
    RollbackVersionRejected { version: String },

    /// The effective download source was chosen
    SourceSelected { url: String, used_p2p: bool },

    /// The hash/signature verification mandate was decided
    HashCheckPolicyDecided { mandatory: bool, reason: String },

    /// An interrupted download of the same payload will be resumed
    DownloadResumed { payload_hash: String },

    /// Download bookkeeping was reset for a fresh attempt cycle
    DownloadRestarted { payload_hash: String },

    /// An install plan was built and handed to the payload stage
    PlanReady { summary: String },

    /// The deadline side channel was updated
    DeadlineWritten { path: String, bytes: usize },

    /// The deadline side channel could not be written (non-fatal)
    DeadlineWriteFailed { path: String, error: String },

    /// The stage finished with its one completion code
    Completed { code: CompletionCode },
}
