//! Per-invocation policy context
//!
//! A fresh read-only view of the collaborators, captured once per
//! response. Nothing here is cached across invocations and nothing is
//! global; explicit values are threaded instead of reaching through
//! shared mutable system state.

use otad_platform::Hardware;
use otad_prefs::PayloadState;

/// Knobs carried over from the update-check request parameters stage.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    /// Whether peer-to-peer downloading is enabled for this session.
    pub use_p2p_for_downloading: bool,
    /// URL of a local peer serving the payload; empty if none found.
    pub p2p_url: String,
    /// Whether this update switches to a channel whose versions regress.
    pub channel_downgrade: bool,
    /// Whether policy allows a powerwash for a channel downgrade.
    pub powerwash_allowed: bool,
}

/// Read view over the collaborators for one planning invocation.
#[derive(Debug, Clone)]
pub struct PolicyContext {
    /// Whether the device runs an official build.
    pub is_official_build: bool,
    /// Version the device was rolled back from; empty if none.
    pub rollback_version: String,
    /// Explicit boot device for test images, bypassing hardware lookup.
    pub boot_device_override: Option<String>,
    /// Request-scoped parameters.
    pub params: RequestParams,
}

impl PolicyContext {
    /// Capture a context from the collaborators.
    ///
    /// A failure to read rollback history degrades to "no rollback
    /// recorded": the guard is an update-loop breaker, not part of the
    /// payload trust chain, and blocking all updates on a bad preference
    /// read would be worse than re-offering a version once.
    pub async fn gather(
        hardware: &dyn Hardware,
        payload_state: &dyn PayloadState,
        params: RequestParams,
        boot_device_override: Option<String>,
    ) -> Self {
        let rollback_version = payload_state
            .rollback_version()
            .await
            .unwrap_or_default();
        Self {
            is_official_build: hardware.is_official_build(),
            rollback_version,
            boot_device_override,
            params,
        }
    }
}
