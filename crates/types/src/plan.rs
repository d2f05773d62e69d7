//! Install plan handed to the payload-application stage

use serde::{Deserialize, Serialize};

/// The validated, policy-enforced description of one update installation.
///
/// Built exactly once per accepted response, then transferred whole to the
/// downstream payload-application stage; nothing in this crate mutates it
/// afterwards. `download_url` is never empty on a successfully built plan,
/// and `hash_checks_mandatory` is always computed by policy, never supplied
/// by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallPlan {
    /// Effective download URL (may be a local peer, not the origin server).
    pub download_url: String,
    /// Version string of the payload being installed.
    pub version: String,
    /// Payload size in bytes.
    pub payload_size: u64,
    /// Expected payload hash.
    pub payload_hash: Vec<u8>,
    /// Payload metadata size in bytes.
    pub metadata_size: u64,
    /// Signature over the payload metadata.
    pub metadata_signature: Vec<u8>,
    /// RSA public key for signature verification; empty if unsigned.
    pub public_key_rsa: Vec<u8>,
    /// Whether downstream verification of hash/signature is mandatory.
    pub hash_checks_mandatory: bool,
    /// Whether an interrupted download of this same payload is resumed.
    pub is_resume: bool,
    /// Whether this is a full image rather than a delta payload.
    pub is_full_update: bool,
    /// Root partition of the inactive slot the payload installs into.
    pub install_path: String,
    /// Kernel partition paired with `install_path`.
    pub kernel_install_path: String,
    /// Whether applying this update requires a factory reset.
    pub powerwash_required: bool,
}

impl InstallPlan {
    /// One-line summary used for the plan-ready event.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "version={} url={} size={} resume={} full={} mandatory_checks={} install={} kernel={} powerwash={}",
            self.version,
            self.download_url,
            self.payload_size,
            self.is_resume,
            self.is_full_update,
            self.hash_checks_mandatory,
            self.install_path,
            self.kernel_install_path,
            self.powerwash_required,
        )
    }
}
