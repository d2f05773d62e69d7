//! Decoded update-check response

use serde::{Deserialize, Serialize};

/// One decoded answer from the update server.
///
/// Produced by the upstream request/parsing stage; this crate treats it as
/// immutable input. When `update_exists` is false every other field is
/// meaningless and must not be consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Whether the server offered an update at all.
    pub update_exists: bool,
    /// Version string of the offered payload (server-defined format).
    pub version: String,
    /// Payload size in bytes.
    pub payload_size: u64,
    /// Expected hash of the payload.
    #[serde(with = "serde_bytes_hex")]
    pub payload_hash: Vec<u8>,
    /// Size of the payload metadata block.
    pub metadata_size: u64,
    /// Signature over the payload metadata.
    #[serde(with = "serde_bytes_hex")]
    pub metadata_signature: Vec<u8>,
    /// RSA public key the payload is signed with; empty if unsigned.
    #[serde(with = "serde_bytes_hex")]
    pub public_key_rsa: Vec<u8>,
    /// Whether the payload is a delta against the running image.
    pub is_delta_payload: bool,
    /// Candidate download URLs, in server preference order.
    pub payload_urls: Vec<String>,
    /// Opaque deadline blob, forwarded verbatim to the UI side channel.
    #[serde(with = "serde_bytes_hex")]
    pub deadline: Vec<u8>,
}

impl UpdateResponse {
    /// Whether the response carries a payload signature key.
    #[must_use]
    pub fn has_signature(&self) -> bool {
        !self.public_key_rsa.is_empty()
    }

    /// Payload hash rendered as lowercase hex, the form persisted in the
    /// preference store for resume bookkeeping.
    #[must_use]
    pub fn payload_hash_hex(&self) -> String {
        hex::encode(&self.payload_hash)
    }
}

/// Serialize binary response fields as hex strings so responses stay
/// printable in logs and fixtures.
mod serde_bytes_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
