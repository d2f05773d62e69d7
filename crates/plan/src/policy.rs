//! Pure policy decisions
//!
//! Everything in this module is a function of its arguments. The
//! orchestrator feeds in values read from collaborators; nothing here
//! touches I/O, so each rule is testable against plain data.

use otad_errors::{Error, ResponseError};

/// Scheme prefix a URL must carry to count as secure transport.
pub const SECURE_URL_SCHEME: &str = "https://";

/// Outcome of the anti-rollback check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackDecision {
    Accept,
    Reject,
}

/// Reject a response offering the exact version the device was
/// deliberately rolled back from.
///
/// A stale or misconfigured server re-offering that version would
/// otherwise put the device into an update loop. An empty
/// `rolled_back_version` means no rollback happened and everything is
/// accepted.
#[must_use]
pub fn evaluate_rollback(rolled_back_version: &str, proposed_version: &str) -> RollbackDecision {
    if !rolled_back_version.is_empty() && rolled_back_version == proposed_version {
        RollbackDecision::Reject
    } else {
        RollbackDecision::Accept
    }
}

/// The effective download source for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSelection {
    /// URL the download stage will actually fetch from.
    pub url: String,
    /// Whether that URL is a local peer rather than the origin server.
    pub used_p2p: bool,
}

/// Resolve the effective download URL, substituting a local peer when one
/// is eligible.
///
/// # Errors
///
/// Returns `ResponseError::NoUsableUrl` when `primary_url` is empty: a
/// response that claims an update but carries no source is malformed, and
/// a peer URL must never paper over that.
pub fn resolve_source(
    primary_url: &str,
    p2p_eligible: bool,
    p2p_url: &str,
) -> Result<SourceSelection, Error> {
    if primary_url.is_empty() {
        return Err(ResponseError::NoUsableUrl.into());
    }
    if p2p_eligible && !p2p_url.is_empty() {
        return Ok(SourceSelection {
            url: p2p_url.to_string(),
            used_p2p: true,
        });
    }
    Ok(SourceSelection {
        url: primary_url.to_string(),
        used_p2p: false,
    })
}

/// Whether downstream payload verification is mandatory.
///
/// First match wins:
/// 1. Unofficial build: mandatory iff the response carries a signing key.
///    Test fleets default to permissive verification, but a signed
///    response is assumed intentionally signed and is always verified.
/// 2. Official build, effective URL not https: mandatory.
/// 3. Official build, any listed payload URL not https: mandatory. The
///    download may fail over to any listed URL later, so verification
///    must not depend on which URL happens to be used first.
/// 4. Otherwise: waived.
///
/// Note that the effective URL may be a plain-http local peer even when
/// every server URL is https; rule 2 deliberately fires on it.
#[must_use]
pub fn hash_checks_mandatory(
    is_official_build: bool,
    has_signature: bool,
    effective_url: &str,
    payload_urls: &[String],
) -> bool {
    mandate_with_reason(is_official_build, has_signature, effective_url, payload_urls).0
}

/// [`hash_checks_mandatory`] plus a short reason string for events.
pub(crate) fn mandate_with_reason(
    is_official_build: bool,
    has_signature: bool,
    effective_url: &str,
    payload_urls: &[String],
) -> (bool, &'static str) {
    if !is_official_build {
        return if has_signature {
            (true, "unofficial build but response is signed")
        } else {
            (false, "unofficial build, unsigned response")
        };
    }
    if !has_secure_scheme(effective_url) {
        return (true, "effective download URL is not https");
    }
    if payload_urls.iter().any(|url| !has_secure_scheme(url)) {
        return (true, "response lists a non-https payload URL");
    }
    (false, "all transports are https")
}

/// Case-insensitive `https://` prefix test.
fn has_secure_scheme(url: &str) -> bool {
    url.get(..SECURE_URL_SCHEME.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SECURE_URL_SCHEME))
}
