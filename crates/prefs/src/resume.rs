//! Resume-state accessors
//!
//! The store owns the notion of "a resumable download exists": the
//! persisted response hash plus evidence of partial data. The planning
//! core treats [`can_resume_update`] as an opaque oracle.

use otad_errors::Error;

use crate::{keys, Prefs};

/// Whether an interrupted download of the payload identified by
/// `response_hash_hex` can be resumed.
///
/// True iff the persisted response hash matches and a progress record
/// exists. Read failures count as "cannot resume" - restarting is always
/// safe, resuming against unknown state is not.
pub async fn can_resume_update(prefs: &dyn Prefs, response_hash_hex: &str) -> bool {
    if response_hash_hex.is_empty() {
        return false;
    }
    let stored = match prefs.get_string(keys::UPDATE_CHECK_RESPONSE_HASH).await {
        Ok(Some(stored)) => stored,
        Ok(None) | Err(_) => return false,
    };
    if stored != response_hash_hex {
        return false;
    }
    prefs
        .exists(keys::UPDATE_STATE_PROGRESS)
        .await
        .unwrap_or(false)
}

/// Reset the progress counter for a fresh attempt cycle.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub async fn reset_update_progress(prefs: &dyn Prefs) -> Result<(), Error> {
    prefs.set_i64(keys::UPDATE_STATE_PROGRESS, 0).await
}

/// Persist the response hash the next download attempt belongs to.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub async fn record_response_hash(
    prefs: &dyn Prefs,
    response_hash_hex: &str,
) -> Result<(), Error> {
    prefs
        .set_string(keys::UPDATE_CHECK_RESPONSE_HASH, response_hash_hex)
        .await
}

/// Current progress counter, `None` before any download has started.
///
/// # Errors
///
/// Returns an error if the store cannot be read or holds a non-integer.
pub async fn update_progress(prefs: &dyn Prefs) -> Result<Option<i64>, Error> {
    prefs.get_i64(keys::UPDATE_STATE_PROGRESS).await
}
