//! Deadline side channel
//!
//! A legacy cross-process notification: the UI polls a well-known file
//! for the response's raw deadline bytes. Written on every successful
//! plan hand-off, including an empty write that clears a stale deadline.
//! Strictly an external interface; the policy functions never see it.

use std::fs::Permissions;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use otad_errors::Error;
use tokio::fs;

/// Mode bits for the deadline file: owner read/write, group and others
/// read. The UI must be able to read it, nobody else may write it.
const DEADLINE_MODE: u32 = 0o644;

/// Write the deadline bytes to the side-channel file.
///
/// # Errors
///
/// Returns an error if the file cannot be written or its permissions
/// cannot be set. Callers treat this as non-fatal.
pub async fn write_deadline(path: &Path, deadline: &[u8]) -> Result<(), Error> {
    fs::write(path, deadline)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    fs::set_permissions(path, Permissions::from_mode(DEADLINE_MODE))
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    Ok(())
}
