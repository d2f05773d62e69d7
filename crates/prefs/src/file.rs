//! File-per-key preference store

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use otad_errors::{Error, PrefsError};
use tokio::fs;

use crate::{validate_key, Prefs};

/// Preference store keeping each key in its own file under a base
/// directory. A write lands in a temporary file first and is renamed into
/// place, so readers in other pipeline stages never observe a torn value.
#[derive(Debug, Clone)]
pub struct FilePrefs {
    base_dir: PathBuf,
}

impl FilePrefs {
    /// Create a store rooted at `base_dir`. The directory is created on
    /// first write.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Base directory this store writes under.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }

    async fn write_value(&self, key: &str, value: &str) -> Result<(), Error> {
        validate_key(key)?;
        fs::create_dir_all(&self.base_dir).await.map_err(|e| {
            Error::from(PrefsError::DirectoryUnavailable {
                path: format!("{}: {e}", self.base_dir.display()),
            })
        })?;

        let path = self.key_path(key);
        // Leading dot keeps the temp name out of the valid key namespace.
        let tmp = self.base_dir.join(format!(".{key}.tmp"));
        let write_err = |e: std::io::Error| {
            Error::from(PrefsError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            })
        };
        fs::write(&tmp, value.as_bytes()).await.map_err(write_err)?;
        fs::rename(&tmp, &path).await.map_err(write_err)?;
        Ok(())
    }

    async fn read_value(&self, key: &str) -> Result<Option<String>, Error> {
        validate_key(key)?;
        match fs::read_to_string(self.key_path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PrefsError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl Prefs for FilePrefs {
    async fn get_string(&self, key: &str) -> Result<Option<String>, Error> {
        self.read_value(key).await
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), Error> {
        self.write_value(key, value).await
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>, Error> {
        match self.read_value(key).await? {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|e| {
                    PrefsError::InvalidValue {
                        key: key.to_string(),
                        message: e.to_string(),
                    }
                    .into()
                }),
        }
    }

    async fn set_i64(&self, key: &str, value: i64) -> Result<(), Error> {
        self.write_value(key, &value.to_string()).await
    }

    async fn exists(&self, key: &str) -> Result<bool, Error> {
        validate_key(key)?;
        Ok(fs::try_exists(self.key_path(key)).await.unwrap_or(false))
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        validate_key(key)?;
        match fs::remove_file(self.key_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PrefsError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            }
            .into()),
        }
    }
}
