//! In-memory preference store for tests and dry runs

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use otad_errors::{Error, PrefsError};

use crate::{validate_key, Prefs};

/// Preference store held entirely in memory. Used by tests and by dry-run
/// invocations that must not touch persistent state.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPrefs {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the keys currently present, for test assertions.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.values
            .lock()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Prefs for MemoryPrefs {
    async fn get_string(&self, key: &str) -> Result<Option<String>, Error> {
        validate_key(key)?;
        let map = self.values.lock().map_err(poisoned)?;
        Ok(map.get(key).cloned())
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), Error> {
        validate_key(key)?;
        let mut map = self.values.lock().map_err(poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>, Error> {
        match self.get_string(key).await? {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<i64>().map(Some).map_err(|e| {
                PrefsError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                }
                .into()
            }),
        }
    }

    async fn set_i64(&self, key: &str, value: i64) -> Result<(), Error> {
        self.set_string(key, &value.to_string()).await
    }

    async fn exists(&self, key: &str) -> Result<bool, Error> {
        Ok(self.get_string(key).await?.is_some())
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        validate_key(key)?;
        let mut map = self.values.lock().map_err(poisoned)?;
        map.remove(key);
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> Error {
    Error::internal("preference store mutex poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn behaves_like_a_store() {
        let prefs = MemoryPrefs::new();
        prefs.set_i64("progress", 7).await.expect("set");
        assert_eq!(prefs.get_i64("progress").await.expect("get"), Some(7));
        assert_eq!(prefs.keys(), vec!["progress".to_string()]);

        prefs.remove("progress").await.expect("remove");
        assert!(prefs.keys().is_empty());
    }
}
