//! JSON file store
//!
//! Each module persists one pretty-printed JSON document. Read-modify-write
//! cycles are serialized per file so concurrent actions cannot lose updates.

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

use super::BackendError;

/// Read a JSON document, yielding `T::default()` when the file does not exist yet
pub async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, BackendError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

/// One module's data file
pub struct JsonStore {
    file_name: &'static str,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(file_name: &'static str) -> Self {
        Self {
            file_name,
            write_lock: Mutex::new(()),
        }
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    pub async fn load<T: DeserializeOwned + Default>(&self, data_dir: &Path) -> Result<T, BackendError> {
        read_json(&data_dir.join(self.file_name)).await
    }

    async fn save<T: Serialize>(&self, data_dir: &Path, data: &T) -> Result<(), BackendError> {
        tokio::fs::create_dir_all(data_dir).await?;
        let bytes = serde_json::to_vec_pretty(data)?;
        tokio::fs::write(data_dir.join(self.file_name), bytes).await?;
        Ok(())
    }

    /// Load, apply `f`, and save if `f` succeeded. Nothing is written on error.
    pub async fn update<T, R, F>(&self, data_dir: &Path, f: F) -> Result<R, BackendError>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> Result<R, BackendError>,
    {
        let _guard = self.write_lock.lock().await;

        let mut data: T = self.load(data_dir).await?;
        let result = f(&mut data)?;
        self.save(data_dir, &data).await?;

        tracing::debug!(file = self.file_name, "Saved module data");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Counter {
        #[serde(default)]
        value: u32,
    }

    #[tokio::test]
    async fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new("counter.json");

        let counter: Counter = store.load(dir.path()).await.unwrap();
        assert_eq!(counter, Counter::default());
    }

    #[tokio::test]
    async fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new("counter.json");

        for _ in 0..3 {
            store
                .update(dir.path(), |c: &mut Counter| {
                    c.value += 1;
                    Ok(())
                })
                .await
                .unwrap();
        }

        let counter: Counter = store.load(dir.path()).await.unwrap();
        assert_eq!(counter.value, 3);

        let raw = std::fs::read_to_string(dir.path().join("counter.json")).unwrap();
        assert!(raw.contains('\n'), "file should be pretty-printed");
    }

    #[tokio::test]
    async fn test_failed_update_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new("counter.json");

        let result = store
            .update(dir.path(), |c: &mut Counter| -> Result<(), BackendError> {
                c.value = 99;
                Err(BackendError::NotFound("nope".into()))
            })
            .await;

        assert!(result.is_err());
        assert!(!dir.path().join("counter.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("counter.json"), "{not json").unwrap();

        let store = JsonStore::new("counter.json");
        let result: Result<Counter, _> = store.load(dir.path()).await;
        assert!(matches!(result, Err(BackendError::Serialization(_))));
    }
}
