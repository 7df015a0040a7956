//! Preference Store Infrastructure
//!
//! Durable key-value storage for small client-side flags (the biometric
//! binding lives here). Values are opaque strings; callers own the
//! encoding. Read at startup, written on change.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

/// Errors from preference store operations
#[derive(Debug, Error)]
pub enum PrefsError {
    /// I/O error while reading or writing the backing file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for preference storage backends
#[trait_variant::make(PreferenceStore: Send)]
pub trait LocalPreferenceStore {
    /// Read a value by key
    async fn get(&self, key: &str) -> Result<Option<String>, PrefsError>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<(), PrefsError>;

    /// Remove a value; succeeds if the key is absent
    async fn remove(&self, key: &str) -> Result<(), PrefsError>;
}

/// In-memory preference store
///
/// Nothing survives the process; intended for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPrefs {
    async fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PrefsError> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}

/// File-backed preference store
///
/// The whole map is one pretty-printed JSON document. Writes go to a
/// sibling temp file first and are renamed into place, so a crash mid-write
/// leaves the previous document intact.
#[derive(Debug)]
pub struct FilePrefs {
    path: PathBuf,
    cache: Mutex<HashMap<String, String>>,
}

impl FilePrefs {
    /// Open (or create) the store at `path`.
    ///
    /// The parent directory is created if needed. A missing file is an
    /// empty store; an unreadable document is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).await?;
            }
        }

        let values = match fs::read_to_string(&path).await {
            Ok(json) => serde_json::from_str(&json)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            cache: Mutex::new(values),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("prefs.json");
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    async fn flush(&self, values: &HashMap<String, String>) -> Result<(), PrefsError> {
        let json = serde_json::to_string_pretty(values)?;
        let temp = self.temp_path();

        // Write to temp file first, then rename into place (atomic on most
        // filesystems).
        fs::write(&temp, &json).await?;
        fs::rename(&temp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "preferences flushed");
        Ok(())
    }
}

impl PreferenceStore for FilePrefs {
    async fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        Ok(self.cache.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        let mut values = self.cache.lock().await;
        values.insert(key.to_string(), value.to_string());
        self.flush(&values).await
    }

    async fn remove(&self, key: &str) -> Result<(), PrefsError> {
        let mut values = self.cache.lock().await;
        if values.remove(key).is_some() {
            self.flush(&values).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FilePrefs, MemoryPrefs, PreferenceStore, PrefsError};

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let prefs = MemoryPrefs::new();
        assert_eq!(prefs.get("k").await.unwrap(), None);

        prefs.set("k", "v1").await.unwrap();
        assert_eq!(prefs.get("k").await.unwrap(), Some("v1".to_string()));

        prefs.set("k", "v2").await.unwrap();
        assert_eq!(prefs.get("k").await.unwrap(), Some("v2".to_string()));

        prefs.remove("k").await.unwrap();
        assert_eq!(prefs.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let prefs = MemoryPrefs::new();
        prefs.set("k", "v").await.unwrap();
        prefs.remove("k").await.unwrap();
        prefs.remove("k").await.unwrap();
        assert_eq!(prefs.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        {
            let prefs = FilePrefs::open(&path).await.unwrap();
            prefs.set("binding", r#"{"enabled":true}"#).await.unwrap();
        }

        let prefs = FilePrefs::open(&path).await.unwrap();
        assert_eq!(
            prefs.get("binding").await.unwrap(),
            Some(r#"{"enabled":true}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/prefs.json");

        let prefs = FilePrefs::open(&path).await.unwrap();
        prefs.set("k", "v").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_store_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let prefs = FilePrefs::open(&path).await.unwrap();
        prefs.set("k", "v").await.unwrap();
        prefs.remove("k").await.unwrap();

        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["prefs.json".to_string()]);
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        assert!(matches!(
            FilePrefs::open(&path).await,
            Err(PrefsError::Serialization(_))
        ));
    }
}
