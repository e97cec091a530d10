use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{RelayError, RelayResult};

/// Flat-document store: each record is one named JSON document, read and
/// rewritten whole. The registry and the last-sent marker are the only
/// documents this service keeps.
#[async_trait]
pub trait Store: Send + Sync {
    /// Read a document by name. `None` means the document was never written.
    async fn load(&self, name: &str) -> RelayResult<Option<String>>;
    /// Replace a document atomically.
    async fn save(&self, name: &str, content: &str) -> RelayResult<()>;
}

/// File-backed store. Documents live as `<name>.json` under the data
/// directory; saves go through a temp file and rename so a crash mid-write
/// never leaves a truncated document behind.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn doc_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn load(&self, name: &str) -> RelayResult<Option<String>> {
        match tokio::fs::read_to_string(self.doc_path(name)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RelayError::Storage(format!("failed to read {name}: {e}"))),
        }
    }

    async fn save(&self, name: &str, content: &str) -> RelayResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RelayError::Storage(format!("failed to create data dir: {e}")))?;

        let path = self.doc_path(name);
        let tmp = self.dir.join(format!("{name}.json.tmp"));
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| RelayError::Storage(format!("failed to write {name}: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| RelayError::Storage(format!("failed to replace {name}: {e}")))?;

        debug!("Saved document: {}", path.display());
        Ok(())
    }
}

/// In-memory store, used by tests and useful for ephemeral runs.
#[derive(Default)]
pub struct MemStore {
    docs: Mutex<HashMap<String, String>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn load(&self, name: &str) -> RelayResult<Option<String>> {
        Ok(self.docs.lock().await.get(name).cloned())
    }

    async fn save(&self, name: &str, content: &str) -> RelayResult<()> {
        self.docs
            .lock()
            .await
            .insert(name.to_string(), content.to_string());
        Ok(())
    }
}
