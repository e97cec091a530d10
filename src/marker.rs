use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{RelayError, RelayResult};
use crate::storage::Store;

const MARKER_DOC: &str = "last_sent";

/// Last-sent markers: one draw-identity string per broadcast job name.
/// Written only after a dispatch attempt for a new draw, so a failed run
/// retries the same draw at the next firing.
#[derive(Clone)]
pub struct MarkerStore {
    store: Arc<dyn Store>,
}

impl MarkerStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get(&self, job: &str) -> RelayResult<Option<String>> {
        Ok(self.read_doc().await?.remove(job))
    }

    pub async fn set(&self, job: &str, identity: &str) -> RelayResult<()> {
        let mut doc = self.read_doc().await?;
        doc.insert(job.to_string(), identity.to_string());
        let content = serde_json::to_string_pretty(&doc)
            .map_err(|e| RelayError::Storage(format!("failed to encode markers: {e}")))?;
        self.store.save(MARKER_DOC, &content).await
    }

    async fn read_doc(&self) -> RelayResult<BTreeMap<String, String>> {
        match self.store.load(MARKER_DOC).await? {
            Some(content) => serde_json::from_str(&content)
                .map_err(|e| RelayError::Storage(format!("corrupt marker document: {e}"))),
            None => Ok(BTreeMap::new()),
        }
    }
}
