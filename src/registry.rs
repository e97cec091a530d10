use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RelayError, RelayResult};
use crate::storage::Store;

const TARGETS_DOC: &str = "targets";

/// Kind of conversation the bot can push into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Group,
    Room,
}

/// A destination conversation, identified by the platform-issued id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub kind: TargetKind,
    pub id: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TargetsDoc {
    #[serde(default)]
    targets: Vec<Target>,
}

/// Durable set of known push targets. Registration is append-only and
/// idempotent; the whole set is rewritten on every insert (writes are rare,
/// the set stays small).
#[derive(Clone)]
pub struct TargetRegistry {
    store: Arc<dyn Store>,
}

impl TargetRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Insert the (kind, id) pair if absent. Returns whether the pair was new.
    pub async fn record(&self, kind: TargetKind, id: &str) -> RelayResult<bool> {
        let mut doc = self.read_doc().await?;
        if doc.targets.iter().any(|t| t.kind == kind && t.id == id) {
            return Ok(false);
        }

        doc.targets.push(Target {
            kind,
            id: id.to_string(),
        });
        self.write_doc(&doc).await?;

        info!("Registered target: {:?} {}", kind, id);
        Ok(true)
    }

    /// The full current target set.
    pub async fn list(&self) -> RelayResult<Vec<Target>> {
        Ok(self.read_doc().await?.targets)
    }

    async fn read_doc(&self) -> RelayResult<TargetsDoc> {
        match self.store.load(TARGETS_DOC).await? {
            Some(content) => serde_json::from_str(&content)
                .map_err(|e| RelayError::Storage(format!("corrupt targets document: {e}"))),
            None => Ok(TargetsDoc::default()),
        }
    }

    async fn write_doc(&self, doc: &TargetsDoc) -> RelayResult<()> {
        let content = serde_json::to_string_pretty(doc)
            .map_err(|e| RelayError::Storage(format!("failed to encode targets: {e}")))?;
        self.store.save(TARGETS_DOC, &content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStore;

    fn registry() -> TargetRegistry {
        TargetRegistry::new(Arc::new(MemStore::new()))
    }

    #[tokio::test]
    async fn recording_same_pair_is_idempotent() {
        let registry = registry();

        assert!(registry.record(TargetKind::Group, "G1").await.unwrap());
        for _ in 0..4 {
            assert!(!registry.record(TargetKind::Group, "G1").await.unwrap());
        }

        let targets = registry.list().await.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, "G1");
    }

    #[tokio::test]
    async fn distinct_pairs_are_both_kept() {
        let registry = registry();

        registry.record(TargetKind::Group, "G1").await.unwrap();
        registry.record(TargetKind::Room, "R1").await.unwrap();

        let targets = registry.list().await.unwrap();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&Target {
            kind: TargetKind::Group,
            id: "G1".to_string(),
        }));
        assert!(targets.contains(&Target {
            kind: TargetKind::Room,
            id: "R1".to_string(),
        }));
    }

    #[tokio::test]
    async fn same_id_different_kind_is_distinct() {
        let registry = registry();

        registry.record(TargetKind::Group, "X").await.unwrap();
        registry.record(TargetKind::Room, "X").await.unwrap();

        assert_eq!(registry.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn registry_persists_through_shared_store() {
        let store: Arc<dyn Store> = Arc::new(MemStore::new());

        TargetRegistry::new(store.clone())
            .record(TargetKind::Group, "G9")
            .await
            .unwrap();

        let reopened = TargetRegistry::new(store);
        let targets = reopened.list().await.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, "G9");
    }
}
