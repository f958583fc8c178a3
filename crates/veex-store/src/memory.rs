use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use veex_core::{CatalogSnapshot, CatalogStore};

/// Keeps the catalog document in process memory.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    document: RwLock<CatalogSnapshot>,
    revision: RwLock<u64>,
}

impl InMemoryCatalogStore {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            document: RwLock::new(snapshot),
            revision: RwLock::new(0),
        }
    }

    pub fn from_json(document: &str) -> anyhow::Result<Self> {
        Ok(Self::new(CatalogSnapshot::from_json(document)?))
    }

    pub async fn revision(&self) -> u64 {
        *self.revision.read().await
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn snapshot(&self) -> anyhow::Result<CatalogSnapshot> {
        Ok(self.document.read().await.clone())
    }

    async fn replace(&self, snapshot: CatalogSnapshot) -> anyhow::Result<u64> {
        let mut revision_guard = self.revision.write().await;
        *revision_guard += 1;

        let mut document = self.document.write().await;
        *document = snapshot;

        debug!(revision = *revision_guard, "catalog replaced");
        Ok(*revision_guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replace_bumps_revision_and_is_visible() {
        let store = InMemoryCatalogStore::default();
        assert_eq!(store.revision().await, 0);

        let mut snapshot = store.snapshot().await.unwrap();
        snapshot.config.set_expected_volume(250);

        assert_eq!(store.replace(snapshot).await.unwrap(), 1);
        assert_eq!(store.snapshot().await.unwrap().expected_volume(), 250);
        assert_eq!(store.revision().await, 1);
    }

    #[tokio::test]
    async fn seeds_from_json() {
        let store =
            InMemoryCatalogStore::from_json(r#"{ "materials": [{ "id": "m1" }] }"#).unwrap();
        assert_eq!(store.snapshot().await.unwrap().materials.len(), 1);
    }
}
