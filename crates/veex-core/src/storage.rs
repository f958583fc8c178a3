use async_trait::async_trait;

use crate::catalog::CatalogSnapshot;

/// Owner of the catalog document. Readers get a copy; writers hand back a
/// whole document and receive the new revision number.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn snapshot(&self) -> anyhow::Result<CatalogSnapshot>;
    async fn replace(&self, snapshot: CatalogSnapshot) -> anyhow::Result<u64>;
}
