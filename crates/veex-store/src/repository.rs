use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info};
use veex_core::{
    CatalogSnapshot, CatalogStore, FixedCost, Keyed, LedgerEntry, Model, ProductionRecord,
    RawMaterial, VariableCost, new_id,
};

use crate::error::{EntityKind, StoreError, StoreResult};

/// Per-entity access to the catalog document.
///
/// Every write loads the whole document, changes one entity and replaces
/// the document while holding the write lock, so writes through clones of
/// one repository are serialized. Two writes to the same entity: the last
/// one wins.
#[derive(Clone)]
pub struct CatalogRepository {
    store: Arc<dyn CatalogStore>,
    writer: Arc<Mutex<()>>,
}

impl CatalogRepository {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub async fn snapshot(&self) -> StoreResult<CatalogSnapshot> {
        Ok(self.store.snapshot().await?)
    }

    pub async fn replace(&self, snapshot: CatalogSnapshot) -> StoreResult<u64> {
        let _guard = self.writer.lock().await;
        let revision = self.store.replace(snapshot).await?;
        info!(revision, "catalog document replaced");
        Ok(revision)
    }

    pub async fn save_material(&self, material: RawMaterial) -> StoreResult<RawMaterial> {
        let kind = EntityKind::Material;
        non_negative(kind, "unit price", material.unit_price)?;
        non_negative(kind, "stock on hand", material.stock_on_hand)?;
        non_negative(kind, "stock minimum", material.stock_minimum)?;
        self.save(kind, "ins_", material, materials).await
    }

    pub async fn delete_material(&self, id: &str) -> StoreResult<RawMaterial> {
        self.delete(EntityKind::Material, id, materials).await
    }

    pub async fn save_model(&self, model: Model) -> StoreResult<Model> {
        let kind = EntityKind::Model;
        if model.name.trim().is_empty() {
            return Err(invalid(kind, "name is required"));
        }
        if let Some(line) = model
            .recipe_lines
            .iter()
            .find(|line| line.quantity <= Decimal::ZERO)
        {
            return Err(invalid(
                kind,
                format!("quantity of `{}` must be positive", line.material_id),
            ));
        }
        self.save(kind, "mod_", model, models).await
    }

    pub async fn delete_model(&self, id: &str) -> StoreResult<Model> {
        self.delete(EntityKind::Model, id, models).await
    }

    pub async fn save_fixed_cost(&self, cost: FixedCost) -> StoreResult<FixedCost> {
        let kind = EntityKind::FixedCost;
        non_negative(kind, "monthly amount", cost.monthly_amount)?;
        self.save(kind, "cf_", cost, fixed_costs).await
    }

    pub async fn delete_fixed_cost(&self, id: &str) -> StoreResult<FixedCost> {
        self.delete(EntityKind::FixedCost, id, fixed_costs).await
    }

    pub async fn save_variable_cost(&self, cost: VariableCost) -> StoreResult<VariableCost> {
        let kind = EntityKind::VariableCost;
        non_negative(kind, "per-unit amount", cost.per_unit_amount)?;
        self.save(kind, "cv_", cost, variable_costs).await
    }

    pub async fn delete_variable_cost(&self, id: &str) -> StoreResult<VariableCost> {
        self.delete(EntityKind::VariableCost, id, variable_costs).await
    }

    pub async fn save_production(&self, record: ProductionRecord) -> StoreResult<ProductionRecord> {
        self.save(EntityKind::ProductionRecord, "hp_", record, production_history)
            .await
    }

    pub async fn delete_production(&self, id: &str) -> StoreResult<ProductionRecord> {
        self.delete(EntityKind::ProductionRecord, id, production_history)
            .await
    }

    pub async fn save_ledger_entry(&self, entry: LedgerEntry) -> StoreResult<LedgerEntry> {
        let kind = EntityKind::LedgerEntry;
        non_negative(kind, "amount", entry.amount)?;
        self.save(kind, "fin_", entry, ledger).await
    }

    pub async fn delete_ledger_entry(&self, id: &str) -> StoreResult<LedgerEntry> {
        self.delete(EntityKind::LedgerEntry, id, ledger).await
    }

    /// Returns the volume in force afterwards; non-positive input keeps
    /// the previous value.
    pub async fn set_expected_volume(&self, volume: i64) -> StoreResult<i64> {
        let applied = self
            .mutate(move |snapshot| Ok(snapshot.config.set_expected_volume(volume)))
            .await?;
        info!(requested = volume, applied, "expected monthly volume updated");
        Ok(applied)
    }

    async fn mutate<T, F>(&self, apply: F) -> StoreResult<T>
    where
        F: FnOnce(&mut CatalogSnapshot) -> StoreResult<T> + Send,
        T: Send,
    {
        let _guard = self.writer.lock().await;
        let mut snapshot = self.store.snapshot().await?;
        let outcome = apply(&mut snapshot)?;
        self.store.replace(snapshot).await?;
        Ok(outcome)
    }

    async fn save<E>(
        &self,
        kind: EntityKind,
        prefix: &str,
        mut entity: E,
        collection: fn(&mut CatalogSnapshot) -> &mut Vec<E>,
    ) -> StoreResult<E>
    where
        E: Keyed + Clone + Send,
    {
        if entity.key().trim().is_empty() {
            entity.set_key(new_id(prefix));
        }
        let saved = entity.clone();

        let replaced = self
            .mutate(move |snapshot| {
                let items = collection(snapshot);
                let key = entity.key().to_string();
                match items.iter_mut().find(|item| item.key() == key) {
                    Some(existing) => {
                        *existing = entity;
                        Ok(true)
                    }
                    None => {
                        items.push(entity);
                        Ok(false)
                    }
                }
            })
            .await?;

        debug!(%kind, id = saved.key(), replaced, "entity saved");
        Ok(saved)
    }

    async fn delete<E>(
        &self,
        kind: EntityKind,
        id: &str,
        collection: fn(&mut CatalogSnapshot) -> &mut Vec<E>,
    ) -> StoreResult<E>
    where
        E: Keyed + Send,
    {
        let id = id.to_string();
        let removed = self
            .mutate(move |snapshot| {
                let items = collection(snapshot);
                let position = items
                    .iter()
                    .position(|item| item.key() == id)
                    .ok_or_else(|| StoreError::NotFound {
                        kind,
                        id: id.clone(),
                    })?;
                Ok(items.remove(position))
            })
            .await?;

        debug!(%kind, id = removed.key(), "entity deleted");
        Ok(removed)
    }
}

fn invalid(kind: EntityKind, reason: impl Into<String>) -> StoreError {
    StoreError::Invalid {
        kind,
        reason: reason.into(),
    }
}

fn non_negative(kind: EntityKind, field: &str, value: Decimal) -> StoreResult<()> {
    if value < Decimal::ZERO {
        return Err(invalid(kind, format!("{field} must not be negative")));
    }
    Ok(())
}

fn materials(snapshot: &mut CatalogSnapshot) -> &mut Vec<RawMaterial> {
    &mut snapshot.materials
}

fn models(snapshot: &mut CatalogSnapshot) -> &mut Vec<Model> {
    &mut snapshot.models
}

fn fixed_costs(snapshot: &mut CatalogSnapshot) -> &mut Vec<FixedCost> {
    &mut snapshot.fixed_costs
}

fn variable_costs(snapshot: &mut CatalogSnapshot) -> &mut Vec<VariableCost> {
    &mut snapshot.variable_costs
}

fn production_history(snapshot: &mut CatalogSnapshot) -> &mut Vec<ProductionRecord> {
    &mut snapshot.production_history
}

fn ledger(snapshot: &mut CatalogSnapshot) -> &mut Vec<LedgerEntry> {
    &mut snapshot.ledger
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use veex_core::{EntryKind, RecipeLine};

    use super::*;
    use crate::memory::InMemoryCatalogStore;

    fn repository() -> (Arc<InMemoryCatalogStore>, CatalogRepository) {
        let store = Arc::new(InMemoryCatalogStore::default());
        let repository = CatalogRepository::new(store.clone());
        (store, repository)
    }

    fn material(id: &str, unit_price: i64) -> RawMaterial {
        RawMaterial {
            id: id.to_string(),
            name: "Couro".to_string(),
            unit: "m²".to_string(),
            unit_price: Decimal::from(unit_price),
            stock_on_hand: Decimal::from(10),
            stock_minimum: Decimal::from(2),
        }
    }

    #[tokio::test]
    async fn save_assigns_ids_and_overwrites_existing() {
        let (store, repository) = repository();

        let created = repository.save_material(material("", 10)).await.unwrap();
        assert!(created.id.starts_with("ins_"));

        let updated = repository
            .save_material(RawMaterial {
                unit_price: Decimal::from(12),
                ..created.clone()
            })
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);

        let snapshot = repository.snapshot().await.unwrap();
        assert_eq!(snapshot.materials.len(), 1);
        assert_eq!(snapshot.materials[0].unit_price, Decimal::from(12));
        assert_eq!(store.revision().await, 2);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found_and_leaves_document_alone() {
        let (store, repository) = repository();

        let err = repository.delete_model("ghost").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                kind: EntityKind::Model,
                ..
            }
        ));
        assert_eq!(err.to_string(), "model `ghost` not found");
        assert_eq!(store.revision().await, 0);
    }

    #[tokio::test]
    async fn delete_returns_removed_entity() {
        let (_, repository) = repository();
        repository.save_material(material("m1", 10)).await.unwrap();

        let removed = repository.delete_material("m1").await.unwrap();
        assert_eq!(removed.id, "m1");
        assert!(repository.snapshot().await.unwrap().materials.is_empty());
    }

    #[tokio::test]
    async fn rejects_negative_amounts_and_unnamed_models() {
        let (_, repository) = repository();

        let err = repository.save_material(material("m1", -1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid { .. }));

        let model = Model {
            id: String::new(),
            name: "  ".to_string(),
            reference: None,
            recipe_lines: Vec::new(),
            margin_percent: None,
        };
        assert!(matches!(
            repository.save_model(model.clone()).await,
            Err(StoreError::Invalid { .. })
        ));

        let zero_line = Model {
            name: "Bota".to_string(),
            recipe_lines: vec![RecipeLine {
                material_id: "m1".to_string(),
                quantity: Decimal::ZERO,
            }],
            ..model
        };
        assert!(matches!(
            repository.save_model(zero_line).await,
            Err(StoreError::Invalid { .. })
        ));
    }

    #[tokio::test]
    async fn volume_update_keeps_previous_value_when_not_positive() {
        let (_, repository) = repository();

        assert_eq!(repository.set_expected_volume(300).await.unwrap(), 300);
        assert_eq!(repository.set_expected_volume(0).await.unwrap(), 300);
        assert_eq!(repository.snapshot().await.unwrap().expected_volume(), 300);
    }

    #[tokio::test]
    async fn ledger_entries_round_trip_through_the_store() {
        let (_, repository) = repository();
        let entry = repository
            .save_ledger_entry(LedgerEntry {
                id: String::new(),
                date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                description: "Venda feira".to_string(),
                kind: EntryKind::Income,
                amount: Decimal::from(900),
            })
            .await
            .unwrap();

        assert!(entry.id.starts_with("fin_"));
        assert_eq!(repository.snapshot().await.unwrap().ledger, vec![entry.clone()]);
        repository.delete_ledger_entry(&entry.id).await.unwrap();
        assert!(repository.snapshot().await.unwrap().ledger.is_empty());
    }

    /// Hands control back to the scheduler between load and replace so
    /// unsynchronized writers would interleave.
    struct YieldingStore(InMemoryCatalogStore);

    #[async_trait::async_trait]
    impl CatalogStore for YieldingStore {
        async fn snapshot(&self) -> anyhow::Result<CatalogSnapshot> {
            let snapshot = self.0.snapshot().await?;
            tokio::task::yield_now().await;
            Ok(snapshot)
        }

        async fn replace(&self, snapshot: CatalogSnapshot) -> anyhow::Result<u64> {
            self.0.replace(snapshot).await
        }
    }

    #[tokio::test]
    async fn concurrent_saves_of_distinct_entities_all_persist() {
        let repository =
            CatalogRepository::new(Arc::new(YieldingStore(InMemoryCatalogStore::default())));

        let handles: Vec<_> = (0..50)
            .map(|n| {
                let repository = repository.clone();
                tokio::spawn(async move {
                    repository
                        .save_material(material(&format!("m{n}"), 10))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repository.snapshot().await.unwrap().materials.len(), 50);
    }
}
