use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use veex_core::period::within;
use veex_core::{CatalogSnapshot, ProductionRecord, YearMonth, new_id};

use crate::snapshot::CostingContext;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProductionError {
    #[error("model `{0}` does not exist")]
    UnknownModel(String),
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),
}

/// A production run as submitted, before its cost is frozen.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionDraft {
    /// Present when editing an existing record.
    #[serde(default)]
    pub id: Option<String>,
    pub date: NaiveDate,
    pub model_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Estimated cost of a batch; zero when `quantity` is not positive.
pub fn batch_cost(unit_cost: Decimal, quantity: i64) -> Decimal {
    if quantity <= 0 {
        return Decimal::ZERO;
    }
    unit_cost.saturating_mul(Decimal::from(quantity))
}

/// Builds the history record for `draft`, pricing the batch with the
/// catalog as it stands now.
pub fn record_production(
    snapshot: &CatalogSnapshot,
    draft: ProductionDraft,
) -> Result<ProductionRecord, ProductionError> {
    if draft.quantity <= 0 {
        return Err(ProductionError::NonPositiveQuantity(draft.quantity));
    }
    let model = snapshot
        .model(&draft.model_id)
        .ok_or_else(|| ProductionError::UnknownModel(draft.model_id.clone()))?;

    let unit_cost = CostingContext::from_snapshot(snapshot)
        .unit_cost(model)
        .unit_cost;

    Ok(ProductionRecord {
        id: draft.id.unwrap_or_else(|| new_id("hp_")),
        date: draft.date,
        model_id: model.id.clone(),
        model_name: model.name.clone(),
        reference: model
            .reference
            .clone()
            .filter(|reference| !reference.trim().is_empty())
            .unwrap_or_else(|| "N/A".to_string()),
        quantity: draft.quantity,
        total_cost: batch_cost(unit_cost, draft.quantity),
        notes: draft.notes.unwrap_or_default(),
    })
}

/// Records for `model_id` within `period`, newest first.
pub fn filter_history<'a>(
    records: &'a [ProductionRecord],
    model_id: Option<&str>,
    period: Option<YearMonth>,
) -> Vec<&'a ProductionRecord> {
    let mut matching: Vec<&ProductionRecord> = records
        .iter()
        .filter(|record| model_id.is_none_or(|id| record.model_id == id))
        .filter(|record| within(period, record.date))
        .collect();
    matching.sort_by(|a, b| b.date.cmp(&a.date));
    matching
}
