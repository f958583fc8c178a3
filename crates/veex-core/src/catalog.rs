use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::models::{
    FixedCost, LedgerEntry, MaterialCatalog, Model, ProductionConfig, ProductionRecord,
    RawMaterial, VariableCost, index_materials,
};

/// The whole business document. Every computation works on one snapshot
/// and never writes back into it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub materials: Vec<RawMaterial>,
    #[serde(default)]
    pub models: Vec<Model>,
    #[serde(default)]
    pub fixed_costs: Vec<FixedCost>,
    #[serde(default)]
    pub variable_costs: Vec<VariableCost>,
    #[serde(default)]
    pub config: ProductionConfig,
    #[serde(default, deserialize_with = "skip_bad_rows")]
    pub production_history: Vec<ProductionRecord>,
    #[serde(default, deserialize_with = "skip_bad_rows")]
    pub ledger: Vec<LedgerEntry>,
}

/// Rows that do not parse (a garbled date, an unknown entry kind) are
/// dropped one by one instead of rejecting the whole document.
fn skip_bad_rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let rows = match Value::deserialize(deserializer)? {
        Value::Array(rows) => rows,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!(found = %other, "expected a list of rows, ignoring");
            return Ok(Vec::new());
        }
    };

    Ok(rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(index, error = %err, "skipping unreadable catalog row");
                None
            }
        })
        .collect())
}

impl CatalogSnapshot {
    pub fn from_json(document: &str) -> Result<Self> {
        serde_json::from_str(document).context("catalog document is not valid JSON")
    }

    pub fn material_catalog(&self) -> MaterialCatalog {
        index_materials(&self.materials)
    }

    pub fn model(&self, model_id: &str) -> Option<&Model> {
        self.models.iter().find(|model| model.id == model_id)
    }

    pub fn expected_volume(&self) -> i64 {
        self.config.effective_volume()
    }
}
