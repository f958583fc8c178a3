use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amount::{lenient_amount, lenient_count, lenient_integer, lenient_optional};

pub const DEFAULT_MARGIN_PERCENT: i64 = 30;
pub const DEFAULT_EXPECTED_VOLUME: i64 = 100;

/// Material id -> material, as consumed by the costing engine.
pub type MaterialCatalog = HashMap<String, RawMaterial>;

/// Entities addressed by a string id inside the catalog document.
pub trait Keyed {
    fn key(&self) -> &str;
    fn set_key(&mut self, key: String);
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterial {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub unit_price: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub stock_on_hand: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub stock_minimum: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    pub material_id: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub recipe_lines: Vec<RecipeLine>,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub margin_percent: Option<Decimal>,
}

impl Model {
    /// Margin to price this model with; see [`resolve_margin`].
    pub fn effective_margin(&self) -> Decimal {
        resolve_margin(self.margin_percent)
    }
}

/// Absent and negative margins fall back to 30%.
pub fn resolve_margin(margin_percent: Option<Decimal>) -> Decimal {
    match margin_percent {
        Some(margin) if margin >= Decimal::ZERO => margin,
        _ => Decimal::from(DEFAULT_MARGIN_PERCENT),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FixedCost {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub monthly_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VariableCost {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub per_unit_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductionConfig {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub expected_monthly_volume: Option<i64>,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            expected_monthly_volume: Some(DEFAULT_EXPECTED_VOLUME),
        }
    }
}

impl ProductionConfig {
    /// Configured volume, or 100 when it is absent or not positive.
    pub fn effective_volume(&self) -> i64 {
        match self.expected_monthly_volume {
            Some(volume) if volume > 0 => volume,
            _ => DEFAULT_EXPECTED_VOLUME,
        }
    }

    /// Stores `volume` if positive; otherwise keeps the current effective
    /// volume. Returns the volume now in force.
    pub fn set_expected_volume(&mut self, volume: i64) -> i64 {
        let next = if volume > 0 {
            volume
        } else {
            self.effective_volume()
        };
        self.expected_monthly_volume = Some(next);
        next
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRecord {
    pub id: String,
    pub date: NaiveDate,
    pub model_id: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub quantity: i64,
    /// Batch cost frozen when the record was saved.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_cost: Decimal,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[serde(alias = "receita")]
    Income,
    #[serde(alias = "despesa")]
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    pub kind: EntryKind,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Decimal,
}

macro_rules! keyed {
    ($($entity:ty),* $(,)?) => {
        $(
            impl Keyed for $entity {
                fn key(&self) -> &str {
                    &self.id
                }

                fn set_key(&mut self, key: String) {
                    self.id = key;
                }
            }
        )*
    };
}

keyed!(
    RawMaterial,
    Model,
    FixedCost,
    VariableCost,
    ProductionRecord,
    LedgerEntry,
);

/// Indexes materials by id. The first entry wins when ids repeat.
pub fn index_materials(materials: &[RawMaterial]) -> MaterialCatalog {
    let mut catalog = MaterialCatalog::with_capacity(materials.len());
    for material in materials {
        catalog
            .entry(material.id.clone())
            .or_insert_with(|| material.clone());
    }
    catalog
}

pub fn new_id(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}
