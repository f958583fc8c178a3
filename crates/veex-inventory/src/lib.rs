use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use veex_core::RawMaterial;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLevel {
    Ok,
    /// Within 20% above the minimum.
    Attention,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub material_id: String,
    pub name: String,
    pub unit: String,
    pub stock_on_hand: Decimal,
    pub stock_minimum: Decimal,
}

/// Classification used by the material listing. A material without a
/// minimum is never flagged.
pub fn stock_level(material: &RawMaterial) -> StockLevel {
    let minimum = material.stock_minimum;
    if minimum <= Decimal::ZERO {
        return StockLevel::Ok;
    }
    if material.stock_on_hand <= minimum {
        StockLevel::Low
    } else if material.stock_on_hand <= minimum * Decimal::new(12, 1) {
        StockLevel::Attention
    } else {
        StockLevel::Ok
    }
}

/// Materials at or below their minimum, in catalog order.
pub fn low_stock_alerts(materials: &[RawMaterial]) -> Vec<StockAlert> {
    materials
        .iter()
        .filter(|material| material.stock_on_hand <= material.stock_minimum)
        .map(|material| StockAlert {
            material_id: material.id.clone(),
            name: material.name.clone(),
            unit: material.unit.clone(),
            stock_on_hand: material.stock_on_hand,
            stock_minimum: material.stock_minimum,
        })
        .collect()
}

pub fn inventory_value(materials: &[RawMaterial]) -> Decimal {
    materials
        .iter()
        .map(|material| material.stock_on_hand.saturating_mul(material.unit_price))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}
