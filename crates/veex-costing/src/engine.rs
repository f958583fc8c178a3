use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use veex_core::amount::parse_decimal_prefix;
use veex_core::{FixedCost, MaterialCatalog, Model, VariableCost, resolve_margin};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnitCostBreakdown {
    pub material_cost: Decimal,
    pub fixed_dilution: Decimal,
    pub variable_cost: Decimal,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PriceSuggestion {
    pub margin_percent: Decimal,
    pub profit: Decimal,
    pub price: Decimal,
}

/// Cost of producing one unit of `model`.
///
/// Recipe lines pointing at unknown materials are skipped, and a
/// non-positive `expected_monthly_volume` dilutes fixed costs to zero.
/// Nothing here fails: bad data only lowers the result.
pub fn compute_unit_cost(
    model: &Model,
    materials: &MaterialCatalog,
    fixed_costs: &[FixedCost],
    variable_costs: &[VariableCost],
    expected_monthly_volume: i64,
) -> UnitCostBreakdown {
    let material_cost = model
        .recipe_lines
        .iter()
        .filter_map(|line| match materials.get(&line.material_id) {
            Some(material) => Some(material.unit_price.saturating_mul(line.quantity)),
            None => {
                debug!(
                    model_id = %model.id,
                    material_id = %line.material_id,
                    "recipe line references unknown material, skipping"
                );
                None
            }
        })
        .fold(Decimal::ZERO, Decimal::saturating_add);

    let monthly_fixed = fixed_costs
        .iter()
        .map(|cost| cost.monthly_amount)
        .fold(Decimal::ZERO, Decimal::saturating_add);

    let fixed_dilution = if expected_monthly_volume > 0 {
        monthly_fixed / Decimal::from(expected_monthly_volume)
    } else {
        Decimal::ZERO
    };

    let variable_cost = variable_costs
        .iter()
        .map(|cost| cost.per_unit_amount)
        .fold(Decimal::ZERO, Decimal::saturating_add);

    UnitCostBreakdown {
        material_cost,
        fixed_dilution,
        variable_cost,
        unit_cost: material_cost
            .saturating_add(fixed_dilution)
            .saturating_add(variable_cost),
    }
}

/// Sale price for `unit_cost` marked up by `margin_percent` (30 when absent
/// or negative). A negative `unit_cost` is priced as given.
pub fn suggested_price(unit_cost: Decimal, margin_percent: Option<Decimal>) -> PriceSuggestion {
    let margin_percent = resolve_margin(margin_percent);
    let profit = unit_cost.saturating_mul(margin_percent) / Decimal::ONE_HUNDRED;

    PriceSuggestion {
        margin_percent,
        profit,
        price: unit_cost.saturating_add(profit),
    }
}

/// Prices `unit_cost` at every usable margin, in input order. Missing and
/// negative margins are dropped rather than defaulted.
pub fn simulate_across_margins<I>(unit_cost: Decimal, margins: I) -> Vec<PriceSuggestion>
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    margins
        .into_iter()
        .flatten()
        .filter(|margin| *margin >= Decimal::ZERO)
        .map(|margin| suggested_price(unit_cost, Some(margin)))
        .collect()
}

/// Splits comma-separated margin text (`"10, 25.5, 40"`) into candidates.
pub fn parse_margin_list(text: &str) -> Vec<Option<Decimal>> {
    text.split(',').map(parse_decimal_prefix).collect()
}
