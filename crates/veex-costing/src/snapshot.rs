use serde::Serialize;
use veex_core::{CatalogSnapshot, FixedCost, MaterialCatalog, Model, VariableCost};

use crate::engine::{PriceSuggestion, UnitCostBreakdown, compute_unit_cost, suggested_price};

/// Borrowed costing inputs taken from one catalog snapshot, so a batch of
/// models shares a single material index.
pub struct CostingContext<'a> {
    materials: MaterialCatalog,
    fixed_costs: &'a [FixedCost],
    variable_costs: &'a [VariableCost],
    expected_monthly_volume: i64,
}

impl<'a> CostingContext<'a> {
    pub fn from_snapshot(snapshot: &'a CatalogSnapshot) -> Self {
        Self {
            materials: snapshot.material_catalog(),
            fixed_costs: &snapshot.fixed_costs,
            variable_costs: &snapshot.variable_costs,
            expected_monthly_volume: snapshot.expected_volume(),
        }
    }

    pub fn unit_cost(&self, model: &Model) -> UnitCostBreakdown {
        compute_unit_cost(
            model,
            &self.materials,
            self.fixed_costs,
            self.variable_costs,
            self.expected_monthly_volume,
        )
    }

    pub fn model_cost(&self, model: &Model) -> ModelCost {
        let breakdown = self.unit_cost(model);
        ModelCost {
            model_id: model.id.clone(),
            model_name: model.name.clone(),
            reference: model.reference.clone(),
            breakdown,
            suggestion: suggested_price(breakdown.unit_cost, model.margin_percent),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelCost {
    pub model_id: String,
    pub model_name: String,
    pub reference: Option<String>,
    pub breakdown: UnitCostBreakdown,
    pub suggestion: PriceSuggestion,
}

pub fn cost_model(snapshot: &CatalogSnapshot, model_id: &str) -> Option<ModelCost> {
    let model = snapshot.model(model_id)?;
    Some(CostingContext::from_snapshot(snapshot).model_cost(model))
}

/// Costs models in catalog order, optionally only the first `limit`.
pub fn model_cost_summaries(snapshot: &CatalogSnapshot, limit: Option<usize>) -> Vec<ModelCost> {
    let context = CostingContext::from_snapshot(snapshot);
    snapshot
        .models
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|model| context.model_cost(model))
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::from_json(
            r#"{
                "materials": [
                    { "id": "m1", "name": "Couro", "unitPrice": 10 },
                    { "id": "m2", "name": "Solado", "unitPrice": "4.5" }
                ],
                "models": [
                    {
                        "id": "a",
                        "name": "Scarpin",
                        "reference": "SC-01",
                        "recipeLines": [{ "materialId": "m1", "quantity": 2 }],
                        "marginPercent": 30
                    },
                    {
                        "id": "b",
                        "name": "Bota",
                        "recipeLines": [
                            { "materialId": "m1", "quantity": 3 },
                            { "materialId": "m2", "quantity": 2 }
                        ],
                        "marginPercent": "fifty"
                    }
                ],
                "fixedCosts": [{ "id": "cf1", "monthlyAmount": 500 }],
                "variableCosts": [{ "id": "cv1", "perUnitAmount": 1 }],
                "config": { "expectedMonthlyVolume": 100 }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn costs_a_model_from_the_snapshot() {
        let cost = cost_model(&snapshot(), "a").unwrap();

        assert_eq!(cost.breakdown.unit_cost, Decimal::from(26));
        assert_eq!(cost.suggestion.price, Decimal::new(338, 1));
        assert_eq!(cost.reference.as_deref(), Some("SC-01"));
    }

    #[test]
    fn unknown_model_has_no_cost() {
        assert!(cost_model(&snapshot(), "zzz").is_none());
    }

    #[test]
    fn summaries_respect_limit_and_default_margin() {
        let snapshot = snapshot();
        let all = model_cost_summaries(&snapshot, None);
        assert_eq!(all.len(), 2);

        // 30 + 9 materials, 5 fixed, 1 variable
        assert_eq!(all[1].breakdown.unit_cost, Decimal::from(45));
        assert_eq!(all[1].suggestion.margin_percent, Decimal::from(30));
        assert_eq!(all[1].suggestion.price, Decimal::new(585, 1));

        let first = model_cost_summaries(&snapshot, Some(1));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].model_id, "a");
    }

    #[test]
    fn zero_volume_in_document_falls_back_to_default() {
        let mut snapshot = snapshot();
        snapshot.config.expected_monthly_volume = Some(0);

        let cost = cost_model(&snapshot, "a").unwrap();
        assert_eq!(cost.breakdown.fixed_dilution, Decimal::from(5));
    }
}
