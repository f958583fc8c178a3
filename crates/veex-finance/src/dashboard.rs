use rust_decimal::Decimal;
use serde::Serialize;
use veex_core::{CatalogSnapshot, YearMonth};
use veex_costing::{ModelCost, model_cost_summaries, suggested_price};
use veex_inventory::{StockAlert, low_stock_alerts};

use crate::ledger::balance;

/// How many models the dashboard prices.
pub const DASHBOARD_MODEL_LIMIT: usize = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub period: YearMonth,
    pub month_production: i64,
    /// Production is assumed sold at each model's margin.
    pub month_estimated_profit: Decimal,
    pub balance: Decimal,
    pub stock_alerts: Vec<StockAlert>,
    pub model_costs: Vec<ModelCost>,
    pub models_total: usize,
}

pub fn dashboard(snapshot: &CatalogSnapshot, period: YearMonth) -> Dashboard {
    let month_records = snapshot
        .production_history
        .iter()
        .filter(|record| period.contains(record.date));

    let mut month_production = 0i64;
    let mut month_estimated_profit = Decimal::ZERO;
    for record in month_records {
        month_production = month_production.saturating_add(record.quantity.max(0));

        if record.quantity <= 0 {
            continue;
        }
        // records of deleted models carry no margin to estimate with
        if let Some(model) = snapshot.model(&record.model_id) {
            let profit = suggested_price(record.total_cost, model.margin_percent).profit;
            month_estimated_profit = month_estimated_profit.saturating_add(profit);
        }
    }

    Dashboard {
        period,
        month_production,
        month_estimated_profit,
        balance: balance(&snapshot.ledger),
        stock_alerts: low_stock_alerts(&snapshot.materials),
        model_costs: model_cost_summaries(snapshot, Some(DASHBOARD_MODEL_LIMIT)),
        models_total: snapshot.models.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::from_json(
            r#"{
                "materials": [
                    { "id": "m1", "name": "Couro", "unitPrice": 10, "stockOnHand": 2, "stockMinimum": 5 },
                    { "id": "m2", "name": "Linha", "unitPrice": 1, "stockOnHand": 90, "stockMinimum": 5 }
                ],
                "models": [
                    { "id": "a", "name": "A", "recipeLines": [{ "materialId": "m1", "quantity": 2 }], "marginPercent": 50 },
                    { "id": "b", "name": "B" },
                    { "id": "c", "name": "C" },
                    { "id": "d", "name": "D" }
                ],
                "productionHistory": [
                    { "id": "p1", "date": "2026-03-02", "modelId": "a", "quantity": 10, "totalCost": 200 },
                    { "id": "p2", "date": "2026-03-09", "modelId": "gone", "quantity": 4, "totalCost": 100 },
                    { "id": "p3", "date": "2026-02-27", "modelId": "a", "quantity": 7, "totalCost": 140 }
                ],
                "ledger": [
                    { "id": "f1", "date": "2026-01-10", "kind": "income", "amount": 1000 },
                    { "id": "f2", "date": "2026-03-10", "kind": "expense", "amount": 250 }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn builds_month_kpis() {
        let march = YearMonth::new(2026, 3).unwrap();
        let board = dashboard(&snapshot(), march);

        assert_eq!(board.month_production, 14);
        assert_eq!(board.month_estimated_profit, Decimal::from(100));
        assert_eq!(board.balance, Decimal::from(750));
    }

    #[test]
    fn lists_alerts_and_first_models() {
        let march = YearMonth::new(2026, 3).unwrap();
        let board = dashboard(&snapshot(), march);

        assert_eq!(board.stock_alerts.len(), 1);
        assert_eq!(board.stock_alerts[0].material_id, "m1");
        assert_eq!(board.model_costs.len(), DASHBOARD_MODEL_LIMIT);
        assert_eq!(board.models_total, 4);
    }

    #[test]
    fn empty_catalog_yields_zeroes() {
        let march = YearMonth::new(2026, 3).unwrap();
        let board = dashboard(&CatalogSnapshot::default(), march);

        assert_eq!(board.month_production, 0);
        assert_eq!(board.month_estimated_profit, Decimal::ZERO);
        assert_eq!(board.balance, Decimal::ZERO);
        assert!(board.stock_alerts.is_empty());
        assert!(board.model_costs.is_empty());
    }
}
