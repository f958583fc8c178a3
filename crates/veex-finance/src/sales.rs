use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use veex_core::period::within;
use veex_core::{CatalogSnapshot, YearMonth};
use veex_costing::suggested_price;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesLine {
    pub record_id: String,
    pub date: NaiveDate,
    pub model_name: String,
    pub quantity: i64,
    pub total_cost: Decimal,
    pub sale_value: Decimal,
    pub estimated_profit: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub period: Option<YearMonth>,
    pub lines: Vec<SalesLine>,
    pub total_quantity: i64,
    pub total_profit: Decimal,
    pub quantity_by_model: BTreeMap<String, i64>,
}

/// Treats every production record as sold at its model's margin (30% once
/// the model is gone). Lines are oldest first.
pub fn sales_report(snapshot: &CatalogSnapshot, period: Option<YearMonth>) -> SalesReport {
    let mut records: Vec<_> = snapshot
        .production_history
        .iter()
        .filter(|record| within(period, record.date))
        .collect();
    records.sort_by_key(|record| record.date);

    let mut report = SalesReport {
        period,
        lines: Vec::with_capacity(records.len()),
        total_quantity: 0,
        total_profit: Decimal::ZERO,
        quantity_by_model: BTreeMap::new(),
    };

    for record in records {
        let model = snapshot.model(&record.model_id);
        let margin = model.and_then(|model| model.margin_percent);
        let suggestion = suggested_price(record.total_cost, margin);

        let model_name = if !record.model_name.is_empty() {
            record.model_name.clone()
        } else {
            model
                .map(|model| model.name.clone())
                .unwrap_or_else(|| "N/A".to_string())
        };

        report.total_quantity = report.total_quantity.saturating_add(record.quantity);
        report.total_profit = report.total_profit.saturating_add(suggestion.profit);
        let per_model = report
            .quantity_by_model
            .entry(model_name.clone())
            .or_default();
        *per_model = per_model.saturating_add(record.quantity);

        report.lines.push(SalesLine {
            record_id: record.id.clone(),
            date: record.date,
            model_name,
            quantity: record.quantity,
            total_cost: record.total_cost,
            sale_value: suggestion.price,
            estimated_profit: suggestion.profit,
        });
    }

    report
}
