use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use veex_core::amount::{decimal_from_value, lenient_integer, lenient_optional};
use veex_core::{LedgerEntry, ProductionRecord};
use veex_costing::{PriceSuggestion, parse_margin_list};
use veex_finance::LedgerSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    #[serde(default, deserialize_with = "lenient_optional")]
    pub unit_cost: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub margin_percent: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub unit_cost: Decimal,
    pub suggestion: PriceSuggestion,
}

/// Margins either as a list (`[10, "bad", 50]`) or as the comma-separated
/// text a user types (`"10, 25, 40"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarginsInput {
    Text(String),
    List(Vec<Value>),
}

impl MarginsInput {
    pub fn candidates(&self) -> Vec<Option<Decimal>> {
        match self {
            Self::Text(text) => parse_margin_list(text),
            Self::List(values) => values.iter().map(decimal_from_value).collect(),
        }
    }
}

impl Default for MarginsInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    #[serde(default, deserialize_with = "lenient_optional")]
    pub unit_cost: Option<Decimal>,
    #[serde(default)]
    pub margins: MarginsInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    pub unit_cost: Decimal,
    pub results: Vec<PriceSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRequest {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub expected_monthly_volume: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeResponse {
    pub expected_monthly_volume: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogReplaceResponse {
    pub revision: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionListResponse {
    pub items: Vec<ProductionRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerListResponse {
    pub summary: LedgerSummary,
    pub items: Vec<LedgerEntry>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn margins_accept_lists_and_text() {
        let request: SimulateRequest = serde_json::from_value(json!({
            "unitCost": 26,
            "margins": [10, "bad", 50]
        }))
        .unwrap();
        assert_eq!(
            request.margins.candidates(),
            vec![Some(Decimal::from(10)), None, Some(Decimal::from(50))]
        );

        let request: SimulateRequest = serde_json::from_value(json!({
            "unitCost": "26",
            "margins": "10, 20"
        }))
        .unwrap();
        assert_eq!(request.unit_cost, Some(Decimal::from(26)));
        assert_eq!(request.margins.candidates().len(), 2);
    }

    #[test]
    fn price_request_tolerates_garbage() {
        let request: PriceRequest = serde_json::from_value(json!({
            "unitCost": "abc",
            "marginPercent": null
        }))
        .unwrap();
        assert_eq!(request.unit_cost, None);
        assert_eq!(request.margin_percent, None);
    }
}
