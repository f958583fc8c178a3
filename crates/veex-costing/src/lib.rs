//! The unit-cost engine shared by every consumer of the catalog.

pub mod engine;
pub mod production;
pub mod snapshot;

pub use engine::{
    PriceSuggestion, UnitCostBreakdown, compute_unit_cost, parse_margin_list,
    simulate_across_margins, suggested_price,
};
pub use production::{
    ProductionDraft, ProductionError, batch_cost, filter_history, record_production,
};
pub use snapshot::{CostingContext, ModelCost, cost_model, model_cost_summaries};
