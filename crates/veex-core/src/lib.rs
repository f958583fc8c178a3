pub mod amount;
pub mod catalog;
pub mod models;
pub mod period;
pub mod storage;

pub use catalog::CatalogSnapshot;
pub use models::{
    DEFAULT_EXPECTED_VOLUME, DEFAULT_MARGIN_PERCENT, EntryKind, FixedCost, Keyed, LedgerEntry,
    MaterialCatalog, Model, ProductionConfig, ProductionRecord, RawMaterial, RecipeLine,
    VariableCost, index_materials, new_id, resolve_margin,
};
pub use period::{PeriodError, YearMonth};
pub use storage::CatalogStore;
