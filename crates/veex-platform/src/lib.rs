pub mod config;
pub mod contracts;

pub use config::ServiceConfig;
pub use contracts::{
    CatalogReplaceResponse, LedgerListResponse, MarginsInput, PriceRequest, PriceResponse,
    ProductionListResponse, SimulateRequest, SimulateResponse, VolumeRequest, VolumeResponse,
};
