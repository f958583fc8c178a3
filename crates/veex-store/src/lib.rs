mod error;
mod memory;
mod repository;

pub use error::{EntityKind, StoreError};
pub use memory::InMemoryCatalogStore;
pub use repository::CatalogRepository;
