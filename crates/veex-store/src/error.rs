use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Material,
    Model,
    FixedCost,
    VariableCost,
    ProductionRecord,
    LedgerEntry,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Material => "material",
            Self::Model => "model",
            Self::FixedCost => "fixed cost",
            Self::VariableCost => "variable cost",
            Self::ProductionRecord => "production record",
            Self::LedgerEntry => "ledger entry",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("invalid {kind}: {reason}")]
    Invalid { kind: EntityKind, reason: String },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
