use crate::entity::{EntityId, EntityKind};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by pools and the map decoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Every slot of the pool is occupied.
    #[error("{kind} pool exhausted ({capacity} slots)")]
    PoolExhausted {
        /// The kind whose pool is full.
        kind: EntityKind,
        /// The fixed capacity of that pool.
        capacity: usize,
    },

    /// The id refers to a slot that was freed (and possibly reused) since the id was issued.
    #[error("stale reference: {0}")]
    StaleReference(EntityId),

    /// The id belongs to a different pool.
    #[error("kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        /// The kind of the pool that was asked.
        expected: EntityKind,
        /// The kind carried by the id.
        found: EntityKind,
    },

    /// The pixel grid does not describe a usable map.
    #[error("invalid map: {0}")]
    InvalidMap(String),
}
