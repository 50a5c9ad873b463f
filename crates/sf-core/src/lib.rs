//! Core types for Swarmfall: entity pools, ids, and the tile map model.
//!
//! This crate holds the data model the simulation kernel runs on. It knows
//! nothing about behaviour: pools hand out generation-tagged ids, the tile map
//! classifies terrain, and the map decoder turns a colour-coded pixel grid into
//! terrain plus a list of placement directives.

/// RGBA colours used by map markers and cosmetic particles.
pub mod color;
/// Entity kinds, sides, generation-tagged ids, and the common slot body.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Fixed-capacity slot pools with round-robin allocation.
pub mod pool;
/// Terrain grid and colour-coded map decoding.
pub mod tilemap;

/// Re-export of [`color::Rgba`].
pub use color::Rgba;
/// Re-export core entity types.
pub use entity::{Body, EntityId, EntityKind, HasBody, Side, TowerArchetype};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export of [`pool::EntityPool`].
pub use pool::EntityPool;
/// Re-export tile map types.
pub use tilemap::{DecodedMap, PixelGrid, Placement, Terrain, TileMap};
