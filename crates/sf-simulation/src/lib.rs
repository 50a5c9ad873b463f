//! Frame-driven tower-defense simulation kernel for Swarmfall.
//!
//! A [`World`] holds one fixed-capacity pool per entity kind plus the
//! terrain, a uniform-grid [`SpatialIndex`] over minions, a seeded RNG, and an
//! [`EventLog`]. Each frame the world updates every live entity kind by kind,
//! then rebuilds the spatial index. The [`Simulation`] wraps a world with the
//! level table, player input, and level transitions. Nothing here draws or
//! plays sounds: hosts consume [`render::draw_list`] and
//! [`SimEventKind::SoundRequested`] events.

/// Area-of-effect detonations.
pub mod area;
/// The per-kind behaviour trait.
pub mod behavior;
/// Simulation clock for tracking ticks and elapsed time.
pub mod clock;
/// Configuration types for simulation runs.
pub mod config;
/// Particle recipes.
pub mod effects;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Level table, manifest loading, and map sources.
pub mod level;
/// Walking units of both sides.
pub mod minion;
/// Cosmetic particles.
pub mod particle;
/// Arrows, shells, and their flight arc.
pub mod projectile;
/// Draw commands and depth ordering.
pub mod render;
/// Top-level simulation orchestrator.
pub mod simulation;
/// Uniform-grid spatial index over minions.
pub mod spatial;
/// Target selection and claims.
pub mod targeting;
/// Towers and their firing logic.
pub mod tower;
/// Proximity mines.
pub mod trap;
/// The container for all live entities of a level.
pub mod world;

/// Re-export of [`behavior::Behavior`].
pub use behavior::Behavior;
/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-exports of configuration types.
pub use config::{Capacities, SimConfig, TowerStats, TransitionTimes};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of event types.
pub use event::{EventLog, LevelRequest, SimEvent, SimEventKind, SoundCue};
/// Re-exports of level types.
pub use level::{ImageMapSource, LevelManifest, LevelSpec, MapSource};
/// Re-exports of entity records.
pub use minion::Minion;
pub use particle::{Particle, ParticleSprite};
pub use projectile::{ArcProfile, Projectile, ProjectileKind};
/// Re-exports of render types.
pub use render::{DrawCommand, Sprite, draw_list, render_order, squash_scale};
/// Re-export of [`simulation::Simulation`].
pub use simulation::{Simulation, Transition};
/// Re-export of [`spatial::SpatialIndex`].
pub use spatial::{SideFilter, SpatialIndex};
pub use tower::Tower;
pub use trap::Trap;
/// Re-export of [`world::World`].
pub use world::World;
