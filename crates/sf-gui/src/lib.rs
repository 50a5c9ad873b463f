//! Windowed host for Swarmfall.
//!
//! Drives a [`sf_simulation::Simulation`] once per frame, paints its draw
//! list with macroquad shapes, and forwards pointer and key input.

/// Pointer and key handling.
pub mod input;
/// Terrain, entity, and HUD painting.
pub mod scene;
/// Colours and the map camera.
pub mod theme;
