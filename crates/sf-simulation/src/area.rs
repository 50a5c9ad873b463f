//! Blasts that wipe out every minion in a radius.

use glam::Vec2;
use tracing::debug;

use crate::effects;
use crate::event::{SimEventKind, SoundCue};
use crate::spatial::SideFilter;
use crate::world::World;

/// Destroy every minion of either side within `radius` of `center`.
///
/// Negative radii count as zero. Spawns the explosion effect and returns how
/// many minions died.
pub fn detonate(world: &mut World, center: Vec2, radius: f32) -> usize {
    let radius = radius.max(0.0);
    let victims = world
        .spatial
        .query(&world.minions, center, radius, SideFilter::Both);
    let killed = victims.into_iter().filter(|id| world.destroy(*id)).count();

    effects::explosion(world, center, radius);
    world.sound(SoundCue::Explosion, center, 1.0, 1.0);
    world.emit(
        SimEventKind::Detonation {
            center,
            radius,
            killed,
        },
        format!(
            "detonation at ({:.0}, {:.0}) r={radius:.0} killed {killed}",
            center.x, center.y
        ),
    );
    debug!(killed, radius, "detonation");
    killed
}
