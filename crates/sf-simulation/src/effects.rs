//! Particle recipes for dust, explosions, and tower rubble.

use glam::{Vec2, Vec3};
use rand::Rng;
use sf_core::Rgba;

use crate::particle::{Particle, ParticleSprite};
use crate::render::{FLASH_SPRITE_SIZE, palette};
use crate::world::World;

const DEBRIS_PER_BLAST: usize = 40;
const BRICKS_PER_TOWER: usize = 6;

/// Two puffs kicked up where a minion appears.
pub fn kick_dust(world: &mut World, position: Vec2) {
    for side in [-1.0, 1.0] {
        let particle = Particle::new(
            ParticleSprite::Dust,
            position + Vec2::new(10.0 * side, 0.0),
            5.0,
            1.0,
        )
        .with_velocity(Vec3::new(20.0 * side, 0.0, 0.0))
        .with_acceleration(Vec3::new(0.0, 0.0, 100.0))
        .with_damping(0.5)
        .with_colors(Rgba::WHITE, Rgba::CLEAR_WHITE)
        .with_scale(1.0, 0.2);
        world.spawn_particle(particle);
    }
}

/// A flash plus a spray of debris sized to the blast.
pub fn explosion(world: &mut World, center: Vec2, radius: f32) {
    // Placed slightly south so it sorts in front of the victims.
    let flash = Particle::new(ParticleSprite::Flash, center + Vec2::new(0.0, 50.0), 55.0, 0.2)
        .with_acceleration(Vec3::new(0.0, 0.0, 100.0))
        .with_colors(Rgba::WHITE, Rgba::CLEAR_YELLOW)
        .with_scale(radius / FLASH_SPRITE_SIZE * 2.2, 0.2);
    world.spawn_particle(flash);

    let spread = if radius.is_finite() { radius / 2.0 } else { 0.0 };
    for _ in 0..DEBRIS_PER_BLAST {
        let rng = &mut world.rng;
        let offset = Vec2::new(
            rng.random_range(-spread..=spread),
            rng.random_range(-spread..=spread),
        );
        let height = rng.random_range(0.0..=10.0);
        let velocity = Vec3::new(
            rng.random_range(-50.0..=50.0),
            rng.random_range(-10.0..=10.0),
            rng.random_range(0.0..=30.0),
        );
        let duration = rng.random_range(0.5..=0.8);
        let particle = Particle::new(ParticleSprite::Dust, center + offset, height, duration)
            .with_velocity(velocity)
            .with_acceleration(Vec3::new(0.0, 0.0, 100.0))
            .with_damping(1.0)
            .with_colors(palette::ENEMY, Rgba::BLACK)
            .with_scale(2.0, 0.2);
        world.spawn_particle(particle);
    }
}

/// Bricks tumbling off a collapsed tower.
pub fn rubble(world: &mut World, position: Vec2) {
    for _ in 0..BRICKS_PER_TOWER {
        let rng = &mut world.rng;
        let offset = Vec2::new(rng.random_range(-15.0..=15.0), rng.random_range(-5.0..=5.0));
        let velocity = Vec3::new(
            rng.random_range(-60.0..=60.0),
            rng.random_range(-20.0..=20.0),
            rng.random_range(40.0..=90.0),
        );
        let spin = rng.random_range(-8.0..=8.0);
        let particle = Particle::new(ParticleSprite::Brick, position + offset, 30.0, 0.9)
            .with_velocity(velocity)
            .with_acceleration(Vec3::new(0.0, 0.0, -200.0))
            .with_damping(0.3)
            .with_colors(Rgba::WHITE, Rgba::CLEAR_WHITE)
            .with_scale(1.0, 0.6)
            .with_spin(0.0, spin);
        world.spawn_particle(particle);
    }
}

#[cfg(test)]
mod tests {
    use sf_core::EntityKind;

    use super::*;
    use crate::config::SimConfig;
    use crate::world::tests::{open_field, open_field_with};

    #[test]
    fn dust_comes_in_pairs() {
        let mut world = open_field();
        kick_dust(&mut world, Vec2::new(50.0, 50.0));
        assert_eq!(world.particles().len(), 2);
    }

    #[test]
    fn explosion_debris_stays_within_half_radius() {
        let mut world = open_field();
        let center = Vec2::new(300.0, 300.0);
        explosion(&mut world, center, 100.0);
        assert_eq!(world.particles().len(), DEBRIS_PER_BLAST + 1);
        for (_, particle) in world.particles().iter() {
            if particle.sprite == ParticleSprite::Dust {
                let offset = particle.body.position - center;
                assert!(offset.x.abs() <= 50.0 && offset.y.abs() <= 50.0);
            }
        }
    }

    #[test]
    fn effects_are_dropped_when_particle_pool_is_full() {
        let config = SimConfig::default().with_capacity(EntityKind::Particle, 3);
        let mut world = open_field_with(config);
        explosion(&mut world, Vec2::ZERO, 70.0);
        assert_eq!(world.particles().len(), 3);
        assert!(world.events().is_empty());
    }
}
