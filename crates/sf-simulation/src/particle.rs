use glam::{Vec2, Vec3};
use sf_core::{Body, EntityId, EntityKind, EntityPool, HasBody, Rgba};

use crate::behavior::Behavior;
use crate::render::{DrawCommand, Sprite};
use crate::world::World;

/// Particle artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleSprite {
    /// A puff of dust.
    Dust,
    /// The bright core of an explosion.
    Flash,
    /// A chunk of a collapsed tower.
    Brick,
}

/// A short-lived cosmetic sprite. Never touches the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Shared fields.
    pub body: Body,
    /// Artwork.
    pub sprite: ParticleSprite,
    /// Ground velocity in `x`/`y`, vertical velocity in `z`.
    pub velocity: Vec3,
    /// Constant acceleration, same layout as `velocity`.
    pub acceleration: Vec3,
    /// Fraction of velocity lost per second.
    pub damping: f32,
    /// Seconds until the particle disappears.
    pub duration: f32,
    /// Tint at birth.
    pub color_start: Rgba,
    /// Tint at death.
    pub color_end: Rgba,
    /// Scale at birth.
    pub scale_start: f32,
    /// Scale at death.
    pub scale_end: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Rotation speed in radians per second.
    pub spin: f32,
}

impl Particle {
    /// A still, white particle.
    pub fn new(sprite: ParticleSprite, position: Vec2, height: f32, duration: f32) -> Self {
        Self {
            body: Body::raised(position, height),
            sprite,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            damping: 0.0,
            duration,
            color_start: Rgba::WHITE,
            color_end: Rgba::WHITE,
            scale_start: 1.0,
            scale_end: 1.0,
            rotation: 0.0,
            spin: 0.0,
        }
    }

    /// Initial velocity; `z` is vertical.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Constant acceleration, gravity included.
    pub fn with_acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Fraction of velocity lost per second.
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Tint at birth and at expiry.
    pub fn with_colors(mut self, start: Rgba, end: Rgba) -> Self {
        self.color_start = start;
        self.color_end = end;
        self
    }

    /// Scale at birth and at expiry.
    pub fn with_scale(mut self, start: f32, end: f32) -> Self {
        self.scale_start = start;
        self.scale_end = end;
        self
    }

    /// Starting rotation and angular speed in radians per second.
    pub fn with_spin(mut self, rotation: f32, spin: f32) -> Self {
        self.rotation = rotation;
        self.spin = spin;
        self
    }

    /// Fraction of the particle's life used up, in `0.0..=1.0`.
    pub fn age(&self) -> f32 {
        if self.duration > 0.0 {
            (self.body.lifetime / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    fn integrate(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        self.velocity += self.velocity * (-self.damping * dt);
        self.body.position += self.velocity.truncate() * dt;
        self.body.height += self.velocity.z * dt;
        self.rotation += self.spin * dt;
    }
}

impl HasBody for Particle {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Behavior for Particle {
    const KIND: EntityKind = EntityKind::Particle;

    fn pool(world: &World) -> &EntityPool<Self> {
        &world.particles
    }

    fn pool_mut(world: &mut World) -> &mut EntityPool<Self> {
        &mut world.particles
    }

    fn update(world: &mut World, id: EntityId, dt: f32) {
        let Ok(particle) = world.particles.get_mut(id) else {
            return;
        };
        if particle.body.lifetime > particle.duration {
            world.destroy(id);
            return;
        }
        particle.integrate(dt);
    }

    fn draw(&self) -> DrawCommand {
        let age = self.age();
        let scale = self.scale_start + (self.scale_end - self.scale_start) * age;
        DrawCommand::new(Sprite::Particle(self.sprite), &self.body)
            .with_scale(Vec2::splat(scale))
            .with_rotation(self.rotation)
            .with_tint(self.color_start.lerp(self.color_end, age))
    }
}
