//! Draw descriptions and depth ordering.
//!
//! The kernel never draws anything itself. Each frame it produces a list of
//! [`DrawCommand`]s, shadows first, then every live entity sorted by ground
//! `y` so nearer entities paint over farther ones. Hosts map [`Sprite`]s to
//! whatever artwork they have.

use glam::Vec2;
use sf_core::{Body, EntityId, EntityKind, Rgba, Side, TowerArchetype};

use crate::particle::ParticleSprite;
use crate::world::World;

/// Reference width of the flash sprite; flash scale is relative to it.
pub const FLASH_SPRITE_SIZE: f32 = 64.0;

/// Colours shared by the kernel and its hosts.
pub mod palette {
    use sf_core::Rgba;

    /// The player's side.
    pub const PLAYER: Rgba = Rgba::from_hex(0x2E86ABFF);
    /// The towers' side.
    pub const ENEMY: Rgba = Rgba::from_hex(0xA4243BFF);
    /// Walkable ground, checkerboard light.
    pub const GROUND_LIGHT: Rgba = Rgba::from_hex(0xF1BB87FF);
    /// Walkable ground, checkerboard dark.
    pub const GROUND_DARK: Rgba = Rgba::from_hex(0xF2B47AFF);
    /// Placeable ground, checkerboard light.
    pub const PLACEABLE_LIGHT: Rgba = Rgba::from_hex(0x2E86ABFF);
    /// Placeable ground, checkerboard dark.
    pub const PLACEABLE_DARK: Rgba = Rgba::from_hex(0x207295FF);
    /// Off-map void, checkerboard light.
    pub const BACKGROUND_LIGHT: Rgba = Rgba::from_hex(0x281611FF);
    /// Off-map void, checkerboard dark.
    pub const BACKGROUND_DARK: Rgba = Rgba::from_hex(0x241410FF);
    /// Drop shadows.
    pub const SHADOW: Rgba = Rgba::new(0, 0, 0, 64);
}

/// What a draw command depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    /// A minion of one side.
    Minion(Side),
    /// A tower.
    Tower(TowerArchetype),
    /// An arrow in flight.
    Arrow,
    /// A shell in flight.
    Shell,
    /// A trap.
    Trap,
    /// A particle.
    Particle(ParticleSprite),
    /// A ground shadow under a raised or standing entity.
    Shadow,
}

/// One sprite to paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Artwork.
    pub sprite: Sprite,
    /// Ground position in world pixels.
    pub position: Vec2,
    /// Height above the ground; drawn that many pixels up.
    pub height: f32,
    /// Pivot inside the sprite, `(0, 0)` top-left to `(1, 1)` bottom-right.
    pub anchor: Vec2,
    /// Per-axis scale.
    pub scale: Vec2,
    /// Rotation in radians around the anchor.
    pub rotation: f32,
    /// Mirror horizontally.
    pub flip: bool,
    /// Colour multiplier.
    pub tint: Rgba,
    /// Number to print over the sprite, such as tower health.
    pub label: Option<i32>,
}

impl DrawCommand {
    /// An untinted, unscaled sprite at `body`.
    pub fn new(sprite: Sprite, body: &Body) -> Self {
        Self {
            sprite,
            position: body.position,
            height: body.height,
            anchor: Vec2::splat(0.5),
            scale: Vec2::ONE,
            rotation: 0.0,
            flip: false,
            tint: Rgba::WHITE,
            label: None,
        }
    }

    /// Override the height offset.
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Set the pivot.
    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set the per-axis scale.
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Set the rotation in radians.
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Mirror horizontally.
    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    /// Set the colour multiplier.
    pub fn with_tint(mut self, tint: Rgba) -> Self {
        self.tint = tint;
        self
    }

    /// Print `label` over the sprite.
    pub fn with_label(mut self, label: i32) -> Self {
        self.label = Some(label);
        self
    }

    /// Where the anchor lands on screen, height included.
    pub fn screen_position(&self) -> Vec2 {
        self.position - Vec2::new(0.0, self.height)
    }
}

/// Spawn squash: wide and flat at `t = 0`, settling to `(1, 1)`.
///
/// `scaler` exaggerates or softens the initial squash.
pub fn squash_scale(t: f32, scaler: f32) -> Vec2 {
    let squash = 1.0 - (-t.max(0.0) * 10.0).exp();
    let scaler = if scaler.abs() <= f32::EPSILON { 1.0 } else { scaler };
    let lerp = |from: f32, to: f32| from + (to - from) * squash;
    Vec2::new(lerp(1.1 * scaler, 1.0), lerp(1.0 / 1.1 / scaler, 1.0))
}

/// Every live entity, back to front.
///
/// Sorted by ground `y` ascending. The sort is stable, so entities on the
/// same row keep update order (kind, then slot).
pub fn render_order(world: &World) -> Vec<EntityId> {
    let mut ordered: Vec<(EntityId, f32)> = Vec::new();
    ordered.extend(world.minions().iter().map(|(id, m)| (id, m.body.position.y)));
    ordered.extend(world.towers().iter().map(|(id, t)| (id, t.body.position.y)));
    ordered.extend(world.projectiles().iter().map(|(id, p)| (id, p.body.position.y)));
    ordered.extend(world.traps().iter().map(|(id, t)| (id, t.body.position.y)));
    ordered.extend(world.particles().iter().map(|(id, p)| (id, p.body.position.y)));
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1));
    ordered.into_iter().map(|(id, _)| id).collect()
}

/// Shadows, then every entity in [`render_order`].
pub fn draw_list(world: &World) -> Vec<DrawCommand> {
    let order = render_order(world);
    let mut commands = Vec::with_capacity(order.len() * 2);
    commands.extend(order.iter().filter_map(|&id| shadow(world, id)));
    commands.extend(order.iter().filter_map(|&id| world.draw_command(id)));
    commands
}

fn shadow(world: &World, id: EntityId) -> Option<DrawCommand> {
    let size = match id.kind() {
        EntityKind::Minion => 0.5,
        EntityKind::Tower => 1.2,
        EntityKind::Projectile => 0.3,
        EntityKind::Trap | EntityKind::Particle => return None,
    };
    let body = world.body(id)?;
    // Shadows shrink as their caster rises.
    let shrink = (1.0 - body.height / 200.0).clamp(0.3, 1.0);
    Some(
        DrawCommand::new(Sprite::Shadow, &Body::at(body.position))
            .with_scale(Vec2::splat(size * shrink))
            .with_tint(palette::SHADOW),
    )
}
