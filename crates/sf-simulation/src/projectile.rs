use glam::Vec2;
use serde::{Deserialize, Serialize};
use sf_core::{Body, EntityId, EntityKind, EntityPool, HasBody};

use crate::area;
use crate::behavior::Behavior;
use crate::render::{DrawCommand, Sprite};
use crate::world::World;

/// What a projectile does when it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    /// Destroys its target outright.
    Arrow,
    /// Detonates at the aim point.
    Shell,
}

/// Height of a projectile over its flight.
///
/// A parabola through `start` at launch and `end` on landing, bulging by
/// `peak` in between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcProfile {
    /// Height at launch.
    pub start: f32,
    /// Curvature of the arc.
    pub peak: f32,
    /// Height at landing.
    pub end: f32,
}

impl Default for ArcProfile {
    fn default() -> Self {
        Self {
            start: 40.0,
            peak: 80.0,
            end: 10.0,
        }
    }
}

impl ArcProfile {
    /// Height at flight fraction `t`, clamped to `0.0..=1.0`.
    pub fn height_at(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if self.peak.abs() <= f32::EPSILON {
            return self.start + (self.end - self.start) * t;
        }
        -self.peak * (t - 1.0) * (t + (self.start - self.end) / self.peak) + self.end
    }
}

/// An arrow or shell in flight.
///
/// Flight is fully determined at launch: the projectile slides from `origin`
/// to `aim` over `flight_time` seconds, whatever its target does meanwhile.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    /// Shared fields; `height` follows the arc.
    pub body: Body,
    /// Arrow or shell.
    pub kind: ProjectileKind,
    /// Launch point.
    pub origin: Vec2,
    /// Landing point.
    pub aim: Vec2,
    /// Minion the projectile was fired at.
    pub target: EntityId,
    /// Seconds from launch to landing.
    pub flight_time: f32,
    /// Screen-space direction of travel in radians.
    pub heading: f32,
    /// Height profile.
    pub arc: ArcProfile,
}

impl Projectile {
    /// A projectile at the start of its flight.
    pub fn launch(
        kind: ProjectileKind,
        origin: Vec2,
        aim: Vec2,
        target: EntityId,
        flight_time: f32,
        arc: ArcProfile,
    ) -> Self {
        let screen = aim - origin;
        Self {
            body: Body::raised(origin, arc.height_at(0.0)),
            kind,
            origin,
            aim,
            target,
            flight_time,
            heading: screen.y.atan2(screen.x),
            arc,
        }
    }

    /// Fraction of the flight completed, in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.flight_time > 0.0 {
            (self.body.lifetime / self.flight_time).min(1.0)
        } else {
            1.0
        }
    }

    fn screen_position(&self) -> Vec2 {
        self.body.position - Vec2::new(0.0, self.body.height)
    }
}

impl HasBody for Projectile {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Behavior for Projectile {
    const KIND: EntityKind = EntityKind::Projectile;

    fn pool(world: &World) -> &EntityPool<Self> {
        &world.projectiles
    }

    fn pool_mut(world: &mut World) -> &mut EntityPool<Self> {
        &mut world.projectiles
    }

    fn update(world: &mut World, id: EntityId, _dt: f32) {
        let Ok(projectile) = world.projectiles.get_mut(id) else {
            return;
        };
        let before = projectile.screen_position();
        let t = projectile.progress();
        projectile.body.position = projectile.origin.lerp(projectile.aim, t);
        projectile.body.height = projectile.arc.height_at(t);
        let travel = projectile.screen_position() - before;
        if travel.length_squared() > 0.0 {
            projectile.heading = travel.y.atan2(travel.x);
        }

        if t < 1.0 {
            return;
        }
        let (kind, target, aim) = (projectile.kind, projectile.target, projectile.aim);
        match kind {
            ProjectileKind::Arrow => {
                world.destroy(target);
            }
            ProjectileKind::Shell => {
                let radius = world.config.shell_blast_radius;
                area::detonate(world, aim, radius);
                // The target walked out of the blast; let towers try again.
                if let Ok(survivor) = world.minions.get_mut(target) {
                    survivor.projectile_targeted = false;
                }
            }
        }
        world.destroy(id);
    }

    fn draw(&self) -> DrawCommand {
        let (sprite, rotation) = match self.kind {
            ProjectileKind::Arrow => (Sprite::Arrow, self.heading + std::f32::consts::FRAC_PI_2),
            ProjectileKind::Shell => (Sprite::Shell, self.heading * 0.4),
        };
        DrawCommand::new(sprite, &self.body)
            .with_anchor(Vec2::new(0.5, 0.0))
            .with_rotation(rotation)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use sf_core::{Side, TowerArchetype};

    use super::*;
    use crate::world::tests::open_field;

    #[test]
    fn arc_passes_through_start_and_end() {
        let arc = ArcProfile::default();
        assert!((arc.height_at(0.0) - 40.0).abs() < 1e-4);
        assert!((arc.height_at(1.0) - 10.0).abs() < 1e-4);
        assert!(arc.height_at(0.5) > arc.height_at(0.0));
    }

    #[test]
    fn arc_clamps_fraction() {
        let arc = ArcProfile::default();
        assert_eq!(arc.height_at(-2.0), arc.height_at(0.0));
        assert_eq!(arc.height_at(5.0), arc.height_at(1.0));
    }

    proptest! {
        #[test]
        fn default_arc_never_dips_below_ground(t in 0.0f32..=1.0) {
            prop_assert!(ArcProfile::default().height_at(t) >= 0.0);
        }
    }

    #[test]
    fn flat_arc_interpolates_linearly() {
        let arc = ArcProfile {
            start: 10.0,
            peak: 0.0,
            end: 20.0,
        };
        assert!((arc.height_at(0.5) - 15.0).abs() < 1e-4);
    }

    #[test]
    fn aim_leads_a_moving_target() {
        let mut world = open_field();
        let minion = world.spawn_minion(Side::Attacker, Vec2::new(100.0, 100.0)).unwrap();
        world.minions.get_mut(minion).unwrap().velocity = Vec2::new(50.0, 0.0);
        let id = world
            .spawn_projectile(ProjectileKind::Arrow, Vec2::ZERO, minion, 2.0)
            .unwrap();
        assert_eq!(world.projectiles().get(id).unwrap().aim, Vec2::new(200.0, 100.0));
    }

    #[test]
    fn projectile_reaches_aim_after_flight_time() {
        let mut world = open_field();
        let minion = world.spawn_minion(Side::Defender, Vec2::new(600.0, 600.0)).unwrap();
        let id = world
            .spawn_projectile(ProjectileKind::Arrow, Vec2::new(0.0, 600.0), minion, 1.0)
            .unwrap();
        world.update(0.5);
        let halfway = world.projectiles().get(id).unwrap();
        assert!((halfway.body.position.x - 300.0).abs() < 1e-3);
        assert!(halfway.body.height > 40.0);

        world.update(0.5);
        assert!(!world.contains(id));
        assert!(!world.contains(minion));
    }

    #[test]
    fn arrow_with_dead_target_just_vanishes() {
        let mut world = open_field();
        let minion = world.spawn_minion(Side::Defender, Vec2::new(600.0, 600.0)).unwrap();
        let other = world.spawn_minion(Side::Defender, Vec2::new(650.0, 600.0)).unwrap();
        let id = world
            .spawn_projectile(ProjectileKind::Arrow, Vec2::ZERO, minion, 0.1)
            .unwrap();
        world.destroy(minion);
        world.update(0.2);
        assert!(!world.contains(id));
        assert!(world.contains(other));
    }

    #[test]
    fn projectile_for_missing_target_is_not_launched() {
        let mut world = open_field();
        let minion = world.spawn_minion(Side::Attacker, Vec2::new(600.0, 600.0)).unwrap();
        world.destroy(minion);
        assert!(
            world
                .spawn_projectile(ProjectileKind::Shell, Vec2::ZERO, minion, 1.0)
                .is_none()
        );
    }

    #[test]
    fn shell_detonates_on_landing() {
        let mut world = open_field();
        world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(1100.0, 1100.0), 9)
            .unwrap();
        let target = world.spawn_minion(Side::Attacker, Vec2::new(300.0, 300.0)).unwrap();
        let bystander = world.spawn_minion(Side::Attacker, Vec2::new(330.0, 300.0)).unwrap();
        let far = world.spawn_minion(Side::Attacker, Vec2::new(500.0, 300.0)).unwrap();
        world.minions.get_mut(target).unwrap().velocity = Vec2::ZERO;
        world.spawn_projectile(ProjectileKind::Shell, Vec2::new(300.0, 100.0), target, 0.1);
        world.rebuild_spatial();
        world.update(0.1);
        assert!(!world.contains(target));
        assert!(!world.contains(bystander));
        assert!(world.contains(far));
    }
}
