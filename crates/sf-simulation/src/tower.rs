use glam::Vec2;
use rand::Rng;
use sf_core::{Body, EntityId, EntityKind, EntityPool, HasBody, Side, TowerArchetype};
use tracing::debug;

use crate::behavior::Behavior;
use crate::effects;
use crate::event::{LevelRequest, SimEventKind, SoundCue};
use crate::projectile::ProjectileKind;
use crate::render::{DrawCommand, Sprite, palette, squash_scale};
use crate::targeting;
use crate::world::World;

/// A stationary structure the attackers must bring down.
#[derive(Debug, Clone, PartialEq)]
pub struct Tower {
    /// Shared fields.
    pub body: Body,
    /// What the tower does when its cooldown expires.
    pub archetype: TowerArchetype,
    /// Remaining hit points.
    pub health: i32,
    /// Inventory credited when the tower falls.
    pub reward: u32,
    /// Seconds until the next shot; the tower acts once this is not positive.
    pub cooldown: f32,
    /// Lifetime at which the tower was last hit.
    pub last_hit: Option<f32>,
    /// Lifetime at which the tower last fired or spawned.
    pub last_fired: Option<f32>,
}

impl Tower {
    /// A tower ready to act on its first update.
    pub fn new(archetype: TowerArchetype, position: Vec2, health: i32, reward: u32) -> Self {
        Self {
            body: Body::at(position),
            archetype,
            health,
            reward,
            cooldown: 0.0,
            last_hit: None,
            last_fired: None,
        }
    }
}

impl HasBody for Tower {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Behavior for Tower {
    const KIND: EntityKind = EntityKind::Tower;

    fn pool(world: &World) -> &EntityPool<Self> {
        &world.towers
    }

    fn pool_mut(world: &mut World) -> &mut EntityPool<Self> {
        &mut world.towers
    }

    fn update(world: &mut World, id: EntityId, dt: f32) {
        let Ok(tower) = world.towers.get_mut(id) else {
            return;
        };
        if tower.cooldown > 0.0 {
            tower.cooldown -= dt;
            return;
        }
        let (archetype, position) = (tower.archetype, tower.body.position);

        let acted = match archetype {
            TowerArchetype::Spawner => spawn_defender(world, position),
            TowerArchetype::Ranged => fire(world, id, ProjectileKind::Arrow, position),
            TowerArchetype::Area => fire(world, id, ProjectileKind::Shell, position),
        };
        if acted {
            let period = world.config.tower_stats(archetype).period;
            if let Ok(tower) = world.towers.get_mut(id) {
                tower.cooldown += period;
                tower.last_fired = Some(tower.body.lifetime);
            }
        }
    }

    fn on_destroy(world: &mut World, id: EntityId, record: Self) {
        let position = record.body.position;
        world.inventory = world.inventory.saturating_add(record.reward);
        world.targets_stale = true;
        world.emit(
            SimEventKind::TowerDestroyed {
                tower: id,
                reward: record.reward,
            },
            format!("{id} destroyed, {} attackers refunded", record.reward),
        );
        debug!(%id, reward = record.reward, "tower destroyed");
        world.sound(SoundCue::TowerCollapse, position, 1.0, 1.0);
        effects::rubble(world, position);
        if world.towers.is_empty() {
            world.request_level(LevelRequest::Advance);
        }
    }

    fn draw(&self) -> DrawCommand {
        let since = |moment: Option<f32>| moment.map(|at| self.body.lifetime - at);
        let mut command = DrawCommand::new(Sprite::Tower(self.archetype), &self.body)
            .with_anchor(Vec2::new(0.5, 1.0))
            .with_tint(palette::ENEMY)
            .with_label(self.health);
        // A hit squashes harder than a shot.
        if let Some(t) = since(self.last_hit).filter(|t| *t < 0.5) {
            command = command.with_scale(squash_scale(t, 0.9));
        } else if let Some(t) = since(self.last_fired).filter(|t| *t < 0.5) {
            command = command.with_scale(squash_scale(t, 1.05));
        }
        command
    }
}

/// Returns `true` if the spawner should wait out its period.
fn spawn_defender(world: &mut World, position: Vec2) -> bool {
    if world.defender_count >= world.config.max_defenders {
        return false;
    }
    let radius = world.config.spawner_spawn_radius;
    let angle = world.rng.random_range(0.0..=std::f32::consts::TAU);
    world.spawn_minion(Side::Defender, position + Vec2::from_angle(angle) * radius);
    true
}

/// Returns `true` if a shot was taken.
fn fire(world: &mut World, tower: EntityId, kind: ProjectileKind, position: Vec2) -> bool {
    let archetype = match kind {
        ProjectileKind::Arrow => TowerArchetype::Ranged,
        ProjectileKind::Shell => TowerArchetype::Area,
    };
    let stats = *world.config.tower_stats(archetype);
    let Some(target) = targeting::select_tower_target(world, position, stats.radius) else {
        return false;
    };
    let Some(target_position) = world.position_of(target) else {
        return false;
    };

    let min_flight = world.config.min_flight_time;
    let flight_time = if stats.projectile_speed > 0.0 {
        (position.distance(target_position) / stats.projectile_speed).max(min_flight)
    } else {
        min_flight
    };

    if world
        .spawn_projectile(kind, position, target, flight_time)
        .is_none()
    {
        // Nothing is in the air for it after all.
        if let Ok(minion) = world.minions.get_mut(target) {
            minion.projectile_targeted = false;
        }
        return true;
    }

    world.emit(
        SimEventKind::ProjectileLaunched {
            tower,
            target,
            archetype,
        },
        format!("{tower} fired at {target}"),
    );
    let cue = match kind {
        ProjectileKind::Arrow => SoundCue::ArrowShot,
        ProjectileKind::Shell => SoundCue::ShellShot,
    };
    world.sound(cue, position, 0.5, 1.0);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::world::tests::{open_field, open_field_with};

    #[test]
    fn ranged_tower_fires_and_claims_target() {
        let mut world = open_field();
        let tower = world
            .spawn_tower(TowerArchetype::Ranged, Vec2::new(300.0, 300.0), 5)
            .unwrap();
        let minion = world.spawn_minion(Side::Attacker, Vec2::new(400.0, 300.0)).unwrap();
        world.rebuild_spatial();
        world.update(0.016);

        assert_eq!(world.projectiles().len(), 1);
        assert!(world.minions().get(minion).unwrap().projectile_targeted);
        let cooldown = world.towers().get(tower).unwrap().cooldown;
        assert!((cooldown - 0.4).abs() < 1e-5);
    }

    #[test]
    fn tower_waits_out_its_cooldown() {
        let mut world = open_field();
        world
            .spawn_tower(TowerArchetype::Ranged, Vec2::new(300.0, 300.0), 5)
            .unwrap();
        // Out of reach of each other's strike and too far to matter.
        world.spawn_minion(Side::Attacker, Vec2::new(500.0, 300.0)).unwrap();
        world.spawn_minion(Side::Attacker, Vec2::new(500.0, 400.0)).unwrap();
        world.rebuild_spatial();
        world.update(0.1);
        assert_eq!(world.projectiles().len(), 1);
        world.update(0.1);
        assert_eq!(world.projectiles().len(), 1);
    }

    #[test]
    fn tower_ignores_minions_out_of_range() {
        let mut world = open_field();
        world
            .spawn_tower(TowerArchetype::Area, Vec2::new(100.0, 100.0), 5)
            .unwrap();
        world.spawn_minion(Side::Attacker, Vec2::new(900.0, 900.0)).unwrap();
        world.rebuild_spatial();
        world.update(0.016);
        assert!(world.projectiles().is_empty());
    }

    #[test]
    fn spawner_respects_defender_cap() {
        let config = SimConfig::default().with_max_defenders(1);
        let mut world = open_field_with(config);
        world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(600.0, 600.0), 5)
            .unwrap();
        for _ in 0..200 {
            world.update(0.05);
        }
        assert_eq!(world.defender_count(), 1);
        assert_eq!(world.minion_count(Side::Defender), 1);
    }

    #[test]
    fn spawner_places_defenders_on_its_ring() {
        let mut world = open_field();
        world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(600.0, 600.0), 5)
            .unwrap();
        world.update(0.016);
        let (_, defender) = world.minions().iter().next().unwrap();
        let distance = defender.body.position.distance(Vec2::new(600.0, 600.0));
        assert!((distance - 40.0).abs() < 1e-2);
    }

    #[test]
    fn full_projectile_pool_releases_the_claim() {
        let config = SimConfig::default().with_capacity(EntityKind::Projectile, 0);
        let mut world = open_field_with(config);
        world
            .spawn_tower(TowerArchetype::Ranged, Vec2::new(300.0, 300.0), 5)
            .unwrap();
        let minion = world.spawn_minion(Side::Attacker, Vec2::new(400.0, 300.0)).unwrap();
        world.rebuild_spatial();
        world.update(0.016);
        assert!(!world.minions().get(minion).unwrap().projectile_targeted);
    }
}
