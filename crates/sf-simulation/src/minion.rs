use glam::Vec2;
use sf_core::{Body, EntityId, EntityKind, EntityPool, HasBody, Side};

use crate::behavior::Behavior;
use crate::effects;
use crate::event::{SimEventKind, SoundCue};
use crate::render::{DrawCommand, Sprite, palette, squash_scale};
use crate::targeting;
use crate::world::World;

/// A walking unit.
///
/// Attackers walk to the nearest tower and chip one point of health off it;
/// defenders hunt attackers and trade themselves for one. Either way the
/// minion is spent by its strike.
#[derive(Debug, Clone, PartialEq)]
pub struct Minion {
    /// Shared fields.
    pub body: Body,
    /// Allegiance.
    pub side: Side,
    /// Velocity set by the last update, in pixels per second.
    pub velocity: Vec2,
    /// Tower (attackers) or attacker (defenders) being chased.
    pub target: Option<EntityId>,
    /// A tower already has a projectile in the air for this minion.
    pub projectile_targeted: bool,
    /// A defender has claimed this minion as prey.
    pub minion_targeted: bool,
}

impl Minion {
    /// A fresh, idle minion.
    pub fn new(side: Side, position: Vec2) -> Self {
        Self {
            body: Body::at(position),
            side,
            velocity: Vec2::ZERO,
            target: None,
            projectile_targeted: false,
            minion_targeted: false,
        }
    }
}

impl HasBody for Minion {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Behavior for Minion {
    const KIND: EntityKind = EntityKind::Minion;

    fn pool(world: &World) -> &EntityPool<Self> {
        &world.minions
    }

    fn pool_mut(world: &mut World) -> &mut EntityPool<Self> {
        &mut world.minions
    }

    fn update(world: &mut World, id: EntityId, dt: f32) {
        let Ok(minion) = world.minions.get(id) else {
            return;
        };
        let (side, position, current) = (minion.side, minion.body.position, minion.target);

        let target = match side {
            Side::Attacker => {
                let valid = current.is_some_and(|tower| world.towers.contains(tower));
                if world.retarget_attackers || !valid {
                    targeting::nearest_tower(world, position)
                } else {
                    current
                }
            }
            Side::Defender => targeting::retarget_defender(world, id, position, current),
        };
        let goal = target.and_then(|t| world.position_of(t));
        let target = goal.and(target);

        let reach = world.config.melee_range;
        let in_reach = goal.is_some_and(|g| g.distance(position) < reach);
        let velocity = match goal {
            Some(g) if !in_reach => (g - position).normalize_or_zero() * world.config.speed(side),
            _ => Vec2::ZERO,
        };

        if let Ok(minion) = world.minions.get_mut(id) {
            minion.target = target;
            minion.velocity = velocity;
            minion.body.position += velocity * dt;
        }

        if let (true, Some(target)) = (in_reach, target) {
            strike(world, id, side, target, position);
        }
    }

    fn on_destroy(world: &mut World, id: EntityId, record: Self) {
        effects::kick_dust(world, record.body.position);
        if record.side == Side::Defender {
            world.defender_count = world.defender_count.saturating_sub(1);
            // Let another defender go after the prey.
            if let Some(prey) = record.target.and_then(|t| world.minions.get_mut(t).ok()) {
                prey.minion_targeted = false;
            }
        }
        world.emit(
            SimEventKind::MinionKilled {
                minion: id,
                side: record.side,
            },
            format!("{} {id} destroyed", record.side),
        );
    }

    fn draw(&self) -> DrawCommand {
        // Minions hop while they walk.
        let hop = if self.velocity == Vec2::ZERO {
            0.0
        } else {
            (self.body.lifetime * 10.0).sin().abs() * 7.0
        };
        let tint = match self.side {
            Side::Attacker => palette::PLAYER,
            Side::Defender => palette::ENEMY,
        };
        DrawCommand::new(Sprite::Minion(self.side), &self.body)
            .with_height(self.body.height + hop)
            .with_anchor(Vec2::new(0.5, 1.0))
            .with_scale(squash_scale(self.body.lifetime, 1.0))
            .with_flip(self.velocity.x < 0.0)
            .with_tint(tint)
    }
}

fn strike(world: &mut World, id: EntityId, side: Side, target: EntityId, position: Vec2) {
    match side {
        Side::Attacker => {
            world.damage_tower(target, 1);
        }
        Side::Defender => {
            if world.destroy(target) {
                world.sound(SoundCue::Explosion, position, 0.3, 1.4);
            }
        }
    }
    world.destroy(id);
}

#[cfg(test)]
mod tests {
    use sf_core::TowerArchetype;

    use super::*;
    use crate::config::SimConfig;
    use crate::event::LevelRequest;
    use crate::world::tests::{open_field, open_field_with};

    #[test]
    fn attacker_walks_toward_nearest_tower() {
        let mut world = open_field();
        let tower = world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(500.0, 100.0), 5)
            .unwrap();
        let minion = world.spawn_minion(Side::Attacker, Vec2::new(100.0, 100.0)).unwrap();
        world.update(0.1);
        let walker = world.minions().get(minion).unwrap();
        assert_eq!(walker.target, Some(tower));
        assert!((walker.body.position.x - 110.0).abs() < 1e-3);
        assert!((walker.body.position.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn attacker_in_reach_damages_tower_and_is_spent() {
        let mut world = open_field();
        let tower = world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(100.0, 100.0), 5)
            .unwrap();
        world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(900.0, 900.0), 5)
            .unwrap();
        let minion = world.spawn_minion(Side::Attacker, Vec2::new(104.0, 100.0)).unwrap();
        world.update(0.016);
        assert!(!world.contains(minion));
        assert_eq!(world.towers().get(tower).unwrap().health, 4);
    }

    #[test]
    fn killing_a_tower_pays_reward_and_flags_targets() {
        let mut world = open_field();
        let weak = world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(100.0, 100.0), 1)
            .unwrap();
        world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(1000.0, 1000.0), 5)
            .unwrap();
        world.update(0.016);
        assert!(!world.targets_stale());

        world.spawn_minion(Side::Attacker, Vec2::new(103.0, 100.0)).unwrap();
        world.update(0.016);
        assert!(!world.contains(weak));
        assert!(world.targets_stale());
        assert_eq!(world.inventory(), 2);
        assert_eq!(
            world
                .events()
                .count(|k| matches!(k, SimEventKind::TowerDestroyed { reward: 2, .. })),
            1
        );
        assert_eq!(world.take_level_request(), None);
    }

    #[test]
    fn tower_falling_mid_pass_retargets_attackers_next_frame() {
        let mut world = open_field_with(SimConfig::default().with_max_defenders(0));
        let far = world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(100.0, 100.0), 50)
            .unwrap();
        let near = world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(600.0, 500.0), 50)
            .unwrap();
        let weak = world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(1100.0, 1100.0), 1)
            .unwrap();
        let walker = world.spawn_minion(Side::Attacker, Vec2::new(150.0, 100.0)).unwrap();
        world.update(0.0);
        assert_eq!(world.minions().get(walker).unwrap().target, Some(far));

        // Now closer to `near`, but its target still stands.
        world.minions.get_mut(walker).unwrap().body.position = Vec2::new(500.0, 350.0);
        world.spawn_minion(Side::Attacker, Vec2::new(1103.0, 1100.0)).unwrap();
        world.update(0.0);
        assert!(!world.contains(weak));
        assert!(world.targets_stale());
        assert_eq!(world.minions().get(walker).unwrap().target, Some(far));

        world.update(0.0);
        assert_eq!(world.minions().get(walker).unwrap().target, Some(near));
        assert!(!world.targets_stale());
    }

    #[test]
    fn last_tower_falling_requests_next_level() {
        let mut world = open_field();
        world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(100.0, 100.0), 1)
            .unwrap();
        world.spawn_minion(Side::Attacker, Vec2::new(103.0, 100.0)).unwrap();
        world.update(0.016);
        assert_eq!(world.towers().len(), 0);
        assert_eq!(world.take_level_request(), Some(LevelRequest::Advance));
    }

    #[test]
    fn attacker_retargets_when_its_tower_falls() {
        let mut world = open_field();
        let near = world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(200.0, 100.0), 5)
            .unwrap();
        let far = world
            .spawn_tower(TowerArchetype::Spawner, Vec2::new(200.0, 900.0), 5)
            .unwrap();
        let minion = world.spawn_minion(Side::Attacker, Vec2::new(100.0, 100.0)).unwrap();
        world.update(0.016);
        assert_eq!(world.minions().get(minion).unwrap().target, Some(near));

        world.destroy(near);
        world.update(0.016);
        assert_eq!(world.minions().get(minion).unwrap().target, Some(far));
    }

    #[test]
    fn attacker_without_towers_stands_still() {
        let mut world = open_field();
        let minion = world.spawn_minion(Side::Attacker, Vec2::new(100.0, 100.0)).unwrap();
        world.update(0.5);
        let idle = world.minions().get(minion).unwrap();
        assert_eq!(idle.velocity, Vec2::ZERO);
        assert_eq!(idle.body.position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn defender_trades_itself_for_adjacent_attacker() {
        let mut world = open_field();
        world
            .spawn_tower(TowerArchetype::Ranged, Vec2::new(1100.0, 1100.0), 5)
            .unwrap();
        let attacker = world.spawn_minion(Side::Attacker, Vec2::new(300.0, 300.0)).unwrap();
        let defender = world.spawn_minion(Side::Defender, Vec2::new(305.0, 300.0)).unwrap();
        world.rebuild_spatial();
        world.update(0.001);
        assert!(!world.contains(attacker));
        assert!(!world.contains(defender));
        assert_eq!(world.defender_count(), 0);
    }

    #[test]
    fn defender_dying_releases_its_claim() {
        let mut world = open_field();
        let attacker = world.spawn_minion(Side::Attacker, Vec2::new(300.0, 300.0)).unwrap();
        let defender = world.spawn_minion(Side::Defender, Vec2::new(400.0, 300.0)).unwrap();
        world.rebuild_spatial();
        world.update(0.016);
        assert_eq!(world.minions().get(defender).unwrap().target, Some(attacker));
        assert!(world.minions().get(attacker).unwrap().minion_targeted);

        world.destroy(defender);
        assert!(!world.minions().get(attacker).unwrap().minion_targeted);
    }
}
