//! Target selection for towers, attackers, and defenders.
//!
//! Claims keep fire spread out: a tower skips minions that already have a
//! projectile in the air for them, and a defender on the hunt prefers prey no
//! other defender has claimed. Random picks draw from the world's seeded RNG.

use glam::Vec2;
use rand::Rng;
use rand::rngs::StdRng;
use sf_core::EntityId;

use crate::spatial::SideFilter;
use crate::world::World;

/// The tower closest to `from`, if any tower stands.
pub fn nearest_tower(world: &World, from: Vec2) -> Option<EntityId> {
    world
        .towers
        .iter()
        .min_by(|(_, a), (_, b)| {
            a.body
                .position
                .distance_squared(from)
                .total_cmp(&b.body.position.distance_squared(from))
        })
        .map(|(id, _)| id)
}

/// Pick an unclaimed attacker within `radius` of a tower and claim it.
///
/// Returns `None` when every attacker in range already has a projectile
/// headed its way.
pub fn select_tower_target(world: &mut World, center: Vec2, radius: f32) -> Option<EntityId> {
    let mut candidates =
        world
            .spatial
            .query(&world.minions, center, radius, SideFilter::AttackerOnly);
    candidates.retain(|id| {
        world
            .minions
            .get(*id)
            .is_ok_and(|minion| !minion.projectile_targeted)
    });
    let chosen = pick(&mut world.rng, &candidates)?;
    if let Ok(minion) = world.minions.get_mut(chosen) {
        minion.projectile_targeted = true;
    }
    Some(chosen)
}

/// Decide what the defender `id` standing at `position` chases this frame.
///
/// In order of preference:
/// 1. any attacker already within striking distance,
/// 2. the current target, while it lives,
/// 3. a random attacker within view that no other defender has claimed,
/// 4. a random attacker close by, claimed or not.
///
/// Step 4 is the only one that may pick prey another defender has already
/// claimed, and it runs only when step 3 found no unclaimed attacker in view.
/// A target found through 3 or 4 is claimed.
pub fn retarget_defender(
    world: &mut World,
    id: EntityId,
    position: Vec2,
    current: Option<EntityId>,
) -> Option<EntityId> {
    let config = &world.config;
    let (melee, short, view) = (
        config.melee_range,
        config.defender_short_radius,
        config.defender_view_radius,
    );

    let adjacent = world
        .spatial
        .query(&world.minions, position, melee, SideFilter::AttackerOnly);
    if let Some(&first) = adjacent.first() {
        return Some(first);
    }

    if let Some(current) = current.filter(|t| world.minions.contains(*t)) {
        return Some(current);
    }

    let mut unclaimed = world
        .spatial
        .query(&world.minions, position, view, SideFilter::AttackerOnly);
    unclaimed.retain(|prey| {
        world
            .minions
            .get(*prey)
            .is_ok_and(|minion| !minion.minion_targeted)
    });
    let chosen = match pick(&mut world.rng, &unclaimed) {
        Some(prey) => prey,
        None => {
            let nearby = world
                .spatial
                .query(&world.minions, position, short, SideFilter::AttackerOnly);
            pick(&mut world.rng, &nearby)?
        }
    };
    if let Ok(prey) = world.minions.get_mut(chosen) {
        prey.minion_targeted = true;
    }
    tracing::trace!(defender = %id, prey = %chosen, "defender picked prey");
    Some(chosen)
}

fn pick(rng: &mut StdRng, ids: &[EntityId]) -> Option<EntityId> {
    if ids.is_empty() {
        return None;
    }
    Some(ids[rng.random_range(0..ids.len())])
}

#[cfg(test)]
mod tests {
    use sf_core::{Side, TowerArchetype};

    use super::*;
    use crate::world::tests::open_field;

    #[test]
    fn nearest_tower_prefers_closer() {
        let mut world = open_field();
        let far = world
            .spawn_tower(TowerArchetype::Ranged, Vec2::new(900.0, 0.0), 1)
            .unwrap();
        let near = world
            .spawn_tower(TowerArchetype::Ranged, Vec2::new(100.0, 0.0), 1)
            .unwrap();
        assert_eq!(nearest_tower(&world, Vec2::ZERO), Some(near));
        assert_eq!(nearest_tower(&world, Vec2::new(1000.0, 0.0)), Some(far));
    }

    #[test]
    fn no_towers_no_target() {
        let world = open_field();
        assert_eq!(nearest_tower(&world, Vec2::ZERO), None);
    }

    #[test]
    fn two_towers_never_claim_the_same_minion() {
        let mut world = open_field();
        let lone = world.spawn_minion(Side::Attacker, Vec2::new(300.0, 300.0)).unwrap();
        world.rebuild_spatial();

        let first = select_tower_target(&mut world, Vec2::new(250.0, 300.0), 320.0);
        let second = select_tower_target(&mut world, Vec2::new(350.0, 300.0), 320.0);
        assert_eq!(first, Some(lone));
        assert_eq!(second, None);
    }

    #[test]
    fn towers_spread_over_available_minions() {
        let mut world = open_field();
        let a = world.spawn_minion(Side::Attacker, Vec2::new(300.0, 300.0)).unwrap();
        let b = world.spawn_minion(Side::Attacker, Vec2::new(320.0, 300.0)).unwrap();
        world.rebuild_spatial();
        let first = select_tower_target(&mut world, Vec2::new(300.0, 300.0), 100.0).unwrap();
        let second = select_tower_target(&mut world, Vec2::new(300.0, 300.0), 100.0).unwrap();
        assert_ne!(first, second);
        assert!([a, b].contains(&first) && [a, b].contains(&second));
    }

    #[test]
    fn towers_ignore_defenders() {
        let mut world = open_field();
        world.spawn_minion(Side::Defender, Vec2::new(300.0, 300.0)).unwrap();
        world.rebuild_spatial();
        assert_eq!(select_tower_target(&mut world, Vec2::new(300.0, 300.0), 100.0), None);
    }

    #[test]
    fn defender_prefers_adjacent_attacker_over_current_target() {
        let mut world = open_field();
        let current = world.spawn_minion(Side::Attacker, Vec2::new(400.0, 300.0)).unwrap();
        let adjacent = world.spawn_minion(Side::Attacker, Vec2::new(303.0, 300.0)).unwrap();
        let defender = world.spawn_minion(Side::Defender, Vec2::new(300.0, 300.0)).unwrap();
        world.rebuild_spatial();
        let picked = retarget_defender(&mut world, defender, Vec2::new(300.0, 300.0), Some(current));
        assert_eq!(picked, Some(adjacent));
    }

    #[test]
    fn defender_keeps_live_target() {
        let mut world = open_field();
        let current = world.spawn_minion(Side::Attacker, Vec2::new(900.0, 900.0)).unwrap();
        world.spawn_minion(Side::Attacker, Vec2::new(350.0, 300.0)).unwrap();
        let defender = world.spawn_minion(Side::Defender, Vec2::new(300.0, 300.0)).unwrap();
        world.rebuild_spatial();
        let picked = retarget_defender(&mut world, defender, Vec2::new(300.0, 300.0), Some(current));
        assert_eq!(picked, Some(current));
    }

    #[test]
    fn defender_skips_claimed_prey_in_view() {
        let mut world = open_field();
        let claimed = world.spawn_minion(Side::Attacker, Vec2::new(420.0, 300.0)).unwrap();
        let free = world.spawn_minion(Side::Attacker, Vec2::new(300.0, 420.0)).unwrap();
        let defender = world.spawn_minion(Side::Defender, Vec2::new(300.0, 300.0)).unwrap();
        world.minions.get_mut(claimed).unwrap().minion_targeted = true;
        world.rebuild_spatial();
        let picked = retarget_defender(&mut world, defender, Vec2::new(300.0, 300.0), None);
        assert_eq!(picked, Some(free));
        assert!(world.minions().get(free).unwrap().minion_targeted);
    }

    #[test]
    fn defender_falls_back_to_claimed_prey_close_by() {
        let mut world = open_field();
        let claimed = world.spawn_minion(Side::Attacker, Vec2::new(340.0, 300.0)).unwrap();
        let defender = world.spawn_minion(Side::Defender, Vec2::new(300.0, 300.0)).unwrap();
        world.minions.get_mut(claimed).unwrap().minion_targeted = true;
        world.rebuild_spatial();
        let picked = retarget_defender(&mut world, defender, Vec2::new(300.0, 300.0), None);
        assert_eq!(picked, Some(claimed));
    }

    #[test]
    fn defender_with_nothing_in_view_idles() {
        let mut world = open_field();
        world.spawn_minion(Side::Attacker, Vec2::new(800.0, 800.0)).unwrap();
        let defender = world.spawn_minion(Side::Defender, Vec2::new(300.0, 300.0)).unwrap();
        world.rebuild_spatial();
        assert_eq!(retarget_defender(&mut world, defender, Vec2::new(300.0, 300.0), None), None);
    }
}
