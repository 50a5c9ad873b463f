use glam::Vec2;
use sf_core::{EntityId, Side, Terrain, TileMap};
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::event::{EventLog, LevelRequest, SimEventKind, SoundCue};
use crate::level::{LevelSpec, MapSource};
use crate::world::World;

/// A pending level change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// What was asked for.
    pub request: LevelRequest,
    /// Level index that loads when the countdown ends.
    pub target: usize,
    /// Total countdown in seconds.
    pub duration: f32,
    /// Seconds left.
    pub remaining: f32,
}

impl Transition {
    /// How far the countdown has run, from 0 to 1.
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (1.0 - self.remaining / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// The top-level simulation orchestrator.
///
/// Owns the world and the level table. Drives the frame loop, turns player
/// input into spawns, and runs level transitions: when a countdown ends, the
/// world is reset and the next map decoded and populated.
pub struct Simulation {
    world: World,
    levels: Vec<LevelSpec>,
    maps: Box<dyn MapSource>,
    current: usize,
    transition: Option<Transition>,
    last_placement: Option<Vec2>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("level", &self.current)
            .field("levels", &self.levels.len())
            .field("transition", &self.transition)
            .field("world", &self.world)
            .finish()
    }
}

impl Simulation {
    /// Create a simulation and load the first level.
    pub fn new(
        config: SimConfig,
        levels: Vec<LevelSpec>,
        maps: impl MapSource + 'static,
    ) -> SimResult<Self> {
        config.validate()?;
        if levels.is_empty() {
            return Err(SimError::NoLevels);
        }
        let tiles = TileMap::filled(0, 0, config.tile_size, Terrain::Void);
        let mut simulation = Self {
            world: World::new(config, tiles),
            levels,
            maps: Box::new(maps),
            current: 0,
            transition: None,
            last_placement: None,
        };
        simulation.load_level(0)?;
        Ok(simulation)
    }

    /// Reset the world and populate it from level `index`.
    pub fn load_level(&mut self, index: usize) -> SimResult<()> {
        let count = self.levels.len();
        let level = self
            .levels
            .get(index)
            .ok_or(SimError::LevelOutOfRange { index, count })?;
        let grid = self.maps.load_map(level)?;
        let decoded = sf_core::tilemap::decode(&grid, self.world.config().tile_size)?;

        self.world.reset(decoded.tiles, level.starting_minions);
        for placement in &decoded.placements {
            self.world.apply_placement(placement);
        }
        self.world.rebuild_spatial();
        self.world.targets_stale = false;

        self.current = index;
        self.transition = None;
        self.last_placement = None;
        info!(
            index,
            description = %level.description,
            towers = self.world.towers().len(),
            "level loaded"
        );
        self.world.emit(
            SimEventKind::LevelLoaded { index },
            format!("level {} loaded: {}", index + 1, level.description),
        );
        Ok(())
    }

    /// Start a level transition countdown.
    ///
    /// A request of the same kind as the pending one is ignored, so a
    /// countdown already running is not restarted.
    pub fn request(&mut self, request: LevelRequest) {
        if self.transition.is_some_and(|t| t.request == request) {
            return;
        }
        let count = self.levels.len();
        let target = match request {
            LevelRequest::Advance => (self.current + 1) % count,
            LevelRequest::Reload => self.current,
            LevelRequest::Previous => (self.current + count - 1) % count,
        };
        let times = &self.world.config().transitions;
        let duration = match request {
            LevelRequest::Advance => times.advance,
            LevelRequest::Reload => times.reload,
            LevelRequest::Previous => times.previous,
        }
        .max(0.0);
        info!(%request, target, duration, "level transition started");
        self.transition = Some(Transition {
            request,
            target,
            duration,
            remaining: duration,
        });
    }

    /// Perform a level change right away, skipping the countdown.
    pub fn jump(&mut self, request: LevelRequest) -> SimResult<()> {
        self.transition = None;
        self.request(request);
        match self.transition {
            Some(transition) => self.load_level(transition.target),
            None => Ok(()),
        }
    }

    /// Advance the simulation by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> SimResult<()> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if self.transition.is_none()
            && self.world.inventory() == 0
            && self.world.minion_count(Side::Attacker) == 0
        {
            debug!("no attackers left, reloading");
            self.request(LevelRequest::Reload);
        }

        if let Some(transition) = &mut self.transition {
            transition.remaining -= dt;
            if transition.remaining <= 0.0 {
                let target = transition.target;
                self.load_level(target)?;
            }
        }

        self.world.update(dt);

        if let Some(request) = self.world.take_level_request() {
            self.request(request);
        }
        Ok(())
    }

    /// Advance the simulation by `n` frames of `dt` seconds each.
    pub fn run(&mut self, n: u64, dt: f32) -> SimResult<()> {
        for _ in 0..n {
            self.tick(dt)?;
        }
        Ok(())
    }

    /// Place an attacker from the inventory at `position`.
    ///
    /// Only succeeds on placeable terrain with inventory left; the inventory
    /// is spent only if the minion actually spawned.
    pub fn place_attacker(&mut self, position: Vec2) -> Option<EntityId> {
        self.last_placement = Some(position);
        let placeable = self
            .world
            .tiles()
            .terrain_at(position)
            .is_some_and(Terrain::is_placeable);
        if !placeable || self.world.inventory() == 0 {
            return None;
        }
        let id = self.world.spawn_minion(Side::Attacker, position)?;
        self.world.take_inventory();
        self.world.sound(SoundCue::Place, position, 0.4, 1.0);
        Some(id)
    }

    /// Continue a drag: place another attacker once the pointer has moved far
    /// enough from the last placement.
    pub fn drag_to(&mut self, position: Vec2) -> Option<EntityId> {
        let spacing = self.world.config().placement_spacing;
        match self.last_placement {
            Some(last) if last.distance(position) < spacing => None,
            _ => self.place_attacker(position),
        }
    }

    /// End a drag.
    pub fn release_pointer(&mut self) {
        self.last_placement = None;
    }

    /// Spawn a defender anywhere, ignoring terrain and caps.
    pub fn spawn_debug_defender(&mut self, position: Vec2) -> Option<EntityId> {
        self.world.spawn_minion(Side::Defender, position)
    }

    /// The running world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The running world, mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The world's event log.
    pub fn events(&self) -> &EventLog {
        self.world.events()
    }

    /// Index of the running level.
    pub fn current_level(&self) -> usize {
        self.current
    }

    /// The running level's table entry.
    pub fn level(&self) -> &LevelSpec {
        &self.levels[self.current]
    }

    /// The whole level table.
    pub fn levels(&self) -> &[LevelSpec] {
        &self.levels
    }

    /// The pending level change, if any.
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use sf_core::tilemap::marker;
    use sf_core::{PixelGrid, Rgba};

    use super::*;
    use crate::config::TransitionTimes;

    /// 10x10 placeable field with one ranged tower (health 10) at cell (8, 1).
    fn field() -> PixelGrid {
        let mut grid = PixelGrid::filled(10, 10, marker::PLACEABLE);
        grid.set(8, 1, Rgba::new(1, 0, 0, 255));
        grid
    }

    /// Same field, but the tower is a spawner with health 10.
    fn spawner_field() -> PixelGrid {
        let mut grid = PixelGrid::filled(10, 10, marker::PLACEABLE);
        grid.set(8, 1, Rgba::new(0, 0, 1, 255));
        grid
    }

    fn level(name: &str, starting_minions: u32) -> LevelSpec {
        LevelSpec {
            map: PathBuf::from(name),
            description: name.to_string(),
            starting_minions,
        }
    }

    fn maps(entry: &LevelSpec) -> SimResult<PixelGrid> {
        match entry.map.to_str() {
            Some("spawner") => Ok(spawner_field()),
            Some("missing") => Err(SimError::MapLoad {
                path: entry.map.clone(),
                reason: "gone".into(),
            }),
            _ => Ok(field()),
        }
    }

    fn quick() -> SimConfig {
        SimConfig::default().with_transitions(TransitionTimes {
            advance: 0.5,
            reload: 0.25,
            previous: 0.25,
        })
    }

    fn two_levels() -> Simulation {
        Simulation::new(quick(), vec![level("one", 5), level("two", 7)], maps).unwrap()
    }

    #[test]
    fn new_loads_first_level() {
        let sim = two_levels();
        assert_eq!(sim.current_level(), 0);
        assert_eq!(sim.world().inventory(), 5);
        assert_eq!(sim.world().towers().len(), 1);
        assert!(!sim.world().targets_stale());
        assert_eq!(
            sim.events()
                .count(|k| matches!(k, SimEventKind::LevelLoaded { index: 0 })),
            1
        );
    }

    #[test]
    fn empty_level_table_is_an_error() {
        let err = Simulation::new(SimConfig::default(), Vec::new(), maps).unwrap_err();
        assert!(matches!(err, SimError::NoLevels));
    }

    #[test]
    fn map_errors_surface_from_new() {
        let err = Simulation::new(SimConfig::default(), vec![level("missing", 1)], maps)
            .unwrap_err();
        assert!(matches!(err, SimError::MapLoad { .. }));
    }

    #[test]
    fn load_level_out_of_range() {
        let mut sim = two_levels();
        assert!(matches!(
            sim.load_level(5),
            Err(SimError::LevelOutOfRange { index: 5, count: 2 })
        ));
    }

    #[test]
    fn placement_spends_inventory_on_placeable_tiles_only() {
        let mut sim = two_levels();
        assert!(sim.place_attacker(Vec2::new(30.0, 500.0)).is_some());
        assert_eq!(sim.world().inventory(), 4);
        assert!(sim.place_attacker(Vec2::new(-30.0, 500.0)).is_none());
        assert_eq!(sim.world().inventory(), 4);
    }

    #[test]
    fn placement_fails_without_inventory() {
        let mut sim = Simulation::new(quick(), vec![level("one", 0)], maps).unwrap();
        assert!(sim.place_attacker(Vec2::new(30.0, 500.0)).is_none());
    }

    #[test]
    fn drag_respects_spacing() {
        let mut sim = two_levels();
        assert!(sim.place_attacker(Vec2::new(30.0, 500.0)).is_some());
        assert!(sim.drag_to(Vec2::new(35.0, 500.0)).is_none());
        assert!(sim.drag_to(Vec2::new(45.0, 500.0)).is_some());
        sim.release_pointer();
        assert!(sim.drag_to(Vec2::new(46.0, 500.0)).is_some());
        assert_eq!(sim.world().inventory(), 2);
    }

    #[test]
    fn debug_defender_ignores_terrain() {
        let mut sim = two_levels();
        assert!(sim.spawn_debug_defender(Vec2::new(-100.0, -100.0)).is_some());
        assert_eq!(sim.world().defender_count(), 1);
    }

    #[test]
    fn empty_handed_player_gets_a_reload() {
        let mut sim = Simulation::new(quick(), vec![level("one", 0)], maps).unwrap();
        sim.tick(0.016).unwrap();
        let transition = sim.transition().copied().unwrap();
        assert_eq!(transition.request, LevelRequest::Reload);
        assert_eq!(transition.target, 0);
        sim.run(20, 0.016).unwrap();
        assert!(
            sim.events()
                .count(|k| matches!(k, SimEventKind::LevelLoaded { index: 0 }))
                >= 2
        );
    }

    #[test]
    fn destroying_last_tower_advances_to_next_level() {
        let mut sim = two_levels();
        let tower = sim.world().towers().ids()[0];
        sim.world_mut().destroy(tower);
        sim.tick(0.016).unwrap();
        let transition = sim.transition().copied().unwrap();
        assert_eq!(transition.request, LevelRequest::Advance);
        assert_eq!(transition.target, 1);

        sim.run(40, 0.016).unwrap();
        assert_eq!(sim.current_level(), 1);
        assert_eq!(sim.world().inventory(), 7);
        assert!(sim.world().contains(sim.world().towers().ids()[0]));
        assert!(!sim.world().contains(tower));
    }

    #[test]
    fn advancing_past_last_level_wraps() {
        let mut sim = two_levels();
        sim.jump(LevelRequest::Advance).unwrap();
        assert_eq!(sim.current_level(), 1);
        sim.jump(LevelRequest::Advance).unwrap();
        assert_eq!(sim.current_level(), 0);
        sim.jump(LevelRequest::Previous).unwrap();
        assert_eq!(sim.current_level(), 1);
    }

    #[test]
    fn transition_progress_runs_from_zero_to_one() {
        let mut sim = two_levels();
        sim.request(LevelRequest::Advance);
        assert_eq!(sim.transition().unwrap().progress(), 0.0);
        sim.tick(0.25).unwrap();
        assert!((sim.transition().unwrap().progress() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn repeated_request_does_not_restart_countdown() {
        let mut sim = two_levels();
        sim.request(LevelRequest::Advance);
        sim.tick(0.25).unwrap();
        sim.request(LevelRequest::Advance);
        assert!((sim.transition().unwrap().remaining - 0.25).abs() < 1e-5);
    }

    #[test]
    fn level_reset_stales_old_ids() {
        let mut sim = two_levels();
        let minion = sim.place_attacker(Vec2::new(30.0, 500.0)).unwrap();
        sim.jump(LevelRequest::Reload).unwrap();
        assert!(!sim.world().contains(minion));
        assert_eq!(sim.world().inventory(), 5);
    }

    #[test]
    fn same_seed_same_story() {
        let script = |sim: &mut Simulation| {
            for step in 0..300 {
                if step % 10 == 0 {
                    sim.place_attacker(Vec2::new(30.0 + step as f32, 550.0));
                }
                sim.tick(1.0 / 60.0).unwrap();
            }
            sim.events()
                .events()
                .iter()
                .map(|e| e.description.clone())
                .collect::<Vec<_>>()
        };
        let config = quick().with_seed(99);
        let mut a = Simulation::new(config.clone(), vec![level("spawner", 20)], maps).unwrap();
        let mut b = Simulation::new(config, vec![level("spawner", 20)], maps).unwrap();
        let log_a = script(&mut a);
        let log_b = script(&mut b);
        assert!(!log_a.is_empty());
        assert_eq!(log_a, log_b);
    }
}
