use serde::{Deserialize, Serialize};
use sf_core::{EntityKind, Side, TowerArchetype};

use crate::error::{SimError, SimResult};
use crate::projectile::ArcProfile;

/// Pool sizes, one per entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacities {
    /// Minion slots (both sides share one pool).
    pub minions: usize,
    /// Tower slots.
    pub towers: usize,
    /// Projectile slots.
    pub projectiles: usize,
    /// Trap slots.
    pub traps: usize,
    /// Particle slots.
    pub particles: usize,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            minions: 1000,
            towers: 10,
            projectiles: 1000,
            traps: 30,
            particles: 1000,
        }
    }
}

/// Firing parameters of one tower archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Acquisition radius in pixels. Unused by spawners.
    pub radius: f32,
    /// Seconds between shots (or spawns).
    pub period: f32,
    /// Projectile travel speed in pixels per second. Unused by spawners.
    pub projectile_speed: f32,
}

/// Seconds each level transition waits before the new level loads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTimes {
    /// Delay after the last tower falls.
    pub advance: f32,
    /// Delay before reloading the current level.
    pub reload: f32,
    /// Delay before stepping back one level.
    pub previous: f32,
}

impl Default for TransitionTimes {
    fn default() -> Self {
        Self {
            advance: 3.0,
            reload: 1.0,
            previous: 1.0,
        }
    }
}

/// Configuration for a simulation run.
///
/// Every field has a default, so a JSON override file only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Edge length of one map tile in pixels.
    pub tile_size: f32,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Pool sizes.
    pub capacities: Capacities,
    /// Attacker walking speed in pixels per second.
    pub attacker_speed: f32,
    /// Defender walking speed in pixels per second.
    pub defender_speed: f32,
    /// Distance at which a minion strikes its target.
    pub melee_range: f32,
    /// Fallback search radius for defenders.
    pub defender_short_radius: f32,
    /// Search radius for unclaimed prey.
    pub defender_view_radius: f32,
    /// Ranged tower parameters.
    pub ranged: TowerStats,
    /// Area tower parameters.
    pub area: TowerStats,
    /// Spawner tower parameters.
    pub spawner: TowerStats,
    /// Distance from a spawner at which defenders appear.
    pub spawner_spawn_radius: f32,
    /// Spawners stop producing while this many defenders are alive.
    pub max_defenders: usize,
    /// Inventory refund per point of starting tower health.
    pub reward_per_health: u32,
    /// Lower bound on projectile flight time in seconds.
    pub min_flight_time: f32,
    /// Blast radius of an area shell.
    pub shell_blast_radius: f32,
    /// Distance at which a trap notices an attacker.
    pub trap_trigger_radius: f32,
    /// Blast radius of a trap.
    pub trap_blast_radius: f32,
    /// Height profile of projectile flight.
    pub arc: ArcProfile,
    /// Minimum pointer travel before a drag places another attacker.
    pub placement_spacing: f32,
    /// Level transition delays.
    pub transitions: TransitionTimes,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tile_size: 60.0,
            max_events: 5000,
            capacities: Capacities::default(),
            attacker_speed: 100.0,
            defender_speed: 80.0,
            melee_range: 8.0,
            defender_short_radius: 60.0,
            defender_view_radius: 150.0,
            ranged: TowerStats {
                radius: 320.0,
                period: 0.4,
                projectile_speed: 320.0,
            },
            area: TowerStats {
                radius: 160.0,
                period: 1.8,
                projectile_speed: 320.0,
            },
            spawner: TowerStats {
                radius: 0.0,
                period: 2.0,
                projectile_speed: 0.0,
            },
            spawner_spawn_radius: 40.0,
            max_defenders: 60,
            reward_per_health: 2,
            min_flight_time: 0.1,
            shell_blast_radius: 70.0,
            trap_trigger_radius: 40.0,
            trap_blast_radius: 120.0,
            arc: ArcProfile::default(),
            placement_spacing: 10.0,
            transitions: TransitionTimes::default(),
        }
    }
}

impl SimConfig {
    /// Parse a JSON override document on top of the defaults.
    pub fn from_json(text: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        if self.tile_size.is_nan() || self.tile_size <= 0.0 {
            return Err(SimError::Config(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        for (name, stats) in [
            ("ranged", &self.ranged),
            ("area", &self.area),
            ("spawner", &self.spawner),
        ] {
            if stats.period.is_nan() || stats.period <= 0.0 {
                return Err(SimError::Config(format!(
                    "{name} period must be positive, got {}",
                    stats.period
                )));
            }
        }
        Ok(())
    }

    /// Firing parameters of `archetype`.
    pub fn tower_stats(&self, archetype: TowerArchetype) -> &TowerStats {
        match archetype {
            TowerArchetype::Ranged => &self.ranged,
            TowerArchetype::Area => &self.area,
            TowerArchetype::Spawner => &self.spawner,
        }
    }

    /// Walking speed of `side`.
    pub fn speed(&self, side: Side) -> f32 {
        match side {
            Side::Attacker => self.attacker_speed,
            Side::Defender => self.defender_speed,
        }
    }

    /// Pool size for `kind`.
    pub fn capacity(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Minion => self.capacities.minions,
            EntityKind::Tower => self.capacities.towers,
            EntityKind::Projectile => self.capacities.projectiles,
            EntityKind::Trap => self.capacities.traps,
            EntityKind::Particle => self.capacities.particles,
        }
    }

    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the tile edge length in pixels.
    pub fn with_tile_size(mut self, tile_size: f32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set the pool size for one entity kind.
    pub fn with_capacity(mut self, kind: EntityKind, capacity: usize) -> Self {
        match kind {
            EntityKind::Minion => self.capacities.minions = capacity,
            EntityKind::Tower => self.capacities.towers = capacity,
            EntityKind::Projectile => self.capacities.projectiles = capacity,
            EntityKind::Trap => self.capacities.traps = capacity,
            EntityKind::Particle => self.capacities.particles = capacity,
        }
        self
    }

    /// Set the live defender cap for spawner towers.
    pub fn with_max_defenders(mut self, max: usize) -> Self {
        self.max_defenders = max;
        self
    }

    /// Set all level transition delays at once.
    pub fn with_transitions(mut self, transitions: TransitionTimes) -> Self {
        self.transitions = transitions;
        self
    }
}
