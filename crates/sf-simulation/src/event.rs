use std::fmt;

use glam::Vec2;
use sf_core::{EntityId, EntityKind, Side, TowerArchetype};

/// A level change the simulation asks its host to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelRequest {
    /// Move on to the next level.
    Advance,
    /// Restart the current level.
    Reload,
    /// Step back one level.
    Previous,
}

impl fmt::Display for LevelRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advance => write!(f, "advance"),
            Self::Reload => write!(f, "reload"),
            Self::Previous => write!(f, "previous"),
        }
    }
}

/// Named sound effects the host may play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// An attacker was placed by the player.
    Place,
    /// A ranged tower released an arrow.
    ArrowShot,
    /// An area tower lobbed a shell.
    ShellShot,
    /// Something detonated.
    Explosion,
    /// A tower took a hit.
    TowerHit,
    /// A tower collapsed.
    TowerCollapse,
}

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEventKind {
    // Minions
    /// A minion entered the field.
    MinionSpawned {
        /// The new minion.
        minion: EntityId,
        /// Its allegiance.
        side: Side,
    },
    /// A minion was destroyed.
    MinionKilled {
        /// The destroyed minion.
        minion: EntityId,
        /// Its allegiance.
        side: Side,
    },

    // Towers
    /// A tower lost health.
    TowerDamaged {
        /// The damaged tower.
        tower: EntityId,
        /// Health left after the hit.
        health: i32,
    },
    /// A tower was destroyed and refunded inventory.
    TowerDestroyed {
        /// The destroyed tower.
        tower: EntityId,
        /// Inventory credited to the player.
        reward: u32,
    },
    /// A tower fired at a minion.
    ProjectileLaunched {
        /// The firing tower.
        tower: EntityId,
        /// The minion it aimed at.
        target: EntityId,
        /// Arrow or shell.
        archetype: TowerArchetype,
    },

    // Area effects
    /// A blast went off.
    Detonation {
        /// Blast center.
        center: Vec2,
        /// Blast radius.
        radius: f32,
        /// Minions destroyed by the blast.
        killed: usize,
    },
    /// A trap noticed an attacker and blew up.
    TrapTriggered {
        /// The trap.
        trap: EntityId,
    },

    // Bookkeeping
    /// A spawn was dropped because the pool was full.
    SpawnSkipped {
        /// The exhausted pool.
        kind: EntityKind,
    },
    /// A sound effect should be played.
    SoundRequested {
        /// Which effect.
        cue: SoundCue,
        /// Where in the world.
        position: Vec2,
        /// Linear volume.
        volume: f32,
        /// Pitch multiplier.
        pitch: f32,
    },

    // Levels
    /// The simulation asked for a level change.
    LevelRequested {
        /// What kind of change.
        request: LevelRequest,
    },
    /// A level finished loading.
    LevelLoaded {
        /// Index into the level table.
        index: usize,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::MinionSpawned { minion, .. } | Self::MinionKilled { minion, .. } => *minion == id,
            Self::TowerDamaged { tower, .. } | Self::TowerDestroyed { tower, .. } => *tower == id,
            Self::ProjectileLaunched { tower, target, .. } => *tower == id || *target == id,
            Self::TrapTriggered { trap } => *trap == id,
            Self::Detonation { .. }
            | Self::SpawnSkipped { .. }
            | Self::SoundRequested { .. }
            | Self::LevelRequested { .. }
            | Self::LevelLoaded { .. } => false,
        }
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all recorded events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Return all events that occurred at the given tick.
    pub fn events_at_tick(&self, tick: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Count events matching a predicate.
    pub fn count(&self, predicate: impl Fn(&SimEventKind) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(&e.kind)).count()
    }

    /// Take every recorded event, leaving the log empty.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Return the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn killed(minion: EntityId) -> SimEventKind {
        SimEventKind::MinionKilled {
            minion,
            side: Side::Attacker,
        }
    }

    fn some_id() -> EntityId {
        let mut pool = sf_core::EntityPool::with_capacity(EntityKind::Minion, 1);
        pool.allocate(sf_core::Body::default()).unwrap()
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        let id = some_id();
        log.push(SimEvent::new(1, killed(id), "test"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.events_at_tick(1).len(), 1);
        assert_eq!(log.events_for_entity(id).len(), 1);
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        let id = some_id();
        for i in 0..5 {
            log.push(SimEvent::new(i, killed(id), format!("event {i}")));
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].tick, 3);
        assert_eq!(log.events()[1].tick, 4);
    }

    #[test]
    fn drain_empties_the_log() {
        let mut log = EventLog::new(0);
        log.push(SimEvent::new(
            1,
            SimEventKind::LevelLoaded { index: 0 },
            "loaded",
        ));
        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn count_filters_by_kind() {
        let mut log = EventLog::new(0);
        let id = some_id();
        log.push(SimEvent::new(1, killed(id), "a"));
        log.push(SimEvent::new(
            1,
            SimEventKind::SpawnSkipped {
                kind: EntityKind::Trap,
            },
            "b",
        ));
        assert_eq!(
            log.count(|k| matches!(k, SimEventKind::MinionKilled { .. })),
            1
        );
    }

    #[test]
    fn area_events_involve_no_entity() {
        let id = some_id();
        let blast = SimEventKind::Detonation {
            center: Vec2::ZERO,
            radius: 10.0,
            killed: 2,
        };
        assert!(!blast.involves(id));
    }
}
