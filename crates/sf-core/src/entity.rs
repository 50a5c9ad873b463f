use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The five entity kinds. Each kind owns its own fixed-capacity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A walking unit of either side.
    Minion,
    /// A stationary defensive structure.
    Tower,
    /// An arrow or shell in flight.
    Projectile,
    /// A hidden mine that detonates on contact.
    Trap,
    /// A cosmetic particle. Never affects the simulation.
    Particle,
}

impl EntityKind {
    /// All kinds in update order.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Minion,
        EntityKind::Tower,
        EntityKind::Projectile,
        EntityKind::Trap,
        EntityKind::Particle,
    ];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minion => write!(f, "minion"),
            Self::Tower => write!(f, "tower"),
            Self::Projectile => write!(f, "projectile"),
            Self::Trap => write!(f, "trap"),
            Self::Particle => write!(f, "particle"),
        }
    }
}

/// Allegiance of a minion.
///
/// Attackers are the player's summoned swarm; defenders guard the towers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The player's minions, placed from the inventory.
    Attacker,
    /// Minions fighting for the towers.
    Defender,
}

impl Side {
    /// The opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Self::Attacker => Self::Defender,
            Self::Defender => Self::Attacker,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attacker => write!(f, "attacker"),
            Self::Defender => write!(f, "defender"),
        }
    }
}

/// Tower archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerArchetype {
    /// Fires direct arrows at single minions.
    Ranged,
    /// Lobs shells that detonate on landing.
    Area,
    /// Materialises defender minions next to itself.
    Spawner,
}

impl fmt::Display for TowerArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ranged => write!(f, "ranged"),
            Self::Area => write!(f, "area"),
            Self::Spawner => write!(f, "spawner"),
        }
    }
}

/// Handle to one occupied pool slot.
///
/// The generation is bumped every time the slot is freed, so an id kept
/// across a destroy no longer matches the slot and every lookup through it
/// fails instead of reaching the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    kind: EntityKind,
    index: u32,
    generation: u32,
}

impl EntityId {
    pub(crate) fn new(kind: EntityKind, index: usize, generation: u32) -> Self {
        Self {
            kind,
            index: index as u32,
            generation,
        }
    }

    /// The pool this id belongs to.
    pub fn kind(self) -> EntityKind {
        self.kind
    }

    /// Slot index within the pool.
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot at the time the id was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}v{}", self.kind, self.index, self.generation)
    }
}

/// Fields shared by every entity record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    /// World position in pixels.
    pub position: Vec2,
    /// Virtual height above the ground, used for arcs and shadows.
    pub height: f32,
    /// Seconds since spawn.
    pub lifetime: f32,
}

impl Body {
    /// A body on the ground at `position`.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            height: 0.0,
            lifetime: 0.0,
        }
    }

    /// A body at `position` raised by `height`.
    pub fn raised(position: Vec2, height: f32) -> Self {
        Self {
            position,
            height,
            lifetime: 0.0,
        }
    }
}

/// Access to the common [`Body`] of an entity record.
pub trait HasBody {
    /// Shared fields of this record.
    fn body(&self) -> &Body;

    /// Mutable shared fields of this record.
    fn body_mut(&mut self) -> &mut Body;
}

impl HasBody for Body {
    fn body(&self) -> &Body {
        self
    }

    fn body_mut(&mut self) -> &mut Body {
        self
    }
}
