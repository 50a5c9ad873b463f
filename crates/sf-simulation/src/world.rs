use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sf_core::{
    Body, EntityId, EntityKind, EntityPool, HasBody, Placement, Side, TileMap, TowerArchetype,
};
use tracing::{debug, trace};

use crate::behavior::Behavior;
use crate::clock::SimClock;
use crate::config::SimConfig;
use crate::effects;
use crate::event::{EventLog, LevelRequest, SimEvent, SimEventKind, SoundCue};
use crate::minion::Minion;
use crate::particle::Particle;
use crate::projectile::{Projectile, ProjectileKind};
use crate::render::DrawCommand;
use crate::spatial::SpatialIndex;
use crate::targeting;
use crate::tower::Tower;
use crate::trap::Trap;

/// All live state of one level.
///
/// Owns one pool per entity kind, the terrain, the minion spatial index, the
/// seeded RNG, and the event log. Behaviour code receives `&mut World` and
/// reaches every other entity through it.
pub struct World {
    pub(crate) config: SimConfig,
    pub(crate) clock: SimClock,
    pub(crate) rng: StdRng,
    pub(crate) events: EventLog,
    pub(crate) tiles: TileMap,
    pub(crate) spatial: SpatialIndex,
    pub(crate) minions: EntityPool<Minion>,
    pub(crate) towers: EntityPool<Tower>,
    pub(crate) projectiles: EntityPool<Projectile>,
    pub(crate) traps: EntityPool<Trap>,
    pub(crate) particles: EntityPool<Particle>,
    pub(crate) inventory: u32,
    pub(crate) defender_count: usize,
    pub(crate) targets_stale: bool,
    /// Snapshot of `targets_stale` taken for the running minion pass.
    pub(crate) retarget_attackers: bool,
    level_request: Option<LevelRequest>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("tick", &self.clock.tick())
            .field("minions", &self.minions.len())
            .field("towers", &self.towers.len())
            .field("projectiles", &self.projectiles.len())
            .field("traps", &self.traps.len())
            .field("particles", &self.particles.len())
            .field("inventory", &self.inventory)
            .finish()
    }
}

impl World {
    /// Create an empty world over `tiles`.
    pub fn new(config: SimConfig, tiles: TileMap) -> Self {
        let pool = |kind| config.capacity(kind);
        Self {
            clock: SimClock::new(),
            rng: StdRng::seed_from_u64(config.seed),
            events: EventLog::new(config.max_events),
            spatial: SpatialIndex::for_map(&tiles),
            tiles,
            minions: EntityPool::with_capacity(EntityKind::Minion, pool(EntityKind::Minion)),
            towers: EntityPool::with_capacity(EntityKind::Tower, pool(EntityKind::Tower)),
            projectiles: EntityPool::with_capacity(
                EntityKind::Projectile,
                pool(EntityKind::Projectile),
            ),
            traps: EntityPool::with_capacity(EntityKind::Trap, pool(EntityKind::Trap)),
            particles: EntityPool::with_capacity(EntityKind::Particle, pool(EntityKind::Particle)),
            inventory: 0,
            defender_count: 0,
            targets_stale: false,
            retarget_attackers: false,
            level_request: None,
            config,
        }
    }

    /// Drop every entity and start over on `tiles` with `inventory` attackers.
    ///
    /// No destroy hooks run. The clock, RNG, and event log carry on.
    pub fn reset(&mut self, tiles: TileMap, inventory: u32) {
        self.minions.clear();
        self.towers.clear();
        self.projectiles.clear();
        self.traps.clear();
        self.particles.clear();
        self.spatial = SpatialIndex::for_map(&tiles);
        self.tiles = tiles;
        self.inventory = inventory;
        self.defender_count = 0;
        self.targets_stale = false;
        self.level_request = None;
    }

    /// Tuning this world runs with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Ticks and elapsed time.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Terrain of the running level.
    pub fn tiles(&self) -> &TileMap {
        &self.tiles
    }

    /// Minion buckets as of the last rebuild.
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Events recorded so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Events recorded so far, mutably.
    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    /// Minion pool.
    pub fn minions(&self) -> &EntityPool<Minion> {
        &self.minions
    }

    /// Tower pool.
    pub fn towers(&self) -> &EntityPool<Tower> {
        &self.towers
    }

    /// Projectile pool.
    pub fn projectiles(&self) -> &EntityPool<Projectile> {
        &self.projectiles
    }

    /// Trap pool.
    pub fn traps(&self) -> &EntityPool<Trap> {
        &self.traps
    }

    /// Particle pool.
    pub fn particles(&self) -> &EntityPool<Particle> {
        &self.particles
    }

    /// Attackers the player may still place.
    pub fn inventory(&self) -> u32 {
        self.inventory
    }

    /// Live defender minions.
    pub fn defender_count(&self) -> usize {
        self.defender_count
    }

    /// Live minions of `side`.
    pub fn minion_count(&self, side: Side) -> usize {
        self.minions.iter().filter(|(_, m)| m.side == side).count()
    }

    /// Set whenever the tower set changes. The next minion pass makes every
    /// attacker re-pick its tower and clears it.
    pub fn targets_stale(&self) -> bool {
        self.targets_stale
    }

    /// Take the pending level change, if any.
    pub fn take_level_request(&mut self) -> Option<LevelRequest> {
        self.level_request.take()
    }

    /// Return `true` if `id` refers to a live entity.
    pub fn contains(&self, id: EntityId) -> bool {
        self.body(id).is_some()
    }

    /// The shared fields of a live entity.
    pub fn body(&self, id: EntityId) -> Option<&Body> {
        match id.kind() {
            EntityKind::Minion => self.minions.get(id).ok().map(HasBody::body),
            EntityKind::Tower => self.towers.get(id).ok().map(HasBody::body),
            EntityKind::Projectile => self.projectiles.get(id).ok().map(HasBody::body),
            EntityKind::Trap => self.traps.get(id).ok().map(HasBody::body),
            EntityKind::Particle => self.particles.get(id).ok().map(HasBody::body),
        }
    }

    /// Ground position of a live entity.
    pub fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.body(id).map(|body| body.position)
    }

    /// What a live entity looks like this frame.
    pub fn draw_command(&self, id: EntityId) -> Option<DrawCommand> {
        match id.kind() {
            EntityKind::Minion => self.minions.get(id).ok().map(Minion::draw),
            EntityKind::Tower => self.towers.get(id).ok().map(Tower::draw),
            EntityKind::Projectile => self.projectiles.get(id).ok().map(Projectile::draw),
            EntityKind::Trap => self.traps.get(id).ok().map(Trap::draw),
            EntityKind::Particle => self.particles.get(id).ok().map(Particle::draw),
        }
    }

    /// Spawn a minion. Attackers pick the nearest tower straight away.
    pub fn spawn_minion(&mut self, side: Side, position: Vec2) -> Option<EntityId> {
        let mut minion = Minion::new(side, position);
        if side == Side::Attacker {
            minion.target = targeting::nearest_tower(self, position);
        }
        let id = self.insert(minion)?;
        if side == Side::Defender {
            self.defender_count += 1;
        }
        effects::kick_dust(self, position);
        self.emit(
            SimEventKind::MinionSpawned { minion: id, side },
            format!("{side} {id} spawned at ({:.0}, {:.0})", position.x, position.y),
        );
        Some(id)
    }

    /// Spawn a tower with `health` hit points.
    pub fn spawn_tower(
        &mut self,
        archetype: TowerArchetype,
        position: Vec2,
        health: i32,
    ) -> Option<EntityId> {
        let reward = u32::try_from(health)
            .unwrap_or(0)
            .saturating_mul(self.config.reward_per_health);
        let id = self.insert(Tower::new(archetype, position, health, reward))?;
        self.targets_stale = true;
        debug!(%id, %archetype, health, "tower placed");
        Some(id)
    }

    /// Spawn a hidden trap.
    pub fn spawn_trap(&mut self, position: Vec2) -> Option<EntityId> {
        self.insert(Trap::new(position))
    }

    /// Launch a projectile from `origin` at a live minion.
    ///
    /// The aim point leads the target by its current velocity over the whole
    /// flight. Returns `None` if the target is gone or the pool is full.
    pub fn spawn_projectile(
        &mut self,
        kind: ProjectileKind,
        origin: Vec2,
        target: EntityId,
        flight_time: f32,
    ) -> Option<EntityId> {
        let minion = self.minions.get(target).ok()?;
        let aim = minion.body.position + minion.velocity * flight_time;
        let projectile = Projectile::launch(kind, origin, aim, target, flight_time, self.config.arc);
        self.insert(projectile)
    }

    /// Spawn a cosmetic particle. Silently dropped when the pool is full.
    pub fn spawn_particle(&mut self, particle: Particle) -> Option<EntityId> {
        self.insert(particle)
    }

    /// Spawn whatever a decoded map cell asks for.
    pub fn apply_placement(&mut self, placement: &Placement) -> Option<EntityId> {
        match *placement {
            Placement::Tower {
                archetype,
                health,
                position,
            } => self.spawn_tower(archetype, position, health),
            Placement::Trap { position } => self.spawn_trap(position),
            Placement::Minion { side, position } => self.spawn_minion(side, position),
        }
    }

    /// Take `amount` health off a tower, destroying it at zero.
    ///
    /// Returns `false` if the tower is already gone.
    pub fn damage_tower(&mut self, id: EntityId, amount: i32) -> bool {
        let Ok(tower) = self.towers.get_mut(id) else {
            return false;
        };
        tower.health -= amount;
        tower.last_hit = Some(tower.body.lifetime);
        let (health, position) = (tower.health, tower.body.position);
        self.emit(
            SimEventKind::TowerDamaged { tower: id, health },
            format!("{id} hit, {health} health left"),
        );
        self.sound(SoundCue::TowerHit, position, 0.6, 1.0);
        if health <= 0 {
            self.destroy(id);
        }
        true
    }

    /// Destroy a live entity and run its kind's destroy hook.
    ///
    /// Returns `false` for stale ids; destroying twice is harmless.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        match id.kind() {
            EntityKind::Minion => self.destroy_as::<Minion>(id),
            EntityKind::Tower => self.destroy_as::<Tower>(id),
            EntityKind::Projectile => self.destroy_as::<Projectile>(id),
            EntityKind::Trap => self.destroy_as::<Trap>(id),
            EntityKind::Particle => self.destroy_as::<Particle>(id),
        }
    }

    /// Advance every entity by `dt` seconds.
    ///
    /// Kinds run in [`EntityKind::ALL`] order, slots in ascending order. Each
    /// record's lifetime grows by `dt` right before its update. The spatial
    /// index is rebuilt once everything has moved.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let tick = self.clock.advance(dt);
        trace!(tick, dt, "world update");

        // A tower falling during this pass raises the flag again for the next frame.
        self.retarget_attackers = std::mem::take(&mut self.targets_stale);
        self.update_pool::<Minion>(dt);
        self.retarget_attackers = false;
        self.update_pool::<Tower>(dt);
        self.update_pool::<Projectile>(dt);
        self.update_pool::<Trap>(dt);
        self.update_pool::<Particle>(dt);

        self.rebuild_spatial();
    }

    /// Re-bucket every live minion by its current position.
    pub fn rebuild_spatial(&mut self) {
        self.spatial.rebuild(&self.minions);
    }

    /// Give the player attackers to place.
    pub fn grant_inventory(&mut self, amount: u32) {
        self.inventory = self.inventory.saturating_add(amount);
    }

    pub(crate) fn take_inventory(&mut self) -> bool {
        if self.inventory == 0 {
            return false;
        }
        self.inventory -= 1;
        true
    }

    pub(crate) fn request_level(&mut self, request: LevelRequest) {
        self.level_request = Some(request);
        self.emit(
            SimEventKind::LevelRequested { request },
            format!("level {request} requested"),
        );
    }

    pub(crate) fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        let tick = self.clock.tick();
        self.events.push(SimEvent::new(tick, kind, description));
    }

    pub(crate) fn sound(&mut self, cue: SoundCue, position: Vec2, volume: f32, pitch: f32) {
        self.emit(
            SimEventKind::SoundRequested {
                cue,
                position,
                volume,
                pitch,
            },
            format!("{cue:?}"),
        );
    }

    fn insert<T: Behavior>(&mut self, record: T) -> Option<EntityId> {
        match T::pool_mut(self).allocate(record) {
            Ok(id) => Some(id),
            Err(err) => {
                // Particles are cosmetic; a full particle pool is routine.
                if T::KIND != EntityKind::Particle {
                    debug!(%err, "spawn skipped");
                    self.emit(SimEventKind::SpawnSkipped { kind: T::KIND }, err.to_string());
                }
                None
            }
        }
    }

    fn destroy_as<T: Behavior>(&mut self, id: EntityId) -> bool {
        match T::pool_mut(self).free(id) {
            Ok(record) => {
                T::on_destroy(self, id, record);
                true
            }
            Err(err) => {
                trace!(%err, "destroy ignored");
                false
            }
        }
    }

    fn update_pool<T: Behavior>(&mut self, dt: f32) {
        for index in 0..T::pool(self).capacity() {
            let Some(id) = T::pool(self).id_at(index) else {
                continue;
            };
            if let Ok(record) = T::pool_mut(self).get_mut(id) {
                record.body_mut().lifetime += dt;
            }
            T::update(self, id, dt);
        }
    }
}
