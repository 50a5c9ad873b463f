use crate::entity::{EntityId, EntityKind, HasBody};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    occupant: Option<T>,
}

/// Fixed-capacity pool of entity records of one kind.
///
/// Slots are never reallocated. Allocation scans circularly from the slot
/// after the most recently allocated one and takes the first free slot, so
/// steady spawn/destroy churn does not rescan from zero every time. A free
/// slot holds no record at all; its stale data cannot be observed.
#[derive(Debug, Clone)]
pub struct EntityPool<T> {
    kind: EntityKind,
    slots: Vec<Slot<T>>,
    last_allocated: Option<usize>,
    live: usize,
}

impl<T> EntityPool<T> {
    /// Create an empty pool with `capacity` slots.
    pub fn with_capacity(kind: EntityKind, capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                occupant: None,
            })
            .collect();
        Self {
            kind,
            slots,
            last_allocated: None,
            live: 0,
        }
    }

    /// The kind stored in this pool.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Return `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Return `true` if every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.live == self.slots.len()
    }

    /// Free a slot and hand its record back to the caller.
    ///
    /// The slot generation is bumped before returning, so `id` and every copy
    /// of it are stale from here on.
    pub fn free(&mut self, id: EntityId) -> CoreResult<T> {
        self.check(id)?;
        let slot = &mut self.slots[id.index()];
        let record = slot.occupant.take().ok_or(CoreError::StaleReference(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        Ok(record)
    }

    /// Look up a live record.
    pub fn get(&self, id: EntityId) -> CoreResult<&T> {
        self.check(id)?;
        self.slots[id.index()]
            .occupant
            .as_ref()
            .ok_or(CoreError::StaleReference(id))
    }

    /// Look up a live record mutably.
    pub fn get_mut(&mut self, id: EntityId) -> CoreResult<&mut T> {
        self.check(id)?;
        self.slots[id.index()]
            .occupant
            .as_mut()
            .ok_or(CoreError::StaleReference(id))
    }

    /// Return `true` if `id` refers to the current occupant of its slot.
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_ok()
    }

    /// The id of the occupant of slot `index`, if the slot is occupied.
    pub fn id_at(&self, index: usize) -> Option<EntityId> {
        let slot = self.slots.get(index)?;
        slot.occupant
            .as_ref()
            .map(|_| EntityId::new(self.kind, index, slot.generation))
    }

    /// Iterate over live records in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        let kind = self.kind;
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            slot.occupant
                .as_ref()
                .map(|record| (EntityId::new(kind, index, slot.generation), record))
        })
    }

    /// Iterate mutably over live records in ascending slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        let kind = self.kind;
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(move |(index, slot)| {
                let generation = slot.generation;
                slot.occupant
                    .as_mut()
                    .map(|record| (EntityId::new(kind, index, generation), record))
            })
    }

    /// Snapshot of all live ids in ascending slot order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Free every slot without returning the records.
    ///
    /// Used on level transitions. Generations of occupied slots are bumped so
    /// ids issued before the reset go stale.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.occupant.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.live = 0;
        self.last_allocated = None;
    }

    fn check(&self, id: EntityId) -> CoreResult<()> {
        if id.kind() != self.kind {
            return Err(CoreError::KindMismatch {
                expected: self.kind,
                found: id.kind(),
            });
        }
        match self.slots.get(id.index()) {
            Some(slot) if slot.generation == id.generation() => Ok(()),
            _ => Err(CoreError::StaleReference(id)),
        }
    }
}

impl<T: HasBody> EntityPool<T> {
    /// Place `record` in the next free slot and return its id.
    ///
    /// The record's lifetime is reset to zero. Fails with
    /// [`CoreError::PoolExhausted`] when every slot is taken; callers treat
    /// that as a skipped spawn.
    pub fn allocate(&mut self, mut record: T) -> CoreResult<EntityId> {
        let capacity = self.slots.len();
        let exhausted = CoreError::PoolExhausted {
            kind: self.kind,
            capacity,
        };
        if capacity == 0 {
            return Err(exhausted);
        }

        let start = self.last_allocated.map_or(0, |last| (last + 1) % capacity);
        for step in 0..capacity {
            let index = (start + step) % capacity;
            let slot = &mut self.slots[index];
            if slot.occupant.is_none() {
                record.body_mut().lifetime = 0.0;
                slot.occupant = Some(record);
                self.last_allocated = Some(index);
                self.live += 1;
                return Ok(EntityId::new(self.kind, index, slot.generation));
            }
        }
        Err(exhausted)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use glam::Vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::entity::Body;

    #[derive(Debug, Clone, PartialEq)]
    struct Dummy {
        body: Body,
        tag: u32,
    }

    impl Dummy {
        fn new(tag: u32) -> Self {
            Self {
                body: Body::at(Vec2::ZERO),
                tag,
            }
        }
    }

    impl HasBody for Dummy {
        fn body(&self) -> &Body {
            &self.body
        }
        fn body_mut(&mut self) -> &mut Body {
            &mut self.body
        }
    }

    fn pool(capacity: usize) -> EntityPool<Dummy> {
        EntityPool::with_capacity(EntityKind::Minion, capacity)
    }

    #[test]
    fn fills_to_capacity_then_exhausts() {
        let mut pool = pool(4);
        for i in 0..4 {
            assert!(pool.allocate(Dummy::new(i)).is_ok());
        }
        assert!(pool.is_full());
        assert_eq!(
            pool.allocate(Dummy::new(99)),
            Err(CoreError::PoolExhausted {
                kind: EntityKind::Minion,
                capacity: 4,
            })
        );
    }

    #[test]
    fn zero_capacity_pool_always_exhausted() {
        let mut pool = pool(0);
        assert!(matches!(
            pool.allocate(Dummy::new(0)),
            Err(CoreError::PoolExhausted { .. })
        ));
    }

    #[test]
    fn freed_id_is_stale_even_after_reuse() {
        let mut pool = pool(1);
        let first = pool.allocate(Dummy::new(1)).unwrap();
        let record = pool.free(first).unwrap();
        assert_eq!(record.tag, 1);
        assert_eq!(pool.get(first), Err(CoreError::StaleReference(first)));

        let second = pool.allocate(Dummy::new(2)).unwrap();
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert!(pool.get(first).is_err());
        assert_eq!(pool.get(second).unwrap().tag, 2);
    }

    #[test]
    fn double_free_fails() {
        let mut pool = pool(2);
        let id = pool.allocate(Dummy::new(1)).unwrap();
        pool.free(id).unwrap();
        assert!(pool.free(id).is_err());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn allocation_resumes_after_last_allocated_slot() {
        let mut pool = pool(4);
        let a = pool.allocate(Dummy::new(0)).unwrap();
        let b = pool.allocate(Dummy::new(1)).unwrap();
        pool.free(a).unwrap();
        // Slot 0 is free, but the scan starts after slot 1.
        let c = pool.allocate(Dummy::new(2)).unwrap();
        assert_eq!(b.index(), 1);
        assert_eq!(c.index(), 2);
    }

    #[test]
    fn allocation_wraps_around() {
        let mut pool = pool(3);
        let ids: Vec<_> = (0..3).map(|i| pool.allocate(Dummy::new(i)).unwrap()).collect();
        pool.free(ids[0]).unwrap();
        let reused = pool.allocate(Dummy::new(7)).unwrap();
        assert_eq!(reused.index(), 0);
    }

    #[test]
    fn allocate_resets_lifetime() {
        let mut pool = pool(1);
        let mut dummy = Dummy::new(0);
        dummy.body.lifetime = 12.0;
        let id = pool.allocate(dummy).unwrap();
        assert_eq!(pool.get(id).unwrap().body.lifetime, 0.0);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let mut minions = pool(1);
        let mut towers: EntityPool<Dummy> = EntityPool::with_capacity(EntityKind::Tower, 1);
        let tower = towers.allocate(Dummy::new(0)).unwrap();
        minions.allocate(Dummy::new(1)).unwrap();
        assert_eq!(
            minions.get(tower),
            Err(CoreError::KindMismatch {
                expected: EntityKind::Minion,
                found: EntityKind::Tower,
            })
        );
    }

    #[test]
    fn clear_invalidates_outstanding_ids() {
        let mut pool = pool(3);
        let id = pool.allocate(Dummy::new(0)).unwrap();
        pool.clear();
        assert!(pool.is_empty());
        assert!(!pool.contains(id));
        let fresh = pool.allocate(Dummy::new(1)).unwrap();
        assert_eq!(fresh.index(), 0);
        assert!(!pool.contains(id));
    }

    #[test]
    fn iter_visits_live_slots_in_order() {
        let mut pool = pool(4);
        let ids: Vec<_> = (0..4).map(|i| pool.allocate(Dummy::new(i)).unwrap()).collect();
        pool.free(ids[1]).unwrap();
        let tags: Vec<u32> = pool.iter().map(|(_, d)| d.tag).collect();
        assert_eq!(tags, vec![0, 2, 3]);
        assert_eq!(pool.id_at(1), None);
        assert_eq!(pool.id_at(2), Some(ids[2]));
        assert_eq!(pool.id_at(10), None);
    }

    proptest! {
        #[test]
        fn live_ids_never_share_a_slot(ops in prop::collection::vec(any::<bool>(), 1..200)) {
            let mut pool = pool(8);
            let mut live: Vec<EntityId> = Vec::new();
            for (step, spawn) in ops.into_iter().enumerate() {
                if spawn || live.is_empty() {
                    if let Ok(id) = pool.allocate(Dummy::new(step as u32)) {
                        live.push(id);
                    }
                } else {
                    let id = live.remove(step % live.len());
                    prop_assert!(pool.free(id).is_ok());
                    prop_assert!(pool.get(id).is_err());
                }
                let slots: HashSet<usize> = live.iter().map(|id| id.index()).collect();
                prop_assert_eq!(slots.len(), live.len());
                prop_assert_eq!(pool.len(), live.len());
                for id in &live {
                    prop_assert!(pool.contains(*id));
                }
            }
        }
    }
}
