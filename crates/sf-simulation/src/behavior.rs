use sf_core::{EntityId, EntityKind, EntityPool, HasBody};

use crate::render::DrawCommand;
use crate::world::World;

/// Per-kind behaviour, dispatched statically by the world.
///
/// Every entity kind owns one pool inside [`World`]. The world walks the pools
/// in [`EntityKind::ALL`] order, bumps each record's lifetime, then calls
/// [`Behavior::update`] with the record's id. Behaviour code looks records up
/// through the world, so it may spawn, damage, or destroy anything, itself
/// included.
pub trait Behavior: HasBody + Sized {
    /// The pool this record lives in.
    const KIND: EntityKind;

    /// This kind's pool inside `world`.
    fn pool(world: &World) -> &EntityPool<Self>;

    /// This kind's pool inside `world`, mutably.
    fn pool_mut(world: &mut World) -> &mut EntityPool<Self>;

    /// Advance the record behind `id` by `dt` seconds.
    fn update(world: &mut World, id: EntityId, dt: f32);

    /// Runs after the slot behind `id` has been released.
    fn on_destroy(_world: &mut World, _id: EntityId, _record: Self) {}

    /// Sprite description for this frame.
    fn draw(&self) -> DrawCommand;
}
