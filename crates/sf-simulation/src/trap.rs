use glam::Vec2;
use sf_core::{Body, EntityId, EntityKind, EntityPool, HasBody};

use crate::area;
use crate::behavior::Behavior;
use crate::event::SimEventKind;
use crate::render::{DrawCommand, Sprite};
use crate::spatial::SideFilter;
use crate::world::World;

/// A buried mine. Blows up the first time an attacker walks close.
#[derive(Debug, Clone, PartialEq)]
pub struct Trap {
    /// Shared fields.
    pub body: Body,
}

impl Trap {
    /// An armed trap.
    pub fn new(position: Vec2) -> Self {
        Self {
            body: Body::at(position),
        }
    }
}

impl HasBody for Trap {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Behavior for Trap {
    const KIND: EntityKind = EntityKind::Trap;

    fn pool(world: &World) -> &EntityPool<Self> {
        &world.traps
    }

    fn pool_mut(world: &mut World) -> &mut EntityPool<Self> {
        &mut world.traps
    }

    fn update(world: &mut World, id: EntityId, _dt: f32) {
        let Ok(trap) = world.traps.get(id) else {
            return;
        };
        let position = trap.body.position;
        let reach = world.config.trap_trigger_radius;
        if !world
            .spatial
            .any_within(&world.minions, position, reach, SideFilter::AttackerOnly)
        {
            return;
        }
        world.emit(
            SimEventKind::TrapTriggered { trap: id },
            format!("{id} triggered"),
        );
        world.destroy(id);
        let blast = world.config.trap_blast_radius;
        area::detonate(world, position, blast);
    }

    fn draw(&self) -> DrawCommand {
        DrawCommand::new(Sprite::Trap, &self.body).with_anchor(Vec2::new(0.5, 0.9))
    }
}
