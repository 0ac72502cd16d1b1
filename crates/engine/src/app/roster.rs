use tracing::debug;

use crate::physics::{Body, Controlled, Controller, MotionController};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    Player,
    Enemy,
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub id: EntityId,
    pub kind: ActorKind,
    pub body: Body,
    pub controller: Controller,
}

impl AsMut<Body> for Actor {
    fn as_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Controlled for Actor {
    fn parts_mut(&mut self) -> (&mut Body, &mut dyn MotionController) {
        (&mut self.body, &mut self.controller)
    }
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Ordered set of active actors. Index 0 is the contact primary.
///
/// Structural changes are queued and only land in [`apply_pending`],
/// which hosts call between ticks.
///
/// [`apply_pending`]: EntityRoster::apply_pending
#[derive(Debug, Default)]
pub struct EntityRoster {
    allocator: EntityIdAllocator,
    actors: Vec<Actor>,
    pending_spawns: Vec<Actor>,
}

impl EntityRoster {
    pub fn spawn(&mut self, kind: ActorKind, body: Body, controller: Controller) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Actor {
            id,
            kind,
            body,
            controller,
        });
        id
    }

    /// Drops dead actors, then activates queued spawns in spawn order.
    /// Returns the removed actors.
    pub fn apply_pending(&mut self) -> Vec<Actor> {
        let mut removed = Vec::new();
        if self.actors.iter().any(|actor| !actor.body.is_alive()) {
            let (alive, dead): (Vec<_>, Vec<_>) = self
                .actors
                .drain(..)
                .partition(|actor| actor.body.is_alive());
            self.actors = alive;
            for actor in &dead {
                debug!(entity = ?actor.id, kind = ?actor.kind, "entity_removed");
            }
            removed = dead;
        }

        if !self.pending_spawns.is_empty() {
            for actor in self.pending_spawns.drain(..) {
                debug!(entity = ?actor.id, kind = ?actor.kind, "entity_spawned");
                self.actors.push(actor);
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.actors.clear();
        self.pending_spawns.clear();
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actors_mut(&mut self) -> &mut [Actor] {
        &mut self.actors
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending_spawns.len()
    }

    pub fn get(&self, id: EntityId) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.id == id)
    }

    pub fn player(&self) -> Option<&Actor> {
        self.actors
            .iter()
            .find(|actor| actor.kind == ActorKind::Player)
    }

    /// True when the first active actor is a player.
    pub fn player_is_primary(&self) -> bool {
        self.actors
            .first()
            .is_some_and(|actor| actor.kind == ActorKind::Player)
    }
}
