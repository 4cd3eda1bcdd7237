//! Entity registry — the ordered set of live top-level entities.
//!
//! Registration order is the contract: entities update in that order, so an
//! earlier entity's changes are visible to later ones in the same tick, and
//! they draw in that order, so later entities land on top.

use std::any::Any;

use crate::context::{Canvas, SimContext};
use crate::entities::{EntityKind, InputEvent};

/// Capability set every top-level entity provides.
pub trait Entity: Any + Send {
    /// Advance one tick.  `peers` gives access to every other registered
    /// entity; lookups that find nothing mean "not available this tick".
    fn update(&mut self, ctx: &mut SimContext, peers: &mut Peers<'_>);

    fn draw(&self, ctx: &SimContext, canvas: &mut dyn Canvas);

    fn handle_input(&mut self, _event: InputEvent, _ctx: &mut SimContext) {}

    /// Session clock stopped or restarted.  Anything timed off the wall
    /// clock should hold still while paused.
    fn set_paused(&mut self, _paused: bool) {}

    fn kind(&self) -> EntityKind;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Handle returned by `Registry::add`; removal is by identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(u64);

type Entry = (EntityId, Box<dyn Entity>);

/// Every registered entity except the one currently updating.
pub struct Peers<'a> {
    before: &'a mut [Entry],
    after: &'a mut [Entry],
}

impl Peers<'static> {
    /// No peers at all.
    pub fn none() -> Self {
        Peers {
            before: &mut [],
            after: &mut [],
        }
    }
}

impl<'a> Peers<'a> {
    /// First peer of `kind` in registration order.
    pub fn find_by_kind(&self, kind: EntityKind) -> Option<&dyn Entity> {
        self.before
            .iter()
            .chain(self.after.iter())
            .find(|(_, e)| e.kind() == kind)
            .map(|(_, e)| &**e as &dyn Entity)
    }

    pub fn find_by_kind_mut(&mut self, kind: EntityKind) -> Option<&mut dyn Entity> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find(|(_, e)| e.kind() == kind)
            .map(|(_, e)| &mut **e as &mut dyn Entity)
    }

    /// First peer of `kind`, downcast to its concrete type.
    pub fn find<T: Entity>(&self, kind: EntityKind) -> Option<&T> {
        self.find_by_kind(kind)?.as_any().downcast_ref::<T>()
    }

    pub fn find_mut<T: Entity>(&mut self, kind: EntityKind) -> Option<&mut T> {
        self.find_by_kind_mut(kind)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        log::debug!("registered {} as {:?}", entity.kind().as_str(), id);
        self.entries.push((id, entity));
        id
    }

    pub fn add_all<I>(&mut self, entities: I) -> Vec<EntityId>
    where
        I: IntoIterator<Item = Box<dyn Entity>>,
    {
        entities.into_iter().map(|e| self.add(e)).collect()
    }

    /// Remove by identity; `None` if it was never registered or already gone.
    pub fn remove(&mut self, id: EntityId) -> Option<Box<dyn Entity>> {
        let index = self.entries.iter().position(|(eid, _)| *eid == id)?;
        Some(self.entries.remove(index).1)
    }

    pub fn remove_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entities in registration order.
    pub fn list(&self) -> impl Iterator<Item = &dyn Entity> {
        self.entries.iter().map(|(_, e)| &**e as &dyn Entity)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// First registered entity of `kind`.  Uniqueness is not enforced.
    pub fn find_by_kind(&self, kind: EntityKind) -> Option<&dyn Entity> {
        self.list().find(|e| e.kind() == kind)
    }

    pub fn find_by_kind_mut(&mut self, kind: EntityKind) -> Option<&mut dyn Entity> {
        self.entries
            .iter_mut()
            .find(|(_, e)| e.kind() == kind)
            .map(|(_, e)| &mut **e as &mut dyn Entity)
    }

    pub fn find<T: Entity>(&self, kind: EntityKind) -> Option<&T> {
        self.find_by_kind(kind)?.as_any().downcast_ref::<T>()
    }

    pub fn find_mut<T: Entity>(&mut self, kind: EntityKind) -> Option<&mut T> {
        self.find_by_kind_mut(kind)?.as_any_mut().downcast_mut::<T>()
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Update every entity in registration order.
    pub fn update_all(&mut self, ctx: &mut SimContext) {
        for i in 0..self.entries.len() {
            let (before, rest) = self.entries.split_at_mut(i);
            if let Some(((_, current), after)) = rest.split_first_mut() {
                let mut peers = Peers { before, after };
                current.update(ctx, &mut peers);
            }
        }
    }

    /// Draw every entity in registration order; later ones paint over earlier.
    pub fn draw_all(&self, ctx: &SimContext, canvas: &mut dyn Canvas) {
        for (_, entity) in &self.entries {
            entity.draw(ctx, canvas);
        }
    }

    pub fn dispatch_input(&mut self, event: InputEvent, ctx: &mut SimContext) {
        for (_, entity) in self.entries.iter_mut() {
            entity.handle_input(event, ctx);
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        for (_, entity) in self.entries.iter_mut() {
            entity.set_paused(paused);
        }
    }
}
