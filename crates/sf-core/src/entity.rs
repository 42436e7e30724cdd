//! Normalized entity storage: an ordered id list plus an id-keyed map.
//!
//! The id order is the paint order (later = on top). Every id in `ids` has
//! an entry in `entities` and vice versa; all mutators preserve that.

use crate::id::ShapeId;
use crate::model::Shape;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Anything stored in an `EntityState` must know its own id.
pub trait Entity {
    fn id(&self) -> ShapeId;
}

impl Entity for Shape {
    fn id(&self) -> ShapeId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState<T> {
    pub ids: Vec<ShapeId>,
    pub entities: HashMap<ShapeId, T>,
}

impl<T> Default for EntityState<T> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            entities: HashMap::new(),
        }
    }
}

impl<T: Entity> EntityState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&T> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut T> {
        self.entities.get_mut(&id)
    }

    /// Iterate entities in paint order (bottom first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.ids.iter().filter_map(|id| self.entities.get(id))
    }

    /// Append an entity on top. Returns `false` (and changes nothing) when
    /// the id is already present.
    pub fn add_one(&mut self, entity: T) -> bool {
        let id = entity.id();
        if self.entities.contains_key(&id) {
            return false;
        }
        self.ids.push(id);
        self.entities.insert(id, entity);
        true
    }

    pub fn remove_one(&mut self, id: ShapeId) -> Option<T> {
        let removed = self.entities.remove(&id)?;
        self.ids.retain(|existing| *existing != id);
        Some(removed)
    }

    /// Remove every listed id that exists. Returns the number removed.
    pub fn remove_many(&mut self, ids: &[ShapeId]) -> usize {
        let doomed: HashSet<ShapeId> = ids
            .iter()
            .copied()
            .filter(|id| self.entities.remove(id).is_some())
            .collect();
        if !doomed.is_empty() {
            self.ids.retain(|id| !doomed.contains(id));
        }
        doomed.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.entities.clear();
    }

    /// Current z-index of an id.
    pub fn position(&self, id: ShapeId) -> Option<usize> {
        self.ids.iter().position(|existing| *existing == id)
    }

    /// Move the given ids to the top, keeping their relative order.
    pub fn bring_to_front(&mut self, ids: &HashSet<ShapeId>) -> bool {
        let (mut order, mut lifted): (Vec<_>, Vec<_>) =
            self.ids.iter().copied().partition(|id| !ids.contains(id));
        order.append(&mut lifted);
        let changed = order != self.ids;
        self.ids = order;
        changed
    }

    /// Move the given ids to the bottom, keeping their relative order.
    pub fn send_to_back(&mut self, ids: &HashSet<ShapeId>) -> bool {
        let (mut front, mut rest): (Vec<_>, Vec<_>) =
            self.ids.iter().copied().partition(|id| ids.contains(id));
        front.append(&mut rest);
        let changed = front != self.ids;
        self.ids = front;
        changed
    }

    /// Move each given id one step up (swap with the next unselected id).
    pub fn bring_forward(&mut self, ids: &HashSet<ShapeId>) -> bool {
        let mut changed = false;
        for i in (0..self.ids.len().saturating_sub(1)).rev() {
            if ids.contains(&self.ids[i]) && !ids.contains(&self.ids[i + 1]) {
                self.ids.swap(i, i + 1);
                changed = true;
            }
        }
        changed
    }

    /// Move each given id one step down (swap with the previous unselected id).
    pub fn send_backward(&mut self, ids: &HashSet<ShapeId>) -> bool {
        let mut changed = false;
        for i in 1..self.ids.len() {
            if ids.contains(&self.ids[i]) && !ids.contains(&self.ids[i - 1]) {
                self.ids.swap(i, i - 1);
                changed = true;
            }
        }
        changed
    }

    /// Check the order/map invariant. Returns the first offending id.
    pub fn find_inconsistency(&self) -> Option<Inconsistency> {
        let mut seen = HashSet::with_capacity(self.ids.len());
        for id in &self.ids {
            if !seen.insert(*id) {
                return Some(Inconsistency::DuplicateId(*id));
            }
            match self.entities.get(id) {
                None => return Some(Inconsistency::OrphanId(*id)),
                Some(entity) if entity.id() != *id => {
                    return Some(Inconsistency::KeyMismatch(*id));
                }
                Some(_) => {}
            }
        }
        self.entities
            .keys()
            .find(|key| !seen.contains(key))
            .map(|key| Inconsistency::UnorderedEntity(*key))
    }
}

/// A violation of the entity table invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inconsistency {
    /// The id appears more than once in the order.
    DuplicateId(ShapeId),
    /// The id is ordered but has no entity.
    OrphanId(ShapeId),
    /// The entity stored under this key carries a different id.
    KeyMismatch(ShapeId),
    /// The entity is in the map but missing from the order.
    UnorderedEntity(ShapeId),
}
