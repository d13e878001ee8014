use std::collections::BTreeMap;
use std::fmt;

/// Stable handle for an entry in a [`RouteStack`].
///
/// Handles are allocated at insertion and never reused by the stack that
/// issued them, so a stale handle resolves to nothing instead of aliasing a
/// newer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered collection of entries keyed by [`EntityId`].
///
/// Iteration order is insertion order (the "existence" order). This is not
/// the paint order; window managers track z-order separately.
#[derive(Debug, Clone)]
pub struct RouteStack<T> {
    order: Vec<EntityId>,
    entries: BTreeMap<EntityId, T>,
    next_id: u64,
}

impl<T> Default for RouteStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteStack<T> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn push(&mut self, entry: T) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.order.push(id);
        self.entries.insert(id, entry);
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let pos = self.index_of(id)?;
        self.order.remove(pos);
        self.entries.remove(&id)
    }

    /// Moves `id` so it ends up at `index`. Returns false when `id` is absent
    /// or `index` is past the end.
    pub fn move_to(&mut self, id: EntityId, index: usize) -> bool {
        if index >= self.order.len() {
            return false;
        }
        let Some(pos) = self.index_of(id) else {
            return false;
        };
        let item = self.order.remove(pos);
        self.order.insert(index, item);
        true
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.order.iter().position(|x| *x == id)
    }

    pub fn id_at(&self, index: usize) -> Option<EntityId> {
        self.order.get(index).copied()
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| (*id, entry)))
    }

    /// First entry, in stack order, matching `pred`.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<EntityId> {
        self.iter().find(|(_, entry)| pred(*entry)).map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_fresh_ids_in_order() {
        let mut s = RouteStack::new();
        let a = s.push("a");
        let b = s.push("b");
        assert_ne!(a, b);
        assert_eq!(s.ids(), &[a, b]);
        assert_eq!(s.index_of(b), Some(1));
        assert_eq!(s.get(a), Some(&"a"));
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut s = RouteStack::new();
        let a = s.push(1);
        assert_eq!(s.remove(a), Some(1));
        let b = s.push(2);
        assert_ne!(a, b);
        assert!(!s.contains(a));
        assert_eq!(s.remove(a), None);
    }

    #[test]
    fn move_to_reorders() {
        let mut s = RouteStack::new();
        let a = s.push('a');
        let b = s.push('b');
        let c = s.push('c');
        assert!(s.move_to(c, 0));
        assert_eq!(s.ids(), &[c, a, b]);
        assert!(!s.move_to(c, 3));
        let values: Vec<char> = s.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!['c', 'a', 'b']);
    }

    #[test]
    fn find_uses_stack_order() {
        let mut s = RouteStack::new();
        s.push(3);
        let second = s.push(4);
        s.push(4);
        assert_eq!(s.find(|v| *v == 4), Some(second));
        assert_eq!(s.find(|v| *v == 9), None);
    }

    #[test]
    fn entity_id_display() {
        let mut s = RouteStack::new();
        s.push(());
        let id = s.push(());
        assert_eq!(id.to_string(), "#1");
        assert_eq!(id.raw(), 1);
    }
}
