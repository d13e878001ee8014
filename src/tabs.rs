use crate::error::{StackError, StackResult};
use crate::notify::{ChangeNotifier, ListenerId, StackEvent};
use crate::route::Route;
use crate::snapshot::{RouteCodec, SnapshotModel, StackSnapshot};
use crate::stack::{EntityId, RouteStack};

/// Tab strip: ordered tabs with a single active tab.
///
/// The active tab is tracked by identity, so removing or moving other tabs
/// never changes which tab is selected. `active_index` is derived and is
/// always `None` (empty) or within `0..len`.
#[derive(Debug)]
pub struct TabStackManager<T: Route> {
    stack: RouteStack<T>,
    active: Option<EntityId>,
    notifier: ChangeNotifier,
}

impl<T: Route> Default for TabStackManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Route> TabStackManager<T> {
    pub fn new() -> Self {
        Self {
            stack: RouteStack::new(),
            active: None,
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StackEvent) + 'static) -> ListenerId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn ids(&self) -> &[EntityId] {
        self.stack.ids()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.stack.contains(id)
    }

    pub fn route(&self, id: EntityId) -> Option<&T> {
        self.stack.get(id)
    }

    pub fn find(&self, key: &T::Key) -> Option<EntityId> {
        self.stack.find(|route| route.key() == *key)
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.stack.index_of(id)
    }

    pub fn active(&self) -> Option<EntityId> {
        self.active
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.and_then(|id| self.stack.index_of(id))
    }

    pub fn active_route(&self) -> Option<&T> {
        self.active.and_then(|id| self.stack.get(id))
    }

    /// Appends a tab and makes it active. Tabs are not deduplicated here;
    /// use [`activate_route`](Self::activate_route) for that.
    pub fn push(&mut self, route: T) -> EntityId {
        let id = self.push_new(route);
        self.notifier.emit(StackEvent::Pushed(id));
        id
    }

    pub fn go_to(&mut self, id: EntityId) -> StackResult<()> {
        if !self.stack.contains(id) {
            return Err(StackError::InvalidReference(id));
        }
        self.select(id);
        Ok(())
    }

    /// Activates the tab with the route's key, pushing it if absent.
    pub fn activate_route(&mut self, route: T) -> EntityId {
        match self.find(&route.key()) {
            Some(id) => {
                self.select(id);
                id
            }
            None => self.push(route),
        }
    }

    pub fn go_to_index(&mut self, index: usize) -> StackResult<EntityId> {
        let id = self.stack.id_at(index).ok_or(StackError::OutOfRange {
            index,
            len: self.stack.len(),
        })?;
        self.select(id);
        Ok(id)
    }

    /// Selects the next (or previous) tab, wrapping around.
    pub fn cycle(&mut self, forward: bool) -> Option<EntityId> {
        let len = self.stack.len();
        if len == 0 {
            return None;
        }
        let next = match self.active_index() {
            Some(idx) => {
                let step = if forward { 1 } else { -1 };
                (idx as isize + step).rem_euclid(len as isize) as usize
            }
            None if forward => 0,
            None => len - 1,
        };
        let id = self.stack.id_at(next)?;
        self.select(id);
        Some(id)
    }

    /// Moves a tab to `to_index`. The active tab stays the same tab.
    pub fn move_tab(&mut self, id: EntityId, to_index: usize) -> StackResult<()> {
        if !self.stack.contains(id) {
            return Err(StackError::InvalidReference(id));
        }
        if !self.stack.move_to(id, to_index) {
            return Err(StackError::OutOfRange {
                index: to_index,
                len: self.stack.len(),
            });
        }
        self.notifier.emit(StackEvent::Reordered);
        Ok(())
    }

    /// User-initiated close; refuses routes that don't allow closing.
    pub fn close_tab(&mut self, id: EntityId) -> StackResult<T> {
        let route = self.stack.get(id).ok_or(StackError::InvalidReference(id))?;
        if !route.can_close() {
            return Err(StackError::NotClosable(id));
        }
        self.remove(id)
    }

    /// Removes a tab after running its teardown hook. Removing the active
    /// tab selects whichever tab slides into its slot, or the new last tab
    /// when it was at the end.
    pub fn remove(&mut self, id: EntityId) -> StackResult<T> {
        let index = self
            .stack
            .index_of(id)
            .ok_or(StackError::InvalidReference(id))?;
        if let Some(route) = self.stack.get_mut(id) {
            route.on_remove();
        }
        let route = self
            .stack
            .remove(id)
            .ok_or(StackError::InvalidReference(id))?;
        if self.active == Some(id) {
            self.active = if self.stack.is_empty() {
                None
            } else {
                self.stack.id_at(index.min(self.stack.len() - 1))
            };
        }
        tracing::debug!(tab_id = %id, active = ?self.active_index(), "closed tab");
        self.notifier.emit(StackEvent::Removed(id));
        Ok(route)
    }

    pub fn reset(&mut self) {
        self.clear_all();
        self.notifier.emit(StackEvent::Reset);
    }

    pub fn snapshot<C: RouteCodec<T>>(&self, codec: &C) -> StackResult<StackSnapshot> {
        let entries = self
            .stack
            .iter()
            .map(|(_, route)| codec.encode(route))
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(StackSnapshot {
            entries,
            per_entity_state: Vec::new(),
            active_index: self.active_index().map(|idx| idx as i64),
        })
    }

    pub fn restore(&mut self, model: SnapshotModel<T>) {
        self.clear_all();
        for route in model.routes {
            self.stack.push(route);
        }
        self.active = model.active_index.and_then(|idx| self.stack.id_at(idx));
        tracing::debug!(tabs = self.stack.len(), active = ?self.active_index(), "restored tab stack");
        self.notifier.emit(StackEvent::Restored);
    }

    pub fn restore_snapshot<C: RouteCodec<T>>(
        &mut self,
        snapshot: &StackSnapshot,
        codec: &C,
    ) -> StackResult<()> {
        let model = SnapshotModel::decode(snapshot, codec)?;
        self.restore(model);
        Ok(())
    }

    fn push_new(&mut self, route: T) -> EntityId {
        let id = self.stack.push(route);
        self.active = Some(id);
        tracing::debug!(tab_id = %id, index = self.stack.len() - 1, "opened tab");
        id
    }

    fn select(&mut self, id: EntityId) {
        self.active = Some(id);
        self.notifier.emit(StackEvent::Focused(id));
    }

    fn clear_all(&mut self) {
        let ids = self.stack.ids().to_vec();
        for id in ids {
            if let Some(route) = self.stack.get_mut(id) {
                route.on_remove();
            }
        }
        self.stack.clear();
        self.active = None;
    }
}
