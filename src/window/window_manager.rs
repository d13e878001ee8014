use std::iter;

use super::{Placement, WindowEntry, WindowStackConfig};
use crate::error::{StackError, StackResult};
use crate::geometry::{Rect, ResizeEdge, Size};
use crate::notify::{ChangeNotifier, ListenerId, StackEvent};
use crate::route::Route;
use crate::snapshot::{EntityStateRecord, RouteCodec, SnapshotModel, StackSnapshot};
use crate::stack::{EntityId, RouteStack};

#[derive(Debug)]
struct ManagedWindow<T> {
    route: T,
    window: WindowEntry,
}

/// Result of [`WindowStackManager::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// A new window was created.
    Pushed(EntityId),
    /// A window with the same key already existed and was focused instead.
    Focused(EntityId),
}

impl PushOutcome {
    pub fn id(self) -> EntityId {
        match self {
            PushOutcome::Pushed(id) | PushOutcome::Focused(id) => id,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, PushOutcome::Pushed(_))
    }
}

/// Floating window surface: existence order, z-order, active pointer and
/// per-window state.
///
/// Invariants held after every public call:
/// - `z_order` is a permutation of the ids in the stack.
/// - `active`, when set, is a member of the stack.
///
/// Every id-taking operation requires membership and fails with
/// [`StackError::InvalidReference`] without touching any state otherwise.
#[derive(Debug)]
pub struct WindowStackManager<T: Route> {
    stack: RouteStack<ManagedWindow<T>>,
    z_order: Vec<EntityId>,
    active: Option<EntityId>,
    placement: Placement,
    config: WindowStackConfig,
    notifier: ChangeNotifier,
}

impl<T: Route> Default for WindowStackManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Route> WindowStackManager<T> {
    pub fn new() -> Self {
        Self::with_config(WindowStackConfig::default())
    }

    pub fn with_config(config: WindowStackConfig) -> Self {
        Self {
            stack: RouteStack::new(),
            z_order: Vec::new(),
            active: None,
            placement: Placement::new(),
            config,
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn config(&self) -> &WindowStackConfig {
        &self.config
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

    /// Ids in push order.
    pub fn ids(&self) -> &[EntityId] {
        self.stack.ids()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.stack.contains(id)
    }

    pub fn route(&self, id: EntityId) -> Option<&T> {
        self.stack.get(id).map(|m| &m.route)
    }

    pub fn window(&self, id: EntityId) -> Option<&WindowEntry> {
        self.stack.get(id).map(|m| &m.window)
    }

    pub fn title(&self, id: EntityId) -> Option<String> {
        self.route(id).map(|route| route.title())
    }

    pub fn find(&self, key: &T::Key) -> Option<EntityId> {
        self.stack.find(|m| m.route.key() == *key)
    }

    /// Bottom to top; last is topmost.
    pub fn z_order(&self) -> &[EntityId] {
        &self.z_order
    }

    pub fn active(&self) -> Option<EntityId> {
        self.active
    }

    pub fn minimized_windows(&self) -> Vec<EntityId> {
        self.stack
            .iter()
            .filter(|(_, m)| m.window.is_minimized())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn visible_windows(&self) -> Vec<EntityId> {
        self.stack
            .iter()
            .filter(|(_, m)| !m.window.is_minimized())
            .map(|(id, _)| id)
            .collect()
    }

    /// Visible windows sorted by z-order; paint in this order so later
    /// entries land on top.
    pub fn paint_order(&self) -> Vec<EntityId> {
        self.z_order
            .iter()
            .copied()
            .filter(|id| self.window(*id).is_some_and(|w| !w.is_minimized()))
            .collect()
    }

    /// Pushes a new window, or focuses the existing one when a route with
    /// the same key is already present.
    pub fn push(&mut self, route: T) -> PushOutcome {
        if let Some(id) = self.find(&route.key()) {
            self.focus_present(id);
            self.notifier.emit(StackEvent::Focused(id));
            return PushOutcome::Focused(id);
        }
        let id = self.push_new(route);
        self.notifier.emit(StackEvent::Pushed(id));
        PushOutcome::Pushed(id)
    }

    /// Navigation entry point: push if absent, then focus.
    pub fn activate_route(&mut self, route: T) -> PushOutcome {
        let outcome = match self.find(&route.key()) {
            Some(id) => PushOutcome::Focused(id),
            None => PushOutcome::Pushed(self.push_new(route)),
        };
        let id = outcome.id();
        self.focus_present(id);
        let event = if outcome.is_new() {
            StackEvent::Pushed(id)
        } else {
            StackEvent::Focused(id)
        };
        self.notifier.emit(event);
        outcome
    }

    pub fn bring_to_front(&mut self, id: EntityId) -> StackResult<()> {
        self.ensure_member(id)?;
        self.raise(id);
        self.notifier.emit(StackEvent::Focused(id));
        Ok(())
    }

    /// Restores a minimized window, then raises it.
    pub fn focus_window(&mut self, id: EntityId) -> StackResult<()> {
        self.ensure_member(id)?;
        self.focus_present(id);
        self.notifier.emit(StackEvent::Focused(id));
        Ok(())
    }

    /// Minimizes `id`. If it was active, the last visible window in stack
    /// order becomes active.
    pub fn minimize_window(&mut self, id: EntityId) -> StackResult<()> {
        let changed = self.entry_mut(id)?.window.minimize();
        if changed {
            tracing::debug!(window_id = %id, "minimized window");
        }
        let previous = self.active;
        if previous == Some(id) {
            self.active = self.last_visible();
        }
        if changed || self.active != previous {
            self.notifier.emit(StackEvent::StateChanged(id));
        }
        Ok(())
    }

    /// Maximizes into `available`, or restores if already maximized. Raises
    /// the window either way.
    pub fn maximize_window(&mut self, id: EntityId, available: Size) -> StackResult<()> {
        let managed = self.entry_mut(id)?;
        managed.window.maximize(available);
        tracing::debug!(window_id = %id, state = ?managed.window.state(), "toggled maximize");
        self.raise(id);
        self.notifier.emit(StackEvent::StateChanged(id));
        Ok(())
    }

    pub fn restore_window(&mut self, id: EntityId) -> StackResult<()> {
        self.entry_mut(id)?.window.restore();
        tracing::debug!(window_id = %id, "restored window");
        self.raise(id);
        self.notifier.emit(StackEvent::StateChanged(id));
        Ok(())
    }

    pub fn toggle_pin_window(&mut self, id: EntityId) -> StackResult<()> {
        self.entry_mut(id)?.window.toggle_pin();
        self.notifier.emit(StackEvent::StateChanged(id));
        Ok(())
    }

    /// User-initiated close; refuses routes that don't allow closing.
    pub fn close_window(&mut self, id: EntityId) -> StackResult<T> {
        let managed = self
            .stack
            .get(id)
            .ok_or(StackError::InvalidReference(id))?;
        if !managed.route.can_close() {
            return Err(StackError::NotClosable(id));
        }
        self.remove(id)
    }

    /// Unlinks `id` after running its teardown hook. If it was active, the
    /// new top of the z-order becomes active.
    pub fn remove(&mut self, id: EntityId) -> StackResult<T> {
        self.entry_mut(id)?.route.on_remove();
        tracing::debug!(window_id = %id, "closing window");
        let managed = self
            .stack
            .remove(id)
            .ok_or(StackError::InvalidReference(id))?;
        self.z_order.retain(|x| *x != id);
        if self.active == Some(id) {
            self.active = self.z_order.last().copied();
        }
        self.notifier.emit(StackEvent::Removed(id));
        Ok(managed.route)
    }

    pub fn reset(&mut self) {
        self.clear_all();
        self.notifier.emit(StackEvent::Reset);
    }

    /// Returns `Ok(false)` when the window is minimized or maximized and the
    /// write was dropped.
    pub fn update_rect(&mut self, id: EntityId, rect: Rect) -> StackResult<bool> {
        let applied = self.entry_mut(id)?.window.update_rect(rect);
        Ok(self.geometry_changed(id, applied))
    }

    pub fn move_window(&mut self, id: EntityId, dx: f64, dy: f64) -> StackResult<bool> {
        let applied = self.entry_mut(id)?.window.move_by(dx, dy);
        Ok(self.geometry_changed(id, applied))
    }

    pub fn resize_window(
        &mut self,
        id: EntityId,
        width: f64,
        height: f64,
        x: Option<f64>,
        y: Option<f64>,
    ) -> StackResult<bool> {
        let applied = self.entry_mut(id)?.window.resize(width, height, x, y);
        Ok(self.geometry_changed(id, applied))
    }

    pub fn resize_window_from_edge(
        &mut self,
        id: EntityId,
        edge: ResizeEdge,
        dx: f64,
        dy: f64,
    ) -> StackResult<bool> {
        let applied = self.entry_mut(id)?.window.resize_from_edge(edge, dx, dy);
        Ok(self.geometry_changed(id, applied))
    }

    /// Focuses the next (or previous) visible window in stack order,
    /// wrapping around. Returns the newly focused id.
    pub fn cycle_focus(&mut self, forward: bool) -> Option<EntityId> {
        let order = self.visible_windows();
        if order.is_empty() {
            return None;
        }
        let len = order.len() as isize;
        let current = self
            .active
            .and_then(|active| order.iter().position(|id| *id == active));
        let next = match current {
            Some(idx) => {
                let step = if forward { 1 } else { -1 };
                (idx as isize + step).rem_euclid(len) as usize
            }
            None if forward => 0,
            None => order.len() - 1,
        };
        let id = order[next];
        self.focus_present(id);
        self.notifier.emit(StackEvent::Focused(id));
        Some(id)
    }

    pub fn snapshot<C: RouteCodec<T>>(&self, codec: &C) -> StackResult<StackSnapshot> {
        let mut entries = Vec::with_capacity(self.stack.len());
        let mut per_entity_state = Vec::with_capacity(self.stack.len());
        for (_, managed) in self.stack.iter() {
            entries.push(codec.encode(&managed.route)?);
            per_entity_state.push(EntityStateRecord::from_window(&managed.window));
        }
        Ok(StackSnapshot {
            entries,
            per_entity_state,
            active_index: self
                .active
                .and_then(|id| self.stack.index_of(id))
                .map(|idx| idx as i64),
        })
    }

    /// Replaces the stack with a decoded snapshot.
    ///
    /// The z-order is rebuilt from stack order; z-order at save time is not
    /// kept. Maximized windows are re-maximized into `available`.
    pub fn restore(&mut self, model: SnapshotModel<T>, available: Size) {
        self.clear_all();
        let SnapshotModel {
            routes,
            states,
            active_index,
        } = model;
        let mut padded = 0usize;
        let states = states.into_iter().chain(iter::repeat(None));
        for (route, state) in routes.into_iter().zip(states) {
            let id = self.push_new(route);
            let Some(record) = state else {
                padded += 1;
                continue;
            };
            if let Some(managed) = self.stack.get_mut(id) {
                record.apply(&mut managed.window, available);
            }
        }
        if padded > 0 {
            tracing::warn!(padded, "snapshot missing per-window state; using defaults");
        }
        self.active = active_index.and_then(|idx| self.stack.id_at(idx));
        tracing::debug!(windows = self.stack.len(), active = ?self.active, "restored window stack");
        self.notifier.emit(StackEvent::Restored);
    }

    /// Decodes `snapshot` and restores it. A corrupt entry leaves the current
    /// stack untouched.
    pub fn restore_snapshot<C: RouteCodec<T>>(
        &mut self,
        snapshot: &StackSnapshot,
        codec: &C,
        available: Size,
    ) -> StackResult<()> {
        let model = SnapshotModel::decode(snapshot, codec)?;
        self.restore(model, available);
        Ok(())
    }

    fn push_new(&mut self, route: T) -> EntityId {
        let rect = self.placement.next_rect(&self.config);
        let title = route.title();
        let id = self.stack.push(ManagedWindow {
            route,
            window: WindowEntry::new(rect),
        });
        self.z_order.push(id);
        self.active = Some(id);
        tracing::debug!(window_id = %id, %title, "opened window");
        id
    }

    fn focus_present(&mut self, id: EntityId) {
        if let Some(managed) = self.stack.get_mut(id)
            && managed.window.is_minimized()
        {
            managed.window.restore();
        }
        self.raise(id);
    }

    fn raise(&mut self, id: EntityId) {
        if let Some(pos) = self.z_order.iter().position(|&x| x == id) {
            let item = self.z_order.remove(pos);
            self.z_order.push(item);
        } else {
            self.z_order.push(id);
        }
        self.active = Some(id);
    }

    fn last_visible(&self) -> Option<EntityId> {
        self.stack
            .iter()
            .filter(|(_, m)| !m.window.is_minimized())
            .map(|(id, _)| id)
            .last()
    }

    fn clear_all(&mut self) {
        let ids = self.stack.ids().to_vec();
        for id in ids {
            if let Some(managed) = self.stack.get_mut(id) {
                managed.route.on_remove();
            }
        }
        self.stack.clear();
        self.z_order.clear();
        self.active = None;
    }

    fn geometry_changed(&mut self, id: EntityId, applied: bool) -> bool {
        if applied {
            self.notifier.emit(StackEvent::GeometryChanged(id));
        }
        applied
    }

    fn ensure_member(&self, id: EntityId) -> StackResult<()> {
        if self.stack.contains(id) {
            Ok(())
        } else {
            Err(StackError::InvalidReference(id))
        }
    }

    fn entry_mut(&mut self, id: EntityId) -> StackResult<&mut ManagedWindow<T>> {
        self.stack
            .get_mut(id)
            .ok_or(StackError::InvalidReference(id))
    }
}
