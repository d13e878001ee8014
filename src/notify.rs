use std::fmt;

use crate::stack::EntityId;

/// What changed in a stack. Emitted at most once per public manager call,
/// after every mutation of that call has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEvent {
    Pushed(EntityId),
    /// Renderers must drop anything they hold for this id.
    Removed(EntityId),
    Focused(EntityId),
    StateChanged(EntityId),
    GeometryChanged(EntityId),
    Reordered,
    Reset,
    Restored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&StackEvent)>;

/// Synchronous subscriber list. Listeners only see the event; they cannot
/// reach back into the manager while it is being notified.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StackEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: StackEvent) {
        tracing::trace!(?event, listeners = self.listeners.len(), "stack changed");
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
