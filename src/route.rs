use std::fmt;

/// Capability set a window or tab route exposes to the stack managers.
///
/// Managers never inspect a route beyond these calls. `key` is the route's
/// identity for deduplication: pushing a route whose key is already present
/// focuses the existing entry instead of adding a second one.
pub trait Route: fmt::Debug {
    type Key: Clone + Eq + fmt::Debug;

    fn key(&self) -> Self::Key;

    fn title(&self) -> String {
        format!("{:?}", self.key())
    }

    fn can_close(&self) -> bool {
        true
    }

    /// Teardown hook, called synchronously before the route is unlinked from
    /// its stack.
    fn on_remove(&mut self) {}
}
