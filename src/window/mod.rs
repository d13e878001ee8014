mod placement;
mod window_manager;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, ResizeEdge, Size};

pub use placement::{Placement, WindowStackConfig};
pub use window_manager::{PushOutcome, WindowStackManager};

/// Life-cycle state of a managed window. Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    #[default]
    Floating,
    Minimized,
    Maximized,
    /// Behaves like `Floating` for geometry, but is kept apart from the
    /// minimized/docked set.
    Pinned,
}

impl WindowState {
    /// Whether direct rect mutation (move, resize, update) is allowed.
    pub fn accepts_geometry(self) -> bool {
        matches!(self, WindowState::Floating | WindowState::Pinned)
    }
}

/// Per-window geometry and state.
///
/// Transitions out of `Floating`/`Pinned` stash the current rect so it can
/// be put back on restore. Geometry writes while minimized or maximized are
/// dropped so a stray drag cannot corrupt the stashed layout.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEntry {
    rect: Rect,
    state: WindowState,
    saved_floating_rect: Option<Rect>,
}

impl WindowEntry {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            state: WindowState::Floating,
            saved_floating_rect: None,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn saved_floating_rect(&self) -> Option<Rect> {
        self.saved_floating_rect
    }

    pub fn is_minimized(&self) -> bool {
        self.state == WindowState::Minimized
    }

    /// Returns false if the window was already minimized.
    pub fn minimize(&mut self) -> bool {
        if self.is_minimized() {
            return false;
        }
        self.saved_floating_rect = Some(self.rect);
        self.state = WindowState::Minimized;
        true
    }

    /// Maximizes into `available`, or restores if already maximized.
    pub fn maximize(&mut self, available: Size) {
        if self.state == WindowState::Maximized {
            if let Some(prev) = self.saved_floating_rect {
                self.rect = prev;
            }
            self.state = WindowState::Floating;
            return;
        }
        self.saved_floating_rect = Some(self.rect);
        self.rect = Rect::from_size(available);
        self.state = WindowState::Maximized;
    }

    /// Back to `Floating` from any state, reinstating the stashed rect. The
    /// stash is kept, so a later restore snaps back to it again.
    pub fn restore(&mut self) {
        if let Some(prev) = self.saved_floating_rect {
            self.rect = prev;
        }
        self.state = WindowState::Floating;
    }

    pub fn toggle_pin(&mut self) {
        self.state = if self.state == WindowState::Pinned {
            WindowState::Floating
        } else {
            WindowState::Pinned
        };
    }

    pub fn update_rect(&mut self, rect: Rect) -> bool {
        if !self.state.accepts_geometry() {
            return false;
        }
        self.rect = rect;
        true
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) -> bool {
        let next = self.rect.move_by(dx, dy);
        self.update_rect(next)
    }

    pub fn resize(&mut self, width: f64, height: f64, x: Option<f64>, y: Option<f64>) -> bool {
        let next = self.rect.resize(width, height, x, y);
        self.update_rect(next)
    }

    pub fn resize_from_edge(&mut self, edge: ResizeEdge, dx: f64, dy: f64) -> bool {
        let next = self.rect.resize_from_edge(edge, dx, dy);
        self.update_rect(next)
    }

    pub(crate) fn set_saved_floating_rect(&mut self, rect: Option<Rect>) {
        self.saved_floating_rect = rect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> WindowEntry {
        WindowEntry::new(Rect::new(40.0, 60.0, 500.0, 400.0))
    }

    #[test]
    fn minimize_then_restore_keeps_rect() {
        let mut w = entry();
        assert!(w.minimize());
        assert_eq!(w.state(), WindowState::Minimized);
        assert!(!w.minimize());
        w.restore();
        assert_eq!(w.state(), WindowState::Floating);
        assert_eq!(w.rect(), Rect::new(40.0, 60.0, 500.0, 400.0));
    }

    #[test]
    fn maximize_twice_toggles_back() {
        let mut w = entry();
        w.maximize(Size::new(1024.0, 768.0));
        assert_eq!(w.state(), WindowState::Maximized);
        assert_eq!(w.rect(), Rect::new(0.0, 0.0, 1024.0, 768.0));
        w.maximize(Size::new(1024.0, 768.0));
        assert_eq!(w.state(), WindowState::Floating);
        assert_eq!(w.rect(), Rect::new(40.0, 60.0, 500.0, 400.0));
    }

    #[test]
    fn repeated_restore_snaps_back_after_drag() {
        let mut w = WindowEntry::new(Rect::new(10.0, 10.0, 300.0, 200.0));
        w.minimize();
        w.restore();
        assert_eq!(w.saved_floating_rect(), Some(Rect::new(10.0, 10.0, 300.0, 200.0)));
        assert!(w.move_by(50.0, 50.0));
        assert_eq!(w.rect().x, 60.0);
        w.restore();
        assert_eq!(w.rect(), Rect::new(10.0, 10.0, 300.0, 200.0));
    }

    #[test]
    fn maximize_toggle_back_keeps_saved_rect() {
        let mut w = entry();
        w.maximize(Size::new(1024.0, 768.0));
        w.maximize(Size::new(1024.0, 768.0));
        assert_eq!(w.saved_floating_rect(), Some(Rect::new(40.0, 60.0, 500.0, 400.0)));
    }

    #[test]
    fn restore_without_saved_rect_only_changes_state() {
        let mut w = entry();
        w.toggle_pin();
        w.restore();
        assert_eq!(w.state(), WindowState::Floating);
        assert_eq!(w.rect(), Rect::new(40.0, 60.0, 500.0, 400.0));
    }

    #[test]
    fn pin_toggles_without_touching_geometry() {
        let mut w = entry();
        w.toggle_pin();
        assert_eq!(w.state(), WindowState::Pinned);
        assert!(w.move_by(10.0, 10.0));
        assert_eq!(w.rect().x, 50.0);
        w.toggle_pin();
        assert_eq!(w.state(), WindowState::Floating);
        assert_eq!(w.saved_floating_rect(), None);
    }

    #[test]
    fn geometry_ignored_while_minimized_or_maximized() {
        let mut w = entry();
        w.minimize();
        assert!(!w.move_by(10.0, 10.0));
        assert!(!w.resize(900.0, 900.0, None, None));
        assert_eq!(w.rect(), Rect::new(40.0, 60.0, 500.0, 400.0));

        let mut m = entry();
        m.maximize(Size::new(800.0, 600.0));
        assert!(!m.update_rect(Rect::new(1.0, 1.0, 300.0, 300.0)));
        assert_eq!(m.rect(), Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn resize_clamps_on_entry() {
        let mut w = entry();
        assert!(w.resize(50.0, 50.0, None, None));
        assert_eq!(w.rect().width, 200.0);
        assert_eq!(w.rect().height, 150.0);
    }
}
