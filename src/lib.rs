//! Window and tab stack state engine.
//!
//! Tracks a collection of window-like or tab-like routes, their ordering
//! (z-order or active tab), their life-cycle state (floating, minimized,
//! maximized, pinned) and geometry. Rendering, gesture recognition and
//! animation belong to the host; the managers here only receive
//! already-computed deltas and emit change notifications.

pub mod constants;
pub mod error;
pub mod geometry;
pub mod notify;
pub mod route;
pub mod snapshot;
pub mod stack;
pub mod tabs;
pub mod tracing_sub;
pub mod window;

pub use error::StackError;
pub use geometry::{Rect, ResizeEdge, Size};
pub use notify::{ListenerId, StackEvent};
pub use route::Route;
pub use stack::{EntityId, RouteStack};
pub use tabs::TabStackManager;
pub use window::{PushOutcome, WindowEntry, WindowStackConfig, WindowStackManager, WindowState};
