//! Shared crate-wide constants.

use crate::geometry::Size;

/// Smallest width a window may be resized to. Requests below this are
/// clamped silently.
pub const MIN_WINDOW_WIDTH: f64 = 200.0;

/// Smallest height a window may be resized to.
pub const MIN_WINDOW_HEIGHT: f64 = 150.0;

/// Size given to a freshly pushed window.
pub const DEFAULT_WINDOW_SIZE: Size = Size {
    width: 640.0,
    height: 480.0,
};

/// Top-left corner of the first cascaded window.
pub const DEFAULT_ORIGIN_X: f64 = 40.0;
pub const DEFAULT_ORIGIN_Y: f64 = 40.0;

/// Offset applied per pushed window so stacked windows don't perfectly
/// overlap.
///
/// The n-th window lands at `origin + (n * CASCADE_STEP) % CASCADE_SPAN` on
/// both axes, so the cascade wraps back to the origin after
/// `CASCADE_SPAN / CASCADE_STEP` windows.
pub const CASCADE_STEP: f64 = 24.0;
pub const CASCADE_SPAN: f64 = 200.0;

/// Viewport a caller may pass when it has no real host viewport, for example
/// when restoring a maximized window from a snapshot before the first frame.
/// Never applied implicitly.
pub const FALLBACK_VIEWPORT: Size = Size {
    width: 1280.0,
    height: 800.0,
};
