use crate::constants::{
    CASCADE_SPAN, CASCADE_STEP, DEFAULT_ORIGIN_X, DEFAULT_ORIGIN_Y, DEFAULT_WINDOW_SIZE,
};
use crate::geometry::{Rect, Size};

/// Tunables for a [`WindowStackManager`](super::WindowStackManager).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStackConfig {
    pub default_size: Size,
    pub origin_x: f64,
    pub origin_y: f64,
    pub cascade_step: f64,
    pub cascade_span: f64,
}

impl Default for WindowStackConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_WINDOW_SIZE,
            origin_x: DEFAULT_ORIGIN_X,
            origin_y: DEFAULT_ORIGIN_Y,
            cascade_step: CASCADE_STEP,
            cascade_span: CASCADE_SPAN,
        }
    }
}

impl WindowStackConfig {
    pub fn with_default_size(mut self, size: Size) -> Self {
        self.default_size = size;
        self
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    pub fn with_cascade(mut self, step: f64, span: f64) -> Self {
        self.cascade_step = step;
        self.cascade_span = span;
        self
    }
}

/// Deterministic cascade for newly pushed windows.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    next_seq: usize,
}

impl Placement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_rect(&mut self, config: &WindowStackConfig) -> Rect {
        let seq = self.next_seq;
        self.next_seq = seq.saturating_add(1);
        let offset = if config.cascade_span > 0.0 {
            (seq as f64 * config.cascade_step) % config.cascade_span
        } else {
            0.0
        };
        Rect::new(
            config.origin_x + offset,
            config.origin_y + offset,
            config.default_size.width,
            config.default_size.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_steps_and_wraps() {
        let config = WindowStackConfig::default().with_cascade(50.0, 100.0);
        let mut p = Placement::new();
        let xs: Vec<f64> = (0..4).map(|_| p.next_rect(&config).x).collect();
        assert_eq!(xs, vec![40.0, 90.0, 40.0, 90.0]);
    }

    #[test]
    fn zero_span_stacks_at_origin() {
        let config = WindowStackConfig::default()
            .with_origin(5.0, 7.0)
            .with_cascade(10.0, 0.0);
        let mut p = Placement::new();
        p.next_rect(&config);
        let r = p.next_rect(&config);
        assert_eq!((r.x, r.y), (5.0, 7.0));
        assert_eq!(r.size(), DEFAULT_WINDOW_SIZE);
    }
}
