//! Log output goes to stderr so stdout stays free for snapshot output.

use std::io;

use tracing::Level;

/// Initialize a compact tracing subscriber at `DEBUG`.
pub fn init_default() -> bool {
    init_with_level(Level::DEBUG)
}

/// Returns false when a global subscriber was already installed; the call is
/// then a no-op.
pub fn init_with_level(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        init_with_level(Level::WARN);
        assert!(!init_default());
        tracing::debug!("still fine after double init");
    }
}
