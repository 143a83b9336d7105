//! Configuration for sync operations.

use std::time::Duration;

/// Default undo window for optimistic deletes.
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(10);

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long a delete remains undoable.
    pub undo_window: Duration,
}

impl SyncConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            undo_window: DEFAULT_UNDO_WINDOW,
        }
    }

    /// Sets the undo window.
    #[must_use]
    pub fn with_undo_window(mut self, window: Duration) -> Self {
        self.undo_window = window;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
