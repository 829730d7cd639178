//! Progress notification for long correction runs
//!
//! The engine reports how many keys it has assigned through an injected
//! [`ProgressObserver`]; it keeps no counters of its own beyond the loop
//! index. Any `FnMut(usize, usize)` closure is an observer.

use tracing::info;

/// Receives progress notifications from the correction engine
pub trait ProgressObserver {
    /// Called every `progress_interval` keys with the keys assigned so far
    fn on_progress(&mut self, processed: usize, total: usize);

    /// Called once after the last key has been assigned
    fn on_finish(&mut self, total: usize) {
        let _ = total;
    }
}

impl<F> ProgressObserver for F
where
    F: FnMut(usize, usize),
{
    fn on_progress(&mut self, processed: usize, total: usize) {
        self(processed, total)
    }
}

/// Observer that ignores all notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _processed: usize, _total: usize) {}
}

/// Observer that logs progress via tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, processed: usize, total: usize) {
        info!("  Assigned {} / {} keys...", processed, total);
    }

    fn on_finish(&mut self, total: usize) {
        info!("  Assigned all {} keys", total);
    }
}
