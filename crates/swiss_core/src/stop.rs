//! Cooperative cancellation for simulation runs.
//!
//! A [`StopFlag`] is checked before each trial is scheduled. Trials that are
//! already running finish normally, so every counted trial is complete.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Thread-safe stop signal, optionally with a wall-clock budget.
///
/// Cheap to clone; all clones share the same flag.
#[derive(Debug, Clone)]
pub struct StopFlag {
    stopped: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl StopFlag {
    pub fn new() -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Flag that trips by itself once `budget` has elapsed from now.
    pub fn with_time_limit(budget: Duration) -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + budget),
        }
    }

    /// Stop scheduling new trials.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Whether the run should stop scheduling trials.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.stop();
                true
            }
            _ => false,
        }
    }
}
