use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counts audio callbacks that took longer than the audio they produced.
///
/// The host adapter wraps each callback with [`DeadlineMonitor::time`] (or
/// measures itself and calls [`DeadlineMonitor::record`]). Misses land in an
/// atomic shared with [`EngineHandle::underruns`](crate::EngineHandle::underruns),
/// so the control thread can report them without touching the audio thread.
#[derive(Debug, Clone)]
pub struct DeadlineMonitor {
    sample_rate: f32,
    misses: Arc<AtomicU64>,
}

impl DeadlineMonitor {
    pub fn new(sample_rate: f32, misses: Arc<AtomicU64>) -> Self {
        Self {
            sample_rate,
            misses,
        }
    }

    /// Wall-clock budget for rendering `frames` frames.
    pub fn budget(&self, frames: usize) -> Duration {
        Duration::from_secs_f64(frames as f64 / self.sample_rate as f64)
    }

    /// Record one callback. Returns `true` if it missed its deadline.
    pub fn record(&self, frames: usize, elapsed: Duration) -> bool {
        let missed = elapsed > self.budget(frames);
        if missed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        missed
    }

    /// Run `render` and record how long it took.
    pub fn time<R>(&self, frames: usize, render: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = render();
        self.record(frames, start.elapsed());
        result
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
