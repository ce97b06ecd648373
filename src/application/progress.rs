//! Progress reporting for long extraction runs
//!
//! Observers only see counts; they can never change what gets extracted.

use std::sync::atomic::{AtomicU32, Ordering};

use tracing::trace;

/// Receives "N of M name candidates processed" notifications
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, processed: usize, total: usize);
}

impl<F> ProgressObserver for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, processed: usize, total: usize) {
        self(processed, total);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgressObserver;

impl ProgressObserver for NoOpProgressObserver {
    fn on_progress(&self, _processed: usize, _total: usize) {}
}

/// Forwards a notification only when the whole percentage advanced by at
/// least `step_percent`, and always on completion
pub struct ThrottledProgress<O> {
    inner: O,
    step_percent: u32,
    /// Last forwarded percentage plus one; zero means nothing forwarded yet
    last_forwarded: AtomicU32,
}

impl<O: ProgressObserver> ThrottledProgress<O> {
    pub fn new(inner: O, step_percent: u32) -> Self {
        Self {
            inner,
            step_percent: step_percent.max(1),
            last_forwarded: AtomicU32::new(0),
        }
    }

    /// Start over for a new run
    pub fn reset(&self) {
        self.last_forwarded.store(0, Ordering::Relaxed);
    }

    fn percent(processed: usize, total: usize) -> u32 {
        if total == 0 {
            return 100;
        }
        let percent = processed.min(total).saturating_mul(100) / total;
        u32::try_from(percent).unwrap_or(100)
    }
}

impl<O: ProgressObserver> ProgressObserver for ThrottledProgress<O> {
    fn on_progress(&self, processed: usize, total: usize) {
        let percent = Self::percent(processed, total);
        let last = self.last_forwarded.load(Ordering::Relaxed);
        let due = last == 0 || percent >= (last - 1) + self.step_percent || processed >= total;
        if due && last != percent + 1 {
            self.last_forwarded.store(percent + 1, Ordering::Relaxed);
            trace!("Progress {}% ({}/{})", percent, processed, total);
            self.inner.on_progress(processed, total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<usize>>>, impl ProgressObserver) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |processed: usize, _total: usize| {
            sink.lock().unwrap().push(processed);
        })
    }

    #[test]
    fn test_throttles_to_whole_percent_steps() {
        let (seen, observer) = recorder();
        let throttled = ThrottledProgress::new(observer, 10);
        for processed in 1..=1000 {
            throttled.on_progress(processed, 1000);
        }
        let seen = seen.lock().unwrap();
        assert_eq!(seen.first(), Some(&1));
        assert_eq!(seen.last(), Some(&1000));
        assert_eq!(seen.len(), 11);
    }

    #[test]
    fn test_small_runs_report_every_step() {
        let (seen, observer) = recorder();
        let throttled = ThrottledProgress::new(observer, 1);
        for processed in 1..=3 {
            throttled.on_progress(processed, 3);
        }
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_reset_starts_over() {
        let (seen, observer) = recorder();
        let throttled = ThrottledProgress::new(observer, 50);
        throttled.on_progress(2, 2);
        throttled.reset();
        throttled.on_progress(2, 2);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
