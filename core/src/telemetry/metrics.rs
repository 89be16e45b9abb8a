use std::sync::Mutex;

/// Counts poll-cycle outcomes for one subscription.
pub struct MetricsRecorder {
    inner: Mutex<PollMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollMetrics {
    pub applied: usize,
    pub failed: usize,
    pub stale: usize,
    pub cancelled: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PollMetrics::default()),
        }
    }

    pub fn record_applied(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.applied += 1;
        }
    }

    pub fn record_failed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failed += 1;
        }
    }

    pub fn record_stale(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.stale += 1;
        }
    }

    pub fn record_cancelled(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.cancelled += 1;
        }
    }

    pub fn snapshot(&self) -> PollMetrics {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_outcomes() {
        let recorder = MetricsRecorder::new();
        recorder.record_applied();
        recorder.record_applied();
        recorder.record_failed();
        recorder.record_stale();
        assert_eq!(
            recorder.snapshot(),
            PollMetrics {
                applied: 2,
                failed: 1,
                stale: 1,
                cancelled: 0,
            }
        );
    }
}
