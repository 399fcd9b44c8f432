use std::sync::Mutex;

/// Counters accumulated over one node run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub ticks: usize,
    pub events_emitted: usize,
    pub send_failures: usize,
    pub corrections_applied: usize,
    pub messages_ignored: usize,
}

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_tick(&self) {
        self.bump(|m| m.ticks += 1);
    }

    pub fn record_emitted(&self) {
        self.bump(|m| m.events_emitted += 1);
    }

    pub fn record_send_failure(&self) {
        self.bump(|m| m.send_failures += 1);
    }

    pub fn record_correction(&self) {
        self.bump(|m| m.corrections_applied += 1);
    }

    pub fn record_ignored(&self) {
        self.bump(|m| m.messages_ignored += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }

    fn bump(&self, update: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            update(&mut metrics);
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
