//! In-memory celebration trigger log.
//!
//! Triggers have no persisted identity: the admin panel records a
//! timestamp, displays poll for the count inside a short recent window,
//! and old entries are pruned as a side effect of both operations.

use std::time::{SystemTime, UNIX_EPOCH};

/// How long a trigger is retained at all.
const RETENTION_SECS: f64 = 30.0;
/// Window reported to polling displays.
const RECENT_WINDOW_SECS: f64 = 5.0;

/// Pruned list of trigger timestamps (epoch seconds).
#[derive(Debug, Default)]
pub struct TriggerLog {
    entries: Vec<f64>,
}

impl TriggerLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a trigger now; returns its timestamp.
    pub fn record(&mut self) -> f64 {
        self.record_at(now_epoch())
    }

    /// Triggers inside the recent window, oldest first.
    pub fn recent(&mut self) -> Vec<f64> {
        self.recent_at(now_epoch())
    }

    fn record_at(&mut self, now: f64) -> f64 {
        self.entries.retain(|t| now - t < RETENTION_SECS);
        self.entries.push(now);
        now
    }

    fn recent_at(&mut self, now: f64) -> Vec<f64> {
        self.entries.retain(|t| now - t < RETENTION_SECS);
        self.entries
            .iter()
            .copied()
            .filter(|t| now - t < RECENT_WINDOW_SECS)
            .collect()
    }
}

fn now_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_window_is_five_seconds() {
        let mut log = TriggerLog::new();
        log.record_at(100.0);
        log.record_at(103.0);
        log.record_at(107.0);

        let recent = log.recent_at(107.5);
        assert_eq!(recent, vec![103.0, 107.0]);
    }

    #[test]
    fn entries_expire_after_retention() {
        let mut log = TriggerLog::new();
        log.record_at(100.0);
        assert!(log.recent_at(104.0).len() == 1);
        assert!(log.recent_at(106.0).is_empty());

        // Past retention the entry is dropped entirely.
        log.recent_at(131.0);
        assert!(log.entries.is_empty());
    }

    #[test]
    fn record_prunes_stale_entries() {
        let mut log = TriggerLog::new();
        log.record_at(100.0);
        log.record_at(140.0);
        assert_eq!(log.entries, vec![140.0]);
    }
}
