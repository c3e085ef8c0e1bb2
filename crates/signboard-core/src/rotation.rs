//! Rotation engine: countdown state machine for the current message.
//!
//! The engine is wall-clock based and has no internal thread -- the
//! caller invokes `tick()` periodically (every ~100ms in the display
//! loop) and runs the advance transaction when a tick reports expiry.
//!
//! All countdown state lives in one struct, so two live countdowns are
//! unrepresentable: replacing the current message always restarts the
//! single countdown from zero progress.

use crate::message::{Message, SignText};

/// Rotation duration in normal operation.
pub const NORMAL_ROTATION_MS: u64 = 25_000;
/// Rotation duration in fast (testing) mode.
pub const FAST_ROTATION_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationMode {
    Normal,
    Fast,
}

impl RotationMode {
    pub fn toggled(self) -> Self {
        match self {
            RotationMode::Normal => RotationMode::Fast,
            RotationMode::Fast => RotationMode::Normal,
        }
    }
}

/// Emitted by [`RotationEngine::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationEvent {
    /// Countdown reached zero. The countdown is already stopped; the
    /// caller runs the advance transaction for the retired message.
    Expired { retired: Option<i64> },
}

/// Countdown state machine for the currently displayed message.
#[derive(Debug, Clone)]
pub struct RotationEngine {
    placeholder: SignText,
    current: Option<Message>,
    mode: RotationMode,
    normal_ms: u64,
    fast_ms: u64,
    total_ms: u64,
    /// Remaining time in milliseconds for the current countdown.
    remaining_ms: u64,
    running: bool,
    /// Timestamp (ms since epoch) of the last flush; used to compute
    /// elapsed time between ticks.
    last_tick_epoch_ms: Option<u64>,
}

impl RotationEngine {
    /// Create an idle engine showing the placeholder.
    pub fn new(placeholder: SignText, mode: RotationMode) -> Self {
        let mut engine = Self {
            placeholder,
            current: None,
            mode,
            normal_ms: NORMAL_ROTATION_MS,
            fast_ms: FAST_ROTATION_MS,
            total_ms: 0,
            remaining_ms: 0,
            running: false,
            last_tick_epoch_ms: None,
        };
        engine.total_ms = engine.duration_ms();
        engine.remaining_ms = engine.total_ms;
        engine
    }

    /// Override the built-in rotation durations (from configuration).
    pub fn with_durations(mut self, normal_ms: u64, fast_ms: u64) -> Self {
        self.normal_ms = normal_ms;
        self.fast_ms = fast_ms;
        self.total_ms = self.duration_ms();
        self.remaining_ms = self.total_ms;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> RotationMode {
        self.mode
    }

    pub fn current(&self) -> Option<&Message> {
        self.current.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Id of the message that retires when the countdown expires.
    /// `None` while the placeholder is showing.
    pub fn retiring_id(&self) -> Option<i64> {
        self.current.as_ref().map(|m| m.id)
    }

    /// The lines the board should render right now.
    pub fn sign_text(&self) -> SignText {
        self.current
            .as_ref()
            .map(SignText::from)
            .unwrap_or_else(|| self.placeholder.clone())
    }

    /// Rotation duration for the active mode.
    pub fn duration_ms(&self) -> u64 {
        match self.mode {
            RotationMode::Normal => self.normal_ms,
            RotationMode::Fast => self.fast_ms,
        }
    }

    /// Displayed progress, clamped to [0, 100].
    pub fn progress_pct(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        let pct = (1.0 - self.remaining_ms as f64 / self.total_ms as f64) * 100.0;
        pct.clamp(0.0, 100.0)
    }

    /// Whole seconds left on the countdown, rounded up, never negative.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms.div_ceil(1000)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the current message. A real message restarts the
    /// countdown from zero progress; `None` (placeholder) stops it.
    /// Any prior countdown is cancelled by the restart.
    pub fn set_current(&mut self, message: Option<Message>) {
        self.current = message;
        if self.current.is_some() {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Switch rotation mode. A running countdown restarts immediately
    /// at the new duration with progress reset to zero.
    pub fn set_mode(&mut self, mode: RotationMode) {
        self.mode = mode;
        if self.running {
            self.start();
        } else {
            self.total_ms = self.duration_ms();
            self.remaining_ms = self.total_ms;
        }
    }

    /// Toggle between normal and fast mode; returns the new mode.
    pub fn toggle_mode(&mut self) -> RotationMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Stop the countdown without touching the displayed message.
    pub fn stop(&mut self) {
        self.running = false;
        self.last_tick_epoch_ms = None;
    }

    /// Flush wall-clock time into the countdown. Returns the expiry
    /// event exactly once per countdown, stopping the timer as it fires.
    pub fn tick(&mut self) -> Option<RotationEvent> {
        self.tick_at(now_ms())
    }

    fn tick_at(&mut self, now: u64) -> Option<RotationEvent> {
        if !self.running {
            return None;
        }
        if let Some(last) = self.last_tick_epoch_ms {
            let elapsed = now.saturating_sub(last);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick_epoch_ms = Some(now);
        }
        if self.remaining_ms == 0 {
            let retired = self.retiring_id();
            self.stop();
            return Some(RotationEvent::Expired { retired });
        }
        None
    }

    fn start(&mut self) {
        self.total_ms = self.duration_ms();
        self.remaining_ms = self.total_ms;
        self.running = true;
        self.last_tick_epoch_ms = Some(now_ms());
    }
}

/// Which branch of the selection policy produced the next message.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// An unshown message was waiting: display it and celebrate.
    Fresh(Message),
    /// Nothing unshown; cycling through the already-shown set.
    Repeat(Message),
    /// Queue is empty; fall back to the placeholder.
    Empty,
}

/// Pick the next message from a fresh queue snapshot.
///
/// Unshown messages win in snapshot order; otherwise the shown subset is
/// walked as a circular list from the just-retired message. A retiree
/// that vanished from the snapshot (deleted by an admin mid-cycle) is
/// treated as position -1, so the walk restarts at the front.
pub fn select_next(snapshot: &[Message], retired: Option<i64>) -> Selection {
    if let Some(fresh) = snapshot.iter().find(|m| !m.shown) {
        return Selection::Fresh(fresh.clone());
    }
    let shown: Vec<&Message> = snapshot.iter().filter(|m| m.shown).collect();
    if shown.is_empty() {
        return Selection::Empty;
    }
    let pos = retired
        .and_then(|id| shown.iter().position(|m| m.id == id))
        .map(|i| i as i64)
        .unwrap_or(-1);
    let next = (pos + 1) as usize % shown.len();
    Selection::Repeat(shown[next].clone())
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn msg(id: i64, shown: bool) -> Message {
        Message {
            id,
            line1: format!("MSG {id}"),
            line2: String::new(),
            line3: String::new(),
            line4: String::new(),
            shown,
            timestamp: Utc::now(),
        }
    }

    fn engine() -> RotationEngine {
        RotationEngine::new(SignText::default(), RotationMode::Normal)
    }

    #[test]
    fn placeholder_never_starts_a_countdown() {
        let mut engine = engine();
        engine.set_current(None);
        assert!(!engine.is_running());
        assert_eq!(engine.sign_text(), SignText::default());
        assert_eq!(engine.retiring_id(), None);
    }

    #[test]
    fn real_message_starts_countdown_at_full_duration() {
        let mut engine = engine();
        engine.set_current(Some(msg(1, false)));
        assert!(engine.is_running());
        assert_eq!(engine.progress_pct(), 0.0);
        assert_eq!(engine.remaining_secs(), 25);
    }

    #[test]
    fn replacing_current_restarts_the_single_countdown() {
        let mut engine = engine();
        let t0 = now_ms();
        engine.set_current(Some(msg(1, false)));
        engine.tick_at(t0 + 10_000);
        assert!(engine.progress_pct() > 0.0);

        engine.set_current(Some(msg(2, false)));
        assert!(engine.is_running());
        assert_eq!(engine.progress_pct(), 0.0);
        assert_eq!(engine.remaining_secs(), 25);
    }

    #[test]
    fn expiry_fires_exactly_once_and_stops_the_timer() {
        let mut engine = engine();
        let t0 = now_ms();
        engine.set_current(Some(msg(7, false)));

        assert_eq!(engine.tick_at(t0 + 10_000), None);
        assert_eq!(
            engine.tick_at(t0 + 30_000),
            Some(RotationEvent::Expired { retired: Some(7) })
        );
        assert!(!engine.is_running());
        // Outgoing content stays on the board with the timer stopped.
        assert_eq!(engine.retiring_id(), Some(7));
        assert_eq!(engine.tick_at(t0 + 40_000), None);
    }

    #[test]
    fn progress_and_remaining_clamp() {
        let mut engine = engine();
        let t0 = now_ms();
        engine.set_current(Some(msg(1, false)));
        engine.tick_at(t0 + 120_000);
        assert_eq!(engine.progress_pct(), 100.0);
        assert_eq!(engine.remaining_secs(), 0);
    }

    #[test]
    fn mode_toggle_restarts_running_countdown_at_new_duration() {
        let mut engine = engine();
        let t0 = now_ms();
        engine.set_current(Some(msg(1, false)));
        engine.tick_at(t0 + 10_000);
        assert!(engine.progress_pct() > 0.0);

        assert_eq!(engine.toggle_mode(), RotationMode::Fast);
        assert!(engine.is_running());
        assert_eq!(engine.progress_pct(), 0.0);
        assert_eq!(engine.remaining_secs(), 5);

        assert_eq!(engine.toggle_mode(), RotationMode::Normal);
        assert_eq!(engine.remaining_secs(), 25);
    }

    #[test]
    fn mode_toggle_while_idle_only_changes_duration() {
        let mut engine = engine();
        engine.set_mode(RotationMode::Fast);
        assert!(!engine.is_running());
        assert_eq!(engine.duration_ms(), FAST_ROTATION_MS);
    }

    #[test]
    fn configured_durations_apply() {
        let mut engine =
            RotationEngine::new(SignText::default(), RotationMode::Normal).with_durations(8_000, 2_000);
        engine.set_current(Some(msg(1, false)));
        assert_eq!(engine.remaining_secs(), 8);
        engine.set_mode(RotationMode::Fast);
        assert_eq!(engine.remaining_secs(), 2);
    }

    // ── Selection policy ─────────────────────────────────────────────

    #[test]
    fn unshown_messages_win_over_shown() {
        let snapshot = vec![msg(1, true), msg(2, false), msg(3, false)];
        assert_eq!(
            select_next(&snapshot, Some(1)),
            Selection::Fresh(snapshot[1].clone())
        );
    }

    #[test]
    fn shown_set_cycles_and_returns_to_start() {
        let snapshot = vec![msg(1, true), msg(2, true), msg(3, true)];
        let mut retired = Some(1);
        let mut seen = Vec::new();
        for _ in 0..snapshot.len() {
            match select_next(&snapshot, retired) {
                Selection::Repeat(m) => {
                    retired = Some(m.id);
                    seen.push(m.id);
                }
                other => panic!("expected Repeat, got {other:?}"),
            }
        }
        // After N selections the cycle is back at the starting message.
        assert_eq!(seen, vec![2, 3, 1]);
    }

    #[test]
    fn single_shown_message_reselects_itself_as_repeat() {
        // Countdown expired on id 1, it was marked shown, fresh snapshot
        // has no unshown entries: the shown branch picks id 1 again.
        let snapshot = vec![msg(1, true)];
        assert_eq!(
            select_next(&snapshot, Some(1)),
            Selection::Repeat(snapshot[0].clone())
        );
    }

    #[test]
    fn deleted_retiree_wraps_to_front() {
        let snapshot = vec![msg(4, true), msg(5, true)];
        assert_eq!(
            select_next(&snapshot, Some(99)),
            Selection::Repeat(snapshot[0].clone())
        );
        assert_eq!(
            select_next(&snapshot, None),
            Selection::Repeat(snapshot[0].clone())
        );
    }

    #[test]
    fn empty_snapshot_selects_placeholder() {
        assert_eq!(select_next(&[], Some(1)), Selection::Empty);
    }
}
