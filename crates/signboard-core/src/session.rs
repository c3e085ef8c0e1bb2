//! Display session: ties the rotation engine, celebration engine and
//! gateway together into the poll-driven display loop.
//!
//! The session itself is single-threaded: the caller drives it from one
//! cooperative loop (tick every 100ms, queue poll every 3s, trigger poll
//! every 1s). Only celebrations escape into background tasks, which is
//! safe because they touch nothing but the renderer.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::celebration::{self, CelebrationEngine, ConfettiRenderer, Intensity};
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::message::SignText;
use crate::rotation::{select_next, RotationEngine, RotationEvent, RotationMode, Selection};

pub struct DisplaySession {
    gateway: Gateway,
    rotation: RotationEngine,
    celebration: CelebrationEngine,
    renderer: Arc<dyn ConfettiRenderer>,
    /// Display-settle delay before a fresh message's celebration.
    settle: Duration,
}

impl DisplaySession {
    pub fn new(
        gateway: Gateway,
        placeholder: SignText,
        mode: RotationMode,
        renderer: Arc<dyn ConfettiRenderer>,
    ) -> Self {
        Self {
            gateway,
            rotation: RotationEngine::new(placeholder, mode),
            celebration: CelebrationEngine::new(),
            renderer,
            settle: Duration::from_millis(500),
        }
    }

    /// Override rotation durations and settle delay from configuration.
    pub fn with_timings(mut self, normal_ms: u64, fast_ms: u64, settle_ms: u64) -> Self {
        self.rotation = self.rotation.with_durations(normal_ms, fast_ms);
        self.settle = Duration::from_millis(settle_ms);
        self
    }

    pub fn rotation(&self) -> &RotationEngine {
        &self.rotation
    }

    pub fn toggle_mode(&mut self) -> RotationMode {
        self.rotation.toggle_mode()
    }

    /// Advance the countdown; returns the expiry event when it fires.
    pub fn tick(&mut self) -> Option<RotationEvent> {
        self.rotation.tick()
    }

    /// First load: prefer the first unshown message, else the head of
    /// the queue, else the placeholder. Never celebrates, and seeds the
    /// growth-detection baseline.
    pub async fn load_initial(&mut self) -> Result<(), GatewayError> {
        let snapshot = self.gateway.list_messages().await?;
        self.celebration.observe_queue(snapshot.len());
        let first = snapshot
            .iter()
            .find(|m| !m.shown)
            .or_else(|| snapshot.first())
            .cloned();
        self.rotation.set_current(first);
        Ok(())
    }

    /// The advance transaction run when the countdown expires: mark the
    /// retiree shown, refetch the queue, select the next message, and
    /// schedule a high celebration when an unshown message was picked.
    ///
    /// On any gateway failure the advance is abandoned for this cycle;
    /// the board keeps the outgoing content with the timer stopped, and
    /// the next poll cycle recovers.
    pub async fn advance(&mut self) -> Result<(), GatewayError> {
        let retired = self.rotation.retiring_id();
        if let Some(id) = retired {
            self.gateway.mark_shown(id).await?;
        }
        let snapshot = self.gateway.list_messages().await?;
        match select_next(&snapshot, retired) {
            Selection::Fresh(message) => {
                info!(id = message.id, "advancing to fresh message");
                self.rotation.set_current(Some(message));
                let renderer = Arc::clone(&self.renderer);
                let settle = self.settle;
                tokio::spawn(async move {
                    tokio::time::sleep(settle).await;
                    celebration::fire(renderer, Intensity::High);
                });
            }
            Selection::Repeat(message) => {
                debug!(id = message.id, "cycling shown messages");
                self.rotation.set_current(Some(message));
            }
            Selection::Empty => {
                debug!("queue empty; showing placeholder");
                self.rotation.set_current(None);
            }
        }
        Ok(())
    }

    /// Queue-growth poll cycle (~3s).
    pub async fn poll_queue(&mut self) -> Result<(), GatewayError> {
        let snapshot = self.gateway.list_messages().await?;
        if let Some(intensity) = self.celebration.observe_queue(snapshot.len()) {
            info!(len = snapshot.len(), "queue grew; celebrating");
            celebration::fire(Arc::clone(&self.renderer), intensity);
        }
        // A display that lost an advance to a failed request recovers
        // here once real messages are back in the snapshot.
        if !self.rotation.is_running() {
            if let Some(first) = snapshot.iter().find(|m| !m.shown).or_else(|| snapshot.first()) {
                self.rotation.set_current(Some(first.clone()));
            }
        }
        Ok(())
    }

    /// Admin-trigger poll cycle (~1s).
    pub async fn poll_triggers(&mut self) -> Result<(), GatewayError> {
        let poll = self.gateway.poll_triggers().await?;
        if let Some(intensity) = self.celebration.observe_trigger_count(poll.count) {
            info!(count = poll.count, "admin trigger observed; celebrating");
            celebration::fire(Arc::clone(&self.renderer), intensity);
        }
        Ok(())
    }

    /// Operator-initiated celebration, fired directly.
    pub fn fire_manual(&self, intensity: Intensity) {
        celebration::fire(Arc::clone(&self.renderer), intensity);
    }
}
