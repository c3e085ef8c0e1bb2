//! Celebration engine: decides when confetti fires and at what
//! intensity, and builds the burst schedule for a firing.
//!
//! The engine holds no state beyond the last observed queue length.
//! Fires are independent and never deduplicated -- overlapping
//! celebrations are a visual effect only.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

/// Celebration intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

/// Fixed burst parameters per intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub particle_count: u32,
    pub spread_deg: u32,
    pub duration_ms: u64,
}

impl Intensity {
    /// Parse an intensity key; unrecognized keys fall back to `High`.
    pub fn from_key(key: &str) -> Self {
        match key {
            "low" => Intensity::Low,
            "medium" => Intensity::Medium,
            _ => Intensity::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        }
    }

    pub fn profile(self) -> Profile {
        match self {
            Intensity::Low => Profile {
                particle_count: 30,
                spread_deg: 60,
                duration_ms: 4_000,
            },
            Intensity::Medium => Profile {
                particle_count: 50,
                spread_deg: 80,
                duration_ms: 6_000,
            },
            Intensity::High => Profile {
                particle_count: 80,
                spread_deg: 100,
                duration_ms: 8_000,
            },
        }
    }
}

/// Decides whether a poll observation warrants a celebration.
#[derive(Debug, Default)]
pub struct CelebrationEngine {
    last_queue_len: Option<usize>,
}

impl CelebrationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the queue length for this poll cycle. Growth fires one
    /// medium celebration regardless of how many messages arrived; the
    /// first observation only seeds the baseline.
    pub fn observe_queue(&mut self, len: usize) -> Option<Intensity> {
        let grew = matches!(self.last_queue_len, Some(prev) if len > prev);
        self.last_queue_len = Some(len);
        grew.then_some(Intensity::Medium)
    }

    /// Observe the recent admin-trigger count. Any nonzero count fires
    /// one high celebration for this poll cycle.
    pub fn observe_trigger_count(&mut self, count: usize) -> Option<Intensity> {
        (count > 0).then_some(Intensity::High)
    }
}

const WAVES: u64 = 2;
const SIDE_BURST_DELAY_MS: u64 = 400;
const TRICKLE_INTERVAL_MS: u64 = 300;
const TRICKLE_PARTICLES: u32 = 2;
const TRICKLE_SPREAD_DEG: u32 = 30;

/// One confetti burst: when, where and how much.
#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    /// Offset from the start of the celebration.
    pub at_ms: u64,
    pub particle_count: u32,
    pub spread_deg: u32,
    pub origin_x: f64,
    pub origin_y: f64,
}

/// Deterministic-cadence burst schedule for one celebration.
///
/// Two waves spaced evenly across the duration, each a center burst plus
/// two side bursts 400ms later, and a low-rate trickle for the full
/// duration. Bursts are ordered by offset.
#[derive(Debug, Clone)]
pub struct CelebrationPlan {
    pub intensity: Intensity,
    pub bursts: Vec<Burst>,
}

impl CelebrationPlan {
    pub fn build(intensity: Intensity) -> Self {
        let profile = intensity.profile();
        let mut rng = rand::thread_rng();
        let mut bursts = Vec::new();

        for wave in 0..WAVES {
            let at = wave * profile.duration_ms / WAVES;
            bursts.push(Burst {
                at_ms: at,
                particle_count: profile.particle_count,
                spread_deg: profile.spread_deg,
                origin_x: 0.5,
                origin_y: 0.6,
            });
            for side_x in [0.2, 0.8] {
                bursts.push(Burst {
                    at_ms: at + SIDE_BURST_DELAY_MS,
                    particle_count: profile.particle_count * 6 / 10,
                    spread_deg: profile.spread_deg * 8 / 10,
                    origin_x: side_x,
                    origin_y: 0.7,
                });
            }
        }

        // Continuous trickle from the top, stopped at duration's end.
        let mut at = TRICKLE_INTERVAL_MS;
        while at < profile.duration_ms {
            bursts.push(Burst {
                at_ms: at,
                particle_count: TRICKLE_PARTICLES,
                spread_deg: TRICKLE_SPREAD_DEG,
                origin_x: rng.gen_range(0.3..0.7),
                origin_y: rng.gen_range(0.0..0.2),
            });
            at += TRICKLE_INTERVAL_MS;
        }

        bursts.sort_by_key(|b| b.at_ms);
        Self { intensity, bursts }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.intensity.profile().duration_ms)
    }
}

/// Capability interface for the actual particle effect. Implementations
/// must not block; rendering internals are out of scope here.
pub trait ConfettiRenderer: Send + Sync {
    fn burst(&self, burst: &Burst);
}

/// Play one celebration in the background. Each call is independent;
/// concurrent celebrations overlap freely.
pub fn fire(renderer: Arc<dyn ConfettiRenderer>, intensity: Intensity) -> JoinHandle<()> {
    let plan = CelebrationPlan::build(intensity);
    tokio::spawn(async move {
        let start = tokio::time::Instant::now();
        for burst in &plan.bursts {
            tokio::time::sleep_until(start + Duration::from_millis(burst.at_ms)).await;
            renderer.burst(burst);
        }
    })
}
