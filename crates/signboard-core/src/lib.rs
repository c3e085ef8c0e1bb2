//! # Signboard Core Library
//!
//! Core logic for Signboard, a public message display board: visitors
//! submit short messages, an unattended display cycles through the queue
//! on a timed rotation, and an admin panel manages the queue and fires
//! confetti celebrations.
//!
//! ## Architecture
//!
//! - **Rotation Engine**: A wall-clock-based countdown state machine that
//!   requires the caller to periodically invoke `tick()`; expiry drives
//!   the advance to the next queued message
//! - **Celebration Engine**: Decides when confetti fires (queue growth,
//!   fresh-message pickup, admin triggers) and builds burst schedules
//! - **Gateway**: HTTP client for the signboard backend API
//! - **Display Session**: Ties the pieces together into the poll-driven
//!   display loop
//!
//! ## Key Components
//!
//! - [`RotationEngine`]: Countdown state machine for the current message
//! - [`CelebrationEngine`]: Growth/trigger detection and intensity policy
//! - [`Gateway`]: Backend API client
//! - [`DisplaySession`]: Display-side orchestration

pub mod celebration;
pub mod config;
pub mod error;
pub mod gateway;
pub mod message;
pub mod rotation;
pub mod session;

pub use celebration::{Burst, CelebrationEngine, CelebrationPlan, ConfettiRenderer, Intensity};
pub use config::Config;
pub use error::{ConfigError, CoreError, GatewayError, ValidationError};
pub use gateway::Gateway;
pub use message::{Message, MessageDraft, SignText, Stats, MAX_LINE_CHARS};
pub use rotation::{RotationEngine, RotationEvent, RotationMode, Selection};
pub use session::DisplaySession;
