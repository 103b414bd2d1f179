//! # Studybear Core Library
//!
//! This library provides the core logic for Studybear, a study-channel
//! presence tracker. Members accrue study time while they sit in one
//! designated voice channel; that time doubles as a spendable balance they
//! can check and redeem through chat commands. The chat platform itself is
//! an external collaborator: this crate consumes presence transitions and
//! messages and produces replies and events.
//!
//! ## Architecture
//!
//! - **Accrual**: a wall-clock-based tick over the whole registry, with an
//!   optimistic cap that bounds credit across process restarts
//! - **Registry**: the in-memory member collection, shared by handle
//! - **Presence**: join/leave and startup reconciliation
//! - **Commands**: balance, leaderboard and redemption
//! - **Storage**: JSON snapshot file and TOML configuration
//!
//! ## Key Components
//!
//! - [`AccrualEngine`]: the per-tick state machine
//! - [`StudentRegistry`]: member collection
//! - [`PresenceAdapter`]: presence signals into registry state
//! - [`CommandFacade`]: command-layer queries
//! - [`SnapshotStore`]: snapshot persistence
//! - [`Config`]: application configuration

pub mod accrual;
pub mod commands;
pub mod error;
pub mod events;
pub mod format;
pub mod presence;
pub mod registry;
pub mod reward;
pub mod service;
pub mod storage;

pub use accrual::{earned_units, now_ms, AccrualEngine, TickReport, Ticker, MS_PER_UNIT};
pub use commands::{Command, CommandFacade, LeaderboardEntry, RedeemOutcome, Reply};
pub use error::{ConfigError, CoreError, RegistryError, RewardError, SnapshotError};
pub use events::Event;
pub use presence::{PresenceAdapter, ReconcileReport, Transition, VoiceStateChange};
pub use registry::{SharedRegistry, StudentRegistry, TrackedMember};
pub use reward::{ImageApiReward, RewardDelivery};
pub use service::{start, IncomingMessage, RunningBot, StudyBot};
pub use storage::{Config, RewardPricing, SnapshotStore, SnapshotWriter};
