//! Deterministic simulation module
//!
//! All physics and reward logic lives here. This module must be pure and deterministic:
//! - Discrete frames only, no wall-clock time
//! - Seeded RNG only, owned by the episode
//! - Fixed per-frame evaluation order
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;
pub mod versus;

pub use state::{Arena, Ball, Paddle, RngState, Score, Side};
pub use tick::{Episode, EpisodePhase, EpisodeResult, Frame, TerminationReason};
pub use versus::{Match, MatchResult};
