//! NEAT Pong - a deterministic Pong world for scoring paddle-control agents
//!
//! Core modules:
//! - `sim`: Deterministic simulation (paddles, ball, collisions, episode state machine)
//! - `agent`: The observation -> output capability agents implement
//! - `renderer`: One-way frame snapshots for presentation layers
//! - `trainer`: Evaluating many agents and summarising their fitness
//! - `settings`: Episode configuration

pub mod agent;
pub mod error;
pub mod leaderboard;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod trainer;

pub use agent::{Action, Agent, Observation};
pub use error::{ConfigError, NetworkError};
pub use leaderboard::Leaderboard;
pub use settings::Settings;
pub use sim::{Episode, EpisodeResult, TerminationReason};

/// Reference constants of the training setup
pub mod consts {
    /// Field dimensions (pixels)
    pub const FIELD_WIDTH: f64 = 1000.0;
    pub const FIELD_HEIGHT: f64 = 800.0;

    /// Paddle defaults
    pub const PADDLE_SPEED: f64 = 3.0;
    pub const PADDLE_WIDTH: f64 = 20.0;
    pub const PADDLE_HEIGHT: f64 = 200.0;

    /// Ball defaults
    pub const BALL_RADIUS: f64 = 10.0;
    /// Horizontal spawn speed (pixels/frame)
    pub const BALL_START_SPEED: f64 = 3.0;
    /// Added to |x_vel| on every deflection
    pub const DEFLECTION_SPEEDUP: f64 = 0.5;
    /// Smallest |y_vel| a freshly spawned ball can get
    pub const BALL_MIN_SPAWN_Y_SPEED: f64 = 0.2;
    /// Upper bound of the random y kick applied on deflection
    pub const DEFLECTION_MAX_Y_KICK: f64 = 1.0;

    /// Reward for deflecting the ball with the left paddle
    pub const DEFLECTION_REWARD: f64 = 1.0;
    /// Reward per frame for holding the left paddle level with the ball
    pub const PROXIMITY_REWARD: f64 = 0.001;
    /// Fitness at which an agent is considered perfect
    pub const FITNESS_CAP: f64 = 150.0;

    /// Presentation frame rate; physics never depends on it
    pub const FRAME_RATE: u32 = 500;

    /// Agent outputs beyond +/- this value move the paddle
    pub const ACTION_THRESHOLD: f64 = 0.5;
}
