//! Episode settings
//!
//! Fixed before an episode starts and read-only afterwards.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Every tunable of the simulated world and its reward policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    // === Field ===
    pub field_width: f64,
    pub field_height: f64,

    // === Paddles ===
    /// Pixels per frame; also caps |y_vel| of the ball
    pub paddle_speed: f64,
    pub paddle_width: f64,
    /// Height of the agent-controlled paddle (the wall paddle spans the field)
    pub paddle_height: f64,

    // === Ball ===
    pub ball_radius: f64,
    pub ball_start_speed: f64,
    pub deflection_speedup: f64,

    // === Rewards ===
    pub deflection_reward: f64,
    pub proximity_reward: f64,
    /// Episode succeeds once fitness reaches this value
    pub fitness_cap: f64,

    // === Episode ===
    /// Frame budget per episode (`None` = unlimited)
    pub max_frames: Option<u64>,
    /// Pacing hint for presentation layers only
    pub frame_rate: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            paddle_speed: PADDLE_SPEED,
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,

            ball_radius: BALL_RADIUS,
            ball_start_speed: BALL_START_SPEED,
            deflection_speedup: DEFLECTION_SPEEDUP,

            deflection_reward: DEFLECTION_REWARD,
            proximity_reward: PROXIMITY_REWARD,
            fitness_cap: FITNESS_CAP,

            max_frames: None,
            frame_rate: FRAME_RATE,
        }
    }
}

impl Settings {
    pub fn with_field(mut self, width: f64, height: f64) -> Self {
        self.field_width = width;
        self.field_height = height;
        self
    }

    pub fn with_paddle(mut self, width: f64, height: f64, speed: f64) -> Self {
        self.paddle_width = width;
        self.paddle_height = height;
        self.paddle_speed = speed;
        self
    }

    pub fn with_rewards(mut self, deflection: f64, proximity: f64) -> Self {
        self.deflection_reward = deflection;
        self.proximity_reward = proximity;
        self
    }

    pub fn with_fitness_cap(mut self, cap: f64) -> Self {
        self.fitness_cap = cap;
        self
    }

    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Check that the world these settings describe can exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;
        positive("paddle_speed", self.paddle_speed)?;
        positive("paddle_width", self.paddle_width)?;
        positive("paddle_height", self.paddle_height)?;
        positive("ball_radius", self.ball_radius)?;
        positive("ball_start_speed", self.ball_start_speed)?;
        positive("deflection_speedup", self.deflection_speedup)?;
        positive("deflection_reward", self.deflection_reward)?;
        positive("proximity_reward", self.proximity_reward)?;
        positive("fitness_cap", self.fitness_cap)?;

        if self.paddle_height > self.field_height {
            return Err(ConfigError::PaddleExceedsField {
                height: self.paddle_height,
                field_height: self.field_height,
            });
        }
        if 2.0 * self.paddle_width >= self.field_width {
            return Err(ConfigError::PaddlesOverlap {
                width: self.paddle_width,
                field_width: self.field_width,
            });
        }
        if 2.0 * self.ball_radius >= self.field_height {
            return Err(ConfigError::BallExceedsField {
                radius: self.ball_radius,
                field_height: self.field_height,
            });
        }
        if self.ball_start_speed < BALL_MIN_SPAWN_Y_SPEED {
            return Err(ConfigError::StartSpeedTooLow {
                speed: self.ball_start_speed,
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}
