//! Construction-time error types.
//!
//! Nothing that happens inside a running episode is an error: misses and
//! caps are reported as termination reasons.

use thiserror::Error;

/// Invalid episode or paddle configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A dimension, speed, reward or cap that must be positive is not.
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    /// Paddle taller than the field.
    #[error("paddle height {height} exceeds field height {field_height}")]
    PaddleExceedsField { height: f64, field_height: f64 },

    /// Left and right paddles would touch or overlap.
    #[error("two paddles of width {width} do not fit in field width {field_width}")]
    PaddlesOverlap { width: f64, field_width: f64 },

    /// Ball does not fit between the top and bottom walls.
    #[error("ball radius {radius} does not fit in field height {field_height}")]
    BallExceedsField { radius: f64, field_height: f64 },

    /// Start speed too low for the spawn y-velocity draw.
    #[error("ball start speed {speed} is below the minimum spawn y speed")]
    StartSpeedTooLow { speed: f64 },

    /// Initial paddle position outside `[0, max]`.
    #[error("paddle position {y} is outside [0, {max}]")]
    PaddleOutOfBounds { y: f64, max: f64 },

    /// Side name other than `left` or `right`.
    #[error("side must be either left or right, got {0:?}")]
    UnknownSide(String),
}

/// Invalid feed-forward network layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Network without layers.
    #[error("network has no layers")]
    Empty,

    /// Weight or bias count does not match the layer's fan-in/fan-out.
    #[error("layer {layer}: expected {expected} values, found {found}")]
    ShapeMismatch {
        layer: usize,
        expected: usize,
        found: usize,
    },
}
