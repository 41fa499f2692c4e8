//! Agents: observation -> scalar output
//!
//! The episode only ever asks an agent one question per frame: given where
//! the ball and the paddle are, what is your output? The fixed threshold in
//! [`Action::from_output`] turns that into a paddle command. Anything can sit
//! behind the trait: a network, a scripted controller, a wall that never moves.

pub mod network;

pub use network::FeedForwardNet;

use serde::{Deserialize, Serialize};

use crate::consts::ACTION_THRESHOLD;

/// What an agent sees each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub ball_x: f64,
    pub ball_y: f64,
    /// Top edge of the paddle the agent controls
    pub paddle_y: f64,
}

impl Observation {
    /// Network input order: ball x, ball y, paddle y
    pub fn as_inputs(&self) -> [f64; 3] {
        [self.ball_x, self.ball_y, self.paddle_y]
    }
}

/// Paddle command derived from an agent output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    MoveUp,
    MoveDown,
    Hold,
}

impl Action {
    /// `< -0.5` moves down, `> 0.5` moves up, anything else holds.
    ///
    /// NaN holds.
    pub fn from_output(output: f64) -> Self {
        if output < -ACTION_THRESHOLD {
            Action::MoveDown
        } else if output > ACTION_THRESHOLD {
            Action::MoveUp
        } else {
            Action::Hold
        }
    }
}

/// A paddle controller.
///
/// Implementations must behave as a pure function of the observation; the
/// episode gives no ordering or synchronisation guarantees beyond calling it
/// once per frame.
pub trait Agent {
    /// Scalar output for this frame's observation
    fn activate(&self, obs: &Observation) -> f64;

    /// Short label for logs and leaderboards
    fn name(&self) -> &str {
        "agent"
    }

    fn act(&self, obs: &Observation) -> Action {
        Action::from_output(self.activate(obs))
    }
}

impl<A: Agent + ?Sized> Agent for &A {
    fn activate(&self, obs: &Observation) -> f64 {
        (**self).activate(obs)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn activate(&self, obs: &Observation) -> f64 {
        (**self).activate(obs)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Never moves. Used for the wall opponent and as a baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldAgent;

impl Agent for HoldAgent {
    fn activate(&self, _obs: &Observation) -> f64 {
        0.0
    }

    fn name(&self) -> &str {
        "hold"
    }
}

/// Scripted controller that keeps the paddle centre on the ball
#[derive(Debug, Clone, Copy)]
pub struct TrackerAgent {
    paddle_height: f64,
    /// Half-width of the band around the centre where it holds
    dead_zone: f64,
}

impl TrackerAgent {
    pub fn new(paddle_height: f64) -> Self {
        Self {
            paddle_height,
            dead_zone: paddle_height / 8.0,
        }
    }

    pub fn with_dead_zone(mut self, dead_zone: f64) -> Self {
        self.dead_zone = dead_zone.max(0.0);
        self
    }
}

impl Agent for TrackerAgent {
    fn activate(&self, obs: &Observation) -> f64 {
        let center = obs.paddle_y + self.paddle_height / 2.0;
        let offset = obs.ball_y - center;
        if offset < -self.dead_zone {
            1.0
        } else if offset > self.dead_zone {
            -1.0
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "tracker"
    }
}

/// Adapts any `Fn(&Observation) -> f64` into an agent
pub struct FnAgent<F> {
    name: String,
    f: F,
}

impl<F> FnAgent<F>
where
    F: Fn(&Observation) -> f64,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Agent for FnAgent<F>
where
    F: Fn(&Observation) -> f64,
{
    fn activate(&self, obs: &Observation) -> f64 {
        (self.f)(obs)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
