//! Presentation boundary
//!
//! The simulation hands a [`Snapshot`] to a [`Renderer`] at the end of every
//! frame that leaves the episode running. Data only flows outward: a renderer
//! never sees the episode itself.

pub mod json;

pub use json::JsonLinesRenderer;

use serde::{Deserialize, Serialize};

use crate::sim::{Ball, Paddle, Score, Side};

/// Drawable view of the ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Drawable view of a paddle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleView {
    pub side: Side,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<&Ball> for BallView {
    fn from(ball: &Ball) -> Self {
        Self {
            x: ball.pos.x,
            y: ball.pos.y,
            radius: ball.radius,
        }
    }
}

impl From<&Paddle> for PaddleView {
    fn from(paddle: &Paddle) -> Self {
        Self {
            side: paddle.side,
            x: paddle.x(),
            y: paddle.y(),
            width: paddle.width(),
            height: paddle.height(),
        }
    }
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Frames processed so far (1 after the first frame)
    pub frame: u64,
    pub ball: BallView,
    /// Left paddle first
    pub paddles: [PaddleView; 2],
    pub score: Score,
    /// Cumulative fitness of the left agent (0 in match mode)
    pub fitness: f64,
}

impl Snapshot {
    pub fn capture(
        frame: u64,
        ball: &Ball,
        paddles: &[Paddle; 2],
        score: Score,
        fitness: f64,
    ) -> Self {
        Self {
            frame,
            ball: ball.into(),
            paddles: [(&paddles[0]).into(), (&paddles[1]).into()],
            score,
            fitness,
        }
    }
}

/// Receives one snapshot per running frame
pub trait Renderer {
    fn draw(&mut self, snapshot: &Snapshot);
}

/// Discards every frame (headless training)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw(&mut self, _snapshot: &Snapshot) {}
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn draw(&mut self, snapshot: &Snapshot) {
        (**self).draw(snapshot);
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn draw(&mut self, snapshot: &Snapshot) {
        (**self).draw(snapshot);
    }
}

/// Keeps every frame in memory
impl Renderer for Vec<Snapshot> {
    fn draw(&mut self, snapshot: &Snapshot) {
        self.push(snapshot.clone());
    }
}
