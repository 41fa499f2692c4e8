//! Two-agent match with a live score
//!
//! Used to play against an agent once it has been scored: both paddles are
//! regular size, each side has its own agent, and a miss gives the other
//! side a point and a fresh serve from the centre instead of ending the run.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{Ball, Paddle, RngState, Score, Side};
use crate::agent::{Agent, Observation};
use crate::error::ConfigError;
use crate::renderer::{Renderer, Snapshot};
use crate::settings::Settings;

/// Final state of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: Score,
    /// `None` when the frame budget ran out on a tie
    pub winner: Option<Side>,
    pub frames: u64,
}

#[derive(Debug, Clone)]
pub struct Match {
    settings: Settings,
    rng: Pcg32,
    ball: Ball,
    paddles: [Paddle; 2],
    score: Score,
    frame: u64,
    /// First side to reach this many points wins
    target_score: u32,
    result: Option<MatchResult>,
}

impl Match {
    pub fn new(settings: &Settings, seed: u64, target_score: u32) -> Result<Self, ConfigError> {
        settings.validate()?;
        if target_score == 0 {
            return Err(ConfigError::NonPositive {
                name: "target_score",
                value: 0.0,
            });
        }
        let mut rng = RngState::new(seed).to_rng();
        let ball = Ball::spawn(settings, &mut rng);
        Ok(Self {
            settings: settings.clone(),
            rng,
            ball,
            paddles: [
                Paddle::centered(Side::Left, settings)?,
                Paddle::centered(Side::Right, settings)?,
            ],
            score: Score::default(),
            frame: 0,
            target_score,
            result: None,
        })
    }

    fn observation(&self, side: Side) -> Observation {
        let paddle = match side {
            Side::Left => &self.paddles[0],
            Side::Right => &self.paddles[1],
        };
        Observation {
            ball_x: self.ball.pos.x,
            ball_y: self.ball.pos.y,
            paddle_y: paddle.y(),
        }
    }

    /// Advance one frame; returns the side that scored, if any
    pub fn step<L, R>(&mut self, left: &L, right: &R) -> Option<Side>
    where
        L: Agent + ?Sized,
        R: Agent + ?Sized,
    {
        if self.result.is_some() {
            return None;
        }
        self.frame += 1;

        let left_action = left.act(&self.observation(Side::Left));
        let right_action = right.act(&self.observation(Side::Right));
        self.paddles[0].apply(left_action);
        self.paddles[1].apply(right_action);

        for paddle in &self.paddles {
            self.ball.collision(paddle, &mut self.rng);
        }
        self.ball.advance();

        let scored = self.ball.scored();
        if let Some(side) = scored {
            self.score.record(side);
            log::debug!(
                "Point {} at frame {} ({}-{})",
                side,
                self.frame,
                self.score.left,
                self.score.right
            );
            self.ball = Ball::spawn(&self.settings, &mut self.rng);

            if self.score.get(side) >= self.target_score {
                self.finish(Some(side));
                return scored;
            }
        }

        if self.settings.max_frames.is_some_and(|max| self.frame >= max) {
            let winner = match self.score.left.cmp(&self.score.right) {
                std::cmp::Ordering::Greater => Some(Side::Left),
                std::cmp::Ordering::Less => Some(Side::Right),
                std::cmp::Ordering::Equal => None,
            };
            self.finish(winner);
        }
        scored
    }

    /// Play until a side reaches the target score or the frame budget runs out
    pub fn run<L, R, D>(&mut self, left: &L, right: &R, renderer: &mut D) -> MatchResult
    where
        L: Agent + ?Sized,
        R: Agent + ?Sized,
        D: Renderer + ?Sized,
    {
        loop {
            self.step(left, right);
            match self.result {
                Some(result) => return result,
                None => renderer.draw(&self.snapshot()),
            }
        }
    }

    fn finish(&mut self, winner: Option<Side>) {
        self.result = Some(MatchResult {
            score: self.score,
            winner,
            frames: self.frame,
        });
        log::info!(
            "Match over after {} frames: {}-{}",
            self.frame,
            self.score.left,
            self.score.right
        );
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.frame, &self.ball, &self.paddles, self.score, 0.0)
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn result(&self) -> Option<MatchResult> {
        self.result
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddles(&self) -> &[Paddle; 2] {
        &self.paddles
    }
}
