//! Episode state machine
//!
//! One episode scores one agent: the left paddle is the agent's, the right
//! paddle is a full-height wall that returns every ball. Frames run in a
//! fixed order:
//!
//! 1. observe `(ball.x, ball.y, left.y)` and ask the agent for an action
//! 2. apply it to the left paddle
//! 3. resolve collisions (left, then right) and add the rewards to fitness
//! 4. stop with `FitnessCapReached` if fitness hit the cap
//! 5. move the ball
//! 6. stop with `Missed` if the ball left the field
//! 7. otherwise hand a snapshot to the renderer
//!
//! Nothing here reads the clock, so frames may run back to back.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{Ball, Paddle, RngState, Score, Side};
use crate::agent::{Action, Agent, Observation};
use crate::error::ConfigError;
use crate::renderer::{Renderer, Snapshot};
use crate::settings::Settings;

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The agent let the ball past its paddle
    Missed,
    /// Fitness reached `Settings::fitness_cap`
    FitnessCapReached,
    /// `Settings::max_frames` frames were processed
    FrameLimit,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Missed => "missed",
            TerminationReason::FitnessCapReached => "fitness cap reached",
            TerminationReason::FrameLimit => "frame limit",
        }
    }
}

/// Current phase of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodePhase {
    Running,
    /// Final; no further frames are processed
    Terminated(TerminationReason),
}

impl EpisodePhase {
    pub fn is_running(self) -> bool {
        matches!(self, EpisodePhase::Running)
    }
}

/// Outcome of a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Fitness gained this frame
    pub reward: f64,
    /// Phase after the frame
    pub phase: EpisodePhase,
}

/// What the trainer reads back once an episode is over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub fitness: f64,
    pub reason: TerminationReason,
    pub frames: u64,
    pub seed: u64,
}

/// A single agent's run from serve to termination
#[derive(Debug, Clone)]
pub struct Episode {
    settings: Settings,
    rng_state: RngState,
    rng: Pcg32,
    ball: Ball,
    /// Left (agent) then right (wall)
    paddles: [Paddle; 2],
    fitness: f64,
    frame: u64,
    phase: EpisodePhase,
    /// Never changes during training; carried for renderers
    score: Score,
}

impl Episode {
    /// Fresh episode with a centred agent paddle, a wall opponent and a
    /// randomly served ball.
    pub fn new(settings: &Settings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;
        let rng_state = RngState::new(seed);
        let mut rng = rng_state.to_rng();
        let ball = Ball::spawn(settings, &mut rng);
        Self::assemble(settings, rng_state, rng, ball)
    }

    /// Like [`Episode::new`] but starting from a given ball state.
    ///
    /// Only the ball's position and velocity are kept; radius, speed cap and
    /// rewards always come from `settings`.
    pub fn with_ball(settings: &Settings, seed: u64, ball: Ball) -> Result<Self, ConfigError> {
        settings.validate()?;
        let rng_state = RngState::new(seed);
        let rng = rng_state.to_rng();
        let ball = Ball::new(ball.pos, ball.vel, settings);
        Self::assemble(settings, rng_state, rng, ball)
    }

    fn assemble(
        settings: &Settings,
        rng_state: RngState,
        rng: Pcg32,
        ball: Ball,
    ) -> Result<Self, ConfigError> {
        let paddles = [
            Paddle::centered(Side::Left, settings)?,
            Paddle::wall(Side::Right, settings)?,
        ];
        log::debug!(
            "Episode seed {}: ball at ({}, {}) vel ({:.1}, {:.1})",
            rng_state.seed,
            ball.pos.x,
            ball.pos.y,
            ball.vel.x,
            ball.vel.y
        );
        Ok(Self {
            settings: settings.clone(),
            rng_state,
            rng,
            ball,
            paddles,
            fitness: 0.0,
            frame: 0,
            phase: EpisodePhase::Running,
            score: Score::default(),
        })
    }

    /// What the agent sees this frame
    pub fn observation(&self) -> Observation {
        Observation {
            ball_x: self.ball.pos.x,
            ball_y: self.ball.pos.y,
            paddle_y: self.paddles[0].y(),
        }
    }

    /// Advance one frame. A terminated episode is left untouched and
    /// reports a zero reward.
    pub fn step<A: Agent + ?Sized>(&mut self, agent: &A) -> Frame {
        if !self.phase.is_running() {
            return Frame {
                reward: 0.0,
                phase: self.phase,
            };
        }
        self.frame += 1;

        let action = Action::from_output(agent.activate(&self.observation()));
        self.paddles[0].apply(action);

        let mut reward = 0.0;
        for paddle in &self.paddles {
            reward += self.ball.collision(paddle, &mut self.rng);
        }
        self.fitness += reward;

        if self.fitness >= self.settings.fitness_cap {
            self.terminate(TerminationReason::FitnessCapReached);
        } else {
            self.ball.advance();

            if self.ball.scored().is_some() {
                self.terminate(TerminationReason::Missed);
            } else if self.settings.max_frames.is_some_and(|max| self.frame >= max) {
                self.terminate(TerminationReason::FrameLimit);
            }
        }

        Frame {
            reward,
            phase: self.phase,
        }
    }

    /// Advance one frame and draw it if the episode is still running
    pub fn step_with<A, R>(&mut self, agent: &A, renderer: &mut R) -> Frame
    where
        A: Agent + ?Sized,
        R: Renderer + ?Sized,
    {
        let frame = self.step(agent);
        if frame.phase.is_running() {
            renderer.draw(&self.snapshot());
        }
        frame
    }

    /// Run to termination
    pub fn run<A, R>(&mut self, agent: &A, renderer: &mut R) -> EpisodeResult
    where
        A: Agent + ?Sized,
        R: Renderer + ?Sized,
    {
        loop {
            if let EpisodePhase::Terminated(reason) = self.step_with(agent, renderer).phase {
                return self.result_for(reason);
            }
        }
    }

    /// Final result, once terminated
    pub fn result(&self) -> Option<EpisodeResult> {
        match self.phase {
            EpisodePhase::Running => None,
            EpisodePhase::Terminated(reason) => Some(self.result_for(reason)),
        }
    }

    fn result_for(&self, reason: TerminationReason) -> EpisodeResult {
        EpisodeResult {
            fitness: self.fitness,
            reason,
            frames: self.frame,
            seed: self.rng_state.seed,
        }
    }

    fn terminate(&mut self, reason: TerminationReason) {
        self.phase = EpisodePhase::Terminated(reason);
        log::debug!(
            "Episode seed {} ended ({}) after {} frames, fitness {:.3}",
            self.rng_state.seed,
            reason.as_str(),
            self.frame,
            self.fitness
        );
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.frame, &self.ball, &self.paddles, self.score, self.fitness)
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddles(&self) -> &[Paddle; 2] {
        &self.paddles
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::agent::{FnAgent, HoldAgent, TrackerAgent};
    use crate::renderer::NullRenderer;

    fn ball(x: f64, y: f64, vx: f64, vy: f64, settings: &Settings) -> Ball {
        Ball::new(DVec2::new(x, y), DVec2::new(vx, vy), settings)
    }

    #[test]
    fn test_new_episode_layout() {
        let episode = Episode::new(&Settings::default(), 12345).unwrap();
        assert_eq!(episode.phase(), EpisodePhase::Running);
        assert_eq!(episode.paddles()[0].side, Side::Left);
        assert_eq!(episode.paddles()[0].y(), 300.0);
        assert_eq!(episode.paddles()[1].side, Side::Right);
        assert_eq!(episode.paddles()[1].height(), 800.0);
        assert_eq!(episode.ball().pos, DVec2::new(500.0, 400.0));
        assert_eq!(episode.fitness(), 0.0);
        assert!(episode.result().is_none());
        assert_eq!(episode.settings(), &Settings::default());
    }

    #[test]
    fn test_given_ball_takes_physics_from_settings() {
        let settings = Settings::default().with_rewards(2.0, 0.5);
        let other = Settings::default().with_paddle(20.0, 200.0, 9.0);
        let mut foreign = ball(19.0, 400.0, 3.0, 0.0, &other);
        foreign.radius = 50.0;

        let mut episode = Episode::with_ball(&settings, 10, foreign).unwrap();

        assert_eq!(episode.ball().radius, settings.ball_radius);
        assert_eq!(episode.ball().max_y_speed(), settings.paddle_speed);
        assert_eq!(episode.ball().pos, DVec2::new(19.0, 400.0));

        // Deflection plus proximity at the configured values
        let frame = episode.step(&HoldAgent);
        assert!((frame.reward - 2.5).abs() < 1e-12);
        assert_eq!(episode.ball().vel.x, -3.5);
    }

    #[test]
    fn test_invalid_settings_fail_fast() {
        let settings = Settings::default().with_field(-1.0, 800.0);
        assert!(matches!(
            Episode::new(&settings, 1),
            Err(ConfigError::NonPositive { .. })
        ));
    }

    #[test]
    fn test_agent_sees_pre_move_state_and_drives_left_paddle() {
        let settings = Settings::default();
        let start = ball(500.0, 400.0, 3.0, -3.0, &settings);
        let mut episode = Episode::with_ball(&settings, 1, start).unwrap();

        let seen = std::cell::Cell::new(None);
        let agent = FnAgent::new("probe", |obs: &Observation| {
            seen.set(Some(*obs));
            1.0
        });
        let frame = episode.step(&agent);

        assert_eq!(
            seen.get(),
            Some(Observation {
                ball_x: 500.0,
                ball_y: 400.0,
                paddle_y: 300.0
            })
        );
        assert_eq!(episode.paddles()[0].y(), 297.0);
        assert_eq!(episode.paddles()[1].y(), 0.0);
        assert_eq!(episode.ball().pos, DVec2::new(503.0, 397.0));
        // Ball level with the paddle: proximity only
        assert!((frame.reward - 0.001).abs() < 1e-12);
        assert_eq!(frame.phase, EpisodePhase::Running);
    }

    #[test]
    fn test_cap_reached_skips_move_and_miss_check() {
        let settings = Settings::default().with_fitness_cap(1.0);
        // Close enough to deflect this frame
        let start = ball(19.0, 400.0, -30.0, 0.0, &settings);
        let mut episode = Episode::with_ball(&settings, 3, start).unwrap();

        let frame = episode.step(&HoldAgent);

        assert_eq!(
            frame.phase,
            EpisodePhase::Terminated(TerminationReason::FitnessCapReached)
        );
        // Deflected but not moved
        assert_eq!(episode.ball().pos, DVec2::new(19.0, 400.0));
        assert_eq!(episode.ball().vel.x, 30.5);
        assert!(episode.fitness() >= 1.0);
    }

    #[test]
    fn test_miss_ends_episode_regardless_of_fitness() {
        let settings = Settings::default();
        // Above the paddle and heading out on the left
        let start = ball(14.0, 100.0, -3.0, 0.0, &settings);
        let mut episode = Episode::with_ball(&settings, 4, start).unwrap();

        let frame = episode.step(&HoldAgent);

        assert_eq!(frame.reward, 0.0);
        assert_eq!(frame.phase, EpisodePhase::Terminated(TerminationReason::Missed));
        assert_eq!(episode.ball().scored(), Some(Side::Right));
        let result = episode.result().unwrap();
        assert_eq!(result.reason, TerminationReason::Missed);
        assert_eq!(result.frames, 1);
        assert_eq!(result.seed, 4);
    }

    #[test]
    fn test_terminated_episode_is_frozen() {
        let settings = Settings::default();
        let start = ball(14.0, 100.0, -3.0, 0.0, &settings);
        let mut episode = Episode::with_ball(&settings, 5, start).unwrap();
        episode.step(&HoldAgent);
        let ball_before = episode.ball().clone();

        let frame = episode.step(&HoldAgent);

        assert_eq!(frame.reward, 0.0);
        assert_eq!(episode.frame(), 1);
        assert_eq!(episode.ball(), &ball_before);
    }

    #[test]
    fn test_frame_limit() {
        let settings = Settings::default().with_max_frames(Some(10));
        let mut episode = Episode::new(&settings, 6).unwrap();
        let result = episode.run(&TrackerAgent::new(200.0), &mut NullRenderer);
        assert_eq!(result.reason, TerminationReason::FrameLimit);
        assert_eq!(result.frames, 10);
    }

    #[test]
    fn test_fitness_never_decreases() {
        let settings = Settings::default().with_max_frames(Some(5_000));
        let mut episode = Episode::new(&settings, 7).unwrap();
        let agent = TrackerAgent::new(200.0);
        let mut last = 0.0;
        while episode.phase().is_running() {
            let frame = episode.step(&agent);
            assert!(frame.reward >= 0.0);
            assert!(episode.fitness() >= last);
            assert!(episode.ball().vel.y.abs() <= settings.paddle_speed);
            last = episode.fitness();
        }
    }

    #[test]
    fn test_tracker_reaches_cap() {
        let settings = Settings::default().with_fitness_cap(10.0);
        let mut episode = Episode::new(&settings, 8).unwrap();
        let result = episode.run(&TrackerAgent::new(200.0), &mut NullRenderer);
        assert_eq!(result.reason, TerminationReason::FitnessCapReached);
        assert!(result.fitness >= 10.0);
    }

    #[test]
    fn test_renderer_gets_running_frames_only() {
        let settings = Settings::default().with_max_frames(Some(50_000));
        let mut episode = Episode::new(&settings, 9).unwrap();
        let mut frames: Vec<Snapshot> = Vec::new();

        let result = episode.run(&HoldAgent, &mut frames);

        assert_eq!(frames.len() as u64, result.frames - 1);
        assert!(frames.iter().all(|s| s.score == Score::default()));
        assert!(frames.windows(2).all(|w| w[1].frame == w[0].frame + 1));
    }

    #[test]
    fn test_determinism() {
        let settings = Settings::default().with_max_frames(Some(20_000));
        let agent = TrackerAgent::new(200.0).with_dead_zone(60.0);

        let a = Episode::new(&settings, 99999).unwrap().run(&agent, &mut NullRenderer);
        let b = Episode::new(&settings, 99999).unwrap().run(&agent, &mut NullRenderer);

        assert_eq!(a, b);
    }
}
