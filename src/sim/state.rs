//! Simulation state: paddles, ball, score and RNG seed
//!
//! Everything a renderer or a replay needs to reproduce a frame lives here.

use std::fmt;
use std::str::FromStr;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::agent::Action;
use crate::consts::BALL_MIN_SPAWN_Y_SPEED;
use crate::error::ConfigError;
use crate::settings::Settings;

/// Which end of the field a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(ConfigError::UnknownSide(other.to_string())),
        }
    }
}

/// Playing field bounds; origin is the top-left corner, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Arena {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            width: settings.field_width,
            height: settings.field_height,
        }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A player's paddle
///
/// Only `move_up`/`move_down` mutate it, and both keep the top edge inside
/// `[0, arena.height - height]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    /// Left edge, fixed by `side`
    x: f64,
    /// Top edge
    y: f64,
    width: f64,
    height: f64,
    /// Pixels per frame
    speed: f64,
    field_height: f64,
}

impl Paddle {
    pub fn new(
        side: Side,
        y: f64,
        width: f64,
        height: f64,
        speed: f64,
        arena: Arena,
    ) -> Result<Self, ConfigError> {
        let dims = [
            ("paddle width", width),
            ("paddle height", height),
            ("paddle speed", speed),
        ];
        for (name, value) in dims {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if height > arena.height {
            return Err(ConfigError::PaddleExceedsField {
                height,
                field_height: arena.height,
            });
        }
        let max = arena.height - height;
        if !(0.0..=max).contains(&y) {
            return Err(ConfigError::PaddleOutOfBounds { y, max });
        }

        let x = match side {
            Side::Left => 0.0,
            Side::Right => arena.width - width,
        };

        Ok(Self {
            side,
            x,
            y,
            width,
            height,
            speed,
            field_height: arena.height,
        })
    }

    /// Agent paddle, vertically centred
    pub fn centered(side: Side, settings: &Settings) -> Result<Self, ConfigError> {
        let arena = Arena::from_settings(settings);
        let y = (arena.height / 2.0 - settings.paddle_height / 2.0).round();
        Self::new(
            side,
            y,
            settings.paddle_width,
            settings.paddle_height,
            settings.paddle_speed,
            arena,
        )
    }

    /// Full-height paddle that returns every ball
    pub fn wall(side: Side, settings: &Settings) -> Result<Self, ConfigError> {
        let arena = Arena::from_settings(settings);
        Self::new(
            side,
            0.0,
            settings.paddle_width,
            arena.height,
            settings.paddle_speed,
            arena,
        )
    }

    pub fn move_up(&mut self) {
        if self.y > 0.0 {
            self.y = (self.y - self.speed).max(0.0);
        }
    }

    pub fn move_down(&mut self) {
        if self.y + self.height < self.field_height {
            self.y = (self.y + self.speed).min(self.field_height - self.height);
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::MoveUp => self.move_up(),
            Action::MoveDown => self.move_down(),
            Action::Hold => {}
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Strictly between the top and bottom edges
    #[inline]
    pub fn spans(&self, y: f64) -> bool {
        self.y < y && y < self.y + self.height
    }
}

/// Reward values paid out by the left paddle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rewards {
    pub deflection: f64,
    pub proximity: f64,
}

/// The ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub(crate) arena: Arena,
    /// Hard cap on |vel.y|, equal to the paddle speed
    pub(crate) max_y_speed: f64,
    /// Added to |vel.x| on every deflection
    pub(crate) speedup: f64,
    pub(crate) rewards: Rewards,
}

impl Ball {
    /// Ball with an explicit position and velocity
    pub fn new(pos: DVec2, vel: DVec2, settings: &Settings) -> Self {
        Self {
            pos,
            vel,
            radius: settings.ball_radius,
            arena: Arena::from_settings(settings),
            max_y_speed: settings.paddle_speed,
            speedup: settings.deflection_speedup,
            rewards: Rewards {
                deflection: settings.deflection_reward,
                proximity: settings.proximity_reward,
            },
        }
    }

    /// Ball at the field centre with a random serve direction.
    ///
    /// `|vel.x|` is always the start speed; `|vel.y|` is drawn in tenths from
    /// `[0.2, start_speed]`.
    pub fn spawn<R: Rng + ?Sized>(settings: &Settings, rng: &mut R) -> Self {
        let arena = Arena::from_settings(settings);
        let pos = arena.center().trunc();

        let x_vel = random_sign(rng) * settings.ball_start_speed;

        let min_tenths = (BALL_MIN_SPAWN_Y_SPEED * 10.0).round() as u32;
        let max_tenths = ((settings.ball_start_speed * 10.0).round() as u32).max(min_tenths);
        let y_sign = random_sign(rng);
        let y_vel = y_sign * rng.random_range(min_tenths..=max_tenths) as f64 / 10.0;
        let y_vel = y_vel.clamp(-settings.paddle_speed, settings.paddle_speed);

        Self::new(pos, DVec2::new(x_vel, y_vel), settings)
    }

    /// Advance one frame, bouncing off the top and bottom walls.
    ///
    /// The bounce is decided on the position this frame's velocity would
    /// produce, so the ball never moves past a wall.
    pub fn advance(&mut self) {
        let next_y = self.pos.y + self.vel.y;
        if next_y - self.radius < 0.0 || next_y + self.radius > self.arena.height {
            self.vel.y = -self.vel.y;
        }

        self.pos.y += self.vel.y;
        self.pos.x += self.vel.x;
    }

    /// Position after this frame's horizontal displacement
    #[inline]
    pub fn projected_x(&self) -> f64 {
        self.pos.x + self.vel.x
    }

    #[inline]
    pub fn max_y_speed(&self) -> f64 {
        self.max_y_speed
    }
}

pub(crate) fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}

/// Points per side. Only match mode changes these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

impl Score {
    pub fn record(&mut self, side: Side) {
        match side {
            Side::Left => self.left += 1,
            Side::Right => self.right += 1,
        }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// RNG seed wrapper so results can name the run that produced them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed of the `index`-th episode in a batch started from `self`
    pub fn offset(&self, index: u64) -> Self {
        Self {
            seed: self.seed.wrapping_add(index),
        }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arena() -> Arena {
        Arena {
            width: 1000.0,
            height: 800.0,
        }
    }

    #[test]
    fn test_paddle_x_follows_side() {
        let left = Paddle::new(Side::Left, 300.0, 20.0, 200.0, 3.0, arena()).unwrap();
        let right = Paddle::new(Side::Right, 300.0, 20.0, 200.0, 3.0, arena()).unwrap();
        assert_eq!(left.x(), 0.0);
        assert_eq!(right.x(), 980.0);
    }

    #[test]
    fn test_paddle_rejects_bad_construction() {
        assert!(matches!(
            Paddle::new(Side::Left, 300.0, -1.0, 200.0, 3.0, arena()),
            Err(ConfigError::NonPositive { .. })
        ));
        assert!(matches!(
            Paddle::new(Side::Left, 700.0, 20.0, 200.0, 3.0, arena()),
            Err(ConfigError::PaddleOutOfBounds { .. })
        ));
        assert_eq!(
            "middle".parse::<Side>(),
            Err(ConfigError::UnknownSide("middle".into()))
        );
        assert_eq!("right".parse::<Side>(), Ok(Side::Right));
    }

    #[test]
    fn test_centered_and_wall_paddles() {
        let settings = Settings::default();
        let left = Paddle::centered(Side::Left, &settings).unwrap();
        assert_eq!(left.y(), 300.0);
        assert_eq!(left.height(), 200.0);
        assert_eq!(left.speed(), settings.paddle_speed);

        let wall = Paddle::wall(Side::Right, &settings).unwrap();
        assert_eq!(wall.y(), 0.0);
        assert_eq!(wall.height(), 800.0);
        assert_eq!(wall.x(), 980.0);
    }

    #[test]
    fn test_paddle_stops_at_edges() {
        let mut paddle = Paddle::new(Side::Left, 3.0, 20.0, 200.0, 3.0, arena()).unwrap();
        paddle.move_up();
        assert_eq!(paddle.y(), 0.0);
        paddle.move_up();
        assert_eq!(paddle.y(), 0.0);

        let mut paddle = Paddle::new(Side::Left, 599.0, 20.0, 200.0, 3.0, arena()).unwrap();
        paddle.move_down();
        assert_eq!(paddle.y(), 600.0);
        paddle.move_down();
        assert_eq!(paddle.y(), 600.0);
    }

    #[test]
    fn test_ball_move_without_bounce() {
        let settings = Settings::default();
        let mut ball = Ball::new(DVec2::new(500.0, 400.0), DVec2::new(3.0, -3.0), &settings);
        ball.advance();
        assert_eq!(ball.pos, DVec2::new(503.0, 397.0));
        assert_eq!(ball.vel, DVec2::new(3.0, -3.0));
    }

    #[test]
    fn test_ball_bounces_before_crossing_top() {
        let settings = Settings::default();
        let mut ball = Ball::new(DVec2::new(500.0, 12.0), DVec2::new(3.0, -3.0), &settings);
        ball.advance();
        assert_eq!(ball.vel.y, 3.0);
        assert_eq!(ball.pos.y, 15.0);
    }

    #[test]
    fn test_ball_bounces_before_crossing_bottom() {
        let settings = Settings::default();
        let mut ball = Ball::new(DVec2::new(500.0, 788.0), DVec2::new(-3.0, 3.0), &settings);
        ball.advance();
        assert_eq!(ball.vel.y, -3.0);
        assert_eq!(ball.pos, DVec2::new(497.0, 785.0));
    }

    #[test]
    fn test_spawn_is_centered_and_bounded() {
        let settings = Settings::default();
        let mut rng = RngState::new(7).to_rng();
        for _ in 0..200 {
            let ball = Ball::spawn(&settings, &mut rng);
            assert_eq!(ball.pos, DVec2::new(500.0, 400.0));
            assert_eq!(ball.vel.x.abs(), 3.0);
            assert!(ball.vel.y.abs() >= 0.2 - 1e-12);
            assert!(ball.vel.y.abs() <= 3.0);
        }
    }

    #[test]
    fn test_spawn_is_reproducible() {
        let settings = Settings::default();
        let a = Ball::spawn(&settings, &mut RngState::new(42).to_rng());
        let b = Ball::spawn(&settings, &mut RngState::new(42).to_rng());
        assert_eq!(a, b);
    }

    #[test]
    fn test_score_record() {
        let mut score = Score::default();
        score.record(Side::Right);
        score.record(Side::Right);
        score.record(Side::Left);
        assert_eq!(score.get(Side::Left), 1);
        assert_eq!(score.get(Side::Right), 2);
    }

    proptest! {
        #[test]
        fn prop_paddle_stays_in_field(
            start in 0u32..=200,
            speed in 0.5f64..40.0,
            moves in proptest::collection::vec(0u8..3, 0..400),
        ) {
            let y = start as f64 * 3.0;
            let mut paddle = Paddle::new(Side::Left, y, 20.0, 200.0, speed, arena()).unwrap();
            for m in moves {
                paddle.apply(match m {
                    0 => Action::MoveUp,
                    1 => Action::MoveDown,
                    _ => Action::Hold,
                });
                prop_assert!(paddle.y() >= 0.0);
                prop_assert!(paddle.y() <= 800.0 - 200.0);
            }
        }

        #[test]
        fn prop_ball_never_ends_past_a_wall(
            y in 10.0f64..790.0,
            vy in -3.0f64..3.0,
            frames in 1usize..2000,
        ) {
            let settings = Settings::default();
            let mut ball = Ball::new(DVec2::new(500.0, y), DVec2::new(0.0, vy), &settings);
            for _ in 0..frames {
                let before = ball.vel.y;
                ball.advance();
                prop_assert!(ball.vel.y.abs() == before.abs());
                prop_assert!(ball.pos.y - ball.radius >= -vy.abs());
                prop_assert!(ball.pos.y + ball.radius <= 800.0 + vy.abs());
            }
        }
    }
}
