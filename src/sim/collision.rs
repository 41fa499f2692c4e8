//! Ball/paddle collision response and miss detection
//!
//! Both checks look at where the ball will be after this frame's horizontal
//! step (`x + x_vel`) rather than where it is now. A hit is therefore seen one
//! frame before the ball would pass through the paddle, whatever the frame rate.

use rand::Rng;

use super::state::{Ball, Paddle, Side, random_sign};
use crate::consts::DEFLECTION_MAX_Y_KICK;

impl Ball {
    /// Resolve contact with one paddle and return the reward it earned.
    ///
    /// Left paddle: pays the proximity reward whenever the ball is level with
    /// it, plus the deflection reward when the ball's projected left edge
    /// reaches its right edge. Right paddle: deflects, never pays.
    ///
    /// `|vel.y|` is clamped to the paddle speed on return.
    pub fn collision<R: Rng + ?Sized>(&mut self, paddle: &Paddle, rng: &mut R) -> f64 {
        let mut reward = 0.0;
        let level = paddle.spans(self.pos.y);

        match paddle.side {
            Side::Left => {
                if level {
                    reward += self.rewards.proximity;
                    if self.projected_x() - self.radius < paddle.x() + paddle.width() {
                        self.deflect(rng);
                        reward += self.rewards.deflection;
                    }
                }
            }
            Side::Right => {
                if self.projected_x() + self.radius > paddle.x() && level {
                    self.deflect(rng);
                }
            }
        }

        self.vel.y = self.vel.y.clamp(-self.max_y_speed, self.max_y_speed);
        reward
    }

    /// Side that wins the point if the ball's projected edge has left the field
    pub fn scored(&self) -> Option<Side> {
        let next_x = self.projected_x();
        if next_x - self.radius < 0.0 {
            Some(Side::Right)
        } else if next_x + self.radius > self.arena.width {
            Some(Side::Left)
        } else {
            None
        }
    }

    /// Reverse and speed up horizontally, then kick y by a random tenth in
    /// `[-1.0, 1.0]` so rallies do not settle into a fixed loop.
    fn deflect<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let speed = self.vel.x.abs() + self.speedup;
        self.vel.x = -self.vel.x.signum() * speed;

        let max_tenths = (DEFLECTION_MAX_Y_KICK * 10.0).round() as u32;
        let sign = random_sign(rng);
        let kick = sign * rng.random_range(0..=max_tenths) as f64 / 10.0;
        self.vel.y += kick;
        log::trace!("deflect: vel=({:.2}, {:.2})", self.vel.x, self.vel.y);
    }
}
