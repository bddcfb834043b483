//! Impact feedback: hitstop, slowmo and camera punch
//!
//! Juice runs on real frame time and decides how much simulation time a frame
//! is worth.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{damp_factor, lerp};

/// Punch impulse per unit strength (pixels/s)
const PUNCH_IMPULSE: f32 = 120.0;
/// Punch spring stiffness
const PUNCH_STIFFNESS: f32 = 180.0;
/// Punch spring damping
const PUNCH_DAMPING: f32 = 18.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Juice {
    /// Remaining frozen time (real seconds)
    pub hit_stop: f32,
    /// Current simulation speed multiplier
    pub time_scale: f32,
    /// Scale the time_scale eases toward
    pub target_scale: f32,
    /// Remaining slowmo time (real seconds)
    pub scale_timer: f32,
    /// Camera punch offset
    pub punch: Vec2,
    pub punch_vel: Vec2,
    /// Disabled by settings (reduced motion / juice off)
    pub enabled: bool,
}

impl Default for Juice {
    fn default() -> Self {
        Self {
            hit_stop: 0.0,
            time_scale: 1.0,
            target_scale: 1.0,
            scale_timer: 0.0,
            punch: Vec2::ZERO,
            punch_vel: Vec2::ZERO,
            enabled: true,
        }
    }
}

impl Juice {
    /// Freeze the simulation for `sec` (longest request wins)
    pub fn add_hit_stop(&mut self, sec: f32) {
        if self.enabled {
            self.hit_stop = self.hit_stop.max(sec);
        }
    }

    /// Slow time to `scale` for `sec` (slowest scale and longest duration win)
    pub fn add_slowmo(&mut self, scale: f32, sec: f32) {
        if self.enabled {
            self.target_scale = self.target_scale.min(scale);
            self.scale_timer = self.scale_timer.max(sec);
        }
    }

    /// Kick the camera along `dir`
    pub fn add_punch(&mut self, dir: Vec2, strength: f32) {
        if self.enabled {
            self.punch_vel += dir * PUNCH_IMPULSE * strength;
        }
    }

    /// Is the simulation frozen this frame
    pub fn frozen(&self) -> bool {
        self.hit_stop > 0.0
    }

    /// Advance by one real frame and return the simulation dt for it
    pub fn advance(&mut self, raw_dt: f32) -> f32 {
        self.step_punch(raw_dt);

        if !self.enabled {
            self.hit_stop = 0.0;
            self.time_scale = 1.0;
            self.target_scale = 1.0;
            self.scale_timer = 0.0;
            return raw_dt;
        }

        if self.hit_stop > 0.0 {
            self.hit_stop = (self.hit_stop - raw_dt).max(0.0);
            return 0.0;
        }

        if self.scale_timer > 0.0 {
            self.scale_timer = (self.scale_timer - raw_dt).max(0.0);
        } else {
            self.target_scale = 1.0;
        }
        self.time_scale = lerp(self.time_scale, self.target_scale, damp_factor(raw_dt));
        raw_dt * self.time_scale
    }

    /// Damped spring pulling the punch offset back to rest
    fn step_punch(&mut self, dt: f32) {
        let accel = -self.punch * PUNCH_STIFFNESS - self.punch_vel * PUNCH_DAMPING;
        self.punch_vel += accel * dt;
        self.punch += self.punch_vel * dt;
        if self.punch.length_squared() < 1e-4 && self.punch_vel.length_squared() < 1e-2 {
            self.punch = Vec2::ZERO;
            self.punch_vel = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_stop_freezes_then_releases() {
        let mut juice = Juice::default();
        juice.add_hit_stop(0.05);
        assert_eq!(juice.advance(0.02), 0.0);
        assert_eq!(juice.advance(0.02), 0.0);
        assert_eq!(juice.advance(0.02), 0.0);
        assert!(!juice.frozen());
        assert!(juice.advance(0.016) > 0.0);
    }

    #[test]
    fn test_hit_stop_keeps_longest() {
        let mut juice = Juice::default();
        juice.add_hit_stop(0.09);
        juice.add_hit_stop(0.02);
        assert!((juice.hit_stop - 0.09).abs() < 1e-6);
    }

    #[test]
    fn test_slowmo_eases_and_recovers() {
        let mut juice = Juice::default();
        juice.add_slowmo(0.6, 0.22);
        let first = juice.advance(0.016);
        assert!(first < 0.016);

        // Slowest request wins
        juice.add_slowmo(0.78, 0.1);
        assert!((juice.target_scale - 0.6).abs() < 1e-6);

        for _ in 0..120 {
            juice.advance(0.016);
        }
        assert_eq!(juice.target_scale, 1.0);
        assert!((juice.time_scale - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_disabled_is_real_time() {
        let mut juice = Juice {
            enabled: false,
            ..Default::default()
        };
        juice.add_hit_stop(1.0);
        juice.add_slowmo(0.1, 1.0);
        assert_eq!(juice.advance(0.016), 0.016);
    }

    #[test]
    fn test_punch_springs_back() {
        let mut juice = Juice::default();
        juice.add_punch(Vec2::new(0.0, 1.0), 1.4);
        juice.advance(0.016);
        assert!(juice.punch.y > 0.0);
        for _ in 0..600 {
            juice.advance(0.016);
        }
        assert!(juice.punch.length() < 0.05);
    }
}
