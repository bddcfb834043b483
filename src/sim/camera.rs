//! Follow camera with look-ahead and screen shake

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{WORLD_H, WORLD_W};
use crate::damp_factor;

/// How far ahead of the player the camera leans (pixels)
const LOOK_AHEAD: f32 = 90.0;
/// Shake decay per second (fraction remaining)
const SHAKE_DECAY: f32 = 0.0005;
/// Shake below this snaps to zero
const SHAKE_EPSILON: f32 = 0.05;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// World-space center of the view
    pub pos: Vec2,
    /// Shake magnitude (pixels)
    pub shake: f32,
    /// Smoothed look-ahead offset
    pub look: Vec2,
}

impl Camera {
    pub fn new(focus: Vec2) -> Self {
        Self {
            pos: focus,
            shake: 0.0,
            look: Vec2::ZERO,
        }
    }

    /// Request at least `amount` of shake
    pub fn add_shake(&mut self, amount: f32) {
        self.shake = self.shake.max(amount);
    }

    /// Ease toward the target, leaning along `face`
    pub fn follow(&mut self, target: Vec2, face: Vec2, dt: f32) {
        let k = damp_factor(dt);
        self.look = self.look.lerp(face.normalize_or_zero() * LOOK_AHEAD, k * 0.5);
        self.pos = self.pos.lerp(target + self.look, k);

        self.shake *= SHAKE_DECAY.powf(dt);
        if self.shake < SHAKE_EPSILON {
            self.shake = 0.0;
        }
    }

    /// Keep a view of `view_size` inside the world
    pub fn clamp_to_world(&mut self, view_size: Vec2) {
        let half = view_size * 0.5;
        self.pos.x = if half.x * 2.0 >= WORLD_W {
            WORLD_W * 0.5
        } else {
            self.pos.x.clamp(half.x, WORLD_W - half.x)
        };
        self.pos.y = if half.y * 2.0 >= WORLD_H {
            WORLD_H * 0.5
        } else {
            self.pos.y.clamp(half.y, WORLD_H - half.y)
        };
    }

    /// Shake jitter for this instant
    ///
    /// Layered sines instead of RNG so rendering never touches sim randomness.
    pub fn shake_offset(&self, time: f32) -> Vec2 {
        if self.shake <= 0.0 {
            return Vec2::ZERO;
        }
        let x = (time * 91.0).sin() * 0.6 + (time * 53.0).sin() * 0.4;
        let y = (time * 77.0).cos() * 0.6 + (time * 61.0).sin() * 0.4;
        Vec2::new(x, y) * self.shake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_converges() {
        let mut cam = Camera::new(Vec2::ZERO);
        let target = Vec2::new(500.0, 300.0);
        for _ in 0..300 {
            cam.follow(target, Vec2::ZERO, 1.0 / 60.0);
        }
        assert!((cam.pos - target).length() < 1.0);
    }

    #[test]
    fn test_look_ahead_leads_facing() {
        let mut cam = Camera::new(Vec2::ZERO);
        for _ in 0..300 {
            cam.follow(Vec2::ZERO, Vec2::new(0.0, -1.0), 1.0 / 60.0);
        }
        assert!(cam.pos.y < -LOOK_AHEAD * 0.9);
    }

    #[test]
    fn test_shake_decays() {
        let mut cam = Camera::new(Vec2::ZERO);
        cam.add_shake(14.0);
        cam.add_shake(5.0);
        assert_eq!(cam.shake, 14.0);
        for _ in 0..120 {
            cam.follow(Vec2::ZERO, Vec2::ZERO, 1.0 / 60.0);
        }
        assert_eq!(cam.shake, 0.0);
        assert_eq!(cam.shake_offset(1.234), Vec2::ZERO);
    }

    #[test]
    fn test_clamp_to_world() {
        let mut cam = Camera::new(Vec2::new(-100.0, WORLD_H + 100.0));
        cam.clamp_to_world(Vec2::new(800.0, 1200.0));
        assert_eq!(cam.pos, Vec2::new(400.0, WORLD_H - 600.0));

        // View wider than the world centers it
        cam.clamp_to_world(Vec2::new(WORLD_W * 2.0, 1200.0));
        assert_eq!(cam.pos.x, WORLD_W * 0.5);
    }
}
