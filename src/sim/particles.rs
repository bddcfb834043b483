//! Ink droplets and dash after-images

use glam::Vec2;
use rand::Rng;

use super::state::{AFTER_IMAGE_TTL, AfterImage, GameState, Particle};
use crate::rand_range;

/// Hard particle cap
pub const MAX_PARTICLES: usize = 512;
/// Velocity kept per second
const PARTICLE_DRAG: f32 = 0.02;

/// Spray shape for a burst
#[derive(Debug, Clone, Copy)]
pub struct Burst {
    pub count: usize,
    /// Preferred direction (zero for a full circle)
    pub dir: Vec2,
    /// Angular spread around `dir` (radians)
    pub spread: f32,
    pub speed: (f32, f32),
    pub size: (f32, f32),
    pub red: bool,
}

impl Burst {
    /// Splatter from a sword hit, sprayed along the cut
    pub fn splatter(dir: Vec2) -> Self {
        Self {
            count: 10,
            dir,
            spread: 0.9,
            speed: (180.0, 520.0),
            size: (2.0, 6.0),
            red: false,
        }
    }

    /// Big omnidirectional burst on a kill
    pub fn death() -> Self {
        Self {
            count: 26,
            dir: Vec2::ZERO,
            spread: std::f32::consts::PI,
            speed: (120.0, 640.0),
            size: (3.0, 9.0),
            red: false,
        }
    }

    /// Vermilion sparks from a parry
    pub fn parry(dir: Vec2) -> Self {
        Self {
            count: 14,
            dir,
            spread: 1.4,
            speed: (260.0, 700.0),
            size: (2.0, 4.0),
            red: true,
        }
    }
}

/// Emit a burst at `pos`, respecting the state's particle cap
pub fn emit(state: &mut GameState, pos: Vec2, burst: Burst) {
    let room = state.max_particles.saturating_sub(state.particles.len());
    let count = burst.count.min(room);
    let base = if burst.dir == Vec2::ZERO {
        0.0
    } else {
        burst.dir.y.atan2(burst.dir.x)
    };
    for _ in 0..count {
        let ang = base + rand_range(&mut state.rng, -burst.spread, burst.spread);
        let speed = rand_range(&mut state.rng, burst.speed.0, burst.speed.1);
        let particle = Particle {
            pos,
            vel: Vec2::new(ang.cos(), ang.sin()) * speed,
            life: 1.0,
            decay: rand_range(&mut state.rng, 1.2, 2.4),
            size: rand_range(&mut state.rng, burst.size.0, burst.size.1),
            shade: state.rng.random::<f32>() * 0.6 + 0.4,
            red: burst.red,
        };
        state.particles.push(particle);
    }
}

/// Leave a dash ghost at the player's position
pub fn leave_after_image(state: &mut GameState) {
    state.after_images.push(AfterImage {
        pos: state.player.pos,
        face: state.player.face,
        ttl: AFTER_IMAGE_TTL,
    });
}

/// Integrate and age particles and after-images
pub fn update(state: &mut GameState, dt: f32) {
    let drag = PARTICLE_DRAG.powf(dt);
    for p in state.particles.iter_mut() {
        p.pos += p.vel * dt;
        p.vel *= drag;
        p.life -= p.decay * dt;
        p.size *= 0.999;
    }
    state.particles.retain(|p| p.life > 0.0);

    for a in state.after_images.iter_mut() {
        a.ttl -= dt;
    }
    state.after_images.retain(|a| a.ttl > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_respects_cap() {
        let mut state = GameState::new(1);
        state.max_particles = 30;
        emit(&mut state, Vec2::ZERO, Burst::death());
        emit(&mut state, Vec2::ZERO, Burst::death());
        assert_eq!(state.particles.len(), 30);
    }

    #[test]
    fn test_particles_fade_out() {
        let mut state = GameState::new(1);
        emit(&mut state, Vec2::ZERO, Burst::splatter(Vec2::X));
        assert!(!state.particles.is_empty());
        for _ in 0..120 {
            update(&mut state, 1.0 / 60.0);
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_splatter_follows_direction() {
        let mut state = GameState::new(9);
        emit(&mut state, Vec2::ZERO, Burst::splatter(Vec2::X));
        for p in &state.particles {
            assert!(p.vel.x > 0.0);
        }
    }

    #[test]
    fn test_after_images_expire() {
        let mut state = GameState::new(1);
        leave_after_image(&mut state);
        update(&mut state, AFTER_IMAGE_TTL * 0.5);
        assert_eq!(state.after_images.len(), 1);
        update(&mut state, AFTER_IMAGE_TTL);
        assert!(state.after_images.is_empty());
    }
}
