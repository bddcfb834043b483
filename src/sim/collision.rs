//! Hit detection for circles and slash cones
//!
//! Everything in the arena is a circle; slashes are cones (circular sectors)
//! swept in front of the player.

use glam::Vec2;

/// Contact between two overlapping circles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first circle toward the second
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

/// Check overlap between two circles
///
/// Coincident centers report an arbitrary +X normal so callers can still
/// separate them.
pub fn circle_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> Option<Contact> {
    let delta = b - a;
    let dist_sq = delta.length_squared();
    let reach = ra + rb;
    if dist_sq >= reach * reach {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::X };
    Some(Contact {
        normal,
        penetration: reach - dist,
    })
}

/// True if `b` is within `r` of `a`
#[inline]
pub fn within_radius(a: Vec2, b: Vec2, r: f32) -> bool {
    a.distance_squared(b) < r * r
}

/// Check whether a circular target touches a cone
///
/// The cone starts at `origin`, opens around `facing` by `half_angle` on
/// each side and reaches `range`. The target's radius extends both the reach
/// and (as an angular margin) the opening, so big targets at the edge of the
/// swing still register.
pub fn in_cone(
    origin: Vec2,
    facing: Vec2,
    half_angle: f32,
    range: f32,
    target: Vec2,
    target_radius: f32,
) -> bool {
    let to_target = target - origin;
    let dist = to_target.length();
    if dist > range + target_radius {
        return false;
    }
    // Overlapping the origin always counts
    if dist <= target_radius {
        return true;
    }
    let facing = facing.normalize_or_zero();
    if facing == Vec2::ZERO {
        return false;
    }
    let cos_to = (to_target / dist).dot(facing).clamp(-1.0, 1.0);
    let angle = cos_to.acos();
    let margin = (target_radius / dist).min(1.0).asin();
    angle <= half_angle + margin
}

/// Reflect velocity off a surface with given normal
pub fn reflect_velocity(vel: Vec2, normal: Vec2) -> Vec2 {
    vel - 2.0 * vel.dot(normal) * normal
}
