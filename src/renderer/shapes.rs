//! Shape generation for 2D primitives
//!
//! All shapes are plain triangle lists in world coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

fn tri(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

fn quad(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) {
    tri(out, a, b, c, color);
    tri(out, c, b, d, color);
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        tri(
            &mut vertices,
            center,
            center + Vec2::from_angle(theta1) * radius,
            center + Vec2::from_angle(theta2) * radius,
            color,
        );
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let d1 = Vec2::from_angle((i as f32 / segments as f32) * 2.0 * PI);
        let d2 = Vec2::from_angle(((i + 1) as f32 / segments as f32) * 2.0 * PI);

        quad(
            &mut vertices,
            center + d1 * inner_radius,
            center + d1 * outer_radius,
            center + d2 * inner_radius,
            center + d2 * outer_radius,
            color,
        );
    }

    vertices
}

/// Filled circular sector around `facing`, fading from `inner` at the
/// center to `outer` at the rim
pub fn fan(
    center: Vec2,
    facing: Vec2,
    half_angle: f32,
    radius: f32,
    inner: [f32; 4],
    outer: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(1);
    let base = facing.y.atan2(facing.x);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let t1 = i as f32 / segments as f32;
        let t2 = (i + 1) as f32 / segments as f32;
        let p1 = center + Vec2::from_angle(base - half_angle + t1 * 2.0 * half_angle) * radius;
        let p2 = center + Vec2::from_angle(base - half_angle + t2 * 2.0 * half_angle) * radius;

        vertices.push(Vertex::new(center.x, center.y, inner));
        vertices.push(Vertex::new(p1.x, p1.y, outer));
        vertices.push(Vertex::new(p2.x, p2.y, outer));
    }

    vertices
}

/// Tapered brush stroke along a polyline
///
/// Width goes from `width` at the first point to `width * tail` at the last,
/// alpha fades the same way.
pub fn brush_stroke(points: &[Vec2], width: f32, tail: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut vertices = Vec::with_capacity(points.len() * 6);
    let last = (points.len() - 1) as f32;

    for i in 0..points.len() - 1 {
        let p1 = points[i];
        let p2 = points[i + 1];

        let t1 = i as f32 / last;
        let t2 = (i + 1) as f32 / last;

        let w1 = width * (1.0 + (tail - 1.0) * t1) * 0.5;
        let w2 = width * (1.0 + (tail - 1.0) * t2) * 0.5;

        let mut c1 = color;
        c1[3] *= 1.0 - t1 * 0.6;
        let mut c2 = color;
        c2[3] *= 1.0 - t2 * 0.6;

        // Direction from p1 to p2
        let dir = (p2 - p1).normalize_or_zero();
        let perp = dir.perp();

        let v1a = p1 + perp * w1;
        let v1b = p1 - perp * w1;
        let v2a = p2 + perp * w2;
        let v2b = p2 - perp * w2;

        vertices.push(Vertex::new(v1a.x, v1a.y, c1));
        vertices.push(Vertex::new(v1b.x, v1b.y, c1));
        vertices.push(Vertex::new(v2a.x, v2a.y, c2));

        vertices.push(Vertex::new(v2a.x, v2a.y, c2));
        vertices.push(Vertex::new(v1b.x, v1b.y, c1));
        vertices.push(Vertex::new(v2b.x, v2b.y, c2));
    }

    vertices
}

/// Axis-aligned rectangle from its top-left corner
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    let max = min + size;
    quad(
        &mut vertices,
        min,
        Vec2::new(max.x, min.y),
        Vec2::new(min.x, max.y),
        max,
        color,
    );
    vertices
}

/// Horizontal meter centered on `center`, filled to `fraction`
pub fn bar(
    center: Vec2,
    size: Vec2,
    fraction: f32,
    back: [f32; 4],
    fill: [f32; 4],
) -> Vec<Vertex> {
    let min = center - size * 0.5;
    let mut vertices = rect(min, size, back);
    let filled = size.x * fraction.clamp(0.0, 1.0);
    if filled > 0.0 {
        vertices.extend(rect(min, Vec2::new(filled, size.y), fill));
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn test_circle_vertices_on_radius() {
        let verts = circle(Vec2::new(10.0, 5.0), 3.0, RED, 8);
        assert_eq!(verts.len(), 24);
        for v in verts.chunks(3) {
            let edge = Vec2::from(v[1].position) - Vec2::new(10.0, 5.0);
            assert!((edge.length() - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_degenerate_segments_clamped() {
        assert_eq!(circle(Vec2::ZERO, 1.0, RED, 0).len(), 9);
        assert_eq!(ring(Vec2::ZERO, 1.0, 2.0, RED, 1).len(), 18);
    }

    #[test]
    fn test_fan_stays_inside_cone() {
        let verts = fan(Vec2::ZERO, Vec2::Y, 0.5, 100.0, RED, RED, 6);
        assert_eq!(verts.len(), 18);
        for v in &verts {
            let p = Vec2::from(v.position);
            if p.length() > 1.0 {
                assert!(p.angle_to(Vec2::Y).abs() <= 0.5 + 1e-4);
            }
        }
    }

    #[test]
    fn test_brush_stroke_tapers() {
        let pts = [Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(20.0, 0.0)];
        let verts = brush_stroke(&pts, 8.0, 0.25, RED);
        assert_eq!(verts.len(), 12);
        // Head is full width, tail is a quarter
        assert!((verts[0].position[1] - 4.0).abs() < 1e-5);
        assert!((verts[11].position[1] + 1.0).abs() < 1e-5);
        assert!(verts[11].color[3] < verts[0].color[3]);
        assert!(brush_stroke(&pts[..1], 8.0, 0.25, RED).is_empty());
    }

    #[test]
    fn test_bar_fill() {
        let verts = bar(Vec2::ZERO, Vec2::new(40.0, 4.0), 0.5, RED, RED);
        assert_eq!(verts.len(), 12);
        let max_x = verts[6..]
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MIN, f32::max);
        assert!((max_x - 0.0).abs() < 1e-5);
        assert_eq!(bar(Vec2::ZERO, Vec2::ONE, 0.0, RED, RED).len(), 6);
    }
}
