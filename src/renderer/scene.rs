//! Builds the frame's triangle list from game state
//!
//! Everything is emitted in world coordinates; `View` maps them to NDC.
//! Draw order is back to front: paper wash, border, after-images, ink,
//! enemies, player, effects.

use glam::Vec2;

use super::shapes;
use super::vertex::Vertex;
use super::vertex::colors::{self, mix, with_alpha};
use crate::consts::*;
use crate::sim::state::AFTER_IMAGE_TTL;
use crate::sim::{Enemy, EnemyKind, GamePhase, GameState, Player};

/// World units visible vertically
pub const VIEW_HEIGHT: f32 = 1100.0;
/// Spacing of the ink-wash grid
const GRID_SPACING: f32 = 200.0;
const BORDER_WIDTH: f32 = 14.0;
const SWORD_LENGTH: f32 = 72.0;
/// Resting sword angle relative to facing
const SWORD_REST_ANGLE: f32 = 0.9;

/// Visible window into the world plus per-frame draw options
#[derive(Debug, Clone, Copy)]
pub struct View {
    /// World-space center (camera, shake and punch applied)
    pub center: Vec2,
    /// World-space extent
    pub size: Vec2,
    pub segments: u32,
    pub paper_wash: bool,
    pub flash: bool,
}

impl View {
    /// View for a viewport of `aspect` (width / height)
    pub fn new(state: &GameState, aspect: f32, shake: bool) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        let size = Vec2::new(VIEW_HEIGHT * aspect, VIEW_HEIGHT);

        let mut camera = state.camera.clone();
        camera.clamp_to_world(size);
        let mut center = camera.pos;
        if shake {
            center += camera.shake_offset(state.time) + state.juice.punch;
        }

        Self {
            center,
            size,
            segments: 20,
            paper_wash: true,
            flash: true,
        }
    }

    /// World position to normalized device coordinates (y up)
    pub fn world_to_ndc(&self, p: Vec2) -> Vec2 {
        let d = (p - self.center) / (self.size * 0.5);
        Vec2::new(d.x, -d.y)
    }

    /// Whether a circle could be on screen
    pub fn contains(&self, p: Vec2, radius: f32) -> bool {
        let d = (p - self.center).abs();
        let half = self.size * 0.5;
        d.x <= half.x + radius && d.y <= half.y + radius
    }

    fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }
}

/// Base tone for an enemy kind
pub fn enemy_color(kind: EnemyKind) -> [f32; 4] {
    match kind {
        EnemyKind::Dokkaebi => colors::DOKKAEBI,
        EnemyKind::Ghost => with_alpha(colors::GHOST, 0.8),
        EnemyKind::Gate => colors::GATE,
        EnemyKind::Wraith => colors::WRAITH,
    }
}

/// Build all vertices for the current frame
pub fn build(state: &GameState, view: &View) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(4096);

    if view.paper_wash {
        paper_wash(&mut out, view);
    }
    border(&mut out);

    for img in &state.after_images {
        let a = (img.ttl / AFTER_IMAGE_TTL).clamp(0.0, 1.0) * 0.35;
        out.extend(shapes::circle(
            img.pos,
            PLAYER_RADIUS,
            with_alpha(colors::INK, a),
            view.segments,
        ));
    }

    for p in &state.particles {
        if !view.contains(p.pos, p.size) {
            continue;
        }
        let base = if p.red { colors::VERMILION } else { colors::INK };
        let a = p.life.clamp(0.0, 1.0) * p.shade.clamp(0.0, 1.0);
        out.extend(shapes::circle(
            p.pos,
            p.size * (0.5 + 0.5 * p.life),
            with_alpha(base, a),
            8,
        ));
    }

    for e in &state.enemies {
        if view.contains(e.pos, e.radius() + 40.0) {
            enemy(&mut out, e, state.time, view.segments);
        }
    }

    if state.phase != GamePhase::Title {
        player(&mut out, &state.player, state.time, view.segments);
    }

    if view.flash && state.flash > 0.0 {
        out.extend(shapes::rect(
            view.min(),
            view.size,
            with_alpha(colors::PAPER, state.flash * 0.55),
        ));
    }

    out
}

fn paper_wash(out: &mut Vec<Vertex>, view: &View) {
    let min = view.min().max(Vec2::ZERO);
    let max = (view.min() + view.size).min(Vec2::new(WORLD_W, WORLD_H));
    let line = with_alpha(colors::INK, 0.05);

    let mut x = (min.x / GRID_SPACING).ceil() * GRID_SPACING;
    while x <= max.x {
        out.extend(shapes::rect(
            Vec2::new(x - 1.0, min.y),
            Vec2::new(2.0, max.y - min.y),
            line,
        ));
        x += GRID_SPACING;
    }
    let mut y = (min.y / GRID_SPACING).ceil() * GRID_SPACING;
    while y <= max.y {
        out.extend(shapes::rect(
            Vec2::new(min.x, y - 1.0),
            Vec2::new(max.x - min.x, 2.0),
            line,
        ));
        y += GRID_SPACING;
    }
}

fn border(out: &mut Vec<Vertex>) {
    let c = with_alpha(colors::INK, 0.7);
    let w = BORDER_WIDTH;
    out.extend(shapes::rect(Vec2::new(-w, -w), Vec2::new(WORLD_W + 2.0 * w, w), c));
    out.extend(shapes::rect(Vec2::new(-w, WORLD_H), Vec2::new(WORLD_W + 2.0 * w, w), c));
    out.extend(shapes::rect(Vec2::new(-w, 0.0), Vec2::new(w, WORLD_H), c));
    out.extend(shapes::rect(Vec2::new(WORLD_W, 0.0), Vec2::new(w, WORLD_H), c));
}

fn enemy(out: &mut Vec<Vertex>, e: &Enemy, time: f32, segments: u32) {
    let r = e.radius();

    // Telegraph
    if e.danger {
        let pulse = 0.5 + 0.5 * (time * 24.0).sin();
        out.extend(shapes::ring(
            e.pos,
            r + 6.0,
            r + 10.0 + pulse * 4.0,
            with_alpha(colors::VERMILION, 0.5 + 0.4 * pulse),
            segments,
        ));
        let reach = e.kind.stats().attack_range;
        out.extend(shapes::fan(
            e.pos,
            e.attack_dir,
            0.35,
            r + reach,
            with_alpha(colors::VERMILION, 0.25),
            with_alpha(colors::VERMILION, 0.0),
            6,
        ));
    }

    let tone = enemy_color(e.kind);
    let body = mix(tone, colors::VERMILION, e.hurt);
    out.extend(shapes::circle(e.pos, r, body, segments));

    if e.elite {
        out.extend(shapes::ring(e.pos, r + 2.0, r + 5.0, colors::GOLD, segments));
    }

    // Eyes toward the attack direction or velocity
    let look = if e.attack_dir != Vec2::ZERO {
        e.attack_dir
    } else {
        e.vel.normalize_or_zero()
    };
    let eye = e.pos + look * r * 0.45;
    out.extend(shapes::circle(eye, r * 0.18, colors::PAPER, 6));

    if e.hp < e.hp_max {
        out.extend(shapes::bar(
            e.pos - Vec2::new(0.0, r + 12.0),
            Vec2::new(r * 2.0, 5.0),
            e.hp / e.hp_max,
            with_alpha(colors::INK, 0.3),
            colors::VERMILION,
        ));
    }
}

fn player(out: &mut Vec<Vertex>, p: &Player, time: f32, segments: u32) {
    let blink = p.invuln > 0.0 && !p.dashing && (time * 30.0).sin() < 0.0;
    let body_alpha = if blink { 0.35 } else { 1.0 };

    if p.slashing {
        out.extend(shapes::fan(
            p.pos,
            p.face,
            SLASH_HALF_ANGLE,
            SLASH_RANGE,
            with_alpha(colors::INK, 0.05),
            with_alpha(colors::INK, 0.35 * (1.0 - p.slash_progress())),
            14,
        ));
    }

    out.extend(shapes::circle(
        p.pos,
        PLAYER_RADIUS,
        with_alpha(colors::INK, body_alpha),
        segments,
    ));
    // Seal mark on the chest
    out.extend(shapes::circle(
        p.pos + p.face * PLAYER_RADIUS * 0.4,
        PLAYER_RADIUS * 0.28,
        with_alpha(colors::VERMILION, body_alpha),
        8,
    ));

    out.extend(sword(p));

    if p.guarding {
        let c = if p.parry_window > 0.0 {
            colors::VERMILION
        } else {
            with_alpha(colors::INK, 0.5)
        };
        out.extend(shapes::ring(
            p.pos,
            PLAYER_RADIUS + 8.0,
            PLAYER_RADIUS + 13.0,
            c,
            segments,
        ));
    }

    if p.special_ready() {
        let pulse = 0.5 + 0.5 * (time * 6.0).sin();
        out.extend(shapes::ring(
            p.pos,
            PLAYER_RADIUS + 18.0,
            PLAYER_RADIUS + 20.0 + pulse * 3.0,
            with_alpha(colors::GOLD, 0.6),
            segments,
        ));
    }
}

/// Sword as a tapered stroke; sweeps across the cone while slashing
fn sword(p: &Player) -> Vec<Vertex> {
    let base = p.face.y.atan2(p.face.x);
    let angle = if p.slashing {
        base - SLASH_HALF_ANGLE + 2.0 * SLASH_HALF_ANGLE * p.slash_progress()
    } else {
        base + SWORD_REST_ANGLE
    };
    let dir = Vec2::from_angle(angle);
    let hilt = p.pos + dir * PLAYER_RADIUS * 0.6;
    let points = [
        hilt,
        hilt + dir * SWORD_LENGTH * 0.5,
        hilt + dir * SWORD_LENGTH,
    ];
    shapes::brush_stroke(&points, 7.0, 0.2, colors::INK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_to_ndc_flips_y() {
        let state = GameState::new(1);
        let view = View::new(&state, 1.0, false);
        assert_eq!(view.world_to_ndc(view.center), Vec2::ZERO);
        let top_right = view.center + Vec2::new(view.size.x, -view.size.y) * 0.5;
        let ndc = view.world_to_ndc(top_right);
        assert!((ndc.x - 1.0).abs() < 1e-5);
        assert!((ndc.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_view_stays_in_world() {
        let mut state = GameState::new(1);
        state.camera.pos = Vec2::new(-500.0, WORLD_H + 500.0);
        let view = View::new(&state, 0.5, false);
        assert!(view.center.x - view.size.x * 0.5 >= 0.0);
        assert!(view.center.y + view.size.y * 0.5 <= WORLD_H + 1e-3);
    }

    #[test]
    fn test_bad_aspect_falls_back() {
        let state = GameState::new(1);
        let view = View::new(&state, f32::NAN, true);
        assert_eq!(view.size, Vec2::splat(VIEW_HEIGHT));
    }

    #[test]
    fn test_build_draws_playing_scene() {
        let mut state = GameState::new(3);
        let view = View::new(&state, 0.6, true);
        let title = build(&state, &view);
        assert!(!title.is_empty());
        assert_eq!(title.len() % 3, 0);

        state.start();
        let view = View::new(&state, 0.6, true);
        let playing = build(&state, &view);
        assert!(playing.len() > title.len());
        assert_eq!(playing.len() % 3, 0);
    }

    #[test]
    fn test_flash_overlay_toggle() {
        let mut state = GameState::new(3);
        state.flash = 1.0;
        let mut view = View::new(&state, 1.0, false);
        let with_flash = build(&state, &view).len();
        view.flash = false;
        assert_eq!(build(&state, &view).len() + 6, with_flash);
    }
}
