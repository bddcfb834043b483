//! Game state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::combo::Combo;
use super::juice::Juice;
use crate::consts::*;
use crate::rand_range;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Overlay shown, waiting for start
    Title,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended (overlay shown again)
    GameOver,
}

/// The player swordsman
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing direction (smoothed toward movement input)
    pub face: Vec2,
    pub hp: f32,
    pub hp_max: f32,
    /// Special meter
    pub sp: f32,
    pub sp_max: f32,

    pub speed: f32,
    pub dash_speed: f32,
    pub dashing: bool,
    pub dash_timer: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,

    pub slashing: bool,
    pub slash_timer: f32,
    pub slash_duration: f32,
    pub slash_cooldown: f32,
    /// Enemies already struck by the current slash
    #[serde(default)]
    pub slash_hits: Vec<u32>,

    pub guarding: bool,
    pub parry_window: f32,
    pub parry_cooldown: f32,
    pub parry_perfect: bool,

    pub invuln: f32,
    pub stun: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(WORLD_W * 0.5, WORLD_H * 0.85),
            vel: Vec2::ZERO,
            face: Vec2::new(0.0, -1.0),
            hp: PLAYER_HP,
            hp_max: PLAYER_HP,
            sp: 0.0,
            sp_max: PLAYER_SP,
            speed: PLAYER_SPEED,
            dash_speed: DASH_SPEED,
            dashing: false,
            dash_timer: 0.0,
            dash_duration: DASH_DURATION,
            dash_cooldown: 0.0,
            slashing: false,
            slash_timer: 0.0,
            slash_duration: SLASH_DURATION,
            slash_cooldown: 0.0,
            slash_hits: Vec::new(),
            guarding: false,
            parry_window: 0.0,
            parry_cooldown: 0.0,
            parry_perfect: false,
            invuln: 0.0,
            stun: 0.0,
        }
    }
}

impl Player {
    /// Add to the special meter, clamped to `[0, sp_max]`
    pub fn gain_sp(&mut self, amount: f32) {
        self.sp = (self.sp + amount).clamp(0.0, self.sp_max);
    }

    /// Special meter is full
    pub fn special_ready(&self) -> bool {
        self.sp >= self.sp_max
    }

    /// Slash progress in `[0, 1]` (0 when not slashing)
    pub fn slash_progress(&self) -> f32 {
        if self.slashing {
            (self.slash_timer / self.slash_duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Count down all player timers
    pub fn tick_timers(&mut self, dt: f32) {
        self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        self.slash_cooldown = (self.slash_cooldown - dt).max(0.0);
        self.invuln = (self.invuln - dt).max(0.0);
        self.stun = (self.stun - dt).max(0.0);
        self.parry_window = (self.parry_window - dt).max(0.0);
        self.parry_cooldown = (self.parry_cooldown - dt).max(0.0);
    }
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Goblin brawler - straight chase
    Dokkaebi,
    /// Fast, fragile, weaves while approaching
    Ghost,
    /// Gatekeeper - slow and heavy
    Gate,
    /// Warrior wraith - lunges out of its windup
    Wraith,
}

/// Static tuning for an enemy kind
#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub name: &'static str,
    pub hp: f32,
    pub speed: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub damage: f32,
    /// Relative spawn weight (weights sum to 1)
    pub weight: f32,
    /// Telegraph time before the attack lands
    pub windup: f32,
    pub radius: f32,
    /// Base score for a kill
    pub bounty: f32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Dokkaebi,
        EnemyKind::Ghost,
        EnemyKind::Gate,
        EnemyKind::Wraith,
    ];

    pub fn stats(&self) -> EnemyStats {
        match self {
            EnemyKind::Dokkaebi => EnemyStats {
                name: "도깨비",
                hp: 55.0,
                speed: 260.0,
                attack_range: 70.0,
                attack_cooldown: 0.85,
                damage: 18.0,
                weight: 0.38,
                windup: 0.35,
                radius: 24.0,
                bounty: 120.0,
            },
            EnemyKind::Ghost => EnemyStats {
                name: "귀신",
                hp: 35.0,
                speed: 300.0,
                attack_range: 85.0,
                attack_cooldown: 0.95,
                damage: 14.0,
                weight: 0.28,
                windup: 0.3,
                radius: 20.0,
                bounty: 100.0,
            },
            EnemyKind::Gate => EnemyStats {
                name: "수문장",
                hp: 120.0,
                speed: 200.0,
                attack_range: 95.0,
                attack_cooldown: 1.25,
                damage: 28.0,
                weight: 0.18,
                windup: 0.6,
                radius: 34.0,
                bounty: 260.0,
            },
            EnemyKind::Wraith => EnemyStats {
                name: "무사 망령",
                hp: 80.0,
                speed: 280.0,
                attack_range: 85.0,
                attack_cooldown: 0.95,
                damage: 22.0,
                weight: 0.16,
                windup: 0.4,
                radius: 24.0,
                bounty: 180.0,
            },
        }
    }

    /// Weighted pick from a uniform roll in `[0, 1)`
    ///
    /// Rolls past the cumulative weight fall back to `Dokkaebi`.
    pub fn pick(roll: f32) -> EnemyKind {
        let mut acc = 0.0;
        for kind in EnemyKind::ALL {
            acc += kind.stats().weight;
            if roll <= acc {
                return kind;
            }
        }
        EnemyKind::Dokkaebi
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: f32,
    pub hp_max: f32,
    pub elite: bool,
    pub attack_cooldown: f32,
    /// Hurt flash (1 on hit, decays to 0)
    pub hurt: f32,
    pub stun: f32,
    /// Remaining windup time while telegraphing
    pub windup: f32,
    pub attacking: bool,
    /// Telegraph flag for rendering
    pub danger: bool,
    /// Direction locked in when the windup started
    #[serde(default)]
    pub attack_dir: Vec2,
    /// Per-enemy phase offset for weaving motion
    #[serde(default)]
    pub phase: f32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, elite: bool) -> Self {
        let stats = kind.stats();
        let hp = if elite {
            stats.hp * ELITE_HP_FACTOR
        } else {
            stats.hp
        };
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            hp,
            hp_max: hp,
            elite,
            attack_cooldown: stats.attack_cooldown,
            hurt: 0.0,
            stun: 0.0,
            windup: 0.0,
            attacking: false,
            danger: false,
            attack_dir: Vec2::ZERO,
            phase: 0.0,
        }
    }

    pub fn radius(&self) -> f32 {
        let r = self.kind.stats().radius;
        if self.elite { r * 1.25 } else { r }
    }

    /// Damage dealt by this enemy's attack
    pub fn damage(&self) -> f32 {
        let d = self.kind.stats().damage;
        if self.elite { d * 1.3 } else { d }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Cancel an in-progress windup
    pub fn interrupt(&mut self) {
        self.windup = 0.0;
        self.attacking = false;
        self.danger = false;
    }
}

/// An ink droplet for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases over time
    pub life: f32,
    /// Life lost per second
    pub decay: f32,
    pub size: f32,
    /// Ink darkness 0 (wash) - 1 (solid)
    pub shade: f32,
    /// Vermilion droplet instead of black ink
    #[serde(default)]
    pub red: bool,
}

/// Dash ghost left behind the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfterImage {
    pub pos: Vec2,
    pub face: Vec2,
    pub ttl: f32,
}

/// After-image lifetime
pub const AFTER_IMAGE_TTL: f32 = 0.22;

/// Events emitted by the simulation for the frontend (audio, vibration, scores)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Slash,
    Dash,
    Special { hits: u32 },
    EnemyHit { kind: EnemyKind },
    EnemyKilled { kind: EnemyKind, elite: bool, combo: u32 },
    Guard,
    Parry,
    PlayerHit { damage: f32 },
    WaveUp { wave: u32 },
    GameOver { score: u64, kills: u32, wave: u32 },
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed
    pub seed: u64,
    #[serde(skip, default = "default_rng")]
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Simulated seconds since reset
    pub time: f32,
    pub score: f32,
    pub kills: u32,
    pub wave: u32,
    pub spawn_timer: f32,
    pub spawn_every: f32,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    #[serde(skip)]
    pub after_images: Vec<AfterImage>,
    /// Particle cap (from settings)
    #[serde(skip)]
    pub max_particles: usize,
    /// Full-screen ink flash (1 on big impacts, decays)
    pub flash: f32,
    pub juice: Juice,
    pub camera: Camera,
    pub combo: Combo,
    /// Pending events for the frontend
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed (in the Title phase)
    pub fn new(seed: u64) -> Self {
        let player = Player::default();
        let camera = Camera::new(player.pos);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Title,
            time: 0.0,
            score: 0.0,
            kills: 0,
            wave: 1,
            spawn_timer: 0.0,
            spawn_every: 1.1,
            player,
            enemies: Vec::new(),
            particles: Vec::new(),
            after_images: Vec::new(),
            max_particles: super::particles::MAX_PARTICLES,
            flash: 0.0,
            juice: Juice::default(),
            camera,
            combo: Combo::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Back to the title overlay, keeping seed stream and settings-derived caps
    pub fn reset(&mut self) {
        let max_particles = self.max_particles;
        let juice_enabled = self.juice.enabled;
        let seed = self.rng.random::<u64>();
        *self = Self::new(seed);
        self.max_particles = max_particles;
        self.juice.enabled = juice_enabled;
    }

    /// Begin a run (no-op unless on the title or game-over overlay)
    pub fn start(&mut self) {
        match self.phase {
            GamePhase::Title => {}
            GamePhase::GameOver => self.reset(),
            GamePhase::Playing | GamePhase::Paused => return,
        }
        self.phase = GamePhase::Playing;
        for _ in 0..INITIAL_ENEMIES {
            self.spawn_enemy();
        }
        self.events.push(GameEvent::Started);
        log::info!("Run started (seed {})", self.seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a random enemy on a ring around the player
    pub fn spawn_enemy(&mut self) -> u32 {
        let kind = EnemyKind::pick(self.rng.random::<f32>());
        let elite = self.rng.random_bool(ELITE_CHANCE);

        let ring = rand_range(&mut self.rng, SPAWN_RING_MIN, SPAWN_RING_MAX);
        let ang = rand_range(&mut self.rng, 0.0, std::f32::consts::TAU);
        let pos = Vec2::new(
            (self.player.pos.x + ang.cos() * ring).clamp(SPAWN_MARGIN_X, WORLD_W - SPAWN_MARGIN_X),
            (self.player.pos.y + ang.sin() * ring).clamp(SPAWN_MARGIN_Y, WORLD_H - SPAWN_MARGIN_Y),
        );

        let id = self.next_entity_id();
        let mut enemy = Enemy::new(id, kind, pos, elite);
        enemy.attack_cooldown = rand_range(&mut self.rng, 0.2, kind.stats().attack_cooldown);
        enemy.phase = rand_range(&mut self.rng, 0.0, std::f32::consts::TAU);
        self.enemies.push(enemy);
        if elite {
            log::debug!("Elite {} spawned", kind.stats().name);
        }
        id
    }

    /// Score rounded down for display and high scores
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_weights_sum_to_one() {
        let total: f32 = EnemyKind::ALL.iter().map(|k| k.stats().weight).sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_pick_enemy_kind() {
        assert_eq!(EnemyKind::pick(0.0), EnemyKind::Dokkaebi);
        assert_eq!(EnemyKind::pick(0.5), EnemyKind::Ghost);
        assert_eq!(EnemyKind::pick(0.7), EnemyKind::Gate);
        assert_eq!(EnemyKind::pick(0.9), EnemyKind::Wraith);
        // Past the cumulative weight falls back to the first kind
        assert_eq!(EnemyKind::pick(1.5), EnemyKind::Dokkaebi);
    }

    #[test]
    fn test_start_spawns_initial_enemies() {
        let mut state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Title);
        state.start();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.enemies.len(), INITIAL_ENEMIES);
        assert_eq!(state.drain_events(), vec![GameEvent::Started]);

        // Starting again while playing does nothing
        state.start();
        assert_eq!(state.enemies.len(), INITIAL_ENEMIES);
    }

    #[test]
    fn test_spawned_enemies_inside_world() {
        let mut state = GameState::new(42);
        // Push the player into a corner so the ring overflows the world
        state.player.pos = Vec2::new(PLAYER_MARGIN_X, PLAYER_MARGIN_Y);
        for _ in 0..200 {
            state.spawn_enemy();
        }
        for e in &state.enemies {
            assert!(e.pos.x >= SPAWN_MARGIN_X && e.pos.x <= WORLD_W - SPAWN_MARGIN_X);
            assert!(e.pos.y >= SPAWN_MARGIN_Y && e.pos.y <= WORLD_H - SPAWN_MARGIN_Y);
            let cd = e.kind.stats().attack_cooldown;
            assert!(e.attack_cooldown >= 0.2 && e.attack_cooldown <= cd);
        }
    }

    #[test]
    fn test_spawn_ring_around_player() {
        let mut state = GameState::new(9);
        state.player.pos = Vec2::new(WORLD_W * 0.5, WORLD_H * 0.5);
        for _ in 0..200 {
            state.spawn_enemy();
        }
        for e in &state.enemies {
            let dist = e.pos.distance(state.player.pos);
            // Small slack for f32 trig
            assert!(
                dist >= SPAWN_RING_MIN - 0.1 && dist <= SPAWN_RING_MAX + 0.1,
                "spawned {dist} away"
            );
        }
    }

    #[test]
    fn test_elite_hp() {
        let e = Enemy::new(1, EnemyKind::Gate, Vec2::ZERO, true);
        assert!((e.hp - 120.0 * ELITE_HP_FACTOR).abs() < 1e-3);
        assert_eq!(e.hp, e.hp_max);
    }

    #[test]
    fn test_reset_returns_to_title() {
        let mut state = GameState::new(3);
        state.start();
        state.score = 500.0;
        state.player.hp = 10.0;
        state.reset();
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.player.hp, PLAYER_HP);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_gain_sp_clamped() {
        let mut p = Player::default();
        p.gain_sp(250.0);
        assert_eq!(p.sp, p.sp_max);
        p.gain_sp(-500.0);
        assert_eq!(p.sp, 0.0);
    }
}
