//! Simulation module
//!
//! All gameplay logic lives here. No rendering or platform dependencies:
//! - Fixed timestep ticks driven by `FrameClock`
//! - Seeded RNG only
//! - Events out, input in

pub mod ai;
pub mod camera;
pub mod collision;
pub mod combat;
pub mod combo;
pub mod juice;
pub mod particles;
pub mod state;
pub mod tick;

pub use camera::Camera;
pub use collision::{Contact, circle_overlap, in_cone, within_radius};
pub use combat::DamageOutcome;
pub use combo::{Combo, Rank};
pub use juice::Juice;
pub use state::{
    AfterImage, Enemy, EnemyKind, EnemyStats, GameEvent, GamePhase, GameState, Particle, Player,
};
pub use tick::{FrameClock, TickInput, tick};
