//! Kill-streak combo and letter rank

use serde::{Deserialize, Serialize};

/// Seconds a streak survives without a kill
pub const COMBO_WINDOW: f32 = 2.5;

/// Letter grade shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    C,
    B,
    A,
    S,
}

impl Rank {
    pub fn from_combo(count: u32) -> Self {
        match count {
            20.. => Rank::S,
            12.. => Rank::A,
            5.. => Rank::B,
            _ => Rank::C,
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
        }
    }

    /// Score multiplier applied to kill bounties
    pub fn multiplier(&self) -> f32 {
        match self {
            Rank::C => 1.0,
            Rank::B => 1.25,
            Rank::A => 1.5,
            Rank::S => 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Combo {
    /// Current streak length
    pub count: u32,
    /// Time left before the streak drops
    pub timer: f32,
    /// Longest streak this run
    pub best: u32,
}

impl Combo {
    /// Count a kill; returns the new streak length
    pub fn register_kill(&mut self) -> u32 {
        self.count += 1;
        self.timer = COMBO_WINDOW;
        self.best = self.best.max(self.count);
        self.count
    }

    pub fn tick(&mut self, dt: f32) {
        if self.count == 0 {
            return;
        }
        self.timer -= dt;
        if self.timer <= 0.0 {
            log::debug!("Combo of {} expired", self.count);
            self.break_streak();
        }
    }

    /// Drop the streak (player got hit)
    pub fn break_streak(&mut self) {
        self.count = 0;
        self.timer = 0.0;
    }

    pub fn rank(&self) -> Rank {
        Rank::from_combo(self.count)
    }
}
