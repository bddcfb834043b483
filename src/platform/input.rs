//! Keyboard, joystick and button state
//!
//! Browser event handlers write into `InputState`; once per frame it is
//! turned into a `TickInput`.

use glam::Vec2;

use crate::sim::TickInput;

/// Joystick travel (CSS pixels) for full deflection
pub const STICK_MAX: f32 = 52.0;
/// Knob travel as a percentage of its own size at full deflection
pub const KNOB_TRAVEL_PERCENT: f32 = 42.0;

/// Logical game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Slash,
    Guard,
    Dash,
    Special,
    Start,
    Reset,
    Pause,
}

impl Action {
    /// Keys whose default browser behaviour (scrolling) we suppress
    pub fn prevents_default(&self) -> bool {
        !matches!(self, Action::Start | Action::Reset | Action::Pause)
    }
}

/// Map a `KeyboardEvent.code` to an action
pub fn action_for_code(code: &str) -> Option<Action> {
    match code {
        "ArrowUp" | "KeyW" => Some(Action::Up),
        "ArrowDown" | "KeyS" => Some(Action::Down),
        "ArrowLeft" | "KeyA" => Some(Action::Left),
        "ArrowRight" | "KeyD" => Some(Action::Right),
        "KeyJ" => Some(Action::Slash),
        "KeyK" => Some(Action::Guard),
        "KeyL" => Some(Action::Dash),
        "KeyI" => Some(Action::Special),
        "Enter" => Some(Action::Start),
        "KeyR" => Some(Action::Reset),
        "Escape" | "KeyP" => Some(Action::Pause),
        _ => None,
    }
}

/// Convert a pointer offset from the stick center into a stick vector
///
/// Direction is normalized and magnitude grows linearly to 1 at `max`.
pub fn stick_vector(dx: f32, dy: f32, max: f32) -> Vec2 {
    let offset = Vec2::new(dx, dy);
    let mag = offset.length();
    if mag < 1e-6 || max <= 0.0 {
        return Vec2::ZERO;
    }
    let amount = (mag / max).clamp(0.0, 1.0);
    offset / mag * amount
}

/// Accumulated input between frames
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub guard: bool,
    /// Latched presses, cleared after the frame consumes them
    pub slash_pressed: bool,
    pub dash_pressed: bool,
    pub special_pressed: bool,
    pub start_pressed: bool,
    pub reset_pressed: bool,
    pub pause_pressed: bool,
    /// On-screen joystick
    pub stick_active: bool,
    pub stick_pointer: Option<i32>,
    pub stick_center: Vec2,
    pub stick: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key or button went down
    pub fn press(&mut self, action: Action) {
        match action {
            Action::Up => self.up = true,
            Action::Down => self.down = true,
            Action::Left => self.left = true,
            Action::Right => self.right = true,
            Action::Guard => self.guard = true,
            Action::Slash => self.slash_pressed = true,
            Action::Dash => self.dash_pressed = true,
            Action::Special => self.special_pressed = true,
            Action::Start => self.start_pressed = true,
            Action::Reset => self.reset_pressed = true,
            Action::Pause => self.pause_pressed = true,
        }
    }

    /// Key or button went up (one-shots stay latched until consumed)
    pub fn release(&mut self, action: Action) {
        match action {
            Action::Up => self.up = false,
            Action::Down => self.down = false,
            Action::Left => self.left = false,
            Action::Right => self.right = false,
            Action::Guard => self.guard = false,
            _ => {}
        }
    }

    /// Grab the joystick with a pointer
    pub fn stick_begin(&mut self, pointer_id: i32, center: Vec2) {
        self.stick_active = true;
        self.stick_pointer = Some(pointer_id);
        self.stick_center = center;
    }

    /// Pointer moved; ignored unless it is the pointer holding the stick
    pub fn stick_move(&mut self, pointer_id: i32, client: Vec2) -> bool {
        if !self.stick_active || self.stick_pointer != Some(pointer_id) {
            return false;
        }
        let d = client - self.stick_center;
        self.stick = stick_vector(d.x, d.y, STICK_MAX);
        true
    }

    pub fn stick_end(&mut self) {
        self.stick_active = false;
        self.stick_pointer = None;
        self.stick = Vec2::ZERO;
    }

    /// Combined keyboard + stick movement
    pub fn move_dir(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        dir + self.stick
    }

    pub fn to_tick_input(&self) -> TickInput {
        TickInput {
            move_dir: self.move_dir(),
            guard: self.guard,
            slash: self.slash_pressed,
            dash: self.dash_pressed,
            special: self.special_pressed,
            start: self.start_pressed,
            reset: self.reset_pressed,
            pause: self.pause_pressed,
        }
    }

    pub fn clear_one_shots(&mut self) {
        self.slash_pressed = false;
        self.dash_pressed = false;
        self.special_pressed = false;
        self.start_pressed = false;
        self.reset_pressed = false;
        self.pause_pressed = false;
    }

    /// Drop everything held (window lost focus)
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    /// CSS transform for the joystick knob
    pub fn knob_transform(&self) -> String {
        format!(
            "translate({}%, {}%)",
            -50.0 + self.stick.x * KNOB_TRAVEL_PERCENT,
            -50.0 + self.stick.y * KNOB_TRAVEL_PERCENT
        )
    }
}
