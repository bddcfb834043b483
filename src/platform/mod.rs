//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard codes, on-screen joystick)
//! - Storage (LocalStorage on web)

pub mod input;
pub mod storage;

pub use input::{Action, InputState, action_for_code};
pub use storage::StorageError;
