//! Direction Deltas
//!
//! The per-direction delta table. Screen coordinates grow rightwards and
//! downwards, so "up" is a negative Y delta. Kept separate from the key
//! bindings in [`crate::input::keymap`] so both tables test independently.

use crate::input::keymap::LogicalInput;

/// Relative pointer motion for one input at magnitude `m`.
///
/// Buttons never move the pointer.
pub fn motion_delta(input: LogicalInput, m: i32) -> (i32, i32) {
    match input {
        LogicalInput::UpLeft => (-m, -m),
        LogicalInput::Up => (0, -m),
        LogicalInput::UpRight => (m, -m),
        LogicalInput::Left => (-m, 0),
        LogicalInput::Right => (m, 0),
        LogicalInput::DownLeft => (-m, m),
        LogicalInput::Down => (0, m),
        LogicalInput::DownRight => (m, m),
        LogicalInput::Button1 | LogicalInput::Button2 => (0, 0),
    }
}
