//! Key Binding Tables
//!
//! Maps raw evdev key codes to the logical inputs the translator understands.
//! The concrete code values are deployment configuration, not algorithm: the
//! defaults put the eight directions on the numeric keypad with KP5/KP0 as
//! the buttons and Right Alt as the control key, and every binding can be
//! overridden in the `[keymap]` config table.
//!
//! The scancode table is deliberately separate from the direction-to-delta
//! table in [`crate::input::motion`] so the two can be tested independently.

use crate::config::KeymapConfig;
use crate::input::error::{InputError, Result};

/// Linux evdev key codes used by the default bindings.
///
/// Values match `linux/input-event-codes.h`.
pub mod keys {
    /// Keypad 7 (up-left)
    pub const KEY_KP7: u16 = 71;
    /// Keypad 8 (up)
    pub const KEY_KP8: u16 = 72;
    /// Keypad 9 (up-right)
    pub const KEY_KP9: u16 = 73;
    /// Keypad 4 (left)
    pub const KEY_KP4: u16 = 75;
    /// Keypad 5 (left button)
    pub const KEY_KP5: u16 = 76;
    /// Keypad 6 (right)
    pub const KEY_KP6: u16 = 77;
    /// Keypad 1 (down-left)
    pub const KEY_KP1: u16 = 79;
    /// Keypad 2 (down)
    pub const KEY_KP2: u16 = 80;
    /// Keypad 3 (down-right)
    pub const KEY_KP3: u16 = 81;
    /// Keypad 0 (right button)
    pub const KEY_KP0: u16 = 82;
    /// Right Alt (control key)
    pub const KEY_RIGHTALT: u16 = 100;
}

/// Logical meaning of a managed key.
///
/// Eight compass directions plus the two pointer buttons. Each variant has a
/// fixed index 0-9 used as its bit position in
/// [`InputSet`](crate::input::translator::InputSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalInput {
    /// Diagonal up-left motion
    UpLeft,
    /// Vertical up motion
    Up,
    /// Diagonal up-right motion
    UpRight,
    /// Horizontal left motion
    Left,
    /// Horizontal right motion
    Right,
    /// Diagonal down-left motion
    DownLeft,
    /// Vertical down motion
    Down,
    /// Diagonal down-right motion
    DownRight,
    /// Left pointer button
    Button1,
    /// Right pointer button
    Button2,
}

impl LogicalInput {
    /// Number of logical inputs.
    pub const COUNT: usize = 10;

    /// All logical inputs, in bit-position order.
    pub const ALL: [LogicalInput; Self::COUNT] = [
        LogicalInput::UpLeft,
        LogicalInput::Up,
        LogicalInput::UpRight,
        LogicalInput::Left,
        LogicalInput::Right,
        LogicalInput::DownLeft,
        LogicalInput::Down,
        LogicalInput::DownRight,
        LogicalInput::Button1,
        LogicalInput::Button2,
    ];

    /// Bit position of this input, 0-9.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Buttons latch; directions move the pointer.
    pub fn is_button(self) -> bool {
        matches!(self, LogicalInput::Button1 | LogicalInput::Button2)
    }
}

/// Scancode to logical-input mapping, plus the control key.
///
/// Lookup is a linear scan over ten entries; the table is small enough that
/// this beats a hash map on the hot path and allocates nothing.
#[derive(Debug, Clone)]
pub struct KeyMap {
    control: u16,
    bindings: [(u16, LogicalInput); LogicalInput::COUNT],
}

impl KeyMap {
    /// Build a key map from configuration.
    ///
    /// Fails if any two of the eleven bindings share a key code.
    pub fn from_config(cfg: &KeymapConfig) -> Result<Self> {
        let bindings = [
            (cfg.up_left, LogicalInput::UpLeft),
            (cfg.up, LogicalInput::Up),
            (cfg.up_right, LogicalInput::UpRight),
            (cfg.left, LogicalInput::Left),
            (cfg.right, LogicalInput::Right),
            (cfg.down_left, LogicalInput::DownLeft),
            (cfg.down, LogicalInput::Down),
            (cfg.down_right, LogicalInput::DownRight),
            (cfg.button1, LogicalInput::Button1),
            (cfg.button2, LogicalInput::Button2),
        ];

        let mut codes = [cfg.control; LogicalInput::COUNT + 1];
        for (i, (code, _)) in bindings.iter().enumerate() {
            codes[i + 1] = *code;
        }
        for (i, code) in codes.iter().enumerate() {
            if codes[i + 1..].contains(code) {
                return Err(InputError::DuplicateBinding { code: *code });
            }
        }

        Ok(Self {
            control: cfg.control,
            bindings,
        })
    }

    /// The control key's code.
    pub fn control_code(&self) -> u16 {
        self.control
    }

    /// Logical input bound to `code`, if any.
    pub fn lookup(&self, code: u16) -> Option<LogicalInput> {
        self.bindings
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, input)| *input)
    }

    /// Whether `code` is one of the ten managed keys.
    pub fn is_managed(&self, code: u16) -> bool {
        self.lookup(code).is_some()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        // The default config is collision-free by construction.
        Self::from_config(&KeymapConfig::default()).expect("default bindings are distinct")
    }
}
