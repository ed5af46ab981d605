//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::input::keymap::keys;

/// Source device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Explicit keyboard device nodes (e.g. "/dev/input/event3");
    /// empty means autodetect every keyboard
    pub paths: Vec<PathBuf>,

    /// Grab the source keyboards so managed keys can be blocked.
    /// With grabbing off the daemon only injects pointer events and the
    /// managed keys also reach their normal consumers.
    pub grab: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            grab: true,
        }
    }
}

/// Pointer motion tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Base step in pixels per motion event
    pub step_base: u32,

    /// Acceleration ceiling added on top of the base step
    pub max_accel: u32,

    /// Inactivity window after which acceleration resets, in milliseconds
    pub decay_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            step_base: 5,
            max_accel: 50,
            decay_ms: 1000,
        }
    }
}

/// Key bindings, as evdev key codes (see linux/input-event-codes.h)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct KeymapConfig {
    /// Control key; translation is active while it is held
    pub control: u16,
    /// Up-left diagonal
    pub up_left: u16,
    /// Up
    pub up: u16,
    /// Up-right diagonal
    pub up_right: u16,
    /// Left
    pub left: u16,
    /// Right
    pub right: u16,
    /// Down-left diagonal
    pub down_left: u16,
    /// Down
    pub down: u16,
    /// Down-right diagonal
    pub down_right: u16,
    /// Left mouse button
    pub button1: u16,
    /// Right mouse button
    pub button2: u16,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            control: keys::KEY_RIGHTALT,
            up_left: keys::KEY_KP7,
            up: keys::KEY_KP8,
            up_right: keys::KEY_KP9,
            left: keys::KEY_KP4,
            right: keys::KEY_KP6,
            down_left: keys::KEY_KP1,
            down: keys::KEY_KP2,
            down_right: keys::KEY_KP3,
            button1: keys::KEY_KP5,
            button2: keys::KEY_KP0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
