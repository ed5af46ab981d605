//! # vmoused
//!
//! Virtual mouse daemon for Linux - drive the pointer from the keyboard.
//!
//! While a designated control key is held, ten managed keys move a uinput
//! virtual mouse: eight compass directions with linear acceleration, plus
//! left/right buttons. Managed keys are swallowed so they never reach other
//! applications; every other key passes through untouched.
//!
//! # Architecture
//!
//! ```text
//! vmoused
//!   ├─> KeyboardCapture (evdev grab, one stream per source keyboard)
//!   ├─> MotionTranslator (armed / latch / acceleration state machine)
//!   ├─> VirtualMouse (uinput pointer, one frame per sync)
//!   └─> ForwardingKeyboard (uinput keyboard for pass-through events)
//! ```
//!
//! # Data Flow
//!
//! **Managed path:** keyboard → capture → translator → virtual pointer
//!
//! **Pass-through path:** keyboard → capture → forwarding keyboard
//!
//! The translator ([`input::MotionTranslator`]) is pure state transformation
//! with no I/O and no failure modes; devices and configuration carry all the
//! fallibility and live at the edges.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Daemon configuration
pub mod config;

/// Daemon orchestration and event loop
pub mod daemon;

/// Physical and virtual input devices
pub mod device;

/// Key-to-pointer translation
pub mod input;

/// Diagnostics and user-facing error formatting
pub mod utils;
