//! Key-to-Pointer Translation
//!
//! Turns keyboard key events into virtual pointer events. The translation is
//! active only while a designated control key is held; during that window
//! ten managed keys (eight compass directions, two buttons) are intercepted
//! and everything else passes through.
//!
//! # Architecture
//!
//! ```text
//! key event (code, pressed)
//!       ↓
//! ┌──────────────────┐     ┌──────────────┐
//! │ MotionTranslator │ ──> │  MotionSink  │ → relative motion
//! │  - armed flag    │     │  (trait)     │ → button state
//! │  - press latch   │     └──────────────┘ → sync frames
//! │  - acceleration  │
//! └──────────────────┘
//!       ↓
//! consumed verdict (suppress the key or let it through)
//! ```
//!
//! [`KeyMap`] maps raw scancodes to [`LogicalInput`]s; the delta table in
//! [`motion`] maps logical directions to screen deltas. The two tables are
//! independent on purpose so each can be tested (and re-bound) on its own.
//!
//! The translator performs no I/O and cannot fail; device-level errors live
//! in [`error`] and are produced by the [`crate::device`] layer.

pub mod error;
pub mod keymap;
pub mod motion;
pub mod translator;

pub use error::{InputError, Result};
pub use keymap::{KeyMap, LogicalInput};
pub use motion::motion_delta;
pub use translator::{Clock, InputSet, MonotonicClock, MotionSink, MotionTranslator, MouseButton};
