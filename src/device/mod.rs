//! Virtual and Physical Input Devices
//!
//! The uinput/evdev edge of the daemon:
//!
//! - [`mouse`] - the virtual pointer the translator drives, a
//!   [`MotionSink`](crate::input::MotionSink) over a uinput device.
//! - [`keyboard`] - source keyboard discovery, grabbing, and the forwarding
//!   virtual keyboard that replays non-consumed events.
//!
//! Everything here is fallible plumbing; the translation logic itself lives
//! in [`crate::input`] and never touches a device directly.

pub mod keyboard;
pub mod mouse;

pub use keyboard::{discover_keyboards, ForwardingKeyboard};
pub use mouse::VirtualMouse;
