//! Virtual Pointer Device
//!
//! uinput-backed [`MotionSink`]. Reports are buffered per frame and written
//! with a single `emit` call on `sync()`; the kernel appends the SYN_REPORT
//! that closes the frame for downstream consumers.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key, RelativeAxisType};
use tracing::{debug, warn};

use crate::input::error::{InputError, Result};
use crate::input::{MotionSink, MouseButton};

/// Name the virtual pointer registers under.
pub const POINTER_NAME: &str = "vmoused virtual pointer";

fn button_key(button: MouseButton) -> Key {
    match button {
        MouseButton::Left => Key::BTN_LEFT,
        MouseButton::Right => Key::BTN_RIGHT,
    }
}

/// The two events that make up one relative motion report.
fn relative_events(dx: i32, dy: i32) -> [InputEvent; 2] {
    [
        InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, dx),
        InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_Y.0, dy),
    ]
}

fn button_event(button: MouseButton, down: bool) -> InputEvent {
    InputEvent::new(EventType::KEY, button_key(button).code(), down as i32)
}

/// The uinput pointer the translator drives.
pub struct VirtualMouse {
    device: VirtualDevice,
    frame: Vec<InputEvent>,
}

impl VirtualMouse {
    /// Create the uinput device.
    ///
    /// Fails when /dev/uinput is missing or not writable.
    pub fn new() -> Result<Self> {
        let device = VirtualDeviceBuilder::new()
            .map_err(InputError::VirtualDevice)?
            .name(POINTER_NAME)
            .with_relative_axes(&AttributeSet::from_iter([
                RelativeAxisType::REL_X,
                RelativeAxisType::REL_Y,
                // convinces libinput it's a mouse
                RelativeAxisType::REL_WHEEL,
            ]))
            .map_err(InputError::VirtualDevice)?
            .with_keys(&AttributeSet::from_iter([Key::BTN_LEFT, Key::BTN_RIGHT]))
            .map_err(InputError::VirtualDevice)?
            .build()
            .map_err(InputError::VirtualDevice)?;

        debug!("created uinput pointer '{}'", POINTER_NAME);

        Ok(Self {
            device,
            frame: Vec::with_capacity(4),
        })
    }
}

impl MotionSink for VirtualMouse {
    fn report_relative(&mut self, dx: i32, dy: i32) {
        self.frame.extend(relative_events(dx, dy));
    }

    fn report_button(&mut self, button: MouseButton, down: bool) {
        self.frame.push(button_event(button, down));
    }

    fn sync(&mut self) {
        if self.frame.is_empty() {
            return;
        }
        // The sink is infallible by contract; a dead uinput node is not
        // worth killing the event loop over.
        if let Err(e) = self.device.emit(&self.frame) {
            warn!("uinput emit failed: {e}");
        }
        self.frame.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_key_mapping() {
        assert_eq!(button_key(MouseButton::Left), Key::BTN_LEFT);
        assert_eq!(button_key(MouseButton::Right), Key::BTN_RIGHT);
    }

    #[test]
    fn test_relative_events_carry_both_axes() {
        let [x, y] = relative_events(7, -3);

        assert_eq!(x.event_type(), EventType::RELATIVE);
        assert_eq!(x.code(), RelativeAxisType::REL_X.0);
        assert_eq!(x.value(), 7);

        assert_eq!(y.event_type(), EventType::RELATIVE);
        assert_eq!(y.code(), RelativeAxisType::REL_Y.0);
        assert_eq!(y.value(), -3);
    }

    #[test]
    fn test_button_event_levels() {
        let down = button_event(MouseButton::Left, true);
        assert_eq!(down.event_type(), EventType::KEY);
        assert_eq!(down.code(), Key::BTN_LEFT.code());
        assert_eq!(down.value(), 1);

        let up = button_event(MouseButton::Right, false);
        assert_eq!(up.code(), Key::BTN_RIGHT.code());
        assert_eq!(up.value(), 0);
    }
}
