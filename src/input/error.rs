//! Input Device Error Types
//!
//! Errors for the edges of the input pipeline: key bindings, device
//! discovery, grabbing, and uinput creation. The translator itself is a
//! total function and has no error type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;

/// Input pipeline error types
#[derive(Error, Debug)]
pub enum InputError {
    /// Two bindings share one key code
    #[error("key code {code} is bound more than once")]
    DuplicateBinding {
        /// The colliding evdev key code
        code: u16,
    },

    /// Device autodetection found nothing usable
    #[error("no readable keyboard device found under /dev/input")]
    NoKeyboardFound,

    /// Opening a source device failed
    #[error("failed to open input device {path}")]
    DeviceOpen {
        /// Device node path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// EVIOCGRAB on a source device failed
    #[error("failed to grab input device {path}")]
    DeviceGrab {
        /// Device node path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Creating a uinput virtual device failed
    #[error("failed to create uinput virtual device")]
    VirtualDevice(#[source] std::io::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_device() {
        let err = InputError::DeviceOpen {
            path: PathBuf::from("/dev/input/event3"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/dev/input/event3"));
    }

    #[test]
    fn test_duplicate_binding_names_the_code() {
        let err = InputError::DuplicateBinding { code: 72 };
        assert!(err.to_string().contains("72"));
    }
}
