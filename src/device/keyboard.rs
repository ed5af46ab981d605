//! Keyboard Capture
//!
//! Finds the source keyboards and prepares them for the daemon's event
//! loop. Grabbing a source (EVIOCGRAB) makes the daemon its only consumer,
//! which is what lets managed keys be blocked; everything the translator
//! does not swallow is then replayed through the [`ForwardingKeyboard`], a
//! uinput device whose key capabilities are the union of all grabbed
//! sources.
//!
//! Dropping a grabbed [`Device`] releases the grab, so shutdown needs no
//! explicit ungrab beyond letting the devices go out of scope.

use std::path::{Path, PathBuf};

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, Device, InputEvent, Key};
use tracing::{debug, info, warn};

use crate::input::error::{InputError, Result};

/// Name the forwarding keyboard registers under.
pub const KEYBOARD_NAME: &str = "vmoused virtual keyboard";

/// Heuristic keyboard check: the main letter block is present and the
/// device is not a pointer. Filters out mice, headset buttons, lid
/// switches, and a leftover forwarding keyboard from a previous run.
fn looks_like_keyboard(dev: &Device) -> bool {
    if dev.name() == Some(KEYBOARD_NAME) {
        return false;
    }
    let Some(keys) = dev.supported_keys() else {
        return false;
    };
    keys.contains(Key::KEY_A) && keys.contains(Key::KEY_ENTER) && !keys.contains(Key::BTN_LEFT)
}

/// Open the source keyboards.
///
/// With explicit `paths` each one is opened as-is (no heuristics, so even
/// unusual devices can be used). With no paths every device under
/// /dev/input that looks like a keyboard is taken.
pub fn discover_keyboards(paths: &[PathBuf]) -> Result<Vec<(PathBuf, Device)>> {
    if !paths.is_empty() {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let dev = Device::open(path).map_err(|source| InputError::DeviceOpen {
                path: path.clone(),
                source,
            })?;
            info!(
                "opened {} ({})",
                path.display(),
                dev.name().unwrap_or("unknown")
            );
            sources.push((path.clone(), dev));
        }
        return Ok(sources);
    }

    let mut sources = Vec::new();
    for (path, dev) in evdev::enumerate() {
        if looks_like_keyboard(&dev) {
            info!(
                "found keyboard: {} ({})",
                path.display(),
                dev.name().unwrap_or("unknown")
            );
            sources.push((path, dev));
        } else {
            debug!(
                "skipping {} ({}): not a keyboard",
                path.display(),
                dev.name().unwrap_or("unknown")
            );
        }
    }

    if sources.is_empty() {
        return Err(InputError::NoKeyboardFound);
    }
    Ok(sources)
}

/// One row of `--list-devices` output.
#[derive(Debug)]
pub struct DeviceSummary {
    /// Device node path
    pub path: PathBuf,
    /// Kernel-reported device name
    pub name: String,
    /// Whether autodetection would pick this device
    pub keyboard: bool,
}

/// Enumerate every input device for `--list-devices`.
pub fn list_devices() -> Vec<DeviceSummary> {
    let mut devices: Vec<DeviceSummary> = evdev::enumerate()
        .map(|(path, dev)| DeviceSummary {
            keyboard: looks_like_keyboard(&dev),
            name: dev.name().unwrap_or("unknown").to_string(),
            path,
        })
        .collect();
    devices.sort_by(|a, b| a.path.cmp(&b.path));
    devices
}

/// Grab a source device so its events stop reaching other consumers.
pub fn grab(path: &Path, dev: &mut Device) -> Result<()> {
    dev.grab().map_err(|source| InputError::DeviceGrab {
        path: path.to_path_buf(),
        source,
    })?;
    info!("grabbed {}", path.display());
    Ok(())
}

/// Virtual keyboard that replays non-consumed events from grabbed sources.
pub struct ForwardingKeyboard {
    device: VirtualDevice,
}

impl ForwardingKeyboard {
    /// Create the forwarding device with the union of the sources' keys.
    pub fn new(sources: &[(PathBuf, Device)]) -> Result<Self> {
        let mut all_keys: AttributeSet<Key> = AttributeSet::new();
        for (_, dev) in sources {
            if let Some(src_keys) = dev.supported_keys() {
                for key in src_keys.iter() {
                    all_keys.insert(key);
                }
            }
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(InputError::VirtualDevice)?
            .name(KEYBOARD_NAME)
            .with_keys(&all_keys)
            .map_err(InputError::VirtualDevice)?
            .build()
            .map_err(InputError::VirtualDevice)?;

        debug!("created uinput keyboard '{}'", KEYBOARD_NAME);

        Ok(Self { device })
    }

    /// Replay one frame of source events.
    ///
    /// The slice must not include the source's SYN_REPORT; `emit` closes
    /// the frame itself.
    pub fn forward(&mut self, events: &[InputEvent]) {
        if events.is_empty() {
            return;
        }
        if let Err(e) = self.device.emit(events) {
            warn!("keyboard forward failed: {e}");
        }
    }
}
