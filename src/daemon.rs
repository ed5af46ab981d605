//! Daemon Orchestration
//!
//! Wires configuration, devices, and the translator together and owns the
//! shutdown sequence.
//!
//! # Architecture
//!
//! ```text
//! /dev/input/eventN ──┐
//! /dev/input/eventM ──┼─> pump task per device ──> Router
//!                     │        (tokio)              │
//!                     │                             ├─ MotionTranslator ─> VirtualMouse
//!                     │                             └─ ForwardingKeyboard (pass-through)
//!                     └─ SIGINT/SIGTERM ──> abort pumps, drop devices (ungrabs)
//! ```
//!
//! The translator keeps its single-writer contract even with several source
//! keyboards: every capture task routes through one [`Router`], whose mutex
//! is held for the duration of each `handle` call.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use evdev::{Device, InputEvent, InputEventKind};
use parking_lot::Mutex;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::Config;
use crate::device::keyboard::{self, discover_keyboards, ForwardingKeyboard};
use crate::device::mouse::VirtualMouse;
use crate::input::{KeyMap, MotionTranslator};

/// State shared by every capture task.
struct Router {
    translator: Mutex<MotionTranslator>,
    mouse: Mutex<VirtualMouse>,
    /// Present only when the sources are grabbed.
    forwarder: Option<Mutex<ForwardingKeyboard>>,
}

impl Router {
    /// Run one key event through the translator.
    ///
    /// Returns `true` when the original event must be suppressed. Both locks
    /// are held across the call, which serializes event delivery from all
    /// devices into the translator.
    fn handle_key(&self, code: u16, pressed: bool) -> bool {
        let mut translator = self.translator.lock();
        let mut mouse = self.mouse.lock();
        translator.handle(code, pressed, &mut *mouse)
    }

    fn forward_frame(&self, events: &[InputEvent]) {
        if let Some(forwarder) = &self.forwarder {
            forwarder.lock().forward(events);
        }
    }
}

/// Read one source device until it disappears.
///
/// Non-consumed events accumulate per frame and are replayed on the
/// source's SYN_REPORT so pass-through frames stay atomic. Non-key events
/// (MSC_SCAN, LED, ...) travel with their frame untouched.
async fn pump_device(
    path: PathBuf,
    device: Device,
    grabbed: bool,
    router: Arc<Router>,
) -> Result<()> {
    let mut stream = device
        .into_event_stream()
        .with_context(|| format!("watching {}", path.display()))?;
    let mut frame: Vec<InputEvent> = Vec::new();

    loop {
        let event = stream
            .next_event()
            .await
            .with_context(|| format!("reading {}", path.display()))?;

        match event.kind() {
            InputEventKind::Key(key) => {
                // Auto-repeat (value 2) counts as a press.
                let pressed = event.value() != 0;
                let consumed = router.handle_key(key.code(), pressed);
                if !consumed && grabbed {
                    frame.push(event);
                }
            }
            InputEventKind::Synchronization(_) => {
                if grabbed {
                    router.forward_frame(&frame);
                }
                frame.clear();
            }
            _ => {
                if grabbed {
                    frame.push(event);
                }
            }
        }
    }
}

/// The vmoused daemon.
pub struct Daemon {
    config: Config,
}

impl Daemon {
    /// Create a daemon from validated configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run until SIGINT/SIGTERM or until every source keyboard is gone.
    pub async fn run(self) -> Result<()> {
        let keymap =
            KeyMap::from_config(&self.config.keymap).context("invalid [keymap] configuration")?;

        let mouse = VirtualMouse::new()
            .context("creating the virtual pointer (is the uinput module loaded?)")?;

        let mut sources =
            discover_keyboards(&self.config.device.paths).context("locating source keyboards")?;

        let grabbed = self.config.device.grab;
        let forwarder = if grabbed {
            // Build the forwarder before grabbing: a uinput failure here
            // must not leave any keyboard grabbed with nowhere to forward.
            let fwd =
                ForwardingKeyboard::new(&sources).context("creating the forwarding keyboard")?;
            for (path, dev) in &mut sources {
                keyboard::grab(path, dev)?;
            }
            Some(Mutex::new(fwd))
        } else {
            info!("grabbing disabled: managed keys will also reach other consumers");
            None
        };

        let router = Arc::new(Router {
            translator: Mutex::new(MotionTranslator::new(keymap, self.config.motion)),
            mouse: Mutex::new(mouse),
            forwarder,
        });

        let mut pumps = JoinSet::new();
        for (path, device) in sources {
            pumps.spawn(pump_device(path, device, grabbed, Arc::clone(&router)));
        }

        info!("translating events from {} device(s)", pumps.len());

        let mut sigterm = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("SIGINT received, shutting down");
                    break;
                }
                _ = sigterm.recv() => {
                    info!("SIGTERM received, shutting down");
                    break;
                }
                joined = pumps.join_next() => {
                    match joined {
                        // A dead source (unplugged keyboard) is survivable
                        // while others remain.
                        Some(Ok(Err(e))) => warn!("capture task ended: {e:#}"),
                        Some(Err(e)) if e.is_panic() => warn!("capture task panicked: {e}"),
                        Some(_) => {}
                        None => anyhow::bail!("all source keyboards disappeared"),
                    }
                }
            }
        }

        // Aborting the pumps drops the devices, which releases the grabs.
        pumps.shutdown().await;
        info!("shutdown complete");
        Ok(())
    }
}
