//! Utility Functions and Diagnostics
//!
//! Startup environment checks and user-friendly error formatting. The
//! diagnostics answer the two questions that cover almost every support
//! report: can we read the keyboards, and can we create uinput devices?

use std::fmt::Write;
use std::path::Path;

use nix::unistd::Uid;
use tracing::{info, warn};

/// Log the runtime environment at startup.
pub fn log_startup_diagnostics() {
    let uid = Uid::effective();
    info!("=== Environment ===");
    info!("  euid: {}{}", uid, if uid.is_root() { " (root)" } else { "" });
    info!(
        "  session: {}",
        std::env::var("XDG_SESSION_TYPE").unwrap_or_else(|_| "unknown".to_string())
    );

    let uinput = Path::new("/dev/uinput");
    if !uinput.exists() {
        warn!("  /dev/uinput missing - load the uinput module (modprobe uinput)");
    } else {
        info!("  /dev/uinput: present");
    }

    match std::fs::read_dir("/dev/input") {
        Ok(entries) => {
            let nodes = entries
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().starts_with("event"))
                .count();
            info!("  /dev/input: {} event node(s)", nodes);
        }
        Err(e) => warn!("  /dev/input not readable: {}", e),
    }
}

/// Format error for user consumption
///
/// Takes a technical error and produces a message with troubleshooting
/// steps for the common failure classes (device permissions, uinput).
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    let error_msg = format!("{error:#}");

    if error_msg.contains("uinput") {
        format_uinput_error(&mut output);
    } else if error_msg.contains("keyboard") || error_msg.contains("input device") {
        format_device_error(&mut output);
    } else if error_msg.contains("config") || error_msg.contains("keymap") {
        format_config_error(&mut output);
    } else {
        writeln!(&mut output, "The daemon could not start.").ok();
    }

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "Run with -vv for detailed logs: vmoused -vv"
    )
    .ok();

    output
}

fn format_uinput_error(output: &mut String) {
    writeln!(output, "Virtual Device Creation Error").ok();
    writeln!(output).ok();
    writeln!(output, "Could not create a uinput virtual device.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. The uinput module is not loaded").ok();
    writeln!(output, "     → Run: sudo modprobe uinput").ok();
    writeln!(output, "     → Persist: echo uinput | sudo tee /etc/modules-load.d/uinput.conf").ok();
    writeln!(output).ok();
    writeln!(output, "  2. No write access to /dev/uinput").ok();
    writeln!(output, "     → Run as root, or add a udev rule granting your group access").ok();
}

fn format_device_error(output: &mut String) {
    writeln!(output, "Keyboard Access Error").ok();
    writeln!(output).ok();
    writeln!(output, "Could not open or grab a source keyboard.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. No read access to /dev/input/event*").ok();
    writeln!(output, "     → Add your user to the 'input' group: sudo usermod -aG input $USER").ok();
    writeln!(output, "     → Log out and back in for the group change to apply").ok();
    writeln!(output).ok();
    writeln!(output, "  2. No keyboard was detected").ok();
    writeln!(output, "     → List candidates: vmoused --list-devices").ok();
    writeln!(output, "     → Name one explicitly: vmoused --device /dev/input/event3").ok();
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "The configuration file could not be used.").ok();
    writeln!(output).ok();
    writeln!(output, "  → Check the TOML syntax and key codes in the [keymap] table").ok();
    writeln!(output, "  → Every binding must use a distinct evdev key code").ok();
}
