//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod types;

pub use types::{DeviceConfig, KeymapConfig, LoggingConfig, MotionConfig};

/// System-wide configuration file location
pub const SYSTEM_CONFIG_PATH: &str = "/etc/vmoused/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source device configuration
    pub device: DeviceConfig,
    /// Pointer motion tuning
    pub motion: MotionConfig,
    /// Key bindings
    pub keymap: KeymapConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the default locations: the user config directory first,
    /// then the system path. Missing files are not an error; the built-in
    /// defaults apply.
    pub fn load_default_locations() -> Result<Self> {
        if let Some(path) = Self::user_config_path() {
            if path.exists() {
                return Self::load(&path);
            }
        }

        let system = Path::new(SYSTEM_CONFIG_PATH);
        if system.exists() {
            return Self::load(system);
        }

        Ok(Config::default())
    }

    /// Per-user configuration file location, if a config directory exists
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vmoused").join("config.toml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.motion.step_base == 0 {
            anyhow::bail!("motion.step_base must be at least 1");
        }
        if self.motion.decay_ms == 0 {
            anyhow::bail!("motion.decay_ms must be at least 1");
        }

        // Bindings must be pairwise distinct; the keymap constructor enforces
        // the same rule, but failing here names the config file as the culprit.
        let km = &self.keymap;
        let codes = [
            km.control,
            km.up_left,
            km.up,
            km.up_right,
            km.left,
            km.right,
            km.down_left,
            km.down,
            km.down_right,
            km.button1,
            km.button2,
        ];
        for (i, code) in codes.iter().enumerate() {
            if codes[i + 1..].contains(code) {
                anyhow::bail!("[keymap] binds key code {} more than once", code);
            }
        }

        // Validate log level
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!("Invalid log level: {}", other),
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, devices: Vec<PathBuf>, no_grab: bool) -> Self {
        if !devices.is_empty() {
            self.device.paths = devices;
        }
        if no_grab {
            self.device.grab = false;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[motion]\nstep_base = 2\n\n[device]\ngrab = false\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.motion.step_base, 2);
        assert_eq!(config.motion.max_accel, 50); // default
        assert!(!config.device.grab);
        assert_eq!(config.keymap.control, 100); // default KEY_RIGHTALT
    }

    #[test]
    fn test_load_rejects_zero_step() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[motion]\nstep_base = 0\n").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_duplicate_binding() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[keymap]\nup = 72\ndown = 72\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("72"));
    }

    #[test]
    fn test_load_rejects_bad_level() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"loud\"\n").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        assert!(Config::load(Path::new("/nonexistent/config.toml")).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_overrides(vec![PathBuf::from("/dev/input/event7")], true);

        assert_eq!(config.device.paths, vec![PathBuf::from("/dev/input/event7")]);
        assert!(!config.device.grab);
    }

    #[test]
    fn test_overrides_keep_config_values_when_unset() {
        let config = Config::default().with_overrides(Vec::new(), false);

        assert!(config.device.paths.is_empty());
        assert!(config.device.grab);
    }

    #[test]
    fn test_round_trip() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.motion.step_base, config.motion.step_base);
        assert_eq!(parsed.keymap.control, config.keymap.control);
        assert_eq!(parsed.device.grab, config.device.grab);
    }
}
