use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use usbiss_core::{AdapterConfig, I2cMode};

/// User defaults persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub port: String,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub mode: I2cMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: String::new(),
            read_timeout_ms: 32,
            write_timeout_ms: 32,
            mode: I2cMode::default(),
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("usbiss").join("settings.json"))
    }

    /// Load settings from `path`, falling back to defaults when the file
    /// does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }

    pub fn adapter_config(&self) -> Result<AdapterConfig> {
        if self.port.is_empty() {
            bail!("no port configured; pass --port or store one with `usbiss --port <PORT> save`");
        }
        Ok(AdapterConfig {
            port_name: self.port.clone(),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            write_timeout: Duration::from_millis(self.write_timeout_ms),
            mode: self.mode,
            ..Default::default()
        })
    }
}
