use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "webcam_capture.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub window: WindowConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 1-100, used only for JPEG output
    pub jpeg_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig {
                title: "Advanced Webcam Capture".to_string(),
                width: 800,
                height: 700,
            },
            output: OutputConfig { jpeg_quality: 95 },
        }
    }
}

impl Config {
    /// Settings from `webcam_capture.toml` in the working directory. Never
    /// fails: a missing file means defaults, a broken one is logged and
    /// ignored.
    pub fn load() -> Self {
        Self::load_or_default(CONFIG_FILE)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from_file(path).and_then(|config| config.validate().map(|()| config)) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config file {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = toml::from_str(&contents)
            .with_context(|| "Failed to parse configuration file")?;

        log::info!("Configuration loaded from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(anyhow::anyhow!(
                "Invalid window dimensions: {}x{}",
                self.window.width,
                self.window.height
            ));
        }

        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(anyhow::anyhow!(
                "Invalid JPEG quality: {} (expected 1-100)",
                self.output.jpeg_quality
            ));
        }

        Ok(())
    }
}
