use anyhow::{Context, Result};
use raydesk_interaction::InteractionConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/raydesk.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Simulated frame rate used to turn script durations into frames.
    pub frame_rate: f32,
    pub interaction: InteractionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            frame_rate: 90.0,
            interaction: InteractionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(cfg) => cfg.sanitized(),
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    AppConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                AppConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Seconds per simulated frame.
    pub fn frame_time(&self) -> f32 {
        1.0 / self.frame_rate
    }

    fn sanitized(mut self) -> Self {
        if !(self.frame_rate.is_finite() && self.frame_rate >= 1.0) {
            warn!(
                frame_rate = self.frame_rate,
                "Invalid frame_rate; using {}",
                AppConfig::default().frame_rate
            );
            self.frame_rate = AppConfig::default().frame_rate;
        }
        self
    }
}
