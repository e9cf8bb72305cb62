use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for the Gemini calls and the compositor.
///
/// The API key is deliberately absent: credentials are supplied per call
/// and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    pub base_url: String,
    pub metrics_model: String,
    pub transfer_model: String,
    pub request_timeout_secs: u64,
    pub blend_timeout_secs: u64,
    pub jpeg_quality: u8,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            metrics_model: "gemini-3-flash-preview".to_string(),
            transfer_model: "gemini-3-pro-image-preview".to_string(),
            request_timeout_secs: 120,
            blend_timeout_secs: 30,
            jpeg_quality: 90,
        }
    }
}

impl LookConfig {
    /// Load `~/.looklab/config.toml`, writing the defaults on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let looklab_dir = home.join(".looklab");
        let config_path = looklab_dir.join("config.toml");

        if !looklab_dir.exists() {
            fs::create_dir_all(&looklab_dir).context("Failed to create .looklab directory")?;
        }

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&contents).context("Failed to parse config file")
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    /// Environment overrides, applied by the CLI after loading.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("LOOKLAB_BASE_URL")
            && !url.is_empty()
        {
            self.base_url = url;
        }

        if let Ok(model) = std::env::var("LOOKLAB_METRICS_MODEL")
            && !model.is_empty()
        {
            self.metrics_model = model;
        }

        if let Ok(model) = std::env::var("LOOKLAB_TRANSFER_MODEL")
            && !model.is_empty()
        {
            self.transfer_model = model;
        }

        if let Ok(secs) = std::env::var("LOOKLAB_REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
        {
            self.request_timeout_secs = secs;
        }

        if let Ok(secs) = std::env::var("LOOKLAB_BLEND_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
        {
            self.blend_timeout_secs = secs;
        }
    }
}
