//! Configuration handed to the entry points by the hosting page.

use serde::Deserialize;
use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown log level: {0}")]
    LogLevel(String),
    #[error("image size must be positive, got {width}x{height}")]
    ImageSize { width: f64, height: f64 },
}

/// Settings for the prefix tree page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Path prefix the application is mounted under. Empty means root-relative.
    pub base_path: String,
    /// Id of the element the tree is rendered into.
    pub container_id: String,
    pub log_level: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            container_id: "prefix-tree".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl TreeConfig {
    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            base_path: normalize_base(base_path.into()),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.base_path = normalize_base(config.base_path);
        Ok(config)
    }

    pub fn max_level(&self) -> Result<Level, ConfigError> {
        parse_level(&self.log_level)
    }
}

/// Settings for the hover overlay on the map page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverlayConfig {
    pub data_url: String,
    pub image_width: f64,
    pub image_height: f64,
    /// Id of the element laid over the image; regions and tooltip render into it.
    #[serde(default = "default_overlay_id")]
    pub overlay_id: String,
    /// Distance in pixels between the cursor and the tooltip corner.
    #[serde(default = "default_tooltip_offset")]
    pub tooltip_offset: f64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl OverlayConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(config.image_width) || !valid(config.image_height) {
            return Err(ConfigError::ImageSize {
                width: config.image_width,
                height: config.image_height,
            });
        }
        Ok(config)
    }

    pub fn max_level(&self) -> Result<Level, ConfigError> {
        parse_level(&self.log_level)
    }
}

fn default_overlay_id() -> String {
    "overlay".to_string()
}

fn default_tooltip_offset() -> f64 {
    10.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn normalize_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

fn parse_level(level: &str) -> Result<Level, ConfigError> {
    level
        .parse::<Level>()
        .map_err(|_| ConfigError::LogLevel(level.to_string()))
}
