// SPDX-License-Identifier: GPL-3.0-only

use crate::app_settings;
use crate::geometry::{GeometryLimits, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Runtime-tunable panel configuration.
///
/// Every field falls back to the matching [`app_settings`] constant when it is
/// missing from the JSON source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Persistence key for the panel's geometry record.
    pub window_id: String,
    pub min_size: Size,
    pub max_size: Size,
    /// Size used when no persisted geometry is available.
    pub default_size: Size,
    /// Horizontal strip of the panel that must remain on-screen.
    pub min_visible_width: i32,
    pub header_height: i32,
    pub snap_threshold: i32,
    pub maximize_inset: i32,
    /// Window for detecting a double activation of the header.
    pub double_activation_ms: u64,
    pub anchor_margin_right: i32,
    pub anchor_margin_bottom: i32,
    /// Viewports narrower than this switch to the full-screen mobile layout.
    pub mobile_breakpoint: i32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            window_id: app_settings::PANEL_ID.to_string(),
            min_size: Size::new(app_settings::MIN_WIDTH, app_settings::MIN_HEIGHT),
            max_size: Size::new(app_settings::MAX_WIDTH, app_settings::MAX_HEIGHT),
            default_size: Size::new(app_settings::DEFAULT_WIDTH, app_settings::DEFAULT_HEIGHT),
            min_visible_width: app_settings::MIN_VISIBLE_WIDTH,
            header_height: app_settings::HEADER_HEIGHT,
            snap_threshold: app_settings::SNAP_THRESHOLD,
            maximize_inset: app_settings::MAXIMIZE_INSET,
            double_activation_ms: app_settings::DOUBLE_ACTIVATION_MS,
            anchor_margin_right: app_settings::ANCHOR_MARGIN_RIGHT,
            anchor_margin_bottom: app_settings::ANCHOR_MARGIN_BOTTOM,
            mobile_breakpoint: app_settings::MOBILE_BREAKPOINT,
        }
    }
}

impl PanelConfig {
    /// Parse and validate a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PanelConfig = serde_json::from_str(json).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)
            .and_then(|json| Self::from_json_str(&json));

        match loaded {
            Ok(config) => {
                tracing::debug!("Loaded panel config from {}", path.display());
                config
            }
            Err(err) => {
                tracing::warn!(
                    "Using default panel config, {} could not be used: {}",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Check the cross-field constraints the geometry engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_id.trim().is_empty() {
            return Err(ConfigError::Invalid("window_id must not be empty".into()));
        }
        if self.min_size.width <= 0 || self.min_size.height <= 0 {
            return Err(ConfigError::Invalid("min_size must be positive".into()));
        }
        for (name, lo, mid, hi) in [
            (
                "width",
                self.min_size.width,
                self.default_size.width,
                self.max_size.width,
            ),
            (
                "height",
                self.min_size.height,
                self.default_size.height,
                self.max_size.height,
            ),
        ] {
            if !(lo <= mid && mid <= hi) {
                return Err(ConfigError::Invalid(format!(
                    "{name}: expected min <= default <= max, got {lo} / {mid} / {hi}"
                )));
            }
        }
        if self.min_visible_width <= 0 || self.min_visible_width > self.min_size.width {
            return Err(ConfigError::Invalid(
                "min_visible_width must be in (0, min_size.width]".into(),
            ));
        }
        if self.header_height <= 0 || self.header_height > self.min_size.height {
            return Err(ConfigError::Invalid(
                "header_height must be in (0, min_size.height]".into(),
            ));
        }
        for (name, value) in [
            ("snap_threshold", self.snap_threshold),
            ("maximize_inset", self.maximize_inset),
            ("anchor_margin_right", self.anchor_margin_right),
            ("anchor_margin_bottom", self.anchor_margin_bottom),
        ] {
            if !(0..=app_settings::MAX_MARGIN).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in [0, {}], got {value}",
                    app_settings::MAX_MARGIN
                )));
            }
        }
        Ok(())
    }

    /// Size and visibility bounds for the geometry functions.
    #[must_use]
    pub fn limits(&self) -> GeometryLimits {
        GeometryLimits {
            min_size: self.min_size,
            max_size: self.max_size,
            min_visible_width: self.min_visible_width,
            header_height: self.header_height,
        }
    }

    #[must_use]
    pub fn double_activation_window(&self) -> Duration {
        Duration::from_millis(self.double_activation_ms)
    }
}

/// Errors raised while loading a [`PanelConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io(std::io::Error),
    /// The configuration is not valid JSON or has mistyped fields.
    Json(serde_json::Error),
    /// The values parsed but violate a constraint.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config I/O error: {}", err),
            ConfigError::Json(err) => write!(f, "config JSON error: {}", err),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Json(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}
