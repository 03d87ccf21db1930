//! Viewer configuration loading.
//!
//! Configuration is stored as RON. Every field is optional in the file;
//! missing fields take their defaults, and command-line flags are applied on
//! top by the binary.
//!
//! ```ron
//! (
//!     tick_period_ms: 250,
//!     width: 100,
//!     height: 30,
//!     use_color: false,
//! )
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ascii_renderer::AsciiConfig;

/// Shortest allowed tick period.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(50);

/// Longest allowed tick period.
pub const MAX_TICK_PERIOD: Duration = Duration::from_millis(5000);

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Values parsed but make no sense together.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Complete viewer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Milliseconds between automatic steps.
    pub tick_period_ms: u64,
    /// Map viewport columns.
    pub width: usize,
    /// Map viewport rows.
    pub height: usize,
    /// Use ANSI colors.
    pub use_color: bool,
    /// Clear the terminal before every frame.
    pub clear_screen: bool,
    /// Show the legend under the map.
    pub show_legend: bool,
    /// Open paused on the first turn instead of playing.
    pub start_paused: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 500,
            width: 80,
            height: 24,
            use_color: true,
            clear_screen: true,
            show_legend: true,
            start_paused: false,
        }
    }
}

impl ViewerConfig {
    /// Load a configuration from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = ron::from_str(ron)?;
        Ok(config)
    }

    /// Check that values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let period = self.tick_period();
        if period < MIN_TICK_PERIOD || period > MAX_TICK_PERIOD {
            return Err(ConfigError::Invalid(format!(
                "tick_period_ms must be between {} and {}, got {}",
                MIN_TICK_PERIOD.as_millis(),
                MAX_TICK_PERIOD.as_millis(),
                self.tick_period_ms
            )));
        }
        if self.width < 10 || self.height < 4 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be at least 10x4, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Tick period as a duration.
    #[must_use]
    pub const fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Renderer settings derived from this configuration.
    #[must_use]
    pub const fn ascii_config(&self) -> AsciiConfig {
        AsciiConfig {
            width: self.width,
            height: self.height,
            show_legend: self.show_legend,
            use_color: self.use_color,
            clear_screen: self.clear_screen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.tick_period(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
        assert!(!config.start_paused);
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config = ViewerConfig::from_ron_str("(tick_period_ms: 250, use_color: false)").unwrap();
        assert_eq!(config.tick_period_ms, 250);
        assert!(!config.use_color);
        assert_eq!(config.width, 80);
        assert!(config.clear_screen);
    }

    #[test]
    fn test_bad_ron_is_parse_error() {
        let err = ViewerConfig::from_ron_str("(tick_period_ms: \"fast\")").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ViewerConfig::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.ron");
        std::fs::write(&path, "(width: 100, height: 30, start_paused: true)").unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!((config.width, config.height), (100, 30));
        assert!(config.start_paused);
    }

    #[test]
    fn test_validate_rejects_zero_period() {
        let config = ViewerConfig {
            tick_period_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_tiny_viewport() {
        let config = ViewerConfig {
            width: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ascii_config_mirrors_fields() {
        let config = ViewerConfig {
            width: 42,
            use_color: false,
            ..Default::default()
        };
        let ascii = config.ascii_config();
        assert_eq!(ascii.width, 42);
        assert!(!ascii.use_color);
        assert!(ascii.clear_screen);
    }
}
