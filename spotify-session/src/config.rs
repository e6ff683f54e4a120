//! Session configuration
//!
//! Controls where the native library persists its state and how often the
//! pending-work poll runs. Deserializable so embedders can load it from a
//! JSON options object.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use spotify_native::SessionOptions;

use crate::error::{Result, SessionError};

/// Configuration for the native session
///
/// # Example
///
/// ```rust
/// use spotify_session::SessionConfig;
///
/// let config = SessionConfig::new()
///     .with_settings_folder("state/settings")
///     .with_trace_file("trace.log");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Folder for persisted settings (stored credentials live here)
    /// Default: `"settings"`
    pub settings_folder: PathBuf,

    /// Folder for the native library's content cache
    /// Default: `"cache"`
    pub cache_folder: PathBuf,

    /// Optional native API trace log file
    /// Default: unset
    pub trace_file: Option<PathBuf>,

    /// Interval of the periodic pending-work tick, in milliseconds
    /// Default: 50
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settings_folder: PathBuf::from("settings"),
            cache_folder: PathBuf::from("cache"),
            trace_file: None,
            tick_interval_ms: 50,
        }
    }
}

impl SessionConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.settings_folder.as_os_str().is_empty() {
            return Err(SessionError::Configuration(
                "settings folder must not be empty".to_string(),
            ));
        }
        if self.cache_folder.as_os_str().is_empty() {
            return Err(SessionError::Configuration(
                "cache folder must not be empty".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(SessionError::Configuration(
                "tick interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// The tick interval as a [`Duration`]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The options handed to the native library at session creation
    pub fn to_options(&self) -> SessionOptions {
        SessionOptions {
            settings_folder: self.settings_folder.clone(),
            cache_folder: self.cache_folder.clone(),
            trace_file: self.trace_file.clone(),
        }
    }

    pub fn with_settings_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.settings_folder = folder.into();
        self
    }

    pub fn with_cache_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.cache_folder = folder.into();
        self
    }

    pub fn with_trace_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.trace_file = Some(file.into());
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = interval.as_millis() as u64;
        self
    }
}
