//! Configuration loading helpers
//!
//! Embedders hand the SDK a JSON options object; this module reads it into
//! a [`SessionConfig`]. Field names are the camelCase keys of the options
//! object (`settingsFolder`, `cacheFolder`, `traceFile`).

use std::path::Path;

use spotify_session::SessionConfig;

use crate::error::SdkError;

/// Load and validate a configuration from a JSON file
pub fn load_config(path: impl AsRef<Path>) -> Result<SessionConfig, SdkError> {
    let path = path.as_ref();
    let read_err = |reason: String| SdkError::ConfigRead {
        path: path.display().to_string(),
        reason,
    };

    let text = std::fs::read_to_string(path).map_err(|e| read_err(e.to_string()))?;
    let config: SessionConfig =
        serde_json::from_str(&text).map_err(|e| read_err(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// A configuration rooted in the platform's user directories instead of
/// the working directory.
///
/// Settings land under the local data dir and the content cache under the
/// cache dir, both namespaced by `app_name`. Falls back to the relative
/// defaults when the platform dirs are unavailable.
pub fn user_dirs_config(app_name: &str) -> SessionConfig {
    let mut config = SessionConfig::new();
    if let Some(data) = dirs::data_local_dir() {
        config = config.with_settings_folder(data.join(app_name).join("settings"));
    }
    if let Some(cache) = dirs::cache_dir() {
        config = config.with_cache_folder(cache.join(app_name));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SdkError::ConfigRead { .. }));
    }

    #[test]
    fn test_load_config_round_trip() {
        let dir = std::env::temp_dir().join("spotify-sdk-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("options.json");
        std::fs::write(
            &path,
            r#"{ "settingsFolder": "s", "cacheFolder": "c", "tickIntervalMs": 25 }"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.settings_folder, PathBuf::from("s"));
        assert_eq!(config.cache_folder, PathBuf::from("c"));
        assert_eq!(config.tick_interval_ms, 25);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let dir = std::env::temp_dir().join("spotify-sdk-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad-options.json");
        std::fs::write(&path, r#"{ "settingsFolder": "" }"#).unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_user_dirs_config_is_valid() {
        let config = user_dirs_config("spotify-sdk");
        assert!(config.validate().is_ok());
    }
}
