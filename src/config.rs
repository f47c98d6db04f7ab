//! Configuration resolution.
//!
//! The data-file location is an explicit value injected into the store, never
//! a hardcoded working-directory filename. Resolution order: CLI flag (which
//! also reads `WORDBURN_DATA_FILE`), then `config.toml` under the platform
//! config directory, then the platform data directory default.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

const APP_DIR: &str = "wordburn";
const DATA_FILE_NAME: &str = "word_count_data.csv";
const SETTINGS_FILE_NAME: &str = "config.toml";

/// On-disk optional settings file.
#[derive(Debug, Default, Deserialize)]
struct Settings {
    data_file: Option<PathBuf>,
    history_file: Option<PathBuf>,
}

impl Settings {
    /// Load `config.toml` from the platform config directory; absent file
    /// means defaults, malformed file is an error.
    fn load() -> Result<Self, ConfigError> {
        let Some(path) = dirs::config_dir().map(|d| d.join(APP_DIR).join(SETTINGS_FILE_NAME))
        else {
            return Ok(Self::default());
        };
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Ok(Self::default()),
        };
        toml::from_str(&raw).map_err(|e| ConfigError::InvalidValue {
            key: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Shared CSV holding every project's rows.
    pub data_file: PathBuf,
    /// Readline history for the interactive prompt.
    pub history_file: PathBuf,
}

impl TrackerConfig {
    pub fn resolve(cli_data_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::resolve_with(Settings::load()?, cli_data_file)
    }

    fn resolve_with(
        settings: Settings,
        cli_data_file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let data_file = cli_data_file
            .or(settings.data_file)
            .map(validate_data_file)
            .transpose()?
            .unwrap_or_else(default_data_file);

        let history_file = settings
            .history_file
            .unwrap_or_else(|| data_dir().join("history.txt"));

        Ok(Self {
            data_file,
            history_file,
        })
    }
}

fn validate_data_file(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "data_file".to_string(),
            message: "data file path must not be empty".to_string(),
        });
    }
    if path.is_dir() {
        return Err(ConfigError::InvalidValue {
            key: "data_file".to_string(),
            message: format!("{} is a directory", path.display()),
        });
    }
    Ok(path)
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_file() -> PathBuf {
    data_dir().join(DATA_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::error::ConfigError;

    use super::{Settings, TrackerConfig, validate_data_file};

    #[test]
    fn cli_override_wins_over_settings() {
        let settings = Settings {
            data_file: Some(PathBuf::from("/elsewhere/words.csv")),
            history_file: None,
        };
        let config =
            TrackerConfig::resolve_with(settings, Some(PathBuf::from("/tmp/words.csv")))
                .expect("resolve");
        assert_eq!(config.data_file, PathBuf::from("/tmp/words.csv"));
    }

    #[test]
    fn settings_file_wins_over_default() {
        let settings = Settings {
            data_file: Some(PathBuf::from("/elsewhere/words.csv")),
            history_file: None,
        };
        let config = TrackerConfig::resolve_with(settings, None).expect("resolve");
        assert_eq!(config.data_file, PathBuf::from("/elsewhere/words.csv"));
    }

    #[test]
    fn default_path_ends_with_the_shared_csv_name() {
        let config = TrackerConfig::resolve_with(Settings::default(), None).expect("resolve");
        assert!(config.data_file.ends_with("word_count_data.csv"));
    }

    #[test]
    fn empty_data_file_path_is_rejected() {
        let err = validate_data_file(PathBuf::new()).expect_err("empty path");
        let ConfigError::InvalidValue { key, message } = err;
        assert_eq!(key, "data_file");
        assert!(message.contains("empty"), "unexpected message: {message}");
    }

    #[test]
    fn directory_as_data_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err =
            validate_data_file(dir.path().to_path_buf()).expect_err("directories are not files");
        let ConfigError::InvalidValue { key, .. } = err;
        assert_eq!(key, "data_file");
    }
}
