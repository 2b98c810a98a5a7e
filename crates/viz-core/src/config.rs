use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::DEFAULT_ACTIVITY_CAPACITY;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
/// Environment variable overriding `collaborator.base_url`.
pub const API_URL_ENV: &str = "VIZBOARD_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub collaborator: CollaboratorConfig,
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collaborator: CollaboratorConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorMode {
    Http,
    Simulated,
}

impl CollaboratorMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Simulated => "simulated",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CollaboratorConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub mode: CollaboratorMode,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            mode: CollaboratorMode::Http,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub activity_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            activity_capacity: DEFAULT_ACTIVITY_CAPACITY,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` when it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.collaborator.base_url = url.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.collaborator.base_url, DEFAULT_API_URL);
        assert_eq!(config.collaborator.timeout_ms, 15_000);
        assert_eq!(config.collaborator.mode, CollaboratorMode::Http);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [collaborator]
            mode = "simulated"

            [session]
            activity_capacity = 12
            "#,
        )
        .expect("parse");

        assert_eq!(config.collaborator.mode, CollaboratorMode::Simulated);
        assert_eq!(config.collaborator.base_url, DEFAULT_API_URL);
        assert_eq!(config.session.activity_capacity, 12);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let err = Config::from_toml_str("[collaborator]\nmode = \"carrier-pigeon\"\n")
            .expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_and_missing_file_falls_back() {
        let dir = tempdir().expect("tmpdir");
        let path = dir.path().join("config.toml");
        assert_eq!(
            Config::load_or_default(&path).expect("default"),
            Config::default()
        );
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Io { .. })
        ));

        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "[collaborator]\nbase_url = \"http://viz.internal:8080\"\ntimeout_ms = 500").expect("write");
        drop(file);

        let config = Config::load_or_default(&path).expect("load");
        assert_eq!(config.collaborator.base_url, "http://viz.internal:8080");
        assert_eq!(config.collaborator.timeout_ms, 500);
    }

    #[test]
    fn env_override_replaces_base_url() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| {
            (key == API_URL_ENV).then(|| " http://10.0.0.5:5000 ".to_string())
        });
        assert_eq!(config.collaborator.base_url, "http://10.0.0.5:5000");

        let mut untouched = Config::default();
        untouched.apply_env_overrides(|_| Some(String::new()));
        assert_eq!(untouched.collaborator.base_url, DEFAULT_API_URL);
    }
}
