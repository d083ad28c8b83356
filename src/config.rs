//! Configuration types for the planner backend.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for the planner server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// HTTP listener settings.
    pub http: HttpConfig,
    /// Database settings.
    pub database: DatabaseConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Host/interface to bind to.
    pub host: String,
    /// Port to bind to (0 = auto-assign).
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5000,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file (None = platform data dir).
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Resolve the database file path, falling back to the platform default.
    #[must_use]
    pub fn resolve_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_db_path)
    }
}

/// Returns the default database path: `{data_dir}/studyplan/studyplan.db`.
#[must_use]
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studyplan")
        .join("studyplan.db")
}

impl PlannerConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::PlannerError::Config(e.to_string()))
    }

    /// Load the configuration for this process.
    ///
    /// Reads the file named by `STUDYPLAN_CONFIG` if set, otherwise the
    /// default config path. A missing file yields the default configuration;
    /// an unreadable or malformed file is an error.
    pub fn load() -> crate::error::Result<Self> {
        let path = std::env::var_os("STUDYPLAN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    /// Returns the default config file path: `{config_dir}/studyplan/config.toml`.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studyplan")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_bind_localhost_5000() {
        let config = PlannerConfig::default();
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 5000);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn config_serializes_to_toml() {
        let config = PlannerConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("host"));
        assert!(toml_str.contains("port"));
    }

    #[test]
    fn partial_toml_uses_section_defaults() {
        let toml_str = r#"
[http]
port = 8080
"#;
        let config: PlannerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.host, "127.0.0.1");
        assert!(config.database.path.is_none());
    }

    #[test]
    fn database_path_round_trips() {
        let toml_str = r#"
[database]
path = "/tmp/planner.db"
"#;
        let config: PlannerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.resolve_path(), PathBuf::from("/tmp/planner.db"));
    }

    #[test]
    fn resolve_path_falls_back_to_data_dir() {
        let config = DatabaseConfig::default();
        let path = config.resolve_path();
        assert!(path.to_string_lossy().ends_with("studyplan.db"));
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = PlannerConfig::from_file(std::path::Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "http = not valid").unwrap();
        assert!(PlannerConfig::from_file(&path).is_err());
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = PlannerConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("studyplan"));
    }
}
