//! Configuration management for the MongoDB monitor
//!
//! Handles:
//! - Monitored instance list (host, port, optional credentials)
//! - Shell client invocation settings
//! - Push endpoint settings
//! - Log file location
//!
//! A missing config file is not an error: the compiled-in defaults describe a
//! single local instance and the local push agent on port 1988.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "MONGODB_MONITOR_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not find config directory")]
    NoConfigDir,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub collector: CollectorConfig,
    pub push: PushConfig,
    pub log: LogConfig,
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Path of the mongo shell binary
    pub mongo_bin: PathBuf,
    /// Script passed to `--eval`
    pub eval: String,
    pub timeout_secs: u64,
    /// Number of instances queried concurrently
    pub max_parallel: usize,
    /// Emit `mongo.alive` for every instance
    pub report_liveness: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub url: String,
    pub step_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub file_prefix: String,
    pub level: String,
}

/// One monitored mongod/mongos endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing)] // Never write passwords back out
    pub password: Option<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            mongo_bin: PathBuf::from("/usr/local/mongodb/bin/mongo"),
            eval: "printjson(db.serverStatus())".to_string(),
            timeout_secs: 30,
            max_parallel: 1,
            report_liveness: false,
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:1988/v1/push".to_string(),
            step_secs: 60,
            timeout_secs: 10,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/tmp"),
            file_prefix: "mongodb_monitor".to_string(),
            level: "info".to_string(),
        }
    }
}

impl Instance {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Username and password, only when both are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl CollectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PushConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MonitorConfig {
    /// Load config from `$MONGODB_MONITOR_CONFIG` or the OS-specific location
    pub async fn load() -> Result<Self, ConfigError> {
        let config_path = match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => PathBuf::from(path),
            None => Self::config_file_path()?,
        };
        Self::load_from(&config_path).await
    }

    /// Load config from an explicit path, falling back to defaults if absent
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default().with_default_instances());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let config: MonitorConfig = toml::from_str(content)?;
        Ok(config.with_default_instances())
    }

    /// Get OS-specific config file path
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("mongodb-monitor");
        path.push("config.toml");
        Ok(path)
    }

    fn with_default_instances(mut self) -> Self {
        if self.instances.is_empty() {
            self.instances.push(Instance::new("127.0.0.1", 27017));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig::load_from(&dir.path().join("absent.toml")).await.unwrap();

        assert_eq!(config.instances, vec![Instance::new("127.0.0.1", 27017)]);
        assert_eq!(config.push.url, "http://127.0.0.1:1988/v1/push");
        assert_eq!(config.push.step_secs, 60);
        assert_eq!(config.collector.mongo_bin, PathBuf::from("/usr/local/mongodb/bin/mongo"));
        assert!(!config.collector.report_liveness);
        assert_eq!(config.log.file_prefix, "mongodb_monitor");
    }

    #[tokio::test]
    async fn test_env_var_overrides_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        tokio::fs::write(&path, "[[instances]]\nhost = \"10.1.2.3\"\nport = 27019\n[push]\nstep_secs = 30\n")
            .await
            .unwrap();

        std::env::set_var(CONFIG_ENV_VAR, &path);
        let loaded = MonitorConfig::load().await;
        std::env::remove_var(CONFIG_ENV_VAR);

        let config = loaded.unwrap();
        assert_eq!(config.instances, vec![Instance::new("10.1.2.3", 27019)]);
        assert_eq!(config.push.step_secs, 30);
    }

    #[test]
    fn test_partial_file_keeps_section_defaults() {
        let config = MonitorConfig::parse(
            r#"
            [collector]
            timeout_secs = 5

            [[instances]]
            host = "10.0.0.5"
            port = 27018
            username = "monitor"
            password = "s3cret"

            [[instances]]
            host = "10.0.0.6"
            port = 27017
            "#,
        )
        .unwrap();

        assert_eq!(config.collector.timeout(), Duration::from_secs(5));
        assert_eq!(config.collector.eval, "printjson(db.serverStatus())");
        assert_eq!(config.instances.len(), 2);
        assert_eq!(config.instances[0].credentials(), Some(("monitor", "s3cret")));
        assert_eq!(config.instances[1].credentials(), None);
        assert_eq!(config.push.timeout(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "[[instances]]\nhost = 12").await.unwrap();

        let err = MonitorConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_credentials_need_both_parts() {
        let mut instance = Instance::new("db", 27017);
        instance.username = Some("monitor".into());
        assert_eq!(instance.credentials(), None);

        let instance = Instance::new("db", 27017).with_credentials("monitor", "");
        assert_eq!(instance.credentials(), None);
    }

    #[test]
    fn test_password_is_redacted() {
        let instance = Instance::new("db", 27017).with_credentials("monitor", "s3cret");
        let debug = format!("{:?}", instance);
        assert!(!debug.contains("s3cret"));
        assert_eq!(instance.to_string(), "db:27017");

        let toml = toml::to_string(&instance).unwrap();
        assert!(!toml.contains("s3cret"));
    }

    #[test]
    fn test_config_file_path() {
        if let Ok(path) = MonitorConfig::config_file_path() {
            assert!(path.to_string_lossy().contains("mongodb-monitor"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
