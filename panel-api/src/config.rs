use panel_logging::LogConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_daemon_timeout")]
    pub daemon_timeout_secs: u64,

    #[serde(default = "default_database_host_timeout")]
    pub database_host_timeout_secs: u64,

    #[serde(skip, default = "LogConfig::from_env")]
    pub log: LogConfig,
}

fn default_bind_addr() -> String {
    std::env::var("PANEL_API_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
}

fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("PANEL_API_DB_PATH") {
        return PathBuf::from(path);
    }

    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("panel").join("panel.db")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".panel").join("panel.db")
    }
}

fn default_daemon_timeout() -> u64 {
    secs_from_env("PANEL_DAEMON_TIMEOUT", 10)
}

fn default_database_host_timeout() -> u64 {
    secs_from_env("PANEL_DATABASE_HOST_TIMEOUT", 5)
}

fn secs_from_env(key: &str, fallback: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(fallback)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            daemon_timeout_secs: default_daemon_timeout(),
            database_host_timeout_secs: default_database_host_timeout(),
            log: LogConfig::from_env(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn daemon_timeout(&self) -> Duration {
        Duration::from_secs(self.daemon_timeout_secs)
    }

    pub fn database_host_timeout(&self) -> Duration {
        Duration::from_secs(self.database_host_timeout_secs)
    }
}
