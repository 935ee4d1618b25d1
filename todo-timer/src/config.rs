use crate::countdown::DEFAULT_TICK_INTERVAL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Cadence of countdown progress ticks, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Set to false to only log finished timers instead of notifying.
    #[serde(default = "default_notifications_enabled")]
    pub notifications_enabled: bool,

    /// How long the notification stays on screen. Server default when unset.
    #[serde(default)]
    pub notification_timeout_ms: Option<u64>,

    /// Application name shown by the notification server.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Directory for the log file. Defaults to the platform data directory.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_app_name() -> String {
    "Todo Timer".to_string()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            notifications_enabled: default_notifications_enabled(),
            notification_timeout_ms: None,
            app_name: default_app_name(),
            log_dir: None,
        }
    }
}

impl TimerConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("todo-timer")
            .join("config.toml"))
    }

    /// Load config from disk. Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(&path, raw)?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn notification_timeout(&self) -> Option<Duration> {
        self.notification_timeout_ms.map(Duration::from_millis)
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_local_dir()
                .context("Cannot determine data directory")?
                .join("todo-timer")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = TimerConfig::from_toml("").expect("empty config parses");
        assert_eq!(cfg, TimerConfig::default());
        assert_eq!(cfg.tick_interval(), Duration::from_secs(1));
        assert_eq!(cfg.notification_timeout(), None);
    }

    #[test]
    fn partial_file_overrides_fields() {
        let cfg = TimerConfig::from_toml(
            "notifications_enabled = false\nnotification_timeout_ms = 5000\ntick_interval_ms = 0\n",
        )
        .expect("config parses");
        assert!(!cfg.notifications_enabled);
        assert_eq!(cfg.notification_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.tick_interval(), Duration::from_millis(1));
        assert_eq!(cfg.app_name, "Todo Timer");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(TimerConfig::from_toml("tick_interval_ms = \"soon\"").is_err());
    }

    #[test]
    fn explicit_log_dir_is_used() {
        let cfg = TimerConfig {
            log_dir: Some(PathBuf::from("/tmp/todo-timer-logs")),
            ..TimerConfig::default()
        };
        assert_eq!(
            cfg.log_dir().expect("log dir"),
            PathBuf::from("/tmp/todo-timer-logs")
        );
    }
}
