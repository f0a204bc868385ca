use anyhow::{Context, Result};
use config::{Config, File};
use log::{debug, LevelFilter};
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_log_level() -> String {
    "info".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from("/")
}

fn default_settle_secs() -> u64 {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    /// Filesystem root the board monitor reads under. Overridable so tests
    /// can point at a fake sysfs/procfs tree.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Seconds to wait after a power model change before reading state back.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            settle_secs: default_settle_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(rename = "LOGGING", default)]
    pub logging: LoggingConfig,
    #[serde(rename = "MONITOR", default)]
    pub monitor: MonitorConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        Self::from_file("config.ini")
    }

    pub fn get_log_level(&self) -> LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info, // Default to Info if invalid
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        debug!("Loading configuration from {}", config_path.display());

        let config = Config::builder()
            .add_source(
                File::with_name(config_path.to_str().unwrap_or(""))
                    .format(config::FileFormat::Ini),
            )
            .build()
            .context(format!(
                "Failed to load config from {}",
                config_path.display()
            ))?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize config")?;

        Ok(app_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.monitor.root, PathBuf::from("/"));
        assert_eq!(config.monitor.settle_secs, 1);
        assert_eq!(config.get_log_level(), LevelFilter::Info);
    }

    #[test]
    fn test_from_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let config_content =
            "[LOGGING]\nlevel = debug\n\n[MONITOR]\nroot = /tmp/fake-board\nsettle_secs = 0\n";
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.get_log_level(), LevelFilter::Debug);
        assert_eq!(config.monitor.root, PathBuf::from("/tmp/fake-board"));
        assert_eq!(config.monitor.settle_secs, 0);
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let mut temp_file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        temp_file
            .write_all(b"[LOGGING]\nlevel = warn\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.get_log_level(), LevelFilter::Warn);
        assert_eq!(config.monitor.settle_secs, 1);
    }

    #[test]
    fn test_invalid_level_falls_back_to_info() {
        let config = AppConfig {
            logging: LoggingConfig {
                level: "loud".to_string(),
            },
            monitor: MonitorConfig::default(),
        };
        assert_eq!(config.get_log_level(), LevelFilter::Info);
    }
}
