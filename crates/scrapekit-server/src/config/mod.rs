//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use scrapekit_core::error::{Result, ScrapeError};

pub use schema::{AppConfig, MetricsSection, ServerSection};

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "SCRAPEKIT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "scrapekit.yaml";

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ScrapeError::BadConfig(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AppConfig> {
    let cfg: AppConfig = serde_yaml::from_str(s)
        .map_err(|e| ScrapeError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `$SCRAPEKIT_CONFIG` or `scrapekit.yaml`; a missing file yields defaults.
pub fn load() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match fs::read_to_string(&path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(%path, "config file not found, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(ScrapeError::BadConfig(format!(
            "read config failed ({path}): {e}"
        ))),
    }
}
