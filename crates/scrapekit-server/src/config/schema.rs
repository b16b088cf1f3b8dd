use serde::Deserialize;
use scrapekit_core::error::{Result, ScrapeError};
use scrapekit_core::metrics::descriptor::validate_buckets;
use scrapekit_core::DEFAULT_BUCKETS;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ScrapeError::BadConfig(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.metrics.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Delay applied by the `/slow` demo route.
    #[serde(default = "default_slow_delay_ms")]
    pub slow_delay_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            slow_delay_ms: default_slow_delay_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ScrapeError::BadConfig(format!(
                "server.listen must be a valid SocketAddr: {}",
                self.listen
            )));
        }
        if self.slow_delay_ms > 60_000 {
            return Err(ScrapeError::BadConfig(
                "server.slow_delay_ms must be between 0 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:3001".into()
}
fn default_slow_delay_ms() -> u64 {
    2000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Upper bounds (seconds) for `http_request_duration_seconds`.
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,

    /// Reuse a process stats sample for this long. 0 samples on every scrape.
    #[serde(default)]
    pub process_cache_ttl_ms: u64,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            duration_buckets: default_duration_buckets(),
            process_cache_ttl_ms: 0,
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        validate_buckets(&self.duration_buckets)
            .map_err(|msg| ScrapeError::BadConfig(format!("metrics.duration_buckets: {msg}")))?;
        if self.process_cache_ttl_ms > 60_000 {
            return Err(ScrapeError::BadConfig(
                "metrics.process_cache_ttl_ms must be between 0 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_duration_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}
