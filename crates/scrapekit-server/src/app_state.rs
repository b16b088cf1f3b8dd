//! Shared application state for the instrumented server.
//!
//! The metric registry is created here, once, before the router exists, and
//! is reached only through this handle: tests build a fresh state (and thus a
//! fresh registry) per case.

use std::sync::Arc;
use std::time::{Duration, Instant};

use scrapekit_core::error::Result;
use scrapekit_core::{render, MetricRegistry, ProcessStatsCollector};

use crate::config::AppConfig;
use crate::obs::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: AppConfig,
    registry: Arc<MetricRegistry>,
    http_metrics: HttpMetrics,
    process: ProcessStatsCollector,
    started: Instant,
}

impl AppState {
    /// Build application state with a fresh registry.
    /// Returns Result so main can fail startup on a registration error.
    pub fn new(cfg: AppConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(MetricRegistry::new()))
    }

    /// Build application state around an existing registry (e.g. one that
    /// already carries application metrics).
    pub fn with_registry(cfg: AppConfig, registry: Arc<MetricRegistry>) -> Result<Self> {
        let http_metrics = HttpMetrics::register(&registry, &cfg.metrics.duration_buckets)?;
        let process = ProcessStatsCollector::new()
            .with_cache_ttl(Duration::from_millis(cfg.metrics.process_cache_ttl_ms));

        tracing::info!(metrics = registry.len(), "metric registry initialized");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                http_metrics,
                process,
                started: Instant::now(),
            }),
        })
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<MetricRegistry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn http_metrics(&self) -> &HttpMetrics {
        &self.inner.http_metrics
    }

    pub fn uptime(&self) -> Duration {
        self.inner.started.elapsed()
    }

    /// Full scrape body: registry snapshot plus a fresh process sample.
    pub fn render_metrics(&self) -> String {
        let snapshot = self.inner.registry.snapshot();
        let process = self.inner.process.sample();
        render(&snapshot, &process)
    }
}
