//! Process-level statistics sampled at scrape time.
//!
//! Values are read from the Linux `/proc` filesystem through the [`ProcSource`]
//! trait so the parsing can be exercised with in-memory fixtures. A statistic
//! that cannot be read (non-Linux host, restricted `/proc`, parse failure) is
//! left out of the sample instead of failing the scrape. Uptime is measured from
//! collector construction and is always present.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::metrics::{lock, MetricKind};

/// Kernel clock ticks per second as exposed to userspace (`USER_HZ`).
const USER_HZ: f64 = 100.0;

pub const PROCESS_CPU_USER_SECONDS_TOTAL: &str = "process_cpu_user_seconds_total";
pub const PROCESS_CPU_SYSTEM_SECONDS_TOTAL: &str = "process_cpu_system_seconds_total";
pub const PROCESS_CPU_SECONDS_TOTAL: &str = "process_cpu_seconds_total";
pub const PROCESS_RESIDENT_MEMORY_BYTES: &str = "process_resident_memory_bytes";
pub const PROCESS_VIRTUAL_MEMORY_BYTES: &str = "process_virtual_memory_bytes";
pub const PROCESS_OPEN_FDS: &str = "process_open_fds";
pub const PROCESS_MAX_FDS: &str = "process_max_fds";
pub const PROCESS_START_TIME_SECONDS: &str = "process_start_time_seconds";
pub const PROCESS_UPTIME_SECONDS: &str = "process_uptime_seconds";

/// Read access to a `/proc`-like tree. Paths are relative to its root.
pub trait ProcSource: Send + Sync {
    fn read_to_string(&self, path: &str) -> io::Result<String>;
    fn count_entries(&self, path: &str) -> io::Result<usize>;
}

/// The real `/proc` filesystem.
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcSource for ProcFs {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(self.root.join(path))
    }

    fn count_entries(&self, path: &str) -> io::Result<usize> {
        Ok(fs::read_dir(self.root.join(path))?.count())
    }
}

/// One sampled statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessMetric {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub value: f64,
}

/// Ordered set of process statistics from one sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessSample {
    metrics: Vec<ProcessMetric>,
}

impl ProcessSample {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.iter().find(|m| m.name == name).map(|m| m.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessMetric> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    fn push(&mut self, name: &'static str, help: &'static str, kind: MetricKind, value: f64) {
        self.metrics.push(ProcessMetric {
            name,
            help,
            kind,
            value,
        });
    }
}

pub struct ProcessStatsCollector {
    source: Box<dyn ProcSource>,
    started: Instant,
    cache_ttl: Duration,
    cache: Mutex<Option<(Instant, ProcessSample)>>,
}

impl Default for ProcessStatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessStatsCollector {
    /// Collector over the host `/proc`. Create it at process start: uptime counts from here.
    pub fn new() -> Self {
        Self::with_source(ProcFs::default())
    }

    pub fn with_source(source: impl ProcSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            started: Instant::now(),
            cache_ttl: Duration::ZERO,
            cache: Mutex::new(None),
        }
    }

    /// Reuse a sample for `ttl` to bound scrape cost under load. Zero disables caching.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn sample(&self) -> ProcessSample {
        if self.cache_ttl.is_zero() {
            return self.collect();
        }

        let mut cache = lock(&self.cache);
        if let Some((at, sample)) = cache.as_ref() {
            if at.elapsed() < self.cache_ttl {
                return sample.clone();
            }
        }
        let sample = self.collect();
        *cache = Some((Instant::now(), sample.clone()));
        sample
    }

    fn collect(&self) -> ProcessSample {
        let mut out = ProcessSample::default();

        match self.read("self/stat").and_then(|s| parse_stat(&s)) {
            Some(stat) => {
                let user = stat.utime_ticks as f64 / USER_HZ;
                let system = stat.stime_ticks as f64 / USER_HZ;
                out.push(
                    PROCESS_CPU_USER_SECONDS_TOTAL,
                    "Total user CPU time spent in seconds.",
                    MetricKind::Counter,
                    user,
                );
                out.push(
                    PROCESS_CPU_SYSTEM_SECONDS_TOTAL,
                    "Total system CPU time spent in seconds.",
                    MetricKind::Counter,
                    system,
                );
                out.push(
                    PROCESS_CPU_SECONDS_TOTAL,
                    "Total user and system CPU time spent in seconds.",
                    MetricKind::Counter,
                    user + system,
                );

                out.push(
                    PROCESS_VIRTUAL_MEMORY_BYTES,
                    "Virtual memory size in bytes.",
                    MetricKind::Gauge,
                    stat.vsize_bytes as f64,
                );

                match self.read("stat").and_then(|s| parse_btime(&s)) {
                    Some(btime) => out.push(
                        PROCESS_START_TIME_SECONDS,
                        "Start time of the process since unix epoch in seconds.",
                        MetricKind::Gauge,
                        btime as f64 + stat.starttime_ticks as f64 / USER_HZ,
                    ),
                    None => unavailable(PROCESS_START_TIME_SECONDS),
                }
            }
            None => unavailable(PROCESS_CPU_SECONDS_TOTAL),
        }

        match self.read("self/status").and_then(|s| parse_vm_rss_bytes(&s)) {
            Some(rss) => out.push(
                PROCESS_RESIDENT_MEMORY_BYTES,
                "Resident memory size in bytes.",
                MetricKind::Gauge,
                rss as f64,
            ),
            None => unavailable(PROCESS_RESIDENT_MEMORY_BYTES),
        }

        match self.source.count_entries("self/fd") {
            Ok(n) => out.push(
                PROCESS_OPEN_FDS,
                "Number of open file descriptors.",
                MetricKind::Gauge,
                n as f64,
            ),
            Err(e) => {
                tracing::debug!(stat = PROCESS_OPEN_FDS, error = %e, "process statistic unavailable")
            }
        }

        match self.read("self/limits").and_then(|s| parse_max_open_files(&s)) {
            Some(max) => out.push(
                PROCESS_MAX_FDS,
                "Maximum number of open file descriptors.",
                MetricKind::Gauge,
                max as f64,
            ),
            None => unavailable(PROCESS_MAX_FDS),
        }

        out.push(
            PROCESS_UPTIME_SECONDS,
            "Process uptime in seconds.",
            MetricKind::Gauge,
            self.started.elapsed().as_secs_f64(),
        );

        out
    }

    fn read(&self, path: &str) -> Option<String> {
        match self.source.read_to_string(path) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::debug!(path, error = %e, "proc read failed");
                None
            }
        }
    }
}

fn unavailable(stat: &'static str) {
    tracing::debug!(stat, "process statistic unavailable");
}

#[derive(Debug, PartialEq)]
struct Stat {
    utime_ticks: u64,
    stime_ticks: u64,
    starttime_ticks: u64,
    vsize_bytes: u64,
}

// `/proc/self/stat`: "pid (comm) state ppid ...". `comm` may contain spaces and
// parentheses, so fields are counted from the last ')'.
fn parse_stat(s: &str) -> Option<Stat> {
    let rest = &s[s.rfind(')')? + 1..];
    let fields: Vec<&str> = rest.split_whitespace().collect();
    // fields[0] is field 3 (state) in proc(5) numbering.
    let field = |n: usize| -> Option<u64> { fields.get(n - 3)?.parse().ok() };
    Some(Stat {
        utime_ticks: field(14)?,
        stime_ticks: field(15)?,
        starttime_ticks: field(22)?,
        vsize_bytes: field(23)?,
    })
}

// `VmRSS:     1234 kB`
fn parse_vm_rss_bytes(s: &str) -> Option<u64> {
    let line = s.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

fn parse_btime(s: &str) -> Option<u64> {
    s.lines()
        .find_map(|l| l.strip_prefix("btime "))
        .and_then(|v| v.trim().parse().ok())
}

// `Max open files            1024                 4096                 files`
fn parse_max_open_files(s: &str) -> Option<u64> {
    let line = s.lines().find(|l| l.starts_with("Max open files"))?;
    line["Max open files".len()..]
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn stat_with_spaces_in_comm() {
        let s = "4242 (my (odd) proc) S 1 4242 4242 0 -1 4194560 1000 0 0 0 250 75 0 0 20 0 8 0 123456 104857600 2048 18446744073709551615";
        let stat = parse_stat(s).unwrap();
        assert_eq!(
            stat,
            Stat {
                utime_ticks: 250,
                stime_ticks: 75,
                starttime_ticks: 123456,
                vsize_bytes: 104857600,
            }
        );
    }

    #[test]
    fn truncated_stat_is_none() {
        assert!(parse_stat("1 (x) S 1 2 3").is_none());
        assert!(parse_stat("garbage").is_none());
    }

    #[test]
    fn unlimited_max_fds_is_none() {
        let limits = "Limit                     Soft Limit           Hard Limit           Units\n\
                      Max open files            unlimited            unlimited            files\n";
        assert!(parse_max_open_files(limits).is_none());
    }
}
