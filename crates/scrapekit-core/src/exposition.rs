//! Prometheus text exposition format (version 0.0.4).
//!
//! Output order is fully determined by the input: metrics in registration
//! order, series sorted by label values (done by the registry snapshot), then
//! the process family in sampling order.

use std::collections::HashSet;
use std::fmt::Write;

use crate::metrics::{LabelValues, MetricDescriptor, MetricSnapshot, SeriesValues};
use crate::process::ProcessSample;

/// Content type for the `/metrics` response.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Help text escapes backslash and newline only.
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Shortest round-trip decimal; `+Inf`/`-Inf`/`NaN` spelled the Prometheus way.
fn fmt_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{v}")
    }
}

/// `k1="v1",k2="v2"` (no braces).
fn label_pairs(names: &[String], values: &LabelValues) -> String {
    names
        .iter()
        .zip(values.as_slice())
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn braced(labels: &str) -> String {
    if labels.is_empty() {
        String::new()
    } else {
        format!("{{{labels}}}")
    }
}

fn header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

fn render_metric(out: &mut String, desc: &MetricDescriptor, values: &SeriesValues) {
    let name = desc.name();
    header(out, name, desc.help(), desc.kind().as_str());

    match values {
        SeriesValues::Counter(series) => {
            for (labels, v) in series {
                let labels = label_pairs(desc.label_names(), labels);
                let _ = writeln!(out, "{}{} {}", name, braced(&labels), v);
            }
        }
        SeriesValues::Gauge(series) => {
            for (labels, v) in series {
                let labels = label_pairs(desc.label_names(), labels);
                let _ = writeln!(out, "{}{} {}", name, braced(&labels), fmt_float(*v));
            }
        }
        SeriesValues::Histogram(series) => {
            for (labels, hist) in series {
                let label_str = label_pairs(desc.label_names(), labels);
                let prefix = if label_str.is_empty() {
                    String::new()
                } else {
                    format!("{label_str},")
                };

                for (le, count) in hist.buckets() {
                    let _ = writeln!(
                        out,
                        "{}_bucket{{{}le=\"{}\"}} {}",
                        name,
                        prefix,
                        fmt_float(le),
                        count
                    );
                }
                let _ = writeln!(out, "{}_sum{} {}", name, braced(&label_str), fmt_float(hist.sum));
                let _ = writeln!(out, "{}_count{} {}", name, braced(&label_str), hist.count);
            }
        }
    }
}

/// Render a registry snapshot followed by a process sample.
///
/// A process statistic whose name collides with a registered metric is skipped
/// so the output never carries two families with the same name.
pub fn render(snapshot: &[MetricSnapshot], process: &ProcessSample) -> String {
    let mut out = String::new();
    for m in snapshot {
        render_metric(&mut out, &m.descriptor, &m.values);
    }

    let registered: HashSet<&str> = snapshot.iter().map(|m| m.descriptor.name()).collect();
    for p in process.iter() {
        if registered.contains(p.name) {
            tracing::debug!(name = p.name, "process metric shadowed by registered metric");
            continue;
        }
        header(&mut out, p.name, p.help, p.kind.as_str());
        let _ = writeln!(out, "{} {}", p.name, fmt_float(p.value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes() {
        assert_eq!(escape_label("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
        assert_eq!(escape_help("x\\y\n\"z\""), "x\\\\y\\n\"z\"");
    }

    #[test]
    fn floats() {
        assert_eq!(fmt_float(0.005), "0.005");
        assert_eq!(fmt_float(1.0), "1");
        assert_eq!(fmt_float(2.5), "2.5");
        assert_eq!(fmt_float(f64::INFINITY), "+Inf");
        assert_eq!(fmt_float(f64::NEG_INFINITY), "-Inf");
        assert_eq!(fmt_float(f64::NAN), "NaN");
    }
}
