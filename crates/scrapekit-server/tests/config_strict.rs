#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use scrapekit_core::DEFAULT_BUCKETS;
use scrapekit_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:3001"
metrics:
  duration_bucket: [0.1, 1.0] # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:3001");
    assert_eq!(cfg.server.slow_delay_ms, 2000);
    assert_eq!(cfg.metrics.duration_buckets, DEFAULT_BUCKETS.to_vec());
    assert_eq!(cfg.metrics.process_cache_ttl_ms, 0);
}

#[test]
fn custom_buckets_and_ttl() {
    let ok = r#"
version: 1
metrics:
  duration_buckets: [0.05, 0.5, 5]
  process_cache_ttl_ms: 1000
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.metrics.duration_buckets, vec![0.05, 0.5, 5.0]);
    assert_eq!(cfg.metrics.process_cache_ttl_ms, 1000);
}

#[test]
fn rejects_unsorted_buckets() {
    let bad = r#"
version: 1
metrics:
  duration_buckets: [1.0, 0.5]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn rejects_unknown_version_and_bad_listen() {
    assert!(config::load_from_str("version: 2\n").is_err());
    assert!(config::load_from_str("version: 1\nserver:\n  listen: \"nope\"\n").is_err());
    assert!(config::load_from_str("version: 1\nserver:\n  slow_delay_ms: 600000\n").is_err());
}
