//! scrapekit server library entry.
//!
//! This crate wires the metric registry from `scrapekit-core` into an axum
//! server: config loading, shared state, the request instrumentation hook, the
//! `/metrics` scrape endpoint, and a handful of demo routes. It is consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod demo;
pub mod obs;
pub mod ops;
pub mod router;
