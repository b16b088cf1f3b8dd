//! Top-level facade crate for scrapekit.
//!
//! Re-exports the metric core and the instrumented server library so users can depend on a single crate.

pub mod core {
    pub use scrapekit_core::*;
}

pub mod server {
    pub use scrapekit_server::*;
}
