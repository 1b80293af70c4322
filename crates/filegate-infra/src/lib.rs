//! Filegate Infrastructure Library
//!
//! Process-level plumbing shared by Filegate binaries. Libraries only emit
//! `tracing` events; installing a subscriber happens here, once, at startup.

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat, TelemetryConfig};
