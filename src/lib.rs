//! Library exports for reuse in benchmarks, tests and the probe tool.
/// Application directory resolution.
pub mod app_dirs;
/// Anomaly service contract and HTTP client.
pub mod backend;
/// Score to color mapping.
pub mod color;
/// Viewer configuration.
pub mod config;
/// Schema, records and cell colors.
pub mod dataset;
/// Shared egui UI modules.
pub mod egui_app;
/// Bounded HTTP response helpers.
pub mod http_client;
/// Tracing setup.
pub mod logging;
