//! Configuration loading and layering.
//!
//! Handles `.driftwatch.toml` loading, environment variable resolution,
//! and CLI flag merging with proper priority ordering.

pub mod loader;

pub use loader::{AuditConfig, Config, ProviderConfig};
