//! Configuration module for link checking
//!
//! This module provides the `LinkCheckConfig` struct and its type-safe builder
//! for configuring the pipeline with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{LinkCheckConfigBuilder, WithRootDir};
pub use types::LinkCheckConfig;
