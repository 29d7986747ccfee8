//! # KPM Library
//!
//! This library exposes the KPM app modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod config;
pub mod logging;

// Re-export kpm_core for convenience
pub use kpm_core;
