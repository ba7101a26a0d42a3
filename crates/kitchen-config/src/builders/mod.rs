//! Builders for configurations used in tests.

mod config;

pub use config::ConfigBuilder;
