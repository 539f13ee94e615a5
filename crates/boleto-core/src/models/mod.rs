//! Data models: extracted records and configuration.

pub mod config;
pub mod record;
