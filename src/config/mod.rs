//! Configuration and credential loading.

pub mod loader;

pub use loader::{load_config, ChartsSection, Config, ConfigError, Credentials, ExportSection, KrakenSection};
