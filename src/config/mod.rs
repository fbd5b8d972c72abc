/// Database configuration and connection management
pub mod database;

/// Server and auth settings loaded from config.toml
pub mod settings;

pub use settings::Settings;
