//! Error types for the import-cost bot.

use rust_decimal::Decimal;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid update format: {0}")]
    InvalidUpdate(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Input validation errors — user-correctable, re-prompted at the same step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("engine volume is required for petrol/diesel and hybrid cars")]
    EngineVolumeRequired,

    #[error("engine power is required for electric cars")]
    EnginePowerRequired,

    #[error("electric car import from Japan is not supported")]
    JapanElectricUnsupported,

    #[error("car cost must be positive, got {0}")]
    NonPositiveCost(Decimal),

    #[error("exchange rate for {code} is missing or non-positive")]
    BadRate { code: &'static str },
}

/// Session/cursor inconsistencies — not user-correctable, abort to main menu.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no active session for user {user_id}")]
    SessionMissing { user_id: i64 },

    #[error("session field {field} missing at step {step}")]
    FieldMissing {
        field: &'static str,
        step: &'static str,
    },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
