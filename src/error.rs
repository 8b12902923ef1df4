use thiserror::Error;

/// Errors raised to callers of the registry and the CLI.
///
/// Gateway verdicts (tampered payloads, declined payments) are not errors:
/// they travel to the completion callback as a `PaymentOutcome`.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Missing configuration key: {0}")]
    MissingConfig(String),
    #[error("Unknown order: {0}")]
    UnknownOrder(String),
    #[error("Duplicate order: {0}")]
    DuplicateOrder(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
