//! Error types shared across the crate
//!
//! Each subsystem has its own error enum so callers can match on the failures
//! that concern them: dictionary providers fail with [`DictionaryError`],
//! persistence with [`StorageError`], grading with [`ReviewError`] and option
//! parsing with [`ConfigError`].

use thiserror::Error;

/// Errors raised by dictionary providers, loaders and stores
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictionaryError {
    /// Provider is misconfigured (missing endpoint, bad credentials)
    #[error("Dictionary configuration error: {0}")]
    Config(String),
    /// Transport failure talking to a remote provider
    #[error("Dictionary network error: {0}")]
    Network(String),
    /// Provider answered but the lookup itself failed
    #[error("Dictionary lookup error: {0}")]
    Lookup(String),
    /// Dictionary data could not be decoded
    #[error("Dictionary parse error: {0}")]
    Parse(String),
    /// Underlying entry store rejected an operation
    #[error("Dictionary storage error: {0}")]
    Storage(#[from] StorageError),
    /// Reading dictionary data from disk failed
    #[error("Dictionary I/O error: {0}")]
    Io(String),
    /// A language code is not a valid locale identifier
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),
}

impl From<reqwest::Error> for DictionaryError {
    fn from(error: reqwest::Error) -> Self {
        DictionaryError::Network(error.to_string())
    }
}

impl From<std::io::Error> for DictionaryError {
    fn from(error: std::io::Error) -> Self {
        DictionaryError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for DictionaryError {
    fn from(error: serde_json::Error) -> Self {
        DictionaryError::Parse(error.to_string())
    }
}

/// Result type for dictionary operations
pub type DictionaryResult<T> = Result<T, DictionaryError>;

/// Errors raised by dictionary stores and vocabulary repositories
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Record already exists: {0}")]
    Duplicate(String),
    #[error("Store is full ({0} entries)")]
    CapacityExceeded(usize),
    #[error("Storage I/O error: {0}")]
    Io(String),
    #[error("Storage serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        StorageError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> Self {
        StorageError::Serialization(error.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while grading a review
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// Quality grades must lie in `0..=5`; out-of-range values are rejected, not clamped
    #[error("Review quality must be between 0 and 5, got {0}")]
    InvalidQuality(i64),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for review operations
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Errors raised while building processing options or loading configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Density must be within [0, 1], got {0}")]
    InvalidDensity(f64),
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),
    #[error("Unknown proficiency level: {0}")]
    InvalidProficiency(String),
    #[error("Failed to read configuration: {0}")]
    Io(String),
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Parse(error.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
