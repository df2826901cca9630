//! Error types for the application

use thiserror::Error;

/// Result type alias using our AdjusterError
pub type Result<T> = std::result::Result<T, AdjusterError>;

/// Main error type for adjuster operations
#[derive(Error, Debug)]
pub enum AdjusterError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Metrics query failed for an account
    #[error("Metrics fetch error: {0}")]
    DataFetch(String),

    /// Campaign could not be resolved by name
    #[error("Campaign not found: {0}")]
    CampaignNotFound(String),

    /// Budget mutation was rejected by the campaign store
    #[error("Budget mutation error: {0}")]
    StoreMutation(String),

    /// Notification delivery failed
    #[error("Notification error: {0}")]
    Notify(String),

    /// Audit log append failed
    #[error("Audit log error: {0}")]
    Audit(String),

    /// Database errors from the audit log backend
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
