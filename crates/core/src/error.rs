//! Error types for the Veloce domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// Failure of any external capability: chat model, speech, weather,
/// geocoding, music or SMS.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    InvalidResponse(String),

    /// A local collaborator (store, player, speech program) failed.
    #[error("Dependency failed: {0}")]
    Dependency(String),
}

impl ProviderError {
    /// Map an HTTP status code to the matching variant.
    pub fn from_status(status_code: u16, body: String) -> Self {
        match status_code {
            429 => Self::RateLimited {
                retry_after_secs: 5,
            },
            401 | 403 => Self::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ),
            _ => Self::ApiError {
                status_code,
                message: body,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Vehicle not found: {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}
