//! Domain error types
//!
//! Validation failures raised while constructing or mutating entities.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Language code is empty or longer than the column allows
    #[error("Invalid language code: {0}")]
    InvalidLanguageCode(String),

    /// Country code is longer than the column allows
    #[error("Invalid country code: {0}")]
    InvalidCountryCode(String),

    /// Locale string could not be parsed
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// A required text attribute is blank
    #[error("{field} must not be blank")]
    BlankField {
        /// Name of the offending attribute
        field: &'static str,
    },

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}
