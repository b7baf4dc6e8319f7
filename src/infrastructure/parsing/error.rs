//! Parsing error types
//!
//! Extraction itself never fails (a bad page yields an empty set); these errors
//! come from building parsers out of an invalid configuration.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid pattern: {pattern} - {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String, field: String },
}

impl ParsingError {
    /// Create an invalid selector error
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error for an empty or unusable field
    pub fn configuration(field: &str, message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            field: field.to_string(),
        }
    }

    /// Reject empty marker strings, which would match every element
    pub fn require_non_empty(field: &str, value: &str) -> ParsingResult<()> {
        if value.trim().is_empty() {
            return Err(Self::configuration(field, format!("'{field}' must not be empty")));
        }
        Ok(())
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
