use miette::{Diagnostic, Result};
use thiserror::Error;

use crate::ical::ParseError;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Calendar parse error: {0}")]
    #[diagnostic(code(inboxics::parse))]
    Parse(#[from] ParseError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(inboxics::serialization))]
    Serialization(String),

    #[error("Encoding error: {0}")]
    #[diagnostic(code(inboxics::encoding))]
    Encoding(String),

    #[error("Feed fetch error: {0}")]
    #[diagnostic(code(inboxics::fetch))]
    Fetch(String),

    #[error("Delivery error: {0}")]
    #[diagnostic(code(inboxics::delivery))]
    Delivery(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(inboxics::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(inboxics::config))]
    Config(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(inboxics::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(inboxics::io))]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    #[diagnostic(code(inboxics::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type RelayResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create serialization errors
pub fn serialization_error(message: &str) -> Error {
    Error::Serialization(message.to_string())
}

/// Helper to create encoding errors
pub fn encoding_error(message: &str) -> Error {
    Error::Encoding(message.to_string())
}

/// Helper to create feed fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create delivery errors
pub fn delivery_error(message: &str) -> Error {
    Error::Delivery(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}
