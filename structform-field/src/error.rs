//! Error types for form fields and their configuration

use std::path::PathBuf;
use structform_schema::SchemaError;
use thiserror::Error;

/// Result type for field operations
pub type Result<T> = std::result::Result<T, FieldError>;

/// Errors that can occur in field operations
#[derive(Debug, Error)]
pub enum FieldError {
    /// Schema resolution or query failure
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration file format not supported
    #[error("Unsupported configuration file format: {format}")]
    UnsupportedFormat { format: String },

    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: Box<figment::Error>,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_is_transparent() {
        let err = FieldError::from(SchemaError::UnknownTable {
            table: "orders".into(),
        });
        assert_eq!(err.to_string(), "schema not found: orders");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnsupportedFormat {
            format: "ini".into(),
        };
        assert!(err.to_string().contains("ini"));
    }
}
