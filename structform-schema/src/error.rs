//! Error types for schema resolution, queries and value validation

use std::path::PathBuf;
use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors that can occur while resolving schemas, columns or running queries
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Identifier is not of the form `schema.field`
    #[error("Field '{identifier}' not given in schema.field form")]
    MalformedIdentifier { identifier: String },

    /// No schema with this name exists
    #[error("schema not found: {table}")]
    UnknownTable { table: String },

    /// The schema exists but has no column with this label
    #[error("column not found: {table}.{label}")]
    UnknownColumn { table: String, label: String },

    /// A schema definition declares the same label twice
    #[error("duplicate column '{label}' in schema '{table}'")]
    DuplicateColumn { table: String, label: String },

    /// The query builder was used in a way the engine cannot execute
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// Schema directory not found
    #[error("schema directory not found: {path}")]
    NotInitialized { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A submitted value was rejected by its column type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("decimal required")]
    DecimalRequired,

    #[error("value must be at least {min}")]
    DecimalMin { min: f64 },

    #[error("value must be at most {max}")]
    DecimalMax { max: f64 },

    /// Lookup values are row identifiers
    #[error("lookup failed: '{value}' is not a row id")]
    LookupId { value: String },
}
