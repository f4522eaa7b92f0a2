//! Resolution of `schema.field` identifiers to columns.

use std::sync::Arc;

use structform_schema::{Column, Result, SchemaCatalog, SchemaError};
use tracing::debug;

/// Separator between schema and column label.
pub const SEPARATOR: char = '.';

/// Split `identifier` at the first separator into `(table, label)`.
///
/// Both parts must be non-empty.
pub fn parse_identifier(identifier: &str) -> Result<(&str, &str)> {
    match identifier.split_once(SEPARATOR) {
        Some((table, label)) if !table.is_empty() && !label.is_empty() => Ok((table, label)),
        _ => Err(SchemaError::MalformedIdentifier {
            identifier: identifier.to_string(),
        }),
    }
}

/// Looks up columns in a schema catalog.
#[derive(Clone)]
pub struct FieldResolver {
    catalog: Arc<dyn SchemaCatalog>,
}

impl FieldResolver {
    pub fn new(catalog: Arc<dyn SchemaCatalog>) -> Self {
        Self { catalog }
    }

    /// Find the column named by `identifier`.
    pub async fn resolve(&self, identifier: &str) -> Result<Column> {
        let (table, label) = parse_identifier(identifier)?;
        let schema = self.catalog.load_schema(table).await?;
        let column = schema.find_column(label)?.clone();
        debug!(%identifier, kind = column.field_type().name(), "column resolved");
        Ok(column)
    }
}
