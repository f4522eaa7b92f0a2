//! Query interface over the backing store.
//!
//! [`Search`] is a plain description of a query; a [`QueryEngine`] executes
//! it and returns [`Row`]s of [`Cell`]s in the order of the selected columns.

use async_trait::async_trait;

use crate::column::Schema;
use crate::error::Result;

/// Pseudo-column addressing a row's identifier in filters and sorts.
pub const ROWID: &str = "%rowid%";

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Gt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: String,
    pub comparator: Comparator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub column: String,
    pub ascending: bool,
}

/// Builder describing a query.
///
/// ```rust,ignore
/// let search = Search::new()
///     .schema("orders")
///     .column("id")
///     .sort("id", false)
///     .limit(1);
/// let rows = engine.execute(&search).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Search {
    schemas: Vec<String>,
    columns: Vec<String>,
    filters: Vec<Filter>,
    sorts: Vec<Sort>,
    limit: Option<usize>,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema to query.
    pub fn schema(mut self, name: impl Into<String>) -> Self {
        self.schemas.push(name.into());
        self
    }

    /// Add a column to the result projection.
    pub fn column(mut self, label: impl Into<String>) -> Self {
        self.columns.push(label.into());
        self
    }

    /// Keep only rows whose `column` compares to `value`.
    pub fn filter(
        mut self,
        column: impl Into<String>,
        value: impl Into<String>,
        comparator: Comparator,
    ) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
            comparator,
        });
        self
    }

    /// Sort by `column`. Earlier sorts take precedence.
    pub fn sort(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.sorts.push(Sort {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Return at most `limit` rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }
}

/// One result cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    value: String,
    display_value: String,
}

impl Cell {
    pub fn new(value: impl Into<String>, display_value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display_value: display_value.into(),
        }
    }

    /// The stored value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The stored value read as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Human readable form of the value.
    pub fn display_value(&self) -> &str {
        &self.display_value
    }
}

/// One result row, cells ordered like the query's columns.
pub type Row = Vec<Cell>;

/// Source of schema definitions.
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Load the schema named `table`. Fails with `UnknownTable` if absent.
    async fn load_schema(&self, table: &str) -> Result<Schema>;
}

/// Executes [`Search`]es against the backing store.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn execute(&self, search: &Search) -> Result<Vec<Row>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_parts() {
        let search = Search::new()
            .schema("orders")
            .column("id")
            .filter(ROWID, "3", Comparator::Eq)
            .sort("id", false)
            .limit(1);
        assert_eq!(search.schemas(), ["orders"]);
        assert_eq!(search.columns(), ["id"]);
        assert_eq!(search.filters()[0].column, "%rowid%");
        assert!(!search.sorts()[0].ascending);
        assert_eq!(search.row_limit(), Some(1));
    }

    #[test]
    fn cell_numeric_view() {
        assert_eq!(Cell::new("41", "41").as_f64(), Some(41.0));
        assert_eq!(Cell::new("abc", "abc").as_f64(), None);
        assert_eq!(Cell::new(" 2.5 ", "2.5").as_f64(), Some(2.5));
    }
}
