//! In-memory schema catalog and query engine.
//!
//! `MemoryStore` holds schemas and their rows in process memory. Schemas can be
//! registered directly or loaded from a directory of YAML definitions:
//!
//! ```text
//! schemas/
//!   orders.yaml    ← one SchemaDef per file
//!   colors.yaml
//! ```
//!
//! Queries address exactly one schema. Rows get ascending row ids starting at 1
//! and are never persisted.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::column::{Schema, SchemaDef};
use crate::error::{Result, SchemaError};
use crate::query::{Cell, Comparator, QueryEngine, Row, SchemaCatalog, Search, ROWID};
use crate::value::FieldValue;

#[derive(Debug, Clone)]
struct StoredRow {
    rid: u64,
    values: HashMap<String, FieldValue>,
}

#[derive(Debug, Default)]
struct Tables {
    schemas: HashMap<String, Schema>,
    rows: HashMap<String, Vec<StoredRow>>,
    next_rid: u64,
}

/// Schema catalog and query engine backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given schemas.
    pub fn from_schemas(schemas: impl IntoIterator<Item = Schema>) -> Self {
        let mut tables = Tables::default();
        for schema in schemas {
            tables.schemas.insert(schema.name().to_string(), schema);
        }
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Register (or replace) a schema.
    pub async fn add_schema(&self, schema: Schema) {
        let mut tables = self.tables.write().await;
        debug!(schema = %schema.name(), columns = schema.columns().len(), "schema registered");
        tables.schemas.insert(schema.name().to_string(), schema);
    }

    /// Load every `.yaml` schema definition in `dir`. Invalid files are
    /// skipped with a warning. Returns the number of schemas loaded.
    pub async fn load_dir(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(SchemaError::NotInitialized {
                path: dir.to_path_buf(),
            });
        }

        let mut loaded = 0;
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let content = fs::read_to_string(&path).await?;
            let schema = serde_yaml::from_str::<SchemaDef>(&content)
                .map_err(SchemaError::from)
                .and_then(Schema::from_def);
            match schema {
                Ok(schema) => {
                    self.add_schema(schema).await;
                    loaded += 1;
                }
                Err(e) => {
                    warn!(?path, %e, "skipping invalid schema definition");
                }
            }
        }
        Ok(loaded)
    }

    /// Insert a row into `table` and return its row id.
    pub async fn insert<K, V>(
        &self,
        table: &str,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<u64>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut tables = self.tables.write().await;
        let schema = tables
            .schemas
            .get(table)
            .ok_or_else(|| SchemaError::UnknownTable {
                table: table.to_string(),
            })?;

        let mut row = HashMap::new();
        for (label, value) in values {
            let label = label.into();
            schema.find_column(&label)?;
            row.insert(label, value.into());
        }

        tables.next_rid += 1;
        let rid = tables.next_rid;
        tables
            .rows
            .entry(table.to_string())
            .or_default()
            .push(StoredRow { rid, values: row });
        debug!(%table, rid, "row inserted");
        Ok(rid)
    }
}

#[async_trait]
impl SchemaCatalog for MemoryStore {
    async fn load_schema(&self, table: &str) -> Result<Schema> {
        let tables = self.tables.read().await;
        tables
            .schemas
            .get(table)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownTable {
                table: table.to_string(),
            })
    }
}

#[async_trait]
impl QueryEngine for MemoryStore {
    async fn execute(&self, search: &Search) -> Result<Vec<Row>> {
        let [table] = search.schemas() else {
            return Err(SchemaError::InvalidQuery {
                message: format!(
                    "expected exactly one schema, got {}",
                    search.schemas().len()
                ),
            });
        };

        let tables = self.tables.read().await;
        let schema = tables
            .schemas
            .get(table)
            .ok_or_else(|| SchemaError::UnknownTable {
                table: table.clone(),
            })?;

        let referenced = search
            .columns()
            .iter()
            .chain(search.filters().iter().map(|f| &f.column))
            .chain(search.sorts().iter().map(|s| &s.column));
        for label in referenced {
            if label != ROWID {
                schema.find_column(label)?;
            }
        }

        let projection: Vec<String> = if search.columns().is_empty() {
            schema
                .columns()
                .iter()
                .map(|c| c.label().to_string())
                .collect()
        } else {
            search.columns().to_vec()
        };

        let empty = Vec::new();
        let mut rows: Vec<&StoredRow> = tables
            .rows
            .get(table)
            .unwrap_or(&empty)
            .iter()
            .filter(|row| {
                search.filters().iter().all(|f| {
                    cell_values(row, &f.column)
                        .iter()
                        .any(|v| matches(v, &f.value, f.comparator))
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            for sort in search.sorts() {
                let ordering = compare(
                    &cell_values(a, &sort.column).join(", "),
                    &cell_values(b, &sort.column).join(", "),
                );
                let ordering = if sort.ascending {
                    ordering
                } else {
                    ordering.reverse()
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.rid.cmp(&b.rid)
        });

        let limit = search.row_limit().unwrap_or(usize::MAX);
        let result = rows
            .into_iter()
            .take(limit)
            .map(|row| {
                projection
                    .iter()
                    .map(|label| project(schema, row, label))
                    .collect()
            })
            .collect::<Vec<Row>>();

        debug!(%table, rows = result.len(), "query executed");
        Ok(result)
    }
}

fn cell_values(row: &StoredRow, column: &str) -> Vec<String> {
    if column == ROWID {
        return vec![row.rid.to_string()];
    }
    match row.values.get(column) {
        Some(value) => value.values().into_iter().map(String::from).collect(),
        None => vec![String::new()],
    }
}

fn project(schema: &Schema, row: &StoredRow, label: &str) -> Cell {
    if label == ROWID {
        let rid = row.rid.to_string();
        return Cell::new(rid.clone(), rid);
    }
    let Ok(column) = schema.find_column(label) else {
        return Cell::new("", "");
    };
    let values = cell_values(row, label);
    let display = values
        .iter()
        .filter(|v| !v.is_empty())
        .map(|v| column.field_type().display_value(v))
        .collect::<Vec<_>>()
        .join(", ");
    Cell::new(values.join(", "), display)
}

/// Sort key of a stored value: finite numbers rank above any text.
#[derive(Debug)]
enum SortKey<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> SortKey<'a> {
    fn of(value: &'a str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => SortKey::Number(n),
            _ => SortKey::Text(value),
        }
    }
}

/// Total order over stored values. Numbers compare numerically, text
/// compares bytewise and sorts below every number, so a descending sort
/// puts the numeric maximum first even when some values are not numbers.
fn compare(a: &str, b: &str) -> Ordering {
    match (SortKey::of(a), SortKey::of(b)) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Less,
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Greater,
    }
}

fn matches(value: &str, expected: &str, comparator: Comparator) -> bool {
    let ordering = compare(value, expected);
    match comparator {
        Comparator::Eq => ordering == Ordering::Equal,
        Comparator::Ne => ordering != Ordering::Equal,
        Comparator::Lt => ordering == Ordering::Less,
        Comparator::Gt => ordering == Ordering::Greater,
    }
}
