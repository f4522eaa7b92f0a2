//! Test utilities for structform crates
//!
//! Shared fixtures so tests across crates agree on one set of schemas:
//!
//! - `orders`: `id` (increment), `title` (text, German label, English hint),
//!   `amount` (decimal, 0..=1000), `color` (lookup into `colors.name`),
//!   `tags` (multi text), `sizes` (multi lookup into `colors.name`)
//! - `colors`: `name` (text), seeded with `Red` (row 1) and `Blue` (row 2)
//!
//! [`RecordingEngine`] is a query engine that answers with canned rows and
//! remembers every search it was given.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use structform_schema::{
    Cell, Column, FieldType, MemoryStore, QueryEngine, Result, Row, Schema, SchemaCatalog,
    Search,
};
use tempfile::TempDir;

/// The `orders` fixture schema.
pub fn orders_schema() -> Schema {
    Schema::new("orders")
        .column(Column::new("orders", "id", FieldType::increment()))
        .column(
            Column::new("orders", "title", FieldType::text())
                .with_label("de", "Titel")
                .with_hint("en", "Short summary"),
        )
        .column(Column::new(
            "orders",
            "amount",
            FieldType::Decimal {
                min: Some(0.0),
                max: Some(1000.0),
            },
        ))
        .column(Column::new(
            "orders",
            "color",
            FieldType::lookup("colors", "name"),
        ))
        .column(Column::new("orders", "tags", FieldType::text()).multi(true))
        .column(Column::new("orders", "sizes", FieldType::lookup("colors", "name")).multi(true))
}

/// The `colors` fixture schema.
pub fn colors_schema() -> Schema {
    Schema::new("colors").column(Column::new("colors", "name", FieldType::text()))
}

/// A store holding both fixture schemas, `colors` seeded with Red and Blue.
pub async fn fixture_store() -> Arc<MemoryStore> {
    let store = MemoryStore::from_schemas([orders_schema(), colors_schema()]);
    for name in ["Red", "Blue"] {
        store
            .insert("colors", [("name", name)])
            .await
            .expect("fixture insert");
    }
    Arc::new(store)
}

/// Write `(file name, contents)` pairs into a fresh temporary directory.
pub fn schema_dir<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for (name, contents) in files {
        write_file(dir.path(), name, contents);
    }
    dir
}

fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write fixture file");
}

/// Query engine answering with canned rows, in order, and recording searches.
///
/// Once the canned responses run out every further query returns no rows.
/// Schemas are served from the fixture set.
#[derive(Default)]
pub struct RecordingEngine {
    responses: Mutex<VecDeque<Vec<Row>>>,
    searches: Mutex<Vec<Search>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue rows of `(value, display value)` cells for the next query.
    pub fn respond(self, rows: &[&[(&str, &str)]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|(v, d)| Cell::new(*v, *d)).collect())
            .collect();
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(rows);
        self
    }

    /// Every search executed so far.
    pub fn searches(&self) -> Vec<Search> {
        self.searches.lock().expect("searches lock").clone()
    }
}

#[async_trait]
impl QueryEngine for RecordingEngine {
    async fn execute(&self, search: &Search) -> Result<Vec<Row>> {
        self.searches
            .lock()
            .expect("searches lock")
            .push(search.clone());
        Ok(self
            .responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_default())
    }
}

#[async_trait]
impl SchemaCatalog for RecordingEngine {
    async fn load_schema(&self, table: &str) -> Result<Schema> {
        MemoryStore::from_schemas([orders_schema(), colors_schema()])
            .load_schema(table)
            .await
    }
}
