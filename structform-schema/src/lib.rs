//! Schema catalog, column types and query interface
//!
//! `structform-schema` describes structured data: named schemas made of typed
//! columns, the validation and editor rules of each column type, and the
//! query interface used to read rows back.
//!
//! # Architecture
//!
//! - **Closed type catalog**: [`FieldType`] is a tagged enum, every type rule
//!   dispatches on it
//! - **Traits at the store boundary**: [`SchemaCatalog`] and [`QueryEngine`]
//!   are implemented by whatever backs the data
//! - **Reference store**: [`MemoryStore`] implements both in memory and loads
//!   schema definitions from YAML files

pub mod column;
pub mod error;
pub mod memory;
pub mod query;
pub mod types;
pub mod value;

pub use column::{Column, ColumnDef, Schema, SchemaDef};
pub use error::{Result, SchemaError, ValidationError};
pub use memory::MemoryStore;
pub use query::{Cell, Comparator, Filter, QueryEngine, Row, SchemaCatalog, Search, Sort, ROWID};
pub use types::FieldType;
pub use value::FieldValue;
