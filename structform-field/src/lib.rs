//! Schema-backed form fields
//!
//! `structform-field` binds a form field to a column named `schema.field`,
//! validates submissions against the column's type and renders the field's
//! editor. It sits between a form engine (which owns the surrounding form) and
//! a schema store (which owns schemas and rows).
//!
//! # Architecture
//!
//! - **Degraded, not failed**: an unresolvable column is reported once and
//!   the field carries on without one, rendering nothing
//! - **Diagnostics are returned**: operations hand back user messages instead
//!   of printing them
//! - **Store behind traits**: queries go through `structform_schema::QueryEngine`
//!
//! ```rust,ignore
//! let engine = FieldEngine::from_store(store);
//! let (mut field, diagnostics) = engine.initialize(&["struct_field", "orders.id"]).await;
//! let outcome = engine.set_value(&mut field, "").await;
//! engine.render_field(&field, &mut RenderParams::new("orders_id"), &mut form);
//! ```

pub mod config;
pub mod diagnostics;
pub mod display;
pub mod engine;
pub mod error;
pub mod field;
pub mod form;
pub mod placeholder;
pub mod resolver;
pub mod validator;
pub mod value;

pub use config::{FieldConfig, Messages};
pub use diagnostics::{Diagnostic, Severity};
pub use display::{DisplayResolution, MultiValueResolver, PlaceholderMatch};
pub use engine::{FieldEngine, SetValueOutcome};
pub use error::{ConfigError, FieldError, Result};
pub use field::{FieldOptions, StructField};
pub use form::{FormRenderer, HtmlForm, RenderParams};
pub use placeholder::{NoPlaceholders, PlaceholderMap, PlaceholderReplacer};
pub use resolver::{parse_identifier, FieldResolver};
pub use validator::ValueValidator;
pub use value::Value;

pub use structform_schema::{Column, FieldType, FieldValue};
