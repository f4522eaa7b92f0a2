//! Per-field state kept across one request.

use structform_schema::{Column, FieldValue};

/// Options given to a field in the form definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// The `schema.field` identifier as written.
    pub label: String,
    /// Empty submissions are accepted.
    pub optional: bool,
    /// Current value.
    pub value: FieldValue,
}

/// A form field bound to a schema column.
///
/// When the column could not be resolved the field is degraded: it holds an
/// empty value, never validates and renders nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    column: Option<Column>,
    pub(crate) opt: FieldOptions,
    pub(crate) error: bool,
    pub(crate) choices: Option<Vec<(String, String)>>,
}

impl StructField {
    pub fn new(identifier: impl Into<String>, column: Option<Column>) -> Self {
        Self {
            column,
            opt: FieldOptions {
                label: identifier.into(),
                ..FieldOptions::default()
            },
            error: false,
            choices: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.opt.label
    }

    pub fn column(&self) -> Option<&Column> {
        self.column.as_ref()
    }

    pub fn is_degraded(&self) -> bool {
        self.column.is_none()
    }

    pub fn value(&self) -> &FieldValue {
        &self.opt.value
    }

    pub fn is_optional(&self) -> bool {
        self.opt.optional
    }

    pub fn set_optional(&mut self, optional: bool) {
        self.opt.optional = optional;
    }

    /// `(row id, display)` pairs of the lookup target, loaded at
    /// initialization. `None` for other types or when loading failed.
    pub fn choices(&self) -> Option<&[(String, String)]> {
        self.choices.as_deref()
    }

    /// True if the last submitted value was rejected.
    pub fn has_error(&self) -> bool {
        self.error
    }
}
