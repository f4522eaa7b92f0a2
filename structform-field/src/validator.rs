//! Checks submitted values against their column type.

use structform_schema::{Column, FieldValue};
use tracing::trace;

use crate::config::FieldConfig;
use crate::diagnostics::Diagnostic;

/// Validates values for a column, collecting one diagnostic per rejected entry.
pub struct ValueValidator<'a> {
    config: &'a FieldConfig,
}

impl<'a> ValueValidator<'a> {
    pub fn new(config: &'a FieldConfig) -> Self {
        Self { config }
    }

    /// Validate `rawvalue` for `column`.
    ///
    /// Scalar submissions to multi-value columns are split first and empty
    /// entries are dropped. Empty values always pass. Returns the cleaned
    /// value and the errors found; every entry is checked even after a failure.
    pub fn validate_value(
        &self,
        column: &Column,
        rawvalue: FieldValue,
    ) -> (FieldValue, Vec<Diagnostic>) {
        let ty = column.field_type();
        let rawvalue = match rawvalue {
            FieldValue::Single(s) if column.is_multi() => {
                FieldValue::Multi(if s.is_empty() { Vec::new() } else { ty.split_values(&s) })
            }
            other => other,
        };

        let mut errors = Vec::new();
        let mut check = |value: &str| -> String {
            if value.is_empty() {
                return String::new();
            }
            match ty.validate(value) {
                Ok(clean) => clean,
                Err(e) => {
                    let label = column.translated_label(&self.config.lang);
                    errors.push(Diagnostic::error(
                        self.config.messages.validation(label, &e.to_string()),
                    ));
                    value.to_string()
                }
            }
        };

        let value = match rawvalue {
            FieldValue::Single(s) => FieldValue::Single(check(&s)),
            FieldValue::Multi(values) => FieldValue::Multi(
                values
                    .into_iter()
                    .filter(|v| !v.is_empty())
                    .map(|v| check(&v))
                    .filter(|v| !v.is_empty())
                    .collect(),
            ),
        };

        trace!(
            column = %column.full_qualified_label(),
            errors = errors.len(),
            "value validated"
        );
        (value, errors)
    }
}
