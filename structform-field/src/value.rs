//! A column paired with a value, as handed to editors.

use structform_schema::{Column, FieldValue};

/// Carries a value of `column` into rendering.
///
/// The value is normalized to the column's multiplicity: multi-value columns
/// always hold a sequence without empty entries, single-value columns a scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    column: Column,
    value: FieldValue,
    choices: Option<Vec<(String, String)>>,
}

impl Value {
    pub fn new(column: Column, value: FieldValue) -> Self {
        let mut this = Self {
            column,
            value: FieldValue::empty(),
            choices: None,
        };
        this.set_value(value);
        this
    }

    /// Render with a picker over `(row id, display)` pairs instead of a
    /// plain input, so the editor shows readable choices rather than ids.
    pub fn with_choices(mut self, choices: Vec<(String, String)>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Replace the value, normalized to the column's multiplicity.
    pub fn set_value(&mut self, value: FieldValue) {
        self.value = if self.column.is_multi() {
            let values = match value {
                FieldValue::Single(s) => vec![s],
                FieldValue::Multi(v) => v,
            };
            FieldValue::Multi(values.into_iter().filter(|v| !v.is_empty()).collect())
        } else {
            match value {
                FieldValue::Single(s) => FieldValue::Single(s),
                FieldValue::Multi(v) => FieldValue::Single(v.into_iter().next().unwrap_or_default()),
            }
        };
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn is_extended(&self) -> bool {
        self.choices.is_some()
    }

    /// The raw form of the value, as an editor expects it.
    pub fn raw_value(&self) -> FieldValue {
        let ty = self.column.field_type();
        self.value.map(|v| ty.raw_value(v))
    }

    /// Single-string human readable form.
    pub fn display_value(&self) -> String {
        let ty = self.column.field_type();
        self.value
            .values()
            .into_iter()
            .filter(|v| !v.is_empty())
            .map(|v| ty.display_value(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Editor markup for this value.
    pub fn value_editor(&self, name: &str, html_id: &str, multi_hint: &str) -> String {
        let ty = self.column.field_type();
        if let Some(choices) = &self.choices {
            let selected: Vec<String> = self
                .raw_value()
                .values()
                .into_iter()
                .map(String::from)
                .collect();
            return ty.choice_editor(name, &selected, choices, html_id, self.column.is_multi());
        }
        match self.raw_value() {
            FieldValue::Multi(values) => ty.multi_value_editor(name, &values, html_id, multi_hint),
            FieldValue::Single(value) => ty.value_editor(name, &value, html_id),
        }
    }
}
