//! Columns and schemas.
//!
//! A [`Schema`] is a named, ordered list of typed [`Column`]s. Schemas are
//! described on disk by a [`SchemaDef`] and turned into resolved columns that
//! know which table they belong to.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::types::FieldType;

/// Column definition as written in a schema file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDef {
    pub label: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    #[serde(default)]
    pub multi: bool,
    /// Translated labels keyed by language code.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Translated hints keyed by language code.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hints: BTreeMap<String, String>,
}

/// Schema definition as written in a schema file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaDef {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

/// A single typed slot within a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    table: String,
    label: String,
    type_: FieldType,
    multi: bool,
    labels: BTreeMap<String, String>,
    hints: BTreeMap<String, String>,
}

impl Column {
    pub fn new(table: impl Into<String>, label: impl Into<String>, type_: FieldType) -> Self {
        Self {
            table: table.into(),
            label: label.into(),
            type_,
            multi: false,
            labels: BTreeMap::new(),
            hints: BTreeMap::new(),
        }
    }

    fn from_def(table: &str, def: ColumnDef) -> Self {
        Self {
            table: table.to_string(),
            label: def.label,
            type_: def.type_,
            multi: def.multi,
            labels: def.labels,
            hints: def.hints,
        }
    }

    /// Mark the column as holding multiple values.
    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    /// Add a translated label.
    pub fn with_label(mut self, lang: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(lang.into(), label.into());
        self
    }

    /// Add a translated hint.
    pub fn with_hint(mut self, lang: impl Into<String>, hint: impl Into<String>) -> Self {
        self.hints.insert(lang.into(), hint.into());
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn field_type(&self) -> &FieldType {
        &self.type_
    }

    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// `table.label`
    pub fn full_qualified_label(&self) -> String {
        format!("{}.{}", self.table, self.label)
    }

    /// Label in `lang`, falling back to the plain label.
    pub fn translated_label(&self, lang: &str) -> &str {
        self.labels
            .get(lang)
            .map(String::as_str)
            .unwrap_or(&self.label)
    }

    /// Hint in `lang`, empty if none was given.
    pub fn translated_hint(&self, lang: &str) -> &str {
        self.hints.get(lang).map(String::as_str).unwrap_or("")
    }
}

/// A named collection of typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Build a schema from its on-disk definition, rejecting duplicate labels.
    pub fn from_def(def: SchemaDef) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(def.columns.len());
        for col in def.columns {
            if !seen.insert(col.label.clone()) {
                return Err(SchemaError::DuplicateColumn {
                    table: def.name,
                    label: col.label,
                });
            }
            columns.push(Column::from_def(&def.name, col));
        }
        Ok(Self {
            name: def.name,
            columns,
        })
    }

    /// Append a column of the given type. The column's table is this schema.
    pub fn column(mut self, column: Column) -> Self {
        let Column {
            label,
            type_,
            multi,
            labels,
            hints,
            ..
        } = column;
        self.columns.push(Column {
            table: self.name.clone(),
            label,
            type_,
            multi,
            labels,
            hints,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Find a column by its label.
    pub fn find_column(&self, label: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.label == label)
            .ok_or_else(|| SchemaError::UnknownColumn {
                table: self.name.clone(),
                label: label.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders() -> Schema {
        Schema::new("orders")
            .column(Column::new("", "id", FieldType::increment()))
            .column(
                Column::new("", "title", FieldType::text())
                    .with_label("de", "Titel")
                    .with_hint("en", "Short summary"),
            )
    }

    #[test]
    fn find_column_sets_table() {
        let schema = orders();
        let col = schema.find_column("title").unwrap();
        assert_eq!(col.table(), "orders");
        assert_eq!(col.full_qualified_label(), "orders.title");
    }

    #[test]
    fn find_missing_column_errors() {
        let schema = orders();
        assert!(matches!(
            schema.find_column("nope"),
            Err(SchemaError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn translations_fall_back() {
        let schema = orders();
        let col = schema.find_column("title").unwrap();
        assert_eq!(col.translated_label("de"), "Titel");
        assert_eq!(col.translated_label("fr"), "title");
        assert_eq!(col.translated_hint("en"), "Short summary");
        assert_eq!(col.translated_hint("de"), "");
    }

    #[test]
    fn schema_def_from_yaml() {
        let yaml = r#"
name: orders
columns:
  - label: id
    type:
      kind: increment
      zerofill: 5
  - label: color
    type:
      kind: lookup
      schema: colors
      field: name
  - label: tags
    type:
      kind: text
    multi: true
    labels:
      en: Tags
"#;
        let def: SchemaDef = serde_yaml::from_str(yaml).unwrap();
        let schema = Schema::from_def(def).unwrap();
        assert_eq!(schema.columns().len(), 3);
        let tags = schema.find_column("tags").unwrap();
        assert!(tags.is_multi());
        assert_eq!(tags.translated_label("en"), "Tags");
        assert!(schema.find_column("color").unwrap().field_type().is_lookup());
    }

    #[test]
    fn duplicate_labels_rejected() {
        let def = SchemaDef {
            name: "orders".into(),
            columns: vec![
                ColumnDef {
                    label: "id".into(),
                    type_: FieldType::increment(),
                    multi: false,
                    labels: BTreeMap::new(),
                    hints: BTreeMap::new(),
                },
                ColumnDef {
                    label: "id".into(),
                    type_: FieldType::text(),
                    multi: false,
                    labels: BTreeMap::new(),
                    hints: BTreeMap::new(),
                },
            ],
        };
        assert!(matches!(
            Schema::from_def(def),
            Err(SchemaError::DuplicateColumn { .. })
        ));
    }
}
