//! Column types: validation, editor markup and display rules.
//!
//! The catalog is closed. Every column carries one [`FieldType`] and all
//! type-specific behaviour dispatches on it. Types serialize to/from YAML via
//! serde with a `kind` tag, so a schema definition reads:
//!
//! ```yaml
//! type:
//!   kind: lookup
//!   schema: colors
//!   field: name
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ValidationError;

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("valid decimal pattern")
});

/// True if `value` reads as a finite decimal number once leading whitespace
/// is ignored.
fn is_decimal(value: &str) -> bool {
    let value = value.trim_start();
    DECIMAL.is_match(value) && value.parse::<f64>().is_ok_and(f64::is_finite)
}

/// True if `value` survives being printed back with 14 significant digits,
/// the precision submitted increment values are stored with.
fn is_round_trip_stable(value: &str) -> bool {
    let Ok(number) = value.trim().parse::<f64>() else {
        return false;
    };
    format!("{number:.13e}")
        .parse::<f64>()
        .is_ok_and(|printed| printed == number)
}

/// The type of a column, determines how submitted values are checked and
/// how editors are rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldType {
    Text {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        prefix: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        postfix: String,
    },
    Decimal {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Decimal whose empty submissions default to one past the stored maximum.
    Increment {
        /// Minimum digit width when displaying, padded with zeros.
        #[serde(default)]
        zerofill: usize,
    },
    /// Row id pointing into `schema`, shown through that row's `field`.
    Lookup { schema: String, field: String },
}

impl FieldType {
    /// A text type without prefix or postfix.
    pub fn text() -> Self {
        FieldType::Text {
            prefix: String::new(),
            postfix: String::new(),
        }
    }

    /// A decimal type without bounds.
    pub fn decimal() -> Self {
        FieldType::Decimal {
            min: None,
            max: None,
        }
    }

    /// An increment type without zero padding.
    pub fn increment() -> Self {
        FieldType::Increment { zerofill: 0 }
    }

    /// A lookup into `schema`, displayed through `field`.
    pub fn lookup(schema: impl Into<String>, field: impl Into<String>) -> Self {
        FieldType::Lookup {
            schema: schema.into(),
            field: field.into(),
        }
    }

    /// Type name as used in CSS classes and logs.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text { .. } => "Text",
            FieldType::Decimal { .. } => "Decimal",
            FieldType::Increment { .. } => "Increment",
            FieldType::Lookup { .. } => "Lookup",
        }
    }

    pub fn is_increment(&self) -> bool {
        matches!(self, FieldType::Increment { .. })
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, FieldType::Lookup { .. })
    }

    /// Type-specific settings.
    pub fn config(&self) -> serde_json::Value {
        match self {
            FieldType::Text { prefix, postfix } => json!({ "prefix": prefix, "postfix": postfix }),
            FieldType::Decimal { min, max } => json!({ "min": min, "max": max }),
            FieldType::Increment { zerofill } => json!({ "zerofill": zerofill }),
            FieldType::Lookup { schema, field } => json!({ "schema": schema, "field": field }),
        }
    }

    /// Check a single submitted value and return the cleaned value to store.
    pub fn validate(&self, rawvalue: &str) -> Result<String, ValidationError> {
        match self {
            FieldType::Text { .. } => Ok(rawvalue.trim().to_string()),
            FieldType::Decimal { min, max } => {
                let value = rawvalue.trim().replace(',', ".");
                if !is_decimal(&value) {
                    return Err(ValidationError::DecimalRequired);
                }
                let number: f64 = value.parse().map_err(|_| ValidationError::DecimalRequired)?;
                if let Some(min) = *min {
                    if number < min {
                        return Err(ValidationError::DecimalMin { min });
                    }
                }
                if let Some(max) = *max {
                    if number > max {
                        return Err(ValidationError::DecimalMax { max });
                    }
                }
                Ok(value)
            }
            // Only trailing whitespace is stripped and no comma conversion
            // happens, the value is confirmed numeric but kept as submitted.
            FieldType::Increment { .. } => {
                let value = rawvalue.trim_end();
                if !is_decimal(value) || !is_round_trip_stable(value) {
                    return Err(ValidationError::DecimalRequired);
                }
                Ok(value.to_string())
            }
            FieldType::Lookup { .. } => {
                let value = rawvalue.trim();
                if value.is_empty() || value.parse::<u64>().is_ok() {
                    Ok(value.to_string())
                } else {
                    Err(ValidationError::LookupId {
                        value: value.to_string(),
                    })
                }
            }
        }
    }

    /// Split a comma separated submission of a multi-value column.
    pub fn split_values(&self, value: &str) -> Vec<String> {
        value.split(',').map(|v| v.trim().to_string()).collect()
    }

    /// Extract the raw value from a stored one.
    ///
    /// Lookups may be stored as a `["rid", "display"]` JSON pair.
    pub fn raw_value(&self, stored: &str) -> String {
        match self {
            FieldType::Lookup { .. } => match lookup_pair(stored) {
                Some((rid, _)) => rid,
                None => stored.to_string(),
            },
            _ => stored.to_string(),
        }
    }

    /// Human readable single-string form of a stored value.
    pub fn display_value(&self, stored: &str) -> String {
        match self {
            FieldType::Text { prefix, postfix } => {
                if stored.is_empty() {
                    String::new()
                } else {
                    format!("{prefix}{stored}{postfix}")
                }
            }
            FieldType::Decimal { .. } => stored.to_string(),
            FieldType::Increment { zerofill } => format!("{stored:0>zerofill$}"),
            FieldType::Lookup { .. } => match lookup_pair(stored) {
                Some((_, display)) => display,
                None => stored.to_string(),
            },
        }
    }

    /// Markup for editing a single value.
    pub fn value_editor(&self, name: &str, rawvalue: &str, html_id: &str) -> String {
        let class = format!("struct_{}", self.name().to_lowercase());
        let mut attributes = vec![
            ("name", name),
            ("value", rawvalue),
            ("class", class.as_str()),
            ("id", html_id),
        ];
        if let FieldType::Lookup { schema, field } = self {
            attributes.push(("data-schema", schema.as_str()));
            attributes.push(("data-field", field.as_str()));
        }
        format!("<input {} />", build_attributes(&attributes))
    }

    /// Markup for editing a multi-value column: one input holding the
    /// comma joined values plus a usage hint.
    pub fn multi_value_editor(
        &self,
        name: &str,
        rawvalues: &[String],
        html_id: &str,
        hint: &str,
    ) -> String {
        let value = rawvalues.join(", ");
        format!(
            "<div class=\"multiwrap\">{}</div><small>{}</small>",
            self.value_editor(name, &value, html_id),
            html_escape::encode_text(hint)
        )
    }

    /// Markup for picking from `choices`, given as `(row id, display)` pairs.
    ///
    /// Selected ids missing from `choices` are kept as extra options showing
    /// the id itself, so a submission is never silently dropped.
    pub fn choice_editor(
        &self,
        name: &str,
        selected: &[String],
        choices: &[(String, String)],
        html_id: &str,
        multiple: bool,
    ) -> String {
        let class = format!("struct_{}", self.name().to_lowercase());
        let mut attributes = vec![("name", name), ("class", class.as_str()), ("id", html_id)];
        if let FieldType::Lookup { schema, field } = self {
            attributes.push(("data-schema", schema.as_str()));
            attributes.push(("data-field", field.as_str()));
        }
        if multiple {
            attributes.push(("multiple", "multiple"));
        }

        let mut html = format!("<select {}>", build_attributes(&attributes));
        if !multiple {
            html.push_str("<option value=\"\"></option>");
        }
        let missing = selected
            .iter()
            .filter(|id| !id.is_empty() && !choices.iter().any(|(rid, _)| rid == *id))
            .map(|id| (id.clone(), id.clone()));
        for (rid, display) in choices.iter().cloned().chain(missing) {
            let mark = if selected.contains(&rid) {
                " selected=\"selected\""
            } else {
                ""
            };
            html.push_str(&format!(
                "<option value=\"{}\"{mark}>{}</option>",
                html_escape::encode_double_quoted_attribute(&rid),
                html_escape::encode_text(&display)
            ));
        }
        html.push_str("</select>");
        html
    }
}

fn lookup_pair(stored: &str) -> Option<(String, String)> {
    if !stored.starts_with('[') {
        return None;
    }
    let parsed: Vec<serde_json::Value> = serde_json::from_str(stored).ok()?;
    let as_string = |v: &serde_json::Value| match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    };
    let rid = parsed.first().map(as_string)?;
    let display = parsed.get(1).map(as_string).unwrap_or_else(|| rid.clone());
    Some((rid, display))
}

/// Render `key="value"` pairs with escaped values.
fn build_attributes(attributes: &[(&str, &str)]) -> String {
    attributes
        .iter()
        .map(|(key, value)| {
            format!(
                "{key}=\"{}\"",
                html_escape::encode_double_quoted_attribute(value)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}
