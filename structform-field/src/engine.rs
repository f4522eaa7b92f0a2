//! FieldEngine: resolves, validates and renders schema-backed form fields.
//!
//! A field's life within one request:
//!
//! 1. [`FieldEngine::initialize`] resolves the column from the form definition
//!    and applies its options. A column that cannot be found is reported once
//!    and leaves the field degraded for good.
//! 2. [`FieldEngine::set_value`] runs each submission through placeholder
//!    detection, validation, autoincrement defaulting and the required check.
//! 3. [`FieldEngine::render_field`] adds the field's markup to the form.
//!
//! [`FieldEngine::replacement_value`] gives the display form used when the
//! submitted data is substituted into templates.

use std::path::Path;
use std::sync::Arc;

use structform_schema::{
    Column, Comparator, FieldType, FieldValue, QueryEngine, SchemaCatalog, Search, ROWID,
};
use tracing::{debug, trace, warn};
use ulid::Ulid;

use crate::config::FieldConfig;
use crate::diagnostics::Diagnostic;
use crate::display::{DisplayResolution, MultiValueResolver};
use crate::error::Result;
use crate::field::StructField;
use crate::form::{FormRenderer, RenderParams};
use crate::placeholder::{NoPlaceholders, PlaceholderReplacer};
use crate::resolver::FieldResolver;
use crate::validator::ValueValidator;
use crate::value::Value;

/// Result of [`FieldEngine::set_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetValueOutcome {
    /// The value now held by the field.
    pub value: FieldValue,
    /// True if the value was rejected.
    pub error: bool,
    /// Messages for the user, in the order they arose.
    pub diagnostics: Vec<Diagnostic>,
}

impl SetValueOutcome {
    pub fn is_accepted(&self) -> bool {
        !self.error
    }
}

/// Resolves, validates and renders fields against a schema catalog and store.
#[derive(Clone)]
pub struct FieldEngine {
    resolver: FieldResolver,
    query: Arc<dyn QueryEngine>,
    placeholders: Arc<dyn PlaceholderReplacer>,
    config: FieldConfig,
}

impl FieldEngine {
    pub fn new(catalog: Arc<dyn SchemaCatalog>, query: Arc<dyn QueryEngine>) -> Self {
        Self {
            resolver: FieldResolver::new(catalog),
            query,
            placeholders: Arc::new(NoPlaceholders),
            config: FieldConfig::default(),
        }
    }

    /// Use one store as both catalog and query engine.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: SchemaCatalog + QueryEngine + 'static,
    {
        Self::new(store.clone(), store)
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_placeholders(mut self, placeholders: Arc<dyn PlaceholderReplacer>) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Replace the configuration with one loaded from defaults, `path` (if
    /// given) and the environment.
    pub fn load_config(self, path: Option<&Path>) -> Result<Self> {
        let config = FieldConfig::load_from(path)?;
        Ok(self.with_config(config))
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    /// Create a field from its form definition `[cmd, "schema.field", options...]`.
    ///
    /// Options: `!` makes the field optional, `=value` sets an initial value
    /// (validated like a submission). Anything else is ignored.
    pub async fn initialize(&self, args: &[&str]) -> (StructField, Vec<Diagnostic>) {
        let identifier = args.get(1).copied().unwrap_or_default();
        let mut diagnostics = Vec::new();

        let column = match self.resolver.resolve(identifier).await {
            Ok(column) => Some(column),
            Err(e) => {
                debug!(%identifier, %e, "field degraded, column not resolved");
                diagnostics.push(Diagnostic::error(e.to_string()));
                None
            }
        };
        let mut choices = None;
        if let Some(column) = column.as_ref().filter(|c| c.field_type().is_lookup()) {
            match self.lookup_choices(column).await {
                Ok(loaded) => choices = Some(loaded),
                Err(e) => {
                    warn!(%identifier, %e, "lookup choices not loaded, rendering plain input");
                    diagnostics.push(Diagnostic::warning(e.to_string()));
                }
            }
        }
        let mut field = StructField::new(identifier, column);
        field.choices = choices;

        for arg in args.iter().skip(2) {
            if *arg == "!" {
                field.set_optional(true);
            } else if let Some(value) = arg.strip_prefix('=') {
                let outcome = self.set_value(&mut field, value).await;
                diagnostics.extend(outcome.diagnostics);
            } else {
                trace!(%identifier, option = %arg, "ignoring unknown field option");
            }
        }

        (field, diagnostics)
    }

    /// Set and validate a submitted value.
    ///
    /// The field's error flag reflects this submission only. Nothing here
    /// fails hard: rejections set the flag and come back as diagnostics.
    pub async fn set_value(
        &self,
        field: &mut StructField,
        rawvalue: impl Into<FieldValue>,
    ) -> SetValueOutcome {
        let mut value = rawvalue.into();
        let mut diagnostics = Vec::new();
        field.error = false;

        let Some(column) = field.column().cloned() else {
            field.opt.value = FieldValue::empty();
            return SetValueOutcome {
                value: FieldValue::empty(),
                error: false,
                diagnostics,
            };
        };

        let replaced = value.map(|v| self.placeholders.replace(v));
        if replaced == value {
            let (validated, errors) =
                ValueValidator::new(&self.config).validate_value(&column, value);
            value = validated;
            field.error = !errors.is_empty();
            diagnostics.extend(errors);
        } else {
            trace!(identifier = %field.identifier(), "placeholder value, validation skipped");
        }

        if value.is_falsy() && column.field_type().is_increment() {
            match self.next_increment(&column).await {
                Ok(next) => value = next,
                Err(e) => {
                    warn!(column = %column.full_qualified_label(), %e, "autoincrement lookup failed");
                    field.error = true;
                    diagnostics.push(Diagnostic::error(e.to_string()));
                }
            }
        }

        if value.is_empty() && !field.is_optional() {
            field.error = true;
            let label = column.translated_label(&self.config.lang);
            diagnostics.push(Diagnostic::error(self.config.messages.required(label)));
        }

        // The display expansion of the previous value is computed and then
        // replaced by the submitted value right away, the editor always gets
        // the raw value.
        if column.is_multi() {
            match self.replacement_value(field).await {
                Ok(expanded) => {
                    trace!(identifier = %field.identifier(), ?expanded, "multi-value expansion discarded")
                }
                Err(e) => {
                    trace!(identifier = %field.identifier(), %e, "multi-value expansion failed")
                }
            }
        }

        field.opt.value = value.clone();
        SetValueOutcome {
            value,
            error: field.error,
            diagnostics,
        }
    }

    /// Next value for an autoincrement column: one past the largest stored
    /// value, or 1 for an empty table.
    ///
    /// This reads the maximum and adds one without holding any lock, so two
    /// concurrent submissions can both receive the same value. Uniqueness has
    /// to be enforced where the row is written.
    async fn next_increment(&self, column: &Column) -> structform_schema::Result<FieldValue> {
        let search = Search::new()
            .schema(column.table())
            .column(column.label())
            .sort(column.label(), false)
            .limit(1);
        let rows = self.query.execute(&search).await?;

        let next = match rows.first().and_then(|row| row.first()) {
            Some(cell) => {
                let current = cell.as_f64().unwrap_or_else(|| {
                    warn!(
                        column = %column.full_qualified_label(),
                        value = %cell.value(),
                        "non-numeric autoincrement value, counting from zero"
                    );
                    0.0
                });
                current + 1.0
            }
            None => 1.0,
        };

        debug!(column = %column.full_qualified_label(), next, "autoincrement value computed");
        Ok(FieldValue::Single(format_number(next)))
    }

    /// `(row id, display)` pairs of every row a lookup column can point to.
    /// Empty for other column types.
    pub async fn lookup_choices(
        &self,
        column: &Column,
    ) -> structform_schema::Result<Vec<(String, String)>> {
        let FieldType::Lookup { schema, field } = column.field_type() else {
            return Ok(Vec::new());
        };
        let search = Search::new()
            .schema(schema.as_str())
            .column(ROWID)
            .column(field.as_str());
        let rows = self.query.execute(&search).await?;

        let choices = rows
            .iter()
            .filter_map(|row| {
                let rid = row.first()?;
                let display = row.get(1).map_or(rid.value(), |cell| cell.display_value());
                Some((rid.value().to_string(), display.to_string()))
            })
            .collect::<Vec<_>>();
        debug!(
            column = %column.full_qualified_label(),
            choices = choices.len(),
            "lookup choices loaded"
        );
        Ok(choices)
    }

    /// Display form of the field's current value.
    ///
    /// Non-lookup values are returned unchanged. Multi-value lookups are
    /// deferred to the caller for per-occurrence formatting. A single lookup
    /// is replaced by the display values of all rows with that row id.
    pub async fn replacement_value(&self, field: &StructField) -> Result<DisplayResolution> {
        let value = field.value();
        let Some(FieldType::Lookup {
            schema,
            field: target,
        }) = field.column().map(Column::field_type)
        else {
            return Ok(DisplayResolution::Raw(value.clone()));
        };

        let rid = match value {
            FieldValue::Multi(values) => {
                return Ok(DisplayResolution::Deferred(MultiValueResolver::new(
                    values.clone(),
                    self.config.lookup_separator.clone(),
                )))
            }
            FieldValue::Single(rid) => rid,
        };

        let search = Search::new()
            .schema(schema.as_str())
            .column(target.as_str())
            .filter(ROWID, rid.as_str(), Comparator::Eq);
        let rows = self.query.execute(&search).await?;

        let display = rows
            .iter()
            .filter_map(|row| row.first())
            .map(|cell| cell.display_value())
            .collect::<Vec<_>>()
            .join(self.config.lookup_separator.as_str());
        Ok(DisplayResolution::Resolved(display))
    }

    /// Add the field to `form`. Degraded fields render nothing.
    pub fn render_field(
        &self,
        field: &StructField,
        params: &mut RenderParams,
        form: &mut dyn FormRenderer,
    ) {
        let Some(column) = field.column() else {
            return;
        };

        if !form.in_fieldset() {
            form.start_fieldset("");
        }
        if field.has_error() {
            params.class = Some(self.config.error_class.clone());
        }

        let mut value = Value::new(column.clone(), field.value().clone());
        if let Some(choices) = field.choices() {
            value = value.with_choices(choices.to_vec());
        }
        form.add_element(self.make_field(field, &value, &params.name));
    }

    /// Markup of one field: label with hint and required marker, plus the
    /// type's editor. Each call uses a fresh element id.
    pub fn make_field(&self, field: &StructField, value: &Value, name: &str) -> String {
        let lang = &self.config.lang;
        let column = value.column();
        let trans = html_escape::encode_text(column.translated_label(lang));
        let hint = html_escape::encode_double_quoted_attribute(column.translated_hint(lang));
        let class = if hint.is_empty() { "" } else { "hashint" };
        let lclass = if field.has_error() {
            self.config.error_class.as_str()
        } else {
            ""
        };
        let colname = column.full_qualified_label();
        let colname = html_escape::encode_double_quoted_attribute(&colname);
        let required = if field.is_optional() {
            ""
        } else {
            self.config.required_marker.as_str()
        };

        let id = format!(
            "{}{}",
            self.config.id_prefix,
            Ulid::new().to_string().to_lowercase()
        );
        let input = value.value_editor(name, &id, &self.config.messages.multi_hint);

        let mut html = String::from("<div class=\"field\">");
        html.push_str(&format!(
            "<label class=\"{lclass}\" data-column=\"{colname}\" for=\"{id}\">"
        ));
        html.push_str(&format!(
            "<span class=\"label {class}\" title=\"{hint}\">{trans}{required}</span>"
        ));
        html.push_str("</label>");
        html.push_str(&format!("<span class=\"input\">{input}</span>"));
        html.push_str("</div>");
        html
    }
}

/// Integral numbers without a fractional part, others in shortest form.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use crate::form::HtmlForm;
    use structform_schema::{MemoryStore, Schema};
    use structform_test_utils::{fixture_store, RecordingEngine};

    async fn engine() -> FieldEngine {
        FieldEngine::from_store(fixture_store().await)
    }

    fn recording(engine: RecordingEngine) -> (FieldEngine, Arc<RecordingEngine>) {
        let engine = Arc::new(engine);
        (FieldEngine::from_store(engine.clone()), engine)
    }

    #[test]
    fn format_number_drops_integral_fraction() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(42.5), "42.5");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[tokio::test]
    async fn degraded_field_forces_empty_value() {
        let engine = engine().await;
        let (mut field, diagnostics) = engine
            .initialize(&["struct_field", "orders.missing"])
            .await;
        assert!(field.is_degraded());
        assert_eq!(diagnostics.len(), 1);

        let outcome = engine.set_value(&mut field, "12.5abc").await;
        assert!(!outcome.error);
        assert_eq!(outcome.value, FieldValue::empty());
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(field.value(), &FieldValue::empty());
    }

    #[tokio::test]
    async fn increment_defaults_to_one_on_empty_table() {
        let (engine, recorder) = recording(RecordingEngine::new());
        let (mut field, _) = engine.initialize(&["struct_field", "orders.id"]).await;

        let outcome = engine.set_value(&mut field, "").await;
        assert_eq!(outcome.value, FieldValue::from("1"));
        assert!(outcome.is_accepted());

        let searches = recorder.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].schemas(), ["orders"]);
        assert_eq!(searches[0].columns(), ["id"]);
        assert!(!searches[0].sorts()[0].ascending);
        assert_eq!(searches[0].row_limit(), Some(1));
    }

    #[tokio::test]
    async fn increment_defaults_to_max_plus_one() {
        let (engine, _) = recording(RecordingEngine::new().respond(&[&[("41", "41")]]));
        let (mut field, _) = engine.initialize(&["struct_field", "orders.id"]).await;
        let outcome = engine.set_value(&mut field, "").await;
        assert_eq!(outcome.value, FieldValue::from("42"));
    }

    #[tokio::test]
    async fn increment_zero_counts_as_empty() {
        let (engine, _) = recording(RecordingEngine::new().respond(&[&[("9", "9")]]));
        let (mut field, _) = engine.initialize(&["struct_field", "orders.id"]).await;
        let outcome = engine.set_value(&mut field, "0").await;
        assert_eq!(outcome.value, FieldValue::from("10"));
    }

    #[tokio::test]
    async fn increment_keeps_given_value() {
        let (engine, recorder) = recording(RecordingEngine::new());
        let (mut field, _) = engine.initialize(&["struct_field", "orders.id"]).await;
        let outcome = engine.set_value(&mut field, "7  ").await;
        assert_eq!(outcome.value, FieldValue::from("7"));
        assert!(recorder.searches().is_empty());
    }

    #[tokio::test]
    async fn required_field_rejects_empty() {
        let engine = engine().await;
        let (mut field, _) = engine.initialize(&["struct_field", "orders.title"]).await;
        let outcome = engine.set_value(&mut field, "").await;
        assert!(outcome.error);
        assert!(field.has_error());
        assert_eq!(outcome.diagnostics[0].message, "title is required.");
    }

    #[tokio::test]
    async fn optional_field_accepts_empty() {
        let engine = engine().await;
        let (mut field, _) = engine
            .initialize(&["struct_field", "orders.title", "!"])
            .await;
        let outcome = engine.set_value(&mut field, "").await;
        assert!(!outcome.error);
        assert!(outcome.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn lookup_choices_loaded_at_initialize() {
        let engine = engine().await;
        let (field, diagnostics) = engine.initialize(&["struct_field", "orders.color"]).await;
        assert!(diagnostics.is_empty());
        assert_eq!(
            field.choices(),
            Some(
                &[
                    ("1".to_string(), "Red".to_string()),
                    ("2".to_string(), "Blue".to_string())
                ][..]
            )
        );

        let (field, _) = engine.initialize(&["struct_field", "orders.title"]).await;
        assert!(field.choices().is_none());
    }

    #[tokio::test]
    async fn unloadable_choices_warn_and_fall_back() {
        let store = MemoryStore::from_schemas([Schema::new("orders").column(Column::new(
            "orders",
            "owner",
            FieldType::lookup("people", "name"),
        ))]);
        let engine = FieldEngine::from_store(Arc::new(store));
        let (field, diagnostics) = engine.initialize(&["struct_field", "orders.owner"]).await;

        assert!(!field.is_degraded());
        assert!(field.choices().is_none());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].message, "schema not found: people");

        let mut form = HtmlForm::new("f");
        engine.render_field(&field, &mut RenderParams::new("owner"), &mut form);
        assert!(form.elements()[0].contains("<input "));
    }

    #[tokio::test]
    async fn render_degraded_field_is_noop() {
        let engine = engine().await;
        let (field, _) = engine.initialize(&["struct_field", "nope"]).await;
        let mut form = HtmlForm::new("f");
        engine.render_field(&field, &mut RenderParams::new("nope"), &mut form);
        assert!(form.elements().is_empty());
        assert_eq!(form.fieldset_count(), 0);
    }
}
