//! Field rendering and message configuration using Figment
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//! 1. Default values
//! 2. An optional configuration file (TOML, YAML or JSON, chosen by extension)
//! 3. Environment variables with the `STRUCTFORM_` prefix, nested keys separated
//!    by `__` (e.g. `STRUCTFORM_MESSAGES__REQUIRED`)

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "STRUCTFORM_";

/// User-facing message templates. `%s` is replaced by the column label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Messages {
    pub required: String,
    pub validation_prefix: String,
    pub multi_hint: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            required: "%s is required.".into(),
            validation_prefix: "Field [%s]: ".into(),
            multi_hint: "Separate multiple values with commas.".into(),
        }
    }
}

/// Messages are plain text: `%s` takes the label verbatim and escaping is
/// left to whoever displays the diagnostic.
impl Messages {
    pub fn required(&self, label: &str) -> String {
        self.required.replacen("%s", label, 1)
    }

    pub fn validation(&self, label: &str, message: &str) -> String {
        format!("{}{}", self.validation_prefix.replacen("%s", label, 1), message)
    }
}

/// Settings for resolving, validating and rendering fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    /// Language used for translated labels and hints.
    pub lang: String,
    /// CSS class applied to fields that failed validation.
    pub error_class: String,
    /// Markup appended to the label of non-optional fields.
    pub required_marker: String,
    /// Prefix of generated element ids.
    pub id_prefix: String,
    /// Joins display values of multiple lookup matches.
    pub lookup_separator: String,
    pub messages: Messages,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            lang: "en".into(),
            error_class: "bureaucracy_error".into(),
            required_marker: " <sup>*</sup>".into(),
            id_prefix: "struct__".into(),
            lookup_separator: ", ".into(),
            messages: Messages::default(),
        }
    }
}

impl FieldConfig {
    /// Load from defaults and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load from defaults, `path` (if given) and environment.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: FieldConfig = Self::figment(path)?.extract()?;
        debug!(lang = %config.lang, "field configuration loaded");
        Ok(config)
    }

    /// Build the figment with all sources in precedence order.
    pub fn figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FieldConfig::default()));

        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_lowercase();
            figment = match extension.as_str() {
                "toml" => figment.merge(Toml::file(path)),
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "json" => figment.merge(Json::file(path)),
                other => {
                    return Err(ConfigError::UnsupportedFormat {
                        format: other.to_string(),
                    })
                }
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}
