//! Placeholder substitution in submitted values.
//!
//! Values containing placeholders (e.g. `@USER@`) are filled in by the form
//! engine later; a value that changes under substitution is not validated.

use std::collections::BTreeMap;

/// Substitutes placeholders in a value.
pub trait PlaceholderReplacer: Send + Sync {
    fn replace(&self, value: &str) -> String;
}

/// Knows no placeholders, every value is returned unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlaceholders;

impl PlaceholderReplacer for NoPlaceholders {
    fn replace(&self, value: &str) -> String {
        value.to_string()
    }
}

/// Literal token substitution.
///
/// ```rust,ignore
/// let placeholders = PlaceholderMap::new()
///     .with("@USER@", "alice")
///     .with("@DATE@", "2024-01-01");
/// assert_eq!(placeholders.replace("by @USER@"), "by alice");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap {
    tokens: BTreeMap<String, String>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), replacement.into());
        self
    }
}

impl PlaceholderReplacer for PlaceholderMap {
    fn replace(&self, value: &str) -> String {
        self.tokens
            .iter()
            .fold(value.to_string(), |acc, (token, replacement)| {
                acc.replace(token.as_str(), replacement)
            })
    }
}
