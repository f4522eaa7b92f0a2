//! Display resolution of field values for substitution into templates.

use std::sync::LazyLock;

use regex::Regex;
use structform_schema::FieldValue;

static BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\(.*\)").expect("valid bracket pattern"));

/// One occurrence of a field reference in a template, as found by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMatch {
    /// The whole matched text.
    pub matched: String,
    /// Delimiter captured from a bracketed reference such as `@@tags(;)@@`.
    pub delimiter: Option<String>,
}

impl PlaceholderMatch {
    pub fn new(matched: impl Into<String>) -> Self {
        Self {
            matched: matched.into(),
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }
}

/// Formats a multi-value field per template occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiValueResolver {
    values: Vec<String>,
    separator: String,
}

impl MultiValueResolver {
    pub fn new(values: Vec<String>, separator: impl Into<String>) -> Self {
        Self {
            values,
            separator: separator.into(),
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Join the values for one occurrence.
    ///
    /// A bracketed reference uses its own delimiter. An empty sequence
    /// resolves to an empty string.
    pub fn resolve(&self, m: &PlaceholderMatch) -> String {
        let delimiter = match m.delimiter.as_deref() {
            Some(delimiter) if BRACKETS.is_match(&m.matched) => delimiter,
            _ => self.separator.as_str(),
        };
        self.values.join(delimiter)
    }
}

/// Result of resolving a field value for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayResolution {
    /// Not a lookup, the value as stored.
    Raw(FieldValue),
    /// Display values of the referenced rows.
    Resolved(String),
    /// Multi-value lookup, formatted per occurrence by the caller.
    Deferred(MultiValueResolver),
}

impl DisplayResolution {
    /// Text to substitute for the occurrence `m`.
    pub fn resolve(&self, m: &PlaceholderMatch) -> String {
        match self {
            DisplayResolution::Raw(value) => value.to_string(),
            DisplayResolution::Resolved(text) => text.clone(),
            DisplayResolution::Deferred(resolver) => resolver.resolve(m),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, DisplayResolution::Deferred(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> MultiValueResolver {
        MultiValueResolver::new(vec!["1".into(), "2".into()], ", ")
    }

    #[test]
    fn plain_reference_uses_separator() {
        assert_eq!(resolver().resolve(&PlaceholderMatch::new("@@sizes@@")), "1, 2");
    }

    #[test]
    fn bracketed_reference_uses_delimiter() {
        let m = PlaceholderMatch::new("@@sizes(;)@@").with_delimiter(";");
        assert_eq!(resolver().resolve(&m), "1;2");
    }

    #[test]
    fn delimiter_without_brackets_ignored() {
        let m = PlaceholderMatch::new("@@sizes@@").with_delimiter(";");
        assert_eq!(resolver().resolve(&m), "1, 2");
    }

    #[test]
    fn empty_values_resolve_to_empty_string() {
        let empty = MultiValueResolver::new(vec![], ", ");
        assert_eq!(empty.resolve(&PlaceholderMatch::new("@@sizes@@")), "");
        let bracketed = PlaceholderMatch::new("@@sizes(;)@@").with_delimiter(";");
        assert_eq!(empty.resolve(&bracketed), "");
    }

    #[test]
    fn resolution_variants() {
        let m = PlaceholderMatch::new("@@x@@");
        assert_eq!(
            DisplayResolution::Raw(FieldValue::from(vec!["a", "b"])).resolve(&m),
            "a, b"
        );
        assert_eq!(DisplayResolution::Resolved("Red".into()).resolve(&m), "Red");
        assert!(DisplayResolution::Deferred(resolver()).is_deferred());
    }
}
