//! The surrounding form that fields render into.

/// Parameters the form passes to a field when rendering it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderParams {
    /// Input name of the field in the submitted form.
    pub name: String,
    /// CSS class set on the field, e.g. for error styling.
    pub class: Option<String>,
}

impl RenderParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: None,
        }
    }
}

/// Integrates rendered fields into a form.
pub trait FormRenderer {
    /// True while a fieldset is open.
    fn in_fieldset(&self) -> bool;

    /// Open a new fieldset, closing the current one.
    fn start_fieldset(&mut self, legend: &str);

    /// Append one field's markup to the current fieldset.
    fn add_element(&mut self, html: String);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Fieldset {
    legend: String,
    elements: Vec<String>,
}

/// A minimal HTML form collecting fields into fieldsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlForm {
    id: String,
    fieldsets: Vec<Fieldset>,
    loose: Vec<String>,
}

impl HtmlForm {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Markup of every element added, in order.
    pub fn elements(&self) -> Vec<&str> {
        self.loose
            .iter()
            .chain(self.fieldsets.iter().flat_map(|f| f.elements.iter()))
            .map(String::as_str)
            .collect()
    }

    pub fn fieldset_count(&self) -> usize {
        self.fieldsets.len()
    }

    /// The complete form markup.
    pub fn render(&self) -> String {
        let mut html = format!(
            "<form id=\"{}\" method=\"post\">",
            html_escape::encode_double_quoted_attribute(&self.id)
        );
        for element in &self.loose {
            html.push_str(element);
        }
        for fieldset in &self.fieldsets {
            html.push_str("<fieldset>");
            if !fieldset.legend.is_empty() {
                html.push_str(&format!(
                    "<legend>{}</legend>",
                    html_escape::encode_text(&fieldset.legend)
                ));
            }
            for element in &fieldset.elements {
                html.push_str(element);
            }
            html.push_str("</fieldset>");
        }
        html.push_str("</form>");
        html
    }
}

impl FormRenderer for HtmlForm {
    fn in_fieldset(&self) -> bool {
        !self.fieldsets.is_empty()
    }

    fn start_fieldset(&mut self, legend: &str) {
        self.fieldsets.push(Fieldset {
            legend: legend.to_string(),
            elements: Vec::new(),
        });
    }

    fn add_element(&mut self, html: String) {
        match self.fieldsets.last_mut() {
            Some(fieldset) => fieldset.elements.push(html),
            None => self.loose.push(html),
        }
    }
}
