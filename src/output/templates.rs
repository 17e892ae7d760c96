// Template engine for the style guide document

use crate::error::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// Template engine wrapping Tera with custom filters and templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("guide.html", include_str!("../../templates/guide.html.tera")),
            ("section.html", include_str!("../../templates/section.html.tera")),
        ])?;

        tera.register_filter("pluralize", pluralize);
        tera.register_filter("slugify", slugify_filter);

        Ok(Self { tera })
    }

    /// Render the document shell
    pub fn render_guide(&self, page: &GuidePage) -> Result<String> {
        let context = Context::from_serialize(page)?;
        Ok(self.tera.render("guide.html", &context)?)
    }

    /// Render one numbered section around a prebuilt body
    pub fn render_section(&self, section: &SectionView) -> Result<String> {
        let context = Context::from_serialize(section)?;
        Ok(self.tera.render("section.html", &context)?)
    }
}

/// Everything the document shell needs
#[derive(Debug, Serialize)]
pub struct GuidePage {
    pub project_name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub generated: String,
    pub markup_files: usize,
    pub stylesheet_files: usize,
    pub show_toc: bool,
    pub toc: Vec<TocEntry>,
    /// Rendered `<section>` elements, in order
    pub sections: Vec<String>,
    pub stylesheets: Vec<InlineStylesheet>,
    pub external_stylesheets: Vec<&'static str>,
    pub guide_css: &'static str,
    pub guide_js: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub number: usize,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct InlineStylesheet {
    pub name: String,
    pub css: String,
}

/// One section handed to `section.html`
#[derive(Debug, Serialize)]
pub struct SectionView {
    pub id: String,
    pub number: usize,
    pub title: String,
    pub count: usize,
    /// Nouns for the count line
    pub noun: &'static str,
    pub plural: &'static str,
    pub body: String,
}

/// Pluralize a word based on count
fn pluralize(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let count = value.as_u64().unwrap_or(0);
    let singular = args
        .get("singular")
        .and_then(|v| v.as_str())
        .unwrap_or("item");
    let default_plural = format!("{}s", singular);
    let plural = args
        .get("plural")
        .and_then(|v| v.as_str())
        .unwrap_or(&default_plural);

    if count == 1 {
        Ok(Value::String(format!("{} {}", count, singular)))
    } else {
        Ok(Value::String(format!("{} {}", count, plural)))
    }
}

fn slugify_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value.as_str().unwrap_or("");
    Ok(Value::String(slugify(s)))
}

/// Convert text to an anchor-friendly slug
pub fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
