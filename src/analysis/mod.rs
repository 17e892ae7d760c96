// Analysis pipeline: uploaded files in, one AnalysisResult out

pub mod classify;
pub mod extract;
pub mod rules;
pub mod sanitize;
pub mod tokens;

pub use classify::classify;
pub use extract::DocumentScanner;
pub use rules::Component;
pub use sanitize::Sanitizer;
pub use tokens::{classify_variable, extract_tokens, TokenCategory};

use crate::config::Config;
use crate::input::{FileCounts, FileKind, UploadedFile};
use crate::session::Session;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Everything one analysis pass learned about a file set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub counts: FileCounts,
    pub classes: BTreeSet<String>,
    pub ids: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    /// Literal color tokens, verbatim
    pub colors: BTreeSet<String>,
    /// Icon-looking class tokens
    pub icons: BTreeSet<String>,
    /// Custom properties, unique by name, first seen wins
    pub css_variables: Vec<CssVariable>,
    pub favicons: Vec<Favicon>,
    pub og_tags: Vec<OgTag>,
    /// Unique by selector, most frequent first
    pub typography: Vec<TypographyEntry>,
    /// Component buckets derived from `classes` and `ids`
    pub components: BTreeMap<Component, Vec<String>>,
    /// Captured samples per category, unique by selector, most frequent first
    pub extracted: BTreeMap<Component, Vec<MarkupSample>>,
    /// Number of elements carrying each class token
    pub class_frequency: BTreeMap<String, usize>,
    pub observations: Observations,
}

/// A CSS custom property, stored without the leading `--`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssVariable {
    pub name: String,
    pub value: String,
    pub category: TokenCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favicon {
    pub href: String,
    pub rel: String,
    pub sizes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OgTag {
    pub property: String,
    pub content: String,
}

/// A heading or title-like element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypographyEntry {
    /// Class attribute, `#id`, or tag name
    pub selector: String,
    pub tag: String,
    pub sample_text: String,
    pub occurrences: usize,
}

/// One captured component sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupSample {
    /// Dedup key within the category
    pub selector: String,
    pub tag: String,
    /// Sanitized, reflowed markup
    pub html: String,
    pub text: Option<String>,
    pub occurrences: usize,
}

/// Raw per-element observations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Observations {
    pub buttons: Vec<ElementObservation>,
    pub inputs: Vec<ElementObservation>,
    pub tables: Vec<ElementObservation>,
    pub modals: Vec<ElementObservation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementObservation {
    pub tag: String,
    pub class: Option<String>,
    pub id: Option<String>,
    pub text: Option<String>,
    pub input_type: Option<String>,
}

impl AnalysisResult {
    /// Samples captured for one category
    pub fn samples(&self, component: Component) -> &[MarkupSample] {
        self.extracted
            .get(&component)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Bucketed selectors for one category
    pub fn bucket(&self, component: Component) -> &[String] {
        self.components
            .get(&component)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Custom properties classified as colors
    pub fn color_variables(&self) -> impl Iterator<Item = &CssVariable> {
        self.css_variables
            .iter()
            .filter(|v| v.category == TokenCategory::Color)
    }
}

/// Main analyzer that orchestrates the analysis pipeline
pub struct Analyzer {
    config: Config,
    verbose: bool,
}

impl Analyzer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            verbose: false,
        }
    }

    /// Create analyzer with a progress bar over markup files
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Analyze a full file set.
    ///
    /// Stylesheets are read before markup so external declarations win the
    /// first-seen rule over inline `<style>` blocks. Never fails: unparseable
    /// content yields an empty or partial result.
    pub fn analyze(&self, files: &[UploadedFile], session: &Session) -> AnalysisResult {
        let mut result = AnalysisResult {
            counts: FileCounts::from_files(files),
            ..Default::default()
        };

        for file in files.iter().filter(|f| f.kind == FileKind::Stylesheet) {
            debug!("Reading tokens from {}", file.name);
            extract_tokens(&file.content, &mut result);
        }

        let sanitizer = Sanitizer::new()
            .with_images(session.images())
            .with_neutral_links(self.config.output.neutralize_links);
        let scanner = DocumentScanner::new(sanitizer);

        let markup: Vec<&UploadedFile> = files
            .iter()
            .filter(|f| f.kind == FileKind::Markup)
            .collect();

        let progress = self.progress_bar(markup.len());
        let mut inline_styles = Vec::new();

        for file in markup {
            if let Some(ref pb) = progress {
                pb.set_message(file.name.clone());
                pb.inc(1);
            }
            debug!("Scanning {}", file.name);
            inline_styles.extend(scanner.scan(&file.content, &mut result));
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Scan complete");
        }

        for css in &inline_styles {
            extract_tokens(css, &mut result);
        }

        for samples in result.extracted.values_mut() {
            samples.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
        }
        result
            .typography
            .sort_by(|a, b| b.occurrences.cmp(&a.occurrences));

        result.components = classify(&result);

        info!(
            "Analyzed {} files: {} classes, {} variables, {} colors",
            result.counts.total(),
            result.classes.len(),
            result.css_variables.len(),
            result.colors.len()
        );

        result
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.verbose {
            return None;
        }
        let pb = ProgressBar::new(len as u64);
        let template = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup(name: &str, html: &str) -> UploadedFile {
        UploadedFile::text(name, FileKind::Markup, html)
    }

    fn stylesheet(name: &str, css: &str) -> UploadedFile {
        UploadedFile::text(name, FileKind::Stylesheet, css)
    }

    fn analyze(files: &[UploadedFile]) -> AnalysisResult {
        let session = Session::with_files(files);
        Analyzer::new(Config::default()).analyze(files, &session)
    }

    #[test]
    fn test_occurrences_across_documents() {
        let files: Vec<_> = (0..4)
            .map(|i| {
                markup(
                    &format!("page{}.html", i),
                    &format!(
                        "<html><body><section id=\"s{}\"><button class=\"btn-primary\">Go {}</button></section></body></html>",
                        i, i
                    ),
                )
            })
            .collect();
        let result = analyze(&files);
        let buttons = result.samples(Component::Buttons);
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].selector, "btn-primary");
        assert_eq!(buttons[0].occurrences, 4);
        assert_eq!(result.counts.markup, 4);
    }

    #[test]
    fn test_samples_sorted_by_occurrence() {
        let result = analyze(&[markup(
            "a.html",
            r#"<button class="btn-a">A</button>
               <button class="btn-b">B</button><button class="btn-b">B</button>"#,
        )]);
        let keys: Vec<_> = result
            .samples(Component::Buttons)
            .iter()
            .map(|s| s.selector.as_str())
            .collect();
        assert_eq!(keys, ["btn-b", "btn-a"]);
    }

    #[test]
    fn test_external_stylesheet_wins_over_inline() {
        let result = analyze(&[
            markup(
                "a.html",
                "<html><head><style>:root{--brand:#222}</style></head><body></body></html>",
            ),
            stylesheet("a.css", ":root{--brand:#111}"),
        ]);
        assert_eq!(result.css_variables.len(), 1);
        assert_eq!(result.css_variables[0].value, "#111");
        assert!(result.colors.contains("#222"));
    }

    #[test]
    fn test_images_inlined_in_samples() {
        let files = vec![
            markup(
                "sub/index.html",
                r#"<div class="card"><img src="../img/logo.png"></div>"#,
            ),
            UploadedFile::from_bytes("img/logo.png", &[137, 80, 78, 71]).unwrap(),
        ];
        let result = analyze(&files);
        let boxes = result.samples(Component::Boxes);
        assert_eq!(boxes.len(), 1);
        assert!(boxes[0].html.contains("data:image/png;base64,"));
    }

    #[test]
    fn test_links_kept_when_configured() {
        let mut config = Config::default();
        config.output.neutralize_links = false;
        let files = vec![markup("a.html", r#"<a class="btn" href="/go">Go</a>"#)];
        let result = Analyzer::new(config).analyze(&files, &Session::new());
        assert!(result.samples(Component::Buttons)[0].html.contains("/go"));
    }

    #[test]
    fn test_empty_input() {
        let result = analyze(&[]);
        assert_eq!(result.counts.total(), 0);
        assert!(result.extracted.is_empty());
        assert!(result.components.values().all(Vec::is_empty));
    }

    #[test]
    fn test_serializes_to_json() {
        let result = analyze(&[markup("a.html", r#"<span class="badge-new">New</span>"#)]);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"badges\""));
        assert!(json.contains("badge-new"));
    }
}
