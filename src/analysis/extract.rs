// Component extraction
//
// One driver walks a parsed document once per category rule: select
// candidates, filter, promote to a wrapper, derive the selector key, then
// either count the occurrence or store a sanitized sample.

use crate::analysis::rules::{
    bucket_rule, is_carousel_class, is_icon_class, Admission, CategoryRule, Component, Promotion,
    CATEGORY_RULES, CONTAINER_TAGS, MAX_TYPOGRAPHY_ENTRIES, PAGING_FRAGMENTS, SAMPLE_TEXT_LEN,
    TABLE_WRAPPER_FRAGMENTS, TYPOGRAPHY_SCOPES, TYPOGRAPHY_SELECTORS, WRAPPER_FRAGMENTS,
};
use crate::analysis::sanitize::Sanitizer;
use crate::analysis::{
    AnalysisResult, ElementObservation, Favicon, MarkupSample, OgTag, TypographyEntry,
};
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Maximum text kept with a typography sample
const TYPOGRAPHY_TEXT_LEN: usize = 30;

/// Typography candidates larger than this are containers, not headings
const MAX_TYPOGRAPHY_HTML_LEN: usize = 1_500;

/// Raw observations kept per observed category
const MAX_OBSERVATIONS: usize = 200;

struct CompiledRule {
    rule: &'static CategoryRule,
    primary: Selector,
    secondary: Option<Selector>,
}

static COMPILED_RULES: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| {
    CATEGORY_RULES
        .iter()
        .map(|rule| CompiledRule {
            rule,
            primary: group(rule.primary).expect("CATEGORY_RULES: primary selectors are valid"),
            secondary: group(rule.secondary),
        })
        .collect()
});

static TYPOGRAPHY: LazyLock<Selector> = LazyLock::new(|| {
    group(TYPOGRAPHY_SELECTORS).expect("TYPOGRAPHY_SELECTORS: hardcoded selectors are valid")
});

static TYPOGRAPHY_SCOPE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    TYPOGRAPHY_SCOPES
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

static ALL_ELEMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("*").expect("ALL_ELEMENTS: '*' is a valid CSS selector"));

static FAVICON: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("link[rel*=\"icon\"][href]").expect("FAVICON: hardcoded selector is valid")
});

static OG_META: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("meta[property^=\"og:\"][content]")
        .expect("OG_META: hardcoded selector is valid")
});

static INLINE_STYLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("style").expect("INLINE_STYLE: 'style' is a valid CSS selector")
});

fn group(selectors: &[&str]) -> Option<Selector> {
    if selectors.is_empty() {
        return None;
    }
    Selector::parse(&selectors.join(", ")).ok()
}

/// Which selector pass produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Primary,
    Secondary,
}

/// Scans parsed documents into an `AnalysisResult`
pub struct DocumentScanner<'a> {
    sanitizer: Sanitizer<'a>,
}

impl<'a> DocumentScanner<'a> {
    pub fn new(sanitizer: Sanitizer<'a>) -> Self {
        Self { sanitizer }
    }

    /// Scan one markup document. Returns the text of its inline `<style>` blocks.
    pub fn scan(&self, markup: &str, result: &mut AnalysisResult) -> Vec<String> {
        let document = Html::parse_document(markup);

        collect_vocabulary(&document, result);
        collect_head_meta(&document, result);

        for compiled in COMPILED_RULES.iter() {
            self.extract_category(&document, compiled, result);
        }

        extract_typography(&document, result);

        document
            .select(&INLINE_STYLE)
            .map(|style| style.text().collect::<String>())
            .filter(|css| !css.trim().is_empty())
            .collect()
    }

    fn extract_category(
        &self,
        document: &Html,
        compiled: &CompiledRule,
        result: &mut AnalysisResult,
    ) {
        let rule = compiled.rule;
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut captured: HashSet<NodeId> = HashSet::new();

        let passes = [
            (Pass::Primary, Some(&compiled.primary)),
            (Pass::Secondary, compiled.secondary.as_ref()),
        ];

        for (pass, selector) in passes {
            let Some(selector) = selector else {
                continue;
            };

            for element in document.select(selector) {
                if !seen.insert(element.id())
                    || !admits(rule.admission, element)
                    || excluded_by_bucket(rule, element)
                {
                    continue;
                }

                let target = promote(rule.promotion, element);
                if !captured.insert(target.id()) {
                    continue;
                }

                observe(rule.component, target, result);

                let raw = target.html();
                if raw.len() > rule.max_html_len {
                    continue;
                }

                let key = selector_key(target, pass);
                let samples = result.extracted.entry(rule.component).or_default();

                if let Some(existing) = samples.iter_mut().find(|s| s.selector == key) {
                    existing.occurrences += 1;
                    continue;
                }

                if samples.len() >= rule.max_samples {
                    continue;
                }

                let html = self.sanitizer.clean(&raw);
                if rule.containment_dedup
                    && samples
                        .iter()
                        .any(|s| s.html.contains(&html) || html.contains(&s.html))
                {
                    continue;
                }

                samples.push(MarkupSample {
                    selector: key,
                    tag: target.value().name().to_string(),
                    html,
                    text: element_text(target, SAMPLE_TEXT_LEN),
                    occurrences: 1,
                });
            }
        }
    }
}

/// Record every tag, class token and id in the document
fn collect_vocabulary(document: &Html, result: &mut AnalysisResult) {
    for element in document.select(&ALL_ELEMENTS) {
        let value = element.value();
        result.tags.insert(value.name().to_string());

        for class in value.classes() {
            *result.class_frequency.entry(class.to_string()).or_insert(0) += 1;
            if is_icon_class(class) {
                result.icons.insert(class.to_string());
            }
            result.classes.insert(class.to_string());
        }

        if let Some(id) = value.id() {
            result.ids.insert(id.to_string());
        }
    }
}

/// Favicons and Open Graph tags, unique by href / property
fn collect_head_meta(document: &Html, result: &mut AnalysisResult) {
    for link in document.select(&FAVICON) {
        let value = link.value();
        let Some(href) = value.attr("href").map(str::trim).filter(|h| !h.is_empty()) else {
            continue;
        };
        if result.favicons.iter().any(|f| f.href == href) {
            continue;
        }
        result.favicons.push(Favicon {
            href: href.to_string(),
            rel: value.attr("rel").unwrap_or("icon").to_string(),
            sizes: value.attr("sizes").map(str::to_string),
        });
    }

    for meta in document.select(&OG_META) {
        let value = meta.value();
        let (Some(property), Some(content)) = (value.attr("property"), value.attr("content")) else {
            continue;
        };
        if result.og_tags.iter().any(|t| t.property == property) {
            continue;
        }
        result.og_tags.push(OgTag {
            property: property.to_string(),
            content: content.to_string(),
        });
    }
}

/// Headings and title-like classes, scoped to `<main>`, then `.contents`, then the document
fn extract_typography(document: &Html, result: &mut AnalysisResult) {
    let scope = TYPOGRAPHY_SCOPE_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next());

    let candidates: Vec<ElementRef> = match scope {
        Some(root) => root.select(&TYPOGRAPHY).collect(),
        None => document.select(&TYPOGRAPHY).collect(),
    };

    for element in candidates {
        let Some(text) = element_text(element, TYPOGRAPHY_TEXT_LEN) else {
            continue;
        };
        if element.html().len() > MAX_TYPOGRAPHY_HTML_LEN {
            continue;
        }

        let value = element.value();
        let key = match (class_attr(element), value.id()) {
            (Some(class), _) => class,
            (None, Some(id)) if id.to_ascii_lowercase().contains("title") => format!("#{}", id),
            _ => value.name().to_string(),
        };

        if let Some(existing) = result.typography.iter_mut().find(|t| t.selector == key) {
            existing.occurrences += 1;
            continue;
        }

        if result.typography.len() >= MAX_TYPOGRAPHY_ENTRIES {
            continue;
        }

        result.typography.push(TypographyEntry {
            selector: key,
            tag: value.name().to_string(),
            sample_text: text,
            occurrences: 1,
        });
    }
}

fn admits(admission: Admission, element: ElementRef) -> bool {
    let value = element.value();
    match admission {
        Admission::Any => true,
        Admission::Button => {
            !CONTAINER_TAGS.contains(&value.name()) && !inside_carousel(element)
        }
        Admission::FormControl => {
            let input_type = value.attr("type").unwrap_or("").to_ascii_lowercase();
            !(value.name() == "input"
                && matches!(
                    input_type.as_str(),
                    "hidden" | "submit" | "button" | "image" | "reset"
                ))
        }
        Admission::Tab => {
            let class = value.attr("class").unwrap_or("").to_ascii_lowercase();
            let id = value.id().unwrap_or("").to_ascii_lowercase();
            let names_table = ["table", "tbl"]
                .iter()
                .any(|frag| class.contains(frag) || id.contains(frag));
            let is_wrapper = WRAPPER_FRAGMENTS.iter().any(|frag| class.contains(frag));
            !names_table && !is_wrapper
        }
    }
}

/// Whether the element was only picked up through class tokens its bucket
/// excludes, like `checkbox` for boxes or `selected` for forms. Tags the
/// rule names directly (`input`, `select`) are always kept.
fn excluded_by_bucket(rule: &CategoryRule, element: ElementRef) -> bool {
    let Some(bucket) = bucket_rule(rule.component) else {
        return false;
    };
    let value = element.value();
    if bucket.exclude.is_empty() || rule.primary.contains(&value.name()) {
        return false;
    }

    let named: Vec<String> = value
        .classes()
        .map(str::to_ascii_lowercase)
        .filter(|class| bucket.include.iter().any(|frag| class.contains(frag)))
        .collect();
    !named.is_empty() && named.iter().all(|class| !bucket.matches(class))
}

/// The element or any ancestor carries a carousel library class
fn inside_carousel(element: ElementRef) -> bool {
    if element.value().attr("class").is_some_and(is_carousel_class) {
        return true;
    }
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().attr("class").is_some_and(is_carousel_class))
}

/// Replace the match with its parent or grandparent when that ancestor is the real component
fn promote(promotion: Promotion, element: ElementRef<'_>) -> ElementRef<'_> {
    if promotion == Promotion::None {
        return element;
    }

    let parent = element.parent().and_then(ElementRef::wrap);
    let grandparent = parent.and_then(|p| p.parent()).and_then(ElementRef::wrap);

    [parent, grandparent]
        .into_iter()
        .flatten()
        .find(|ancestor| is_wrapper(promotion, *ancestor))
        .unwrap_or(element)
}

fn is_wrapper(promotion: Promotion, element: ElementRef) -> bool {
    let value = element.value();
    let class = value.attr("class").unwrap_or("").to_ascii_lowercase();
    match promotion {
        Promotion::None => false,
        Promotion::TableWrapper => {
            value.name() == "div" && TABLE_WRAPPER_FRAGMENTS.iter().any(|f| class.contains(f))
        }
        Promotion::PagingWrapper => {
            value.name() == "nav" || PAGING_FRAGMENTS.iter().any(|f| class.contains(f))
        }
    }
}

/// Dedup key: class attribute, else `#id` for role/id matches, else a synthetic tag key
fn selector_key(element: ElementRef, pass: Pass) -> String {
    if let Some(class) = class_attr(element) {
        return class;
    }

    let value = element.value();
    if pass == Pass::Secondary {
        if let Some(id) = value.id().filter(|id| !id.is_empty()) {
            return format!("#{}", id);
        }
        if let Some(role) = value.attr("role") {
            return format!("{}[role=\"{}\"]", value.name(), role);
        }
    }

    match (value.name(), value.attr("type")) {
        ("input", Some(input_type)) => {
            format!("input[type=\"{}\"]", input_type.to_ascii_lowercase())
        }
        (name, _) => name.to_string(),
    }
}

fn class_attr(element: ElementRef) -> Option<String> {
    element
        .value()
        .attr("class")
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Whitespace-collapsed text content, truncated to `max` characters
fn element_text(element: ElementRef, max: usize) -> Option<String> {
    let text = element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return None;
    }
    Some(truncate_chars(&text, max))
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

fn observe(component: Component, element: ElementRef, result: &mut AnalysisResult) {
    let list = match component {
        Component::Buttons => &mut result.observations.buttons,
        Component::Forms => &mut result.observations.inputs,
        Component::Tables => &mut result.observations.tables,
        Component::Modals => &mut result.observations.modals,
        _ => return,
    };
    if list.len() >= MAX_OBSERVATIONS {
        return;
    }

    let value = element.value();
    list.push(ElementObservation {
        tag: value.name().to_string(),
        class: value.attr("class").map(str::to_string),
        id: value.id().map(str::to_string),
        text: element_text(element, SAMPLE_TEXT_LEN),
        input_type: value.attr("type").map(str::to_string),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(html: &str) -> AnalysisResult {
        let mut result = AnalysisResult::default();
        DocumentScanner::new(Sanitizer::new()).scan(html, &mut result);
        result
    }

    fn samples(result: &AnalysisResult, component: Component) -> &[MarkupSample] {
        result
            .extracted
            .get(&component)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[test]
    fn test_vocabulary() {
        let result = scan(
            r#"<div id="wrap" class="box  card"><i class="ico-search"></i><span class="box">x</span></div>"#,
        );
        assert!(result.classes.contains("box"));
        assert!(result.classes.contains("card"));
        assert!(result.ids.contains("wrap"));
        assert!(result.tags.contains("span"));
        assert!(result.icons.contains("ico-search"));
        assert_eq!(result.class_frequency["box"], 2);
    }

    #[test]
    fn test_buttons_dedup_and_count() {
        let result = scan(
            r#"<button class="btn btn-primary">A</button>
               <button class="btn btn-primary">B</button>
               <button class="btn btn-line">C</button>
               <button>Plain</button>"#,
        );
        let buttons = samples(&result, Component::Buttons);
        assert_eq!(buttons.len(), 3);
        assert_eq!(buttons[0].selector, "btn btn-primary");
        assert_eq!(buttons[0].occurrences, 2);
        assert_eq!(buttons[0].text.as_deref(), Some("A"));
        assert_eq!(buttons[2].selector, "button");
    }

    #[test]
    fn test_carousel_buttons_excluded() {
        let result = scan(
            r#"<div class="swiper-button-next"><button>next</button></div>
               <div class="slick-slider"><a class="btn-more" role="button">More</a></div>
               <button class="btn-ok">OK</button>"#,
        );
        let buttons = samples(&result, Component::Buttons);
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].selector, "btn-ok");
    }

    #[test]
    fn test_button_container_tags_rejected() {
        let result = scan(r#"<div class="btn-area"><a class="btn" href="/go">Go</a></div>"#);
        let buttons = samples(&result, Component::Buttons);
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].selector, "btn");
        assert_eq!(buttons[0].html, r##"<a class="btn" href="#">Go</a>"##);
    }

    #[test]
    fn test_role_button_uses_id_key() {
        let result = scan(r#"<span id="close" role="button">X</span>"#);
        let buttons = samples(&result, Component::Buttons);
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].selector, "#close");
    }

    #[test]
    fn test_table_wrapper_promotion() {
        let result = scan(
            r#"<div class="table-wrap"><p class="caption">Fees</p><table><tr><td>1</td></tr></table></div>"#,
        );
        let tables = samples(&result, Component::Tables);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].selector, "table-wrap");
        assert!(tables[0].html.starts_with("<div class=\"table-wrap\">"));
        assert!(tables[0].html.contains("caption"));
        assert_eq!(tables[0].occurrences, 1);
    }

    #[test]
    fn test_table_grandparent_promotion() {
        let result = scan(
            r#"<div class="tbl-wrap"><div class="scroll"><table class="data"><tr><td>1</td></tr></table></div></div>"#,
        );
        let tables = samples(&result, Component::Tables);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].selector, "tbl-wrap");
    }

    #[test]
    fn test_bare_table_without_wrapper() {
        let result = scan(r#"<section><table><tr><td>1</td></tr></table></section>"#);
        let tables = samples(&result, Component::Tables);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].selector, "table");
        assert!(tables[0].html.starts_with("<table>"));
    }

    #[test]
    fn test_pagination_containment_dedup() {
        let result = scan(
            r#"<nav><div class="paging"><a href="1">1</a><a href="2">2</a></div></nav>
               <div class="board"><div class="paging"><a href="1">1</a><a href="2">2</a></div></div>
               <div class="board-pager"><span>only</span></div>"#,
        );
        let pages = samples(&result, Component::Pagination);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].selector, "nav");
        assert_eq!(pages[1].selector, "board-pager");
    }

    #[test]
    fn test_tabs_reject_tables_and_wrappers() {
        let result = scan(
            r#"<div class="tab-contents"><ul class="tab-menu"><li>A</li></ul></div>
               <table class="tbl-tab"><tr><td>x</td></tr></table>
               <div role="tablist"><button role="tab">A</button></div>"#,
        );
        let tabs = samples(&result, Component::Tabs);
        let keys: Vec<_> = tabs.iter().map(|t| t.selector.as_str()).collect();
        assert_eq!(keys, ["tab-menu", "div[role=\"tablist\"]"]);
    }

    #[test]
    fn test_size_cap() {
        let big = "x".repeat(600);
        let result = scan(&format!(
            r#"<span class="badge-big">{}</span><span class="badge">ok</span>"#,
            big
        ));
        let badges = samples(&result, Component::Badges);
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].selector, "badge");
    }

    #[test]
    fn test_form_controls() {
        let result = scan(
            r#"<form><input type="hidden" name="t"><input type="text" name="q">
               <select class="select-sort"><option>1</option></select><textarea></textarea></form>"#,
        );
        let forms = samples(&result, Component::Forms);
        let keys: Vec<_> = forms.iter().map(|f| f.selector.as_str()).collect();
        assert_eq!(keys, ["input[type=\"text\"]", "select-sort", "textarea"]);
        assert_eq!(result.observations.inputs.len(), 3);
    }

    #[test]
    fn test_bucket_exclusions_apply_to_extraction() {
        let result = scan(
            r#"<ul class="gnb"><li class="selected"><a href="/a">A</a></li><li>B</li></ul>
               <label><input type="checkbox" class="checkbox"> Agree</label>
               <div class="info-box">Box</div>
               <ul class="tablist"><li>Tab</li></ul>
               <select class="selected"><option>1</option></select>"#,
        );

        let boxes: Vec<_> = samples(&result, Component::Boxes)
            .iter()
            .map(|s| s.selector.as_str())
            .collect();
        assert_eq!(boxes, ["info-box"]);

        let forms: Vec<_> = samples(&result, Component::Forms)
            .iter()
            .map(|s| s.selector.as_str())
            .collect();
        assert_eq!(forms, ["checkbox", "selected"]);
        assert!(samples(&result, Component::Forms).iter().all(|s| s.tag != "li"));

        let lists: Vec<_> = samples(&result, Component::Lists)
            .iter()
            .map(|s| s.selector.as_str())
            .collect();
        assert_eq!(lists, ["gnb"]);
    }

    #[test]
    fn test_promoted_table_observed_once() {
        let result = scan(
            r#"<div class="table-wrap"><table class="tbl-basic"><tr><td>1</td></tr></table></div>"#,
        );
        assert_eq!(samples(&result, Component::Tables).len(), 1);
        assert_eq!(result.observations.tables.len(), 1);
        assert_eq!(
            result.observations.tables[0].class.as_deref(),
            Some("table-wrap")
        );
    }

    #[test]
    fn test_typography_prefers_main_scope() {
        let result = scan(
            r#"<header><h1 class="logo-title">Site</h1></header>
               <main><h2 class="sub-title">Notice</h2><h3>Plain</h3><h2 class="sub-title">Again</h2></main>"#,
        );
        let keys: Vec<_> = result.typography.iter().map(|t| t.selector.as_str()).collect();
        assert_eq!(keys, ["sub-title", "h3"]);
        assert_eq!(result.typography[0].tag, "h2");
        assert_eq!(result.typography[0].sample_text, "Notice");
        assert_eq!(result.typography[0].occurrences, 2);
    }

    #[test]
    fn test_typography_contents_scope_then_document() {
        let scoped = scan(r#"<h1>Out</h1><div class="contents"><p class="tit">In</p></div>"#);
        let keys: Vec<_> = scoped.typography.iter().map(|t| t.selector.as_str()).collect();
        assert_eq!(keys, ["tit"]);

        let whole = scan(r#"<h1>Out</h1><div><p class="tit">In</p></div>"#);
        assert_eq!(whole.typography.len(), 2);
    }

    #[test]
    fn test_head_meta() {
        let result = scan(
            r#"<html><head>
                <link rel="shortcut icon" href="/favicon.ico">
                <link rel="icon" href="/favicon.ico">
                <link rel="apple-touch-icon" sizes="180x180" href="/apple.png">
                <meta property="og:title" content="Home">
                <meta property="og:title" content="Dup">
                <meta property="og:image" content="/og.png">
            </head><body></body></html>"#,
        );
        assert_eq!(result.favicons.len(), 2);
        assert_eq!(result.favicons[1].sizes.as_deref(), Some("180x180"));
        assert_eq!(result.og_tags.len(), 2);
        assert_eq!(result.og_tags[0].content, "Home");
    }

    #[test]
    fn test_inline_styles_returned() {
        let mut result = AnalysisResult::default();
        let styles = DocumentScanner::new(Sanitizer::new()).scan(
            "<html><head><style>:root{--x:#fff}</style></head><body></body></html>",
            &mut result,
        );
        assert_eq!(styles, [":root{--x:#fff}"]);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("버튼입니다", 2), "버튼");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
