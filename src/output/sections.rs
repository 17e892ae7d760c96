// Per-section renderers
//
// Each section body is plain markup assembled here; the numbered wrapper
// comes from `section.html`. Sample markup is inserted unescaped so it
// renders live against the inlined project stylesheets.

use crate::analysis::{AnalysisResult, Component};
use crate::config::SectionKind;
use crate::output::builder::BuildOptions;
use crate::output::colors::{group_colors, ColorGroup};
use crate::output::highlight::highlight_html;
use crate::output::templates::html_escape;
use crate::session::Session;
use std::collections::HashSet;

/// Rendered body of one section plus its count line
#[derive(Debug, Clone)]
pub struct SectionBody {
    pub html: String,
    pub count: usize,
    pub noun: &'static str,
    pub plural: &'static str,
}

/// Component category backing a section, if any
pub fn component_for(kind: SectionKind) -> Option<Component> {
    match kind {
        SectionKind::Icons => Some(Component::Icons),
        SectionKind::Badges => Some(Component::Badges),
        SectionKind::Lists => Some(Component::Lists),
        SectionKind::Tabs => Some(Component::Tabs),
        SectionKind::Tables => Some(Component::Tables),
        SectionKind::Buttons => Some(Component::Buttons),
        SectionKind::Forms => Some(Component::Forms),
        SectionKind::Boxes => Some(Component::Boxes),
        SectionKind::Modals => Some(Component::Modals),
        SectionKind::Pagination => Some(Component::Pagination),
        SectionKind::Accordions => Some(Component::Accordions),
        SectionKind::Typography => Some(Component::Typography),
        SectionKind::Colors | SectionKind::Meta => None,
    }
}

/// Renders section bodies for one build
pub struct SectionRenderer<'a> {
    session: &'a Session,
    options: &'a BuildOptions,
    result: &'a AnalysisResult,
}

impl<'a> SectionRenderer<'a> {
    pub fn new(
        session: &'a Session,
        options: &'a BuildOptions,
        result: &'a AnalysisResult,
    ) -> Self {
        Self {
            session,
            options,
            result,
        }
    }

    /// Whether a section has anything to show
    pub fn should_render(&self, kind: SectionKind) -> bool {
        let result = self.result;
        match kind {
            SectionKind::Colors => {
                !result.colors.is_empty() || result.color_variables().next().is_some()
            }
            SectionKind::Meta => !result.favicons.is_empty() || !result.og_tags.is_empty(),
            SectionKind::Typography => {
                !result.typography.is_empty() || !self.keyword_matches(kind).is_empty()
            }
            SectionKind::Icons if !result.icons.is_empty() => true,
            _ => match component_for(kind) {
                Some(component) => {
                    !result.samples(component).is_empty()
                        || !result.bucket(component).is_empty()
                        || !self.keyword_matches(kind).is_empty()
                }
                None => false,
            },
        }
    }

    pub fn render(&self, kind: SectionKind) -> SectionBody {
        match kind {
            SectionKind::Colors => self.render_colors(),
            SectionKind::Typography => self.render_typography(),
            SectionKind::Meta => self.render_meta(),
            _ => match component_for(kind) {
                Some(component) => self.render_component(kind, component),
                None => SectionBody {
                    html: String::new(),
                    count: 0,
                    noun: "item",
                    plural: "items",
                },
            },
        }
    }

    /// Classes matching the section's additional keywords
    fn keyword_matches(&self, kind: SectionKind) -> Vec<String> {
        let keywords: Vec<String> = self
            .options
            .additional_for(kind)
            .iter()
            .map(|k| k.trim().to_ascii_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Vec::new();
        }

        self.result
            .classes
            .iter()
            .filter(|class| {
                let lower = class.to_ascii_lowercase();
                keywords.iter().any(|k| lower.contains(k.as_str()))
            })
            .cloned()
            .collect()
    }

    /// Bucket selectors merged with keyword matches, deduplicated, most
    /// frequent first, capped at the label limit
    pub fn combined_classes(&self, kind: SectionKind) -> Vec<String> {
        let mut base: Vec<String> = match component_for(kind) {
            Some(component) => self.result.bucket(component).to_vec(),
            None => Vec::new(),
        };
        if kind == SectionKind::Icons {
            base.extend(self.result.icons.iter().cloned());
        }
        base.extend(self.keyword_matches(kind));

        let mut seen = HashSet::new();
        let mut labels: Vec<String> = base
            .into_iter()
            .filter(|label| seen.insert(label.clone()))
            .collect();

        labels.sort_by(|a, b| {
            self.frequency(b)
                .cmp(&self.frequency(a))
                .then_with(|| a.cmp(b))
        });
        labels.truncate(self.options.style.label_limit);
        labels
    }

    fn frequency(&self, label: &str) -> usize {
        if label.starts_with('#') {
            return 0;
        }
        label
            .split_whitespace()
            .filter_map(|class| self.result.class_frequency.get(class).copied())
            .max()
            .unwrap_or(0)
    }

    fn render_component(&self, kind: SectionKind, component: Component) -> SectionBody {
        let labels = self.combined_classes(kind);
        let limit = self.options.style.preview_limit;
        let samples = self.result.samples(component);

        let mut html = String::new();
        html.push_str(&self.label_line(&labels));
        html.push_str("<div class=\"sg-previews\">\n");

        for sample in samples.iter().take(limit) {
            let caption = format!(
                "<code>{}</code> <span class=\"sg-uses\">{}</span>",
                html_escape(&display_selector(&sample.selector)),
                uses(sample.occurrences)
            );
            html.push_str(&self.preview(&sample.html, &caption));
        }

        let sampled: HashSet<&str> = samples
            .iter()
            .flat_map(|s| s.selector.split_whitespace())
            .collect();
        let fallbacks: Vec<&String> = if samples.is_empty() {
            labels.iter().collect()
        } else {
            let keywords = self.keyword_matches(kind);
            labels
                .iter()
                .filter(|label| keywords.contains(*label) && !sampled.contains(label.as_str()))
                .collect()
        };

        let remaining = limit.saturating_sub(samples.len().min(limit));
        for label in fallbacks.into_iter().take(remaining) {
            let markup = fallback_markup(component, label);
            let caption = format!(
                "<code>{}</code> <span class=\"sg-uses\">example</span>",
                html_escape(&display_selector(label))
            );
            html.push_str(&self.preview(&markup, &caption));
        }

        html.push_str("</div>\n");

        SectionBody {
            html,
            count: labels.len(),
            noun: "class",
            plural: "classes",
        }
    }

    fn render_typography(&self) -> SectionBody {
        let mut html = String::new();
        let mut count = 0;

        for entry in &self.result.typography {
            let markup = format!(
                "<{tag}{attr}>{text}</{tag}>",
                tag = entry.tag,
                attr = selector_attribute(&entry.selector, &entry.tag),
                text = html_escape(&entry.sample_text)
            );
            html.push_str(&self.type_row(
                &markup,
                &entry.selector,
                &entry.tag,
                Some(entry.occurrences),
            ));
            count += 1;
        }

        let known: HashSet<&str> = self
            .result
            .typography
            .iter()
            .map(|t| t.selector.as_str())
            .collect();
        for class in self.keyword_matches(SectionKind::Typography) {
            if known.contains(class.as_str()) {
                continue;
            }
            let tag = typography_tag(&class);
            let markup = format!(
                "<{tag} class=\"{class}\">Sample heading</{tag}>",
                tag = tag,
                class = html_escape(&class)
            );
            html.push_str(&self.type_row(&markup, &class, tag, None));
            count += 1;
        }

        SectionBody {
            html,
            count,
            noun: "style",
            plural: "styles",
        }
    }

    fn type_row(
        &self,
        markup: &str,
        selector: &str,
        tag: &str,
        occurrences: Option<usize>,
    ) -> String {
        let uses_text = occurrences.map(uses).unwrap_or_else(|| "example".to_string());
        format!(
            "<div class=\"sg-type-row\">\n<div class=\"sg-type-preview\">{markup}</div>\n\
             <div class=\"sg-type-meta\"><code>{selector}</code> <span class=\"sg-tag\">&lt;{tag}&gt;</span> <span class=\"sg-uses\">{uses}</span></div>\n\
             {code}</div>\n",
            markup = markup,
            selector = html_escape(&display_selector(selector)),
            tag = html_escape(tag),
            uses = uses_text,
            code = self.code_block(markup)
        )
    }

    fn render_colors(&self) -> SectionBody {
        let groups = group_colors(&self.result.css_variables);
        let mut html = String::new();
        let mut count = 0;

        for group in &groups {
            html.push_str(&color_group(group));
            count += group.swatches.len();
        }

        if !self.result.colors.is_empty() {
            html.push_str("<div class=\"sg-color-group sg-literal-colors\">\n<h3 class=\"sg-color-group-title\">Literal colors</h3>\n<div class=\"sg-swatches\">\n");
            for color in &self.result.colors {
                let color = html_escape(color);
                html.push_str(&format!(
                    "<div class=\"sg-swatch\"><span class=\"sg-swatch-chip\" style=\"background: {c}\"></span><span class=\"sg-swatch-value\">{c}</span></div>\n",
                    c = color
                ));
            }
            html.push_str("</div>\n</div>\n");
            count += self.result.colors.len();
        }

        SectionBody {
            html,
            count,
            noun: "color",
            plural: "colors",
        }
    }

    fn render_meta(&self) -> SectionBody {
        let images = self.session.images();
        let mut html = String::new();

        if !self.result.favicons.is_empty() {
            html.push_str("<div class=\"sg-favicons\">\n");
            for favicon in &self.result.favicons {
                let src = images.resolve(&favicon.href).unwrap_or(&favicon.href);
                let sizes = favicon
                    .sizes
                    .as_deref()
                    .map(|s| format!(" <span class=\"sg-favicon-sizes\">{}</span>", html_escape(s)))
                    .unwrap_or_default();
                html.push_str(&format!(
                    "<div class=\"sg-favicon\"><img class=\"sg-favicon-img\" src=\"{}\" alt=\"\"><code>{}</code>{}<code class=\"sg-favicon-href\">{}</code></div>\n",
                    html_escape(src),
                    html_escape(&favicon.rel),
                    sizes,
                    html_escape(&favicon.href)
                ));
            }
            html.push_str("</div>\n");
        }

        if !self.result.og_tags.is_empty() {
            html.push_str("<table class=\"sg-og\">\n<thead><tr><th>Property</th><th>Content</th></tr></thead>\n<tbody>\n");
            for tag in &self.result.og_tags {
                let content = if tag.property == "og:image" {
                    let src = images.resolve(&tag.content).unwrap_or(&tag.content);
                    format!(
                        "<img class=\"sg-og-image\" src=\"{}\" alt=\"\"> <span>{}</span>",
                        html_escape(src),
                        html_escape(&tag.content)
                    )
                } else {
                    html_escape(&tag.content)
                };
                html.push_str(&format!(
                    "<tr><td><code>{}</code></td><td>{}</td></tr>\n",
                    html_escape(&tag.property),
                    content
                ));
            }
            html.push_str("</tbody>\n</table>\n");
        }

        SectionBody {
            html,
            count: self.result.favicons.len() + self.result.og_tags.len(),
            noun: "tag",
            plural: "tags",
        }
    }

    fn label_line(&self, labels: &[String]) -> String {
        if labels.is_empty() {
            return String::new();
        }
        let items: Vec<String> = labels
            .iter()
            .map(|label| {
                format!(
                    "<code class=\"sg-label\">{}<span class=\"sg-label-count\">{}</span></code>",
                    html_escape(&display_selector(label)),
                    self.frequency(label)
                )
            })
            .collect();
        format!("<div class=\"sg-labels\">{}</div>\n", items.join(" "))
    }

    fn preview(&self, markup: &str, caption: &str) -> String {
        format!(
            "<figure class=\"sg-sample\">\n<div class=\"sg-preview\">\n{}\n</div>\n<figcaption>{}</figcaption>\n{}</figure>\n",
            markup,
            caption,
            self.code_block(markup)
        )
    }

    /// Collapsible, copyable source block; empty when code blocks are off
    fn code_block(&self, source: &str) -> String {
        if !self.options.style.code_blocks {
            return String::new();
        }
        let id = self.session.next_code_block_id();
        let code = if self.options.style.highlight {
            highlight_html(source)
        } else {
            html_escape(source)
        };
        format!(
            "<div class=\"sg-code\"><div class=\"sg-code-actions\">\
             <button type=\"button\" class=\"sg-code-toggle\" data-target=\"sg-code-{id}\" aria-expanded=\"false\">Code</button>\
             <button type=\"button\" class=\"sg-code-copy\" data-target=\"sg-code-{id}\">Copy</button></div>\
             <pre class=\"sg-code-body\" id=\"sg-code-{id}\" hidden><code>{code}</code></pre></div>\n",
            id = id,
            code = code
        )
    }
}

fn color_group(group: &ColorGroup) -> String {
    let mut html = format!(
        "<div class=\"sg-color-group\">\n<h3 class=\"sg-color-group-title\">{}</h3>\n<div class=\"sg-swatches\">\n",
        html_escape(&group.name)
    );
    for swatch in &group.swatches {
        let resolved = if swatch.resolved {
            format!(" <span class=\"sg-swatch-resolved\">{}</span>", html_escape(&swatch.background))
        } else {
            String::new()
        };
        html.push_str(&format!(
            "<div class=\"sg-swatch\"><span class=\"sg-swatch-chip\" style=\"background: {}\"></span><code class=\"sg-swatch-name\">--{}</code><span class=\"sg-swatch-value\">{}</span>{}</div>\n",
            html_escape(&swatch.background),
            html_escape(&swatch.name),
            html_escape(&swatch.value),
            resolved
        ));
    }
    html.push_str("</div>\n</div>\n");
    html
}

/// `.a.b` for class keys, ids and synthetic keys as-is
fn display_selector(selector: &str) -> String {
    if selector.starts_with('#') || selector.contains('[') || is_tag_name(selector) {
        return selector.to_string();
    }
    format!(".{}", selector.split_whitespace().collect::<Vec<_>>().join("."))
}

fn is_tag_name(s: &str) -> bool {
    matches!(
        s,
        "button" | "input" | "select" | "textarea" | "table" | "nav" | "ul" | "ol" | "dl" | "div"
            | "span" | "a" | "i" | "details" | "dialog" | "p" | "h1" | "h2" | "h3" | "h4" | "h5"
            | "h6" | "section" | "li"
    )
}

/// Attribute reproducing a typography selector on its element
fn selector_attribute(selector: &str, tag: &str) -> String {
    if let Some(id) = selector.strip_prefix('#') {
        return format!(" id=\"{}\"", html_escape(id));
    }
    if selector == tag {
        return String::new();
    }
    format!(" class=\"{}\"", html_escape(selector))
}

/// Heading level for a keyword-matched typography class
fn typography_tag(class: &str) -> &'static str {
    let lower = class.to_ascii_lowercase();
    if lower.contains("title-1") || lower.contains("title1") {
        "h1"
    } else if lower.contains("title-2") || lower.contains("title2") {
        "h2"
    } else if lower.contains("title-3") || lower.contains("title3") {
        "h3"
    } else if lower.contains("tit") || lower.contains("heading") {
        "h4"
    } else {
        "p"
    }
}

fn uses(count: usize) -> String {
    if count == 1 {
        "1 use".to_string()
    } else {
        format!("{} uses", count)
    }
}

/// Minimal stand-in markup for a class with no captured sample
pub fn fallback_markup(component: Component, label: &str) -> String {
    let attr = match label.strip_prefix('#') {
        Some(id) => format!("id=\"{}\"", html_escape(id)),
        None => format!("class=\"{}\"", html_escape(label)),
    };
    match component {
        Component::Buttons => format!("<button type=\"button\" {}>Button</button>", attr),
        Component::Forms => format!("<input type=\"text\" {} placeholder=\"Input\">", attr),
        Component::Tables => format!(
            "<table {}>\n<thead>\n<tr>\n<th>Header</th>\n<th>Header</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td>Cell</td>\n<td>Cell</td>\n</tr>\n</tbody>\n</table>",
            attr
        ),
        Component::Boxes => format!("<div {}>Box content</div>", attr),
        Component::Lists => format!("<ul {}>\n<li>Item 1</li>\n<li>Item 2</li>\n</ul>", attr),
        Component::Modals => format!(
            "<div {}>\n<div class=\"sg-modal-title\">Modal title</div>\n<p>Modal content</p>\n</div>",
            attr
        ),
        Component::Tabs => format!(
            "<ul {}>\n<li class=\"on\"><a href=\"#\">Tab 1</a></li>\n<li><a href=\"#\">Tab 2</a></li>\n</ul>",
            attr
        ),
        Component::Pagination => format!(
            "<div {}>\n<a href=\"#\">1</a>\n<a href=\"#\">2</a>\n<a href=\"#\">3</a>\n</div>",
            attr
        ),
        Component::Badges => format!("<span {}>Badge</span>", attr),
        Component::Accordions => format!(
            "<details {}>\n<summary>Title</summary>\n<p>Content</p>\n</details>",
            attr
        ),
        Component::Icons => format!("<i {} aria-hidden=\"true\"></i>", attr),
        Component::Typography => format!("<p {}>Sample heading</p>", attr),
    }
}
