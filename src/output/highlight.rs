// Source highlighting for code blocks
//
// Markup is escaped, then tags, attribute names and attribute values are
// wrapped in spans the guide stylesheet colors.

use crate::output::templates::html_escape;
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("TAG_RE: hardcoded regex is valid"));

static TAG_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<(/?)([A-Za-z][\w:-]*)").expect("TAG_NAME_RE: hardcoded regex is valid")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/>"']+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s>]+))?"#)
        .expect("ATTR_RE: hardcoded regex is valid")
});

/// Escape markup and wrap tags and attributes in highlight spans
pub fn highlight_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len() * 2);
    let mut last = 0;

    for tag in TAG_RE.find_iter(source) {
        out.push_str(&html_escape(&source[last..tag.start()]));
        out.push_str(&highlight_tag(tag.as_str()));
        last = tag.end();
    }
    out.push_str(&html_escape(&source[last..]));
    out
}

fn highlight_tag(tag: &str) -> String {
    let Some(caps) = TAG_NAME_RE.captures(tag) else {
        // comments, doctypes
        return format!("<span class=\"sg-hl-comment\">{}</span>", html_escape(tag));
    };

    let head_end = caps.get(0).map_or(0, |m| m.end());
    let body = &tag[head_end..tag.len() - 1];
    let (attrs, self_closing) = match body.trim_end().strip_suffix('/') {
        Some(attrs) => (attrs, true),
        None => (body, false),
    };

    let mut out = format!(
        "<span class=\"sg-hl-tag\">&lt;{}{}</span>",
        &caps[1],
        html_escape(&caps[2])
    );

    for attr in ATTR_RE.captures_iter(attrs) {
        out.push_str(&format!(
            " <span class=\"sg-hl-attr\">{}</span>",
            html_escape(&attr[1])
        ));
        if let Some(value) = attr.get(2) {
            out.push_str(&format!(
                "=<span class=\"sg-hl-value\">{}</span>",
                html_escape(value.as_str())
            ));
        }
    }

    let close = if self_closing { " /&gt;" } else { "&gt;" };
    out.push_str(&format!("<span class=\"sg-hl-tag\">{}</span>", close));
    out
}
