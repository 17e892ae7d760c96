// Markup sanitizer
//
// Cleans captured fragments before they are stored for display: no scripts,
// no inline styles blocks, no event handlers, inline images, one tag per line.

use crate::input::ImageStore;
use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<script\b[^>]*/?>")
        .expect("SCRIPT_RE: hardcoded regex is valid")
});

static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("STYLE_RE: hardcoded regex is valid")
});

static EVENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\s+on(?:click|load|error|mouseover|mouseout|focus|blur)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#,
    )
    .expect("EVENT_RE: hardcoded regex is valid")
});

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("HREF_RE: hardcoded regex is valid")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RE: hardcoded regex is valid"));

static TAG_GAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s*<").expect("TAG_GAP_RE: hardcoded regex is valid"));

/// Placeholder written over every `href` when links are neutralized
pub const NEUTRAL_HREF: &str = "href=\"#\"";

/// Sanitizer for captured markup fragments
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer<'a> {
    images: Option<&'a ImageStore>,
    neutralize_links: bool,
}

impl<'a> Sanitizer<'a> {
    pub fn new() -> Self {
        Self {
            images: None,
            neutralize_links: true,
        }
    }

    pub fn with_images(mut self, images: &'a ImageStore) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_neutral_links(mut self, neutralize: bool) -> Self {
        self.neutralize_links = neutralize;
        self
    }

    /// Sanitize one fragment
    pub fn clean(&self, html: &str) -> String {
        let out = strip_active(html);

        let mut out = if self.neutralize_links {
            HREF_RE.replace_all(&out, NEUTRAL_HREF).into_owned()
        } else {
            out
        };

        if let Some(images) = self.images {
            out = images.rewrite_all(&out);
        }

        reflow(&out)
    }
}

impl Default for Sanitizer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove script and style blocks and event handlers until nothing changes.
/// A single pass can splice a new `<script>` together from the remains of a
/// nested one.
fn strip_active(html: &str) -> String {
    let mut current = html.to_string();
    loop {
        let out = SCRIPT_RE.replace_all(&current, "");
        let out = STYLE_RE.replace_all(&out, "");
        let out = EVENT_RE.replace_all(&out, "").into_owned();
        if out == current {
            return out;
        }
        current = out;
    }
}

/// Collapse whitespace runs, then put each tag boundary on its own line
pub fn reflow(html: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(html.trim(), " ");
    TAG_GAP_RE.replace_all(&collapsed, ">\n<").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_styles() {
        let html =
            r#"<div class="box"><script>alert(1)</script><style>.a{}</style><p>Hi</p></div>"#;
        let out = Sanitizer::new().clean(html);
        assert!(!out.contains("script"));
        assert!(!out.contains("style"));
        assert!(out.contains("<p>Hi</p>"));
    }

    #[test]
    fn test_strips_event_handlers() {
        let html = r#"<button class="btn" onclick="go()" onMouseOver='x()' onblur=y>Go</button>"#;
        let out = Sanitizer::new().clean(html);
        assert_eq!(out, r#"<button class="btn">Go</button>"#);
    }

    #[test]
    fn test_neutralizes_links() {
        let html = r#"<a href="/member/login.do" class="btn">Login</a>"#;
        assert_eq!(
            Sanitizer::new().clean(html),
            r##"<a href="#" class="btn">Login</a>"##
        );
        let kept = Sanitizer::new().with_neutral_links(false).clean(html);
        assert!(kept.contains("/member/login.do"));
    }

    #[test]
    fn test_reflow() {
        let html = "<ul>\n   <li>One</li>   <li>Two\n words</li></ul>";
        assert_eq!(reflow(html), "<ul>\n<li>One</li>\n<li>Two words</li>\n</ul>");
    }

    #[test]
    fn test_rewrites_images() {
        let mut store = ImageStore::new();
        store.register("img/x.png", "data:image/png;base64,X");
        let out = Sanitizer::new()
            .with_images(&store)
            .clean(r#"<img src="../img/x.png">"#);
        assert_eq!(out, r#"<img src="data:image/png;base64,X">"#);
    }

    #[test]
    fn test_idempotent() {
        let html = r#"
            <div class="modal" onload="init()">
                <script src="a.js"></script>
                <a href="/x">  link </a>   <span>text</span>
            </div>"#;
        let sanitizer = Sanitizer::new();
        let once = sanitizer.clean(html);
        let twice = sanitizer.clean(&once);
        assert_eq!(once, twice);

        let nested = "<div><scr<script></script>ipt>alert(1)</script></div>";
        let once = sanitizer.clean(nested);
        assert_eq!(once, "<div>\n</div>");
        assert_eq!(sanitizer.clean(&once), once);
    }

    #[test]
    fn test_nested_fragments_do_not_reassemble() {
        let sanitizer = Sanitizer::new();

        let script = sanitizer.clean("<p><scr<script>x</script>ipt>steal()</script>ok</p>");
        assert!(!script.to_ascii_lowercase().contains("<script"));
        assert!(!script.contains("steal()"));

        let style = sanitizer.clean("<p><sty<style></style>le>.x{}</style>ok</p>");
        assert!(!style.contains("<style"));

        let handler = sanitizer.clean(r#"<img o onclick="a()"nclick="b()" src="x.gif">"#);
        assert!(!handler.contains("onclick"));
    }
}
