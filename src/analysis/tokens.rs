// Design token extraction
//
// Sweeps stylesheet text for literal colors and custom properties. Colors
// are kept verbatim; custom properties are first-seen-wins by name.

use crate::analysis::{AnalysisResult, CssVariable};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("COMMENT_RE: hardcoded regex is valid"));

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}|[0-9a-fA-F]{3,4})\b|rgba?\([^)]*\)|hsl\([^)]*\)")
        .expect("COLOR_RE: hardcoded regex is valid")
});

static LEADING_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}|[0-9a-fA-F]{3,4})\b|rgba?\(|hsl\()")
        .expect("LEADING_COLOR_RE: hardcoded regex is valid")
});

/// A custom property only starts a declaration, never inside a selector
/// such as `.btn--primary:hover`
static VARIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[{;\s])--([A-Za-z0-9_-]+)\s*:\s*([^;{}]+)")
        .expect("VARIABLE_RE: hardcoded regex is valid")
});

static DIMENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^-?(?:\d+\.?\d*|\.\d+)(?:px|rem|em|%|vh|vw|vmin|vmax|pt|ch|ex)?(?:\s|$)")
        .expect("DIMENSION_RE: hardcoded regex is valid")
});

const FONT_HINTS: &[&str] = &[
    "font", "family", "weight", "line-height", "letter-spacing", "leading", "tracking",
];
const FONT_VALUE_HINTS: &[&str] = &["sans-serif", "serif", "monospace", "pretendard", "noto sans"];
const SIZE_HINTS: &[&str] = &[
    "size", "spacing", "space", "gap", "radius", "width", "height", "margin", "padding", "gutter",
    "breakpoint", "shadow", "border",
];
/// Name hints that mark a `var()` alias as a color even when a size hint
/// (`border`, `shadow`) is also present
const EXPLICIT_COLOR_HINTS: &[&str] = &["color", "bg"];
const COLOR_NAME_HINTS: &[&str] = &[
    "color", "bg", "background", "primary", "secondary", "tertiary", "accent", "point", "gray",
    "grey", "black", "white", "success", "danger", "warning", "info", "error", "text", "line",
];

/// Category of a CSS custom property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Color,
    Size,
    Font,
    Other,
}

/// Extract colors and custom properties from one stylesheet
pub fn extract_tokens(css: &str, result: &mut AnalysisResult) {
    let css = COMMENT_RE.replace_all(css, "");

    for color in find_colors(&css) {
        if !result.colors.contains(color) {
            result.colors.insert(color.to_string());
        }
    }

    let mut depth = BlockDepth::default();
    for caps in VARIABLE_RE.captures_iter(&css) {
        let Some(name) = caps.get(1) else {
            continue;
        };
        if depth.at(&css, name.start()) == 0 {
            continue;
        }
        let name = name.as_str();
        let value = caps[2].trim();
        if value.is_empty() || result.css_variables.iter().any(|v| v.name == name) {
            continue;
        }
        result.css_variables.push(CssVariable {
            name: name.to_string(),
            value: value.to_string(),
            category: classify_variable(name, value),
        });
    }
}

/// Running `{`/`}` balance of a string scanned left to right
#[derive(Debug, Default)]
struct BlockDepth {
    pos: usize,
    depth: usize,
}

impl BlockDepth {
    /// Nesting depth at `pos`; positions must not decrease between calls
    fn at(&mut self, css: &str, pos: usize) -> usize {
        for byte in &css.as_bytes()[self.pos..pos] {
            match byte {
                b'{' => self.depth += 1,
                b'}' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }
        self.pos = pos;
        self.depth
    }
}

/// Literal color tokens in order of appearance. Id selectors spelled in hex
/// letters (`#add-btn {`, `#deface {`) are not colors.
pub fn find_colors(css: &str) -> impl Iterator<Item = &str> {
    COLOR_RE
        .find_iter(css)
        .filter(move |m| !opens_block(&css[m.end()..]))
        .map(|m| m.as_str())
}

/// Whether the text after a match reaches `{` before a declaration ends
fn opens_block(rest: &str) -> bool {
    rest.find(['{', ';', '}'])
        .is_some_and(|idx| rest.as_bytes()[idx] == b'{')
}

/// Whether a value begins with a literal color
pub fn starts_with_color(value: &str) -> bool {
    LEADING_COLOR_RE.is_match(value.trim())
}

/// Classify a custom property.
///
/// Precedence: a literal color value wins, then font hints, then a `var()`
/// alias whose name says `color`/`bg`, then size hints from the name or a
/// dimensional value, then broader color hints for `var()` aliases, else
/// `Other`.
pub fn classify_variable(name: &str, value: &str) -> TokenCategory {
    let name = name.to_ascii_lowercase();
    let value = value.trim();
    let value_lower = value.to_ascii_lowercase();

    if starts_with_color(value) {
        return TokenCategory::Color;
    }

    if FONT_HINTS.iter().any(|h| name.contains(h))
        || FONT_VALUE_HINTS.iter().any(|h| value_lower.contains(h))
    {
        return TokenCategory::Font;
    }

    let is_alias = value_lower.starts_with("var(");

    if is_alias && EXPLICIT_COLOR_HINTS.iter().any(|h| name.contains(h)) {
        return TokenCategory::Color;
    }

    if SIZE_HINTS.iter().any(|h| name.contains(h)) || DIMENSION_RE.is_match(value) {
        return TokenCategory::Size;
    }

    if is_alias && COLOR_NAME_HINTS.iter().any(|h| name.contains(h)) {
        return TokenCategory::Color;
    }

    TokenCategory::Other
}
