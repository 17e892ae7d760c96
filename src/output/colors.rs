// Color token grouping
//
// Groups color variables by a key derived from their name and resolves
// `var()` references one level deep for swatch backgrounds.

use crate::analysis::tokens::starts_with_color;
use crate::analysis::{CssVariable, TokenCategory};
use regex::Regex;
use std::sync::LazyLock;

static VAR_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^var\(\s*--([A-Za-z0-9_-]+)\s*(?:,\s*([^)]+))?\)")
        .expect("VAR_REF_RE: hardcoded regex is valid")
});

/// Groups shown first, in this order
const GROUP_PRIORITY: &[&str] = &[
    "primary", "secondary", "tertiary", "accent", "point", "gray", "grey",
];

/// Semantic names collected into the `etc` group
const SEMANTIC_NAMES: &[&str] = &[
    "success", "danger", "warning", "info", "error", "alert", "notice", "positive", "negative",
    "caution",
];

const EXCLUDED_NAMES: &[&str] = &["black", "white"];

const NAME_PREFIXES: &[&str] = &["color-", "clr-", "c-"];

pub const ETC_GROUP: &str = "etc";

/// One color swatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swatch {
    pub name: String,
    /// Declared value, possibly a `var()` reference
    pub value: String,
    /// Value used for the swatch background
    pub background: String,
    /// Whether `background` came from resolving a reference
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGroup {
    pub name: String,
    pub swatches: Vec<Swatch>,
}

/// Group key for a variable name, `None` for excluded names
pub fn group_key(name: &str) -> Option<String> {
    let lower = name.to_ascii_lowercase();
    let stripped = NAME_PREFIXES
        .iter()
        .find_map(|prefix| lower.strip_prefix(prefix))
        .unwrap_or(&lower);

    let segments: Vec<&str> = stripped
        .split(['-', '_'])
        .filter(|s| !s.is_empty())
        .take_while(|s| !s.chars().all(|c| c.is_ascii_digit()))
        .collect();

    let Some(first) = segments.first() else {
        return Some(ETC_GROUP.to_string());
    };

    if EXCLUDED_NAMES.contains(first) {
        return None;
    }
    if SEMANTIC_NAMES.contains(first) {
        return Some(ETC_GROUP.to_string());
    }

    Some(segments.join("-"))
}

/// Trailing numeric suffix of a variable name, e.g. `50` for `primary-50`
fn numeric_suffix(name: &str) -> Option<u32> {
    let digits: String = name
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

/// Resolve a `var(--x)` value to a literal color, one level deep
pub fn resolve_reference(value: &str, variables: &[CssVariable]) -> Option<String> {
    let caps = VAR_REF_RE.captures(value.trim())?;
    let target = &caps[1];

    if let Some(var) = variables.iter().find(|v| v.name == target) {
        if starts_with_color(&var.value) {
            return Some(var.value.clone());
        }
    }

    caps.get(2)
        .map(|fallback| fallback.as_str().trim())
        .filter(|fallback| starts_with_color(fallback))
        .map(str::to_string)
}

fn group_rank(name: &str) -> (usize, &str) {
    if name == ETC_GROUP {
        return (GROUP_PRIORITY.len() + 1, name);
    }
    match GROUP_PRIORITY.iter().position(|p| *p == name) {
        Some(idx) => (idx, ""),
        None => (GROUP_PRIORITY.len(), name),
    }
}

/// Group every color variable for the palette
pub fn group_colors(variables: &[CssVariable]) -> Vec<ColorGroup> {
    let mut groups: Vec<ColorGroup> = Vec::new();

    for var in variables
        .iter()
        .filter(|v| v.category == TokenCategory::Color)
    {
        let Some(key) = group_key(&var.name) else {
            continue;
        };

        let (background, resolved) = if starts_with_color(&var.value) {
            (var.value.clone(), false)
        } else {
            match resolve_reference(&var.value, variables) {
                Some(color) => (color, true),
                None => (var.value.clone(), false),
            }
        };

        let swatch = Swatch {
            name: var.name.clone(),
            value: var.value.clone(),
            background,
            resolved,
        };

        match groups.iter_mut().find(|g| g.name == key) {
            Some(group) => group.swatches.push(swatch),
            None => groups.push(ColorGroup {
                name: key,
                swatches: vec![swatch],
            }),
        }
    }

    for group in &mut groups {
        group.swatches.sort_by_key(|s| numeric_suffix(&s.name));
    }
    groups.sort_by(|a, b| group_rank(&a.name).cmp(&group_rank(&b.name)));
    groups
}
