//! Image path resolution.
//!
//! Legacy markup refers to the same asset as `img/a.png`, `./img/a.png`,
//! `../img/a.png` or `/img/a.png` depending on which page it lives in. The
//! store registers every asset under all of those spellings so references can
//! be swapped for inline data URIs regardless of the page's directory depth.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(\bsrc\s*=\s*)(["'])([^"']+?\.(?:jpe?g|png|gif|svg|webp|ico|bmp)(?:[?#][^"']*)?)(["'])"#,
    )
    .expect("SRC_RE: hardcoded regex is valid")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)url\(\s*(["']?)([^"')]+?\.(?:jpe?g|png|gif|svg|webp|ico|bmp)(?:[?#][^"')]*)?)(["']?)\s*\)"#,
    )
    .expect("URL_RE: hardcoded regex is valid")
});

const PREFIXES: [&str; 4] = ["", "./", "../", "/"];

/// MIME type for a supported image extension
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        "ico" => Some("image/x-icon"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Multi-key lookup from asset paths to inline data
#[derive(Debug, Default)]
pub struct ImageStore {
    assets: Vec<String>,
    index: HashMap<String, usize>,
    /// Keys in registration order, for the containment scan
    keys: Vec<String>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn clear(&mut self) {
        self.assets.clear();
        self.index.clear();
        self.keys.clear();
    }

    /// Register an asset under its path, file name and every path suffix
    pub fn register(&mut self, path: &str, inline: impl Into<String>) {
        let slot = self.assets.len();
        self.assets.push(inline.into());

        self.insert_key(path.to_string(), slot);

        let normalized = normalize(path);
        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        for start in 0..segments.len() {
            let suffix = segments[start..].join("/");
            for prefix in PREFIXES {
                self.insert_key(format!("{}{}", prefix, suffix), slot);
            }
        }
    }

    fn insert_key(&mut self, key: String, slot: usize) {
        if !self.index.contains_key(&key) {
            self.keys.push(key.clone());
            self.index.insert(key, slot);
        }
    }

    /// Look up inline data for a reference found in markup or CSS
    pub fn resolve(&self, path: &str) -> Option<&str> {
        let path = path.trim();
        if path.is_empty() || is_external(path) {
            return None;
        }

        if let Some(&slot) = self.index.get(path) {
            return Some(&self.assets[slot]);
        }

        let normalized = normalize(path);
        if normalized.is_empty() {
            return None;
        }
        if let Some(&slot) = self.index.get(normalized.as_str()) {
            return Some(&self.assets[slot]);
        }

        let file_name = normalized.rsplit('/').next().unwrap_or(&normalized);
        if let Some(&slot) = self.index.get(file_name) {
            return Some(&self.assets[slot]);
        }

        // First registered key wins when several assets share a name
        self.keys
            .iter()
            .find(|key| {
                let key = normalize(key);
                !key.is_empty() && (key.ends_with(&normalized) || normalized.ends_with(&key))
            })
            .and_then(|key| self.index.get(key))
            .map(|&slot| self.assets[slot].as_str())
    }

    /// Replace resolvable `src="…"` and `url(…)` image references with inline data
    pub fn rewrite_all(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }

        let pass = SRC_RE.replace_all(text, |caps: &Captures| {
            match self.resolve(strip_query(&caps[3])) {
                Some(data) => format!("{}{}{}{}", &caps[1], &caps[2], data, &caps[4]),
                None => caps[0].to_string(),
            }
        });

        URL_RE
            .replace_all(&pass, |caps: &Captures| match self.resolve(strip_query(&caps[2])) {
                Some(data) => format!("url(\"{}\")", data),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Strip leading `./`, `../` and `/` segments and backslashes
fn normalize(path: &str) -> String {
    let mut rest = path.trim();
    let owned;
    if rest.contains('\\') {
        owned = rest.replace('\\', "/");
        rest = &owned;
    }
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            break;
        }
    }
    rest.to_string()
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn is_external(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("data:")
        || lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
}
