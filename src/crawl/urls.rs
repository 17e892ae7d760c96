// URL rules for the crawler: seed validation, host scoping, exclusions
// and page identity.

use crate::analysis::rules::CAROUSEL_FRAGMENTS;
use crate::error::{Error, Result};
use url::Url;

/// Path fragments of pages that carry no reusable UI
const EXCLUDED_PATH_FRAGMENTS: &[&str] = &[
    "login", "logout", "signin", "signup", "join", "register", "member/", "mypage", "admin",
    "wp-admin", "auth", "oauth", "cart", "order", "checkout", "search", "print", "download",
    "/api/", "rss", "feed",
];

/// File extensions that are never pages
const EXCLUDED_EXTENSIONS: &[&str] = &[
    "pdf", "zip", "rar", "7z", "hwp", "hwpx", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "jpg",
    "jpeg", "png", "gif", "svg", "webp", "ico", "bmp", "mp3", "mp4", "avi", "mov", "exe", "dmg",
    "css", "js", "json", "xml", "txt",
];

/// Query keys of listing, paging and search variants of a page
const EXCLUDED_QUERY_KEYS: &[&str] = &[
    "page", "pageindex", "pageno", "page_no", "cpage", "search", "searchkeyword", "keyword",
    "query", "q", "sort", "search_target", "search_keyword",
];

/// File-name prefixes of carousel builds whose class fragment alone is too
/// short to match on (`owl-`, `bx-`)
const CAROUSEL_FILE_PREFIXES: &[&str] = &["owl.", "owl-", "bx-", "jquery.bx"];

/// Query parameter some CMSes use as the page identity
const PAGE_ID_PARAM: &str = "mid";

/// Validate and normalize a seed URL. A bare host gets `https://`.
pub fn validate_seed(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_url("URL is empty"));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url =
        Url::parse(&candidate).map_err(|e| Error::invalid_url(format!("{}: {}", trimmed, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_url(format!(
            "{}: only http and https are supported",
            trimmed
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::invalid_url(format!("{}: missing host", trimmed)));
    }

    Ok(url)
}

/// Host with `www.` / `m.` stripped
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .map(str::to_string)
        .unwrap_or(host);
    Some(host)
}

pub fn same_host(a: &Url, b: &Url) -> bool {
    match (host_key(a), host_key(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Whether a discovered link is not worth fetching as a page
pub fn is_excluded(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();

    if EXCLUDED_PATH_FRAGMENTS.iter().any(|frag| path.contains(frag)) {
        return true;
    }

    if let Some(ext) = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
    {
        if EXCLUDED_EXTENSIONS.contains(&ext) {
            return true;
        }
    }

    url.query_pairs()
        .any(|(key, _)| EXCLUDED_QUERY_KEYS.contains(&key.to_ascii_lowercase().as_str()))
}

/// Dedup key for a page: host plus the `mid` parameter when present,
/// else host plus path without a trailing slash
pub fn page_key(url: &Url) -> String {
    let host = host_key(url).unwrap_or_default();

    if let Some((_, mid)) = url.query_pairs().find(|(key, _)| key == PAGE_ID_PARAM) {
        return format!("{}?{}={}", host, PAGE_ID_PARAM, mid);
    }

    let path = url.path().trim_end_matches('/');
    let path = path
        .strip_suffix("/index.html")
        .or_else(|| path.strip_suffix("/index.htm"))
        .or_else(|| path.strip_suffix("/index.php"))
        .unwrap_or(path);
    format!("{}{}", host, path)
}

/// Whether a stylesheet URL belongs to a carousel library
pub fn is_carousel_stylesheet(url: &Url) -> bool {
    let file = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("")
        .to_ascii_lowercase();
    CAROUSEL_FRAGMENTS
        .iter()
        .filter(|frag| !frag.ends_with('-'))
        .any(|frag| file.contains(frag))
        || CAROUSEL_FILE_PREFIXES
            .iter()
            .any(|prefix| file.starts_with(prefix))
}

/// Resolve an href against a base, dropping fragments and non-http schemes
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_validate_seed() {
        assert_eq!(validate_seed("example.com").unwrap().as_str(), "https://example.com/");
        assert_eq!(
            validate_seed(" http://example.com/a ").unwrap().as_str(),
            "http://example.com/a"
        );
        assert!(matches!(validate_seed(""), Err(Error::InvalidUrl(_))));
        assert!(matches!(validate_seed("ftp://example.com"), Err(Error::InvalidUrl(_))));
        assert!(matches!(validate_seed("http://"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_same_host_normalizes_prefixes() {
        assert!(same_host(&url("https://www.example.com/"), &url("http://example.com/a")));
        assert!(same_host(&url("https://m.example.com/"), &url("https://www.example.com/")));
        assert!(!same_host(&url("https://example.com/"), &url("https://cdn.example.com/")));
        assert!(!same_host(&url("https://example.com/"), &url("https://other.org/")));
    }

    #[test]
    fn test_is_excluded() {
        assert!(is_excluded(&url("https://a.com/member/login.do")));
        assert!(is_excluded(&url("https://a.com/admin/")));
        assert!(is_excluded(&url("https://a.com/files/guide.pdf")));
        assert!(is_excluded(&url("https://a.com/board/list.do?page=2")));
        assert!(is_excluded(&url("https://a.com/board?searchKeyword=x")));
        assert!(!is_excluded(&url("https://a.com/about/intro.html")));
        assert!(!is_excluded(&url("https://a.com/index.php?mid=notice")));
    }

    #[test]
    fn test_page_key() {
        assert_eq!(
            page_key(&url("https://www.a.com/index.php?mid=notice&document_srl=3")),
            "a.com?mid=notice"
        );
        assert_eq!(
            page_key(&url("https://a.com/?mid=notice")),
            page_key(&url("https://a.com/index.php?mid=notice"))
        );
        assert_eq!(page_key(&url("https://a.com/about/")), "a.com/about");
        assert_eq!(page_key(&url("https://a.com/index.html")), page_key(&url("https://a.com/")));
    }

    #[test]
    fn test_is_carousel_stylesheet() {
        assert!(is_carousel_stylesheet(&url("https://a.com/css/swiper-bundle.min.css")));
        assert!(is_carousel_stylesheet(&url("https://a.com/lib/slick/slick-theme.css")));
        assert!(is_carousel_stylesheet(&url("https://a.com/css/owl.carousel.css")));
        assert!(is_carousel_stylesheet(&url("https://a.com/lib/owl.theme.default.min.css")));
        assert!(is_carousel_stylesheet(&url("https://a.com/lib/jquery.bxslider.css")));
        assert!(is_carousel_stylesheet(&url("https://a.com/lib/bx-styles.css")));
        assert!(!is_carousel_stylesheet(&url("https://a.com/css/common.css")));
        assert!(!is_carousel_stylesheet(&url("https://a.com/css/knowledge.css")));
        assert!(!is_carousel_stylesheet(&url("https://a.com/css/rgbx-theme.css")));
        assert!(!is_carousel_stylesheet(&url("https://a.com/css/flower-owl.css")));
    }

    #[test]
    fn test_resolve_link() {
        let base = url("https://a.com/sub/page.html");
        assert_eq!(
            resolve_link(&base, "../about.html#top").unwrap().as_str(),
            "https://a.com/about.html"
        );
        assert!(resolve_link(&base, "#top").is_none());
        assert!(resolve_link(&base, "javascript:void(0)").is_none());
        assert!(resolve_link(&base, "mailto:a@a.com").is_none());
    }
}
