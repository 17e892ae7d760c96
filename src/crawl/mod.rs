// Website crawler
//
// Fetches a seed page, a bounded set of same-host subpages and their
// stylesheets, and hands them to the analyzer as uploaded files. Fetches
// fan out on a bounded rayon pool; results keep discovery order.

pub mod urls;

pub use urls::*;

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use crate::input::{FileKind, UploadedFile};
use rayon::prelude::*;
use rayon::ThreadPool;
use regex::Regex;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("LINK: hardcoded selector is valid"));

static STYLESHEET: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("link[rel~=\"stylesheet\"][href]")
        .expect("STYLESHEET: hardcoded selector is valid")
});

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@import\s+(?:url\(\s*)?["']?([^"')\s;]+)["']?\s*\)?[^;]*;"#)
        .expect("IMPORT_RE: hardcoded regex is valid")
});

/// One fetched page or stylesheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchedDocument {
    pub url: String,
    pub content: String,
}

/// Everything one crawl collected, in discovery order
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub html: Vec<FetchedDocument>,
    pub css: Vec<FetchedDocument>,
    pub base_url: String,
    pub pages_count: usize,
}

impl CrawlResult {
    /// Convert to analyzer input. Names are numbered to stay unique.
    pub fn into_files(self) -> Vec<UploadedFile> {
        let pages = self.html.into_iter().enumerate().map(|(idx, doc)| {
            let name = format!("pages/{:03}-{}.html", idx + 1, file_stem(&doc.url, "index"));
            UploadedFile::text(name, FileKind::Markup, doc.content)
        });
        let sheets = self.css.into_iter().enumerate().map(|(idx, doc)| {
            let name = format!("css/{:03}-{}.css", idx + 1, file_stem(&doc.url, "style"));
            UploadedFile::text(name, FileKind::Stylesheet, doc.content)
        });
        pages.chain(sheets).collect()
    }
}

/// Last path segment without extension, or `mid` value, sanitized for a file name
fn file_stem(url: &str, fallback: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return fallback.to_string();
    };
    if let Some((_, mid)) = parsed.query_pairs().find(|(key, _)| key == "mid") {
        return sanitize_stem(&mid, fallback);
    }
    let last = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");
    let stem = last.rsplit_once('.').map_or(last, |(stem, _)| stem);
    sanitize_stem(stem, fallback)
}

fn sanitize_stem(raw: &str, fallback: &str) -> String {
    let stem: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        fallback.to_string()
    } else {
        stem.to_string()
    }
}

/// Same-host page links in document order, excluding non-content paths
pub fn discover_links(base: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    document
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .filter(|url| same_host(base, url) && !is_excluded(url))
        .collect()
}

/// Same-host stylesheet links in document order
pub fn stylesheet_links(base: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    document
        .select(&STYLESHEET)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .filter(|url| same_host(base, url))
        .collect()
}

/// `@import` targets of one stylesheet
pub fn import_links(base: &Url, css: &str) -> Vec<Url> {
    IMPORT_RE
        .captures_iter(css)
        .filter_map(|caps| resolve_link(base, &caps[1]))
        .collect()
}

/// Crawler over one seed site
pub struct Crawler {
    config: CrawlConfig,
    client: Client,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Crawl a seed URL.
    ///
    /// An invalid seed or a failed seed fetch is an error; every other
    /// failed fetch is logged and leaves a gap.
    pub fn crawl(&self, seed: &str) -> Result<CrawlResult> {
        let seed = validate_seed(seed)?;
        info!("Crawling {}", seed);

        let seed_html = self.fetch(&seed)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.concurrency)
            .build()
            .map_err(|e| Error::other(format!("Failed to start fetch pool: {}", e)))?;

        let mut seen = HashSet::from([page_key(&seed)]);
        let subpages: Vec<Url> = discover_links(&seed, &seed_html)
            .into_iter()
            .filter(|url| seen.insert(page_key(url)))
            .take(self.config.max_pages.saturating_sub(1))
            .collect();
        debug!("Discovered {} subpages", subpages.len());

        let mut html = vec![FetchedDocument {
            url: seed.to_string(),
            content: seed_html,
        }];
        html.extend(self.fetch_all(&pool, &subpages));

        let css = self.collect_stylesheets(&pool, &html);

        info!("Fetched {} pages and {} stylesheets", html.len(), css.len());

        Ok(CrawlResult {
            pages_count: html.len(),
            html,
            css,
            base_url: seed.to_string(),
        })
    }

    fn collect_stylesheets(
        &self,
        pool: &ThreadPool,
        pages: &[FetchedDocument],
    ) -> Vec<FetchedDocument> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut wanted: Vec<Url> = Vec::new();

        for page in pages {
            let Ok(base) = Url::parse(&page.url) else {
                continue;
            };
            for url in stylesheet_links(&base, &page.content) {
                if is_carousel_stylesheet(&url) {
                    debug!("Skipping carousel stylesheet {}", url);
                    continue;
                }
                if seen.insert(url.to_string()) {
                    wanted.push(url);
                }
            }
        }
        wanted.truncate(self.config.max_stylesheets);

        let mut sheets = self.fetch_all(pool, &wanted);

        let mut frontier: Vec<FetchedDocument> = sheets.clone();
        for depth in 1..=self.config.import_depth {
            let remaining = self.config.max_stylesheets.saturating_sub(sheets.len());
            if frontier.is_empty() || remaining == 0 {
                break;
            }

            let mut imports = Vec::new();
            for sheet in &frontier {
                let Ok(base) = Url::parse(&sheet.url) else {
                    continue;
                };
                for url in import_links(&base, &sheet.content) {
                    if same_host(&base, &url)
                        && !is_carousel_stylesheet(&url)
                        && seen.insert(url.to_string())
                    {
                        imports.push(url);
                    }
                }
            }
            imports.truncate(remaining);
            debug!("Resolving {} imports at depth {}", imports.len(), depth);

            frontier = self.fetch_all(pool, &imports);
            sheets.extend(frontier.iter().cloned());
        }

        sheets
    }

    /// Fetch concurrently; failures are logged and dropped, order is kept
    fn fetch_all(&self, pool: &ThreadPool, urls: &[Url]) -> Vec<FetchedDocument> {
        pool.install(|| {
            urls.par_iter()
                .map(|url| match self.fetch(url) {
                    Ok(content) => Some(FetchedDocument {
                        url: url.to_string(),
                        content,
                    }),
                    Err(e) => {
                        warn!("{}", e);
                        None
                    }
                })
                .collect::<Vec<_>>()
        })
        .into_iter()
        .flatten()
        .collect()
    }

    fn fetch(&self, url: &Url) -> Result<String> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| Error::fetch(url.as_str(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::fetch(
                url.as_str(),
                format!("server returned status {}", response.status()),
            ));
        }

        response
            .text()
            .map_err(|e| Error::fetch(url.as_str(), e.to_string()))
    }
}
