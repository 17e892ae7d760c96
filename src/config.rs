use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
    pub sections: SectionOptions,
    /// Section id -> class keywords matched against the analyzed class set
    pub additional_classes: BTreeMap<String, Vec<String>>,
    pub crawl: CrawlConfig,
}

/// Project metadata shown in the guide header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

/// Input discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub exclude: Vec<String>,
    /// Empty means every supported file kind
    pub include: Vec<String>,
    pub max_file_size: u64,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub path: PathBuf,
    pub toc: bool,
    pub code_blocks: bool,
    pub highlight: bool,
    pub neutralize_links: bool,
    /// Maximum live preview samples per section
    pub preview_limit: usize,
    /// Maximum class labels per section
    pub label_limit: usize,
}

/// Crawler limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub max_pages: usize,
    pub max_stylesheets: usize,
    pub import_depth: usize,
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

/// Sections of the generated guide, in render order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Colors,
    Typography,
    Icons,
    Badges,
    Lists,
    Tabs,
    Tables,
    Buttons,
    Forms,
    Boxes,
    Modals,
    Pagination,
    Accordions,
    Meta,
}

impl SectionKind {
    /// Fixed render order
    pub const ALL: [SectionKind; 14] = [
        SectionKind::Colors,
        SectionKind::Typography,
        SectionKind::Icons,
        SectionKind::Badges,
        SectionKind::Lists,
        SectionKind::Tabs,
        SectionKind::Tables,
        SectionKind::Buttons,
        SectionKind::Forms,
        SectionKind::Boxes,
        SectionKind::Modals,
        SectionKind::Pagination,
        SectionKind::Accordions,
        SectionKind::Meta,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SectionKind::Colors => "colors",
            SectionKind::Typography => "typography",
            SectionKind::Icons => "icons",
            SectionKind::Badges => "badges",
            SectionKind::Lists => "lists",
            SectionKind::Tabs => "tabs",
            SectionKind::Tables => "tables",
            SectionKind::Buttons => "buttons",
            SectionKind::Forms => "forms",
            SectionKind::Boxes => "boxes",
            SectionKind::Modals => "modals",
            SectionKind::Pagination => "pagination",
            SectionKind::Accordions => "accordions",
            SectionKind::Meta => "meta",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Colors => "Colors",
            SectionKind::Typography => "Typography",
            SectionKind::Icons => "Icons",
            SectionKind::Badges => "Badges",
            SectionKind::Lists => "Lists",
            SectionKind::Tabs => "Tabs",
            SectionKind::Tables => "Tables",
            SectionKind::Buttons => "Buttons",
            SectionKind::Forms => "Forms",
            SectionKind::Boxes => "Boxes",
            SectionKind::Modals => "Modal",
            SectionKind::Pagination => "Pagination",
            SectionKind::Accordions => "Accordions",
            SectionKind::Meta => "Favicon & OG",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.id() == id).or(match id.as_str() {
            "modal" => Some(SectionKind::Modals),
            "favicon" | "og" => Some(SectionKind::Meta),
            _ => None,
        })
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SectionKind::from_id(s).ok_or_else(|| format!("unknown section: {}", s))
    }
}

/// Per-section on/off switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionOptions {
    pub colors: bool,
    pub typography: bool,
    pub icons: bool,
    pub badges: bool,
    pub lists: bool,
    pub tabs: bool,
    pub tables: bool,
    pub buttons: bool,
    pub forms: bool,
    pub boxes: bool,
    pub modals: bool,
    pub pagination: bool,
    pub accordions: bool,
    pub meta: bool,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            colors: true,
            typography: true,
            icons: true,
            badges: true,
            lists: true,
            tabs: true,
            tables: true,
            buttons: true,
            forms: true,
            boxes: true,
            modals: true,
            pagination: true,
            accordions: true,
            meta: true,
        }
    }
}

impl SectionOptions {
    pub fn set(&mut self, kind: SectionKind, enabled: bool) {
        let slot = match kind {
            SectionKind::Colors => &mut self.colors,
            SectionKind::Typography => &mut self.typography,
            SectionKind::Icons => &mut self.icons,
            SectionKind::Badges => &mut self.badges,
            SectionKind::Lists => &mut self.lists,
            SectionKind::Tabs => &mut self.tabs,
            SectionKind::Tables => &mut self.tables,
            SectionKind::Buttons => &mut self.buttons,
            SectionKind::Forms => &mut self.forms,
            SectionKind::Boxes => &mut self.boxes,
            SectionKind::Modals => &mut self.modals,
            SectionKind::Pagination => &mut self.pagination,
            SectionKind::Accordions => &mut self.accordions,
            SectionKind::Meta => &mut self.meta,
        };
        *slot = enabled;
    }

    pub fn is_enabled(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Colors => self.colors,
            SectionKind::Typography => self.typography,
            SectionKind::Icons => self.icons,
            SectionKind::Badges => self.badges,
            SectionKind::Lists => self.lists,
            SectionKind::Tabs => self.tabs,
            SectionKind::Tables => self.tables,
            SectionKind::Buttons => self.buttons,
            SectionKind::Forms => self.forms,
            SectionKind::Boxes => self.boxes,
            SectionKind::Modals => self.modals,
            SectionKind::Pagination => self.pagination,
            SectionKind::Accordions => self.accordions,
            SectionKind::Meta => self.meta,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            description: None,
            version: None,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            exclude: vec![
                "node_modules/**".to_string(),
                ".git/**".to_string(),
                "__MACOSX/**".to_string(),
            ],
            include: vec![],
            max_file_size: 5 * 1024 * 1024,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            path: PathBuf::from("./styleguide.html"),
            toc: true,
            code_blocks: true,
            highlight: true,
            neutralize_links: true,
            preview_limit: 4,
            label_limit: 30,
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 20,
            max_stylesheets: 15,
            import_depth: 2,
            concurrency: 8,
            timeout_secs: 15,
            user_agent: format!("stylemap/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, overrides: CliOverrides) {
        if let Some(out) = overrides.output {
            self.output.path = out;
        }

        if !overrides.exclude.is_empty() {
            self.analysis.exclude.extend(overrides.exclude);
        }

        if let Some(fmt) = overrides.format {
            self.output.format = match fmt.as_str() {
                "json" => OutputFormat::Json,
                _ => OutputFormat::Html,
            };
        }

        for kind in overrides.skip {
            self.sections.set(kind, false);
        }

        if overrides.no_toc {
            self.output.toc = false;
        }

        if overrides.no_code {
            self.output.code_blocks = false;
        }

        if let Some(title) = overrides.title {
            self.project.name = title;
        }

        if let Some(max_pages) = overrides.max_pages {
            self.crawl.max_pages = max_pages;
        }
    }

    /// Additional class keywords configured for one section, aliases included
    pub fn additional_for(&self, kind: SectionKind) -> Vec<String> {
        self.additional_classes
            .iter()
            .filter(|(key, _)| SectionKind::from_id(key) == Some(kind))
            .flat_map(|(_, keywords)| keywords.iter().cloned())
            .collect()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.output.preview_limit == 0 {
            return Err(Error::config_validation("preview_limit must be at least 1"));
        }

        if self.output.preview_limit > 50 {
            return Err(Error::config_validation("preview_limit cannot exceed 50"));
        }

        if self.output.label_limit == 0 {
            return Err(Error::config_validation("label_limit must be at least 1"));
        }

        if self.crawl.max_pages == 0 {
            return Err(Error::config_validation("crawl max_pages must be at least 1"));
        }

        if self.crawl.max_pages > 500 {
            return Err(Error::config_validation("crawl max_pages cannot exceed 500"));
        }

        if self.crawl.max_stylesheets == 0 {
            return Err(Error::config_validation(
                "crawl max_stylesheets must be at least 1",
            ));
        }

        if self.crawl.import_depth > 5 {
            return Err(Error::config_validation("crawl import_depth cannot exceed 5"));
        }

        if self.crawl.concurrency == 0 {
            return Err(Error::config_validation("crawl concurrency must be at least 1"));
        }

        if let Some(key) = self
            .additional_classes
            .keys()
            .find(|key| SectionKind::from_id(key).is_none())
        {
            return Err(Error::config_validation(format!(
                "unknown section in additional_classes: {}",
                key
            )));
        }

        Ok(())
    }
}

/// Values collected from the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output: Option<PathBuf>,
    pub exclude: Vec<String>,
    pub format: Option<String>,
    pub skip: Vec<SectionKind>,
    pub no_toc: bool,
    pub no_code: bool,
    pub title: Option<String>,
    pub max_pages: Option<usize>,
}
