// Input normalization
//
// Turns a directory, a ZIP archive, or crawled pages into the flat
// UploadedFile list the analyzer consumes.

pub mod images;

pub use images::*;

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Kind of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Markup,
    Stylesheet,
    Script,
    Image,
}

impl FileKind {
    /// Classify a path by extension; unsupported files yield `None`
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = extension(path)?;
        match ext.as_str() {
            "html" | "htm" | "xhtml" | "php" | "jsp" | "asp" | "aspx" => Some(FileKind::Markup),
            "css" => Some(FileKind::Stylesheet),
            "js" | "mjs" => Some(FileKind::Script),
            _ if mime_for_extension(&ext).is_some() => Some(FileKind::Image),
            _ => None,
        }
    }
}

/// One normalized input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Path relative to the input root, with forward slashes
    pub name: String,
    pub kind: FileKind,
    pub byte_size: u64,
    /// Raw text, or a data URI for images
    pub content: String,
}

impl UploadedFile {
    /// Build a file from raw bytes, encoding images as data URIs
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Option<Self> {
        let name = name.into();
        let kind = FileKind::from_path(&name)?;
        let content = match kind {
            FileKind::Image => {
                let mime = extension(&name)
                    .and_then(|ext| mime_for_extension(&ext))
                    .unwrap_or("application/octet-stream");
                format!("data:{};base64,{}", mime, BASE64.encode(bytes))
            }
            _ => String::from_utf8_lossy(bytes).into_owned(),
        };

        Some(Self {
            name,
            kind,
            byte_size: bytes.len() as u64,
            content,
        })
    }

    /// Build a text file (markup, stylesheet or script)
    pub fn text(name: impl Into<String>, kind: FileKind, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            kind,
            byte_size: content.len() as u64,
            content,
        }
    }
}

/// Number of files per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounts {
    pub markup: usize,
    pub stylesheet: usize,
    pub script: usize,
    pub image: usize,
}

impl FileCounts {
    pub fn from_files(files: &[UploadedFile]) -> Self {
        let mut counts = Self::default();
        for file in files {
            match file.kind {
                FileKind::Markup => counts.markup += 1,
                FileKind::Stylesheet => counts.stylesheet += 1,
                FileKind::Script => counts.script += 1,
                FileKind::Image => counts.image += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.markup + self.stylesheet + self.script + self.image
    }

    /// Whether there is anything a style guide can be built from
    pub fn has_content(&self) -> bool {
        self.markup + self.stylesheet > 0
    }
}

/// Load a directory or a `.zip` archive
pub fn load_path(path: &Path, config: &AnalysisConfig) -> Result<Vec<UploadedFile>> {
    if !path.exists() {
        return Err(Error::PathNotFound(path.to_path_buf()));
    }

    let is_zip = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

    if is_zip {
        load_zip(path, config)
    } else if path.is_dir() {
        load_directory(path, config)
    } else {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = std::fs::read(path)?;
        Ok(UploadedFile::from_bytes(name, &bytes).into_iter().collect())
    }
}

/// Load every supported file under a directory
pub fn load_directory(root: &Path, config: &AnalysisConfig) -> Result<Vec<UploadedFile>> {
    let filter = PathFilter::new(config)?;
    let mut files = Vec::new();

    let mut entries: Vec<_> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .collect();
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    for entry in entries {
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = relative
            .iter()
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if !filter.accepts(&name) {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if size > config.max_file_size {
            warn!("Skipping {} ({} bytes exceeds limit)", name, size);
            continue;
        }

        let bytes = std::fs::read(entry.path())?;
        if let Some(file) = UploadedFile::from_bytes(name, &bytes) {
            files.push(file);
        }
    }

    debug!("Loaded {} files from {}", files.len(), root.display());
    Ok(files)
}

/// Load every supported file inside a ZIP archive
pub fn load_zip(path: &Path, config: &AnalysisConfig) -> Result<Vec<UploadedFile>> {
    let filter = PathFilter::new(config)?;
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut files = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().trim_start_matches('/').replace('\\', "/");
        if name.starts_with("__MACOSX/") || !filter.accepts(&name) {
            continue;
        }

        if entry.size() > config.max_file_size {
            warn!("Skipping {} ({} bytes exceeds limit)", name, entry.size());
            continue;
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        if let Some(file) = UploadedFile::from_bytes(name, &bytes) {
            files.push(file);
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Loaded {} files from {}", files.len(), path.display());
    Ok(files)
}

/// Include/exclude glob matching on relative paths
struct PathFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathFilter {
    fn new(config: &AnalysisConfig) -> Result<Self> {
        let compile = |patterns: &[String]| -> Result<Vec<Pattern>> {
            patterns
                .iter()
                .map(|p| Pattern::new(p).map_err(Error::from))
                .collect()
        };

        Ok(Self {
            include: compile(&config.include)?,
            exclude: compile(&config.exclude)?,
        })
    }

    fn accepts(&self, name: &str) -> bool {
        if FileKind::from_path(name).is_none() {
            return false;
        }
        if self.exclude.iter().any(|p| p.matches(name)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches(name))
    }
}

/// Lowercased extension of a path or URL, ignoring query and fragment
pub fn extension(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
