//! Stylemap - Generate UI style guides from legacy HTML/CSS codebases
//!
//! Reads a directory, a ZIP archive or a crawled website, extracts design
//! tokens and recurring UI components, and renders them as one
//! self-contained HTML page.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod crawl;
pub mod error;
pub mod input;
pub mod output;
pub mod session;

// Re-export main types
pub use analysis::{AnalysisResult, Analyzer, Component};
pub use config::{Config, SectionKind};
pub use crawl::{CrawlResult, Crawler};
pub use error::{Error, Result};
pub use input::{FileCounts, FileKind, ImageStore, UploadedFile};
pub use output::{BuildOptions, StyleGuideBuilder};
pub use session::Session;
