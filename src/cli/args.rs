//! CLI argument parsing

use crate::config::{CliOverrides, SectionKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate UI style guides from legacy HTML/CSS codebases
#[derive(Parser, Debug)]
#[command(name = "stylemap")]
#[command(about = "Generate UI style guides from legacy HTML/CSS codebases")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Command::Analyze { output, .. } | Command::Crawl { output, .. } => output.verbose,
            Command::Version => false,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a directory or ZIP archive and generate a style guide
    Analyze {
        /// Directory or .zip file to analyze
        path: PathBuf,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Crawl a website and generate a style guide
    Crawl {
        /// Seed URL
        url: String,

        /// Maximum pages to fetch, seed included
        #[arg(long)]
        max_pages: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show version information
    Version,
}

/// Flags shared by every generating command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format (html, json)
    #[arg(long, value_parser = ["html", "json"])]
    pub format: Option<String>,

    /// Sections to leave out (can be repeated)
    #[arg(long, value_name = "SECTION")]
    pub skip: Vec<SectionKind>,

    /// Omit the table of contents
    #[arg(long)]
    pub no_toc: bool,

    /// Omit source code blocks
    #[arg(long)]
    pub no_code: bool,

    /// Project name shown in the guide header
    #[arg(long)]
    pub title: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl OutputArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            output: self.output.clone(),
            format: self.format.clone(),
            skip: self.skip.clone(),
            no_toc: self.no_toc,
            no_code: self.no_code,
            title: self.title.clone(),
            ..Default::default()
        }
    }
}
