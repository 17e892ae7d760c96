//! CLI module for stylemap

mod args;

pub use args::{Args, Command, OutputArgs};

use crate::analysis::Analyzer;
use crate::config::{CliOverrides, Config, OutputFormat, ProjectConfig};
use crate::crawl::Crawler;
use crate::error::{Error, Result};
use crate::input::{load_path, FileCounts, UploadedFile};
use crate::output::{BuildOptions, StyleGuideBuilder};
use crate::session::Session;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "stylemap.toml";

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();
    init_logging(args.verbose());

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the tracing subscriber; `RUST_LOG` wins over the verbose flag
fn init_logging(verbose: bool) {
    let default = if verbose { "stylemap=debug" } else { "stylemap=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Analyze {
            path,
            exclude,
            output,
        } => {
            let mut cfg = load_config(
                &output,
                CliOverrides {
                    exclude,
                    ..output.overrides()
                },
            )?;

            if !path.exists() {
                return Err(Error::PathNotFound(path));
            }

            if output.verbose {
                println!("Analyzing: {}", path.display());
                println!("Output: {}", output_path(&cfg).display());
                println!("Format: {:?}", cfg.output.format);
                println!("Include: {:?}", cfg.analysis.include);
                println!("Exclude: {:?}", cfg.analysis.exclude);
            }

            if uses_default_name(&cfg) {
                if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                    cfg.project.name = name.to_string();
                }
            }

            println!("Loading files...");
            let files = load_path(&path, &cfg.analysis)?;
            generate(&cfg, files, &path.display().to_string(), output.verbose)
        }

        Command::Crawl {
            url,
            max_pages,
            output,
        } => {
            let mut cfg = load_config(
                &output,
                CliOverrides {
                    max_pages,
                    ..output.overrides()
                },
            )?;

            println!("Crawling {}...", url);
            let crawler = Crawler::new(cfg.crawl.clone())?;
            let crawled = crawler.crawl(&url)?;
            println!(
                "Fetched {} pages and {} stylesheets",
                crawled.pages_count,
                crawled.css.len()
            );

            if uses_default_name(&cfg) {
                if let Some(host) = url::Url::parse(&crawled.base_url)
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_string))
                {
                    cfg.project.name = host;
                }
            }

            let source = crawled.base_url.clone();
            generate(&cfg, crawled.into_files(), &source, output.verbose)
        }

        Command::Version => {
            println!("stylemap {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Explicit `--config` must load; the default file is optional
fn load_config(output: &OutputArgs, overrides: CliOverrides) -> Result<Config> {
    let mut cfg = match &output.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG)),
    };
    cfg.merge_cli(overrides);
    cfg.validate()?;
    Ok(cfg)
}

fn uses_default_name(cfg: &Config) -> bool {
    cfg.project.name.is_empty() || cfg.project.name == ProjectConfig::default().name
}

/// Configured output path; JSON output swaps the default `.html` extension
fn output_path(cfg: &Config) -> PathBuf {
    let path = cfg.output.path.clone();
    let is_html = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
    if cfg.output.format == OutputFormat::Json && is_html {
        path.with_extension("json")
    } else {
        path
    }
}

fn generate(cfg: &Config, files: Vec<UploadedFile>, source: &str, verbose: bool) -> Result<()> {
    let counts = FileCounts::from_files(&files);
    println!(
        "Found {} files ({} markup, {} stylesheets, {} scripts, {} images)",
        counts.total(),
        counts.markup,
        counts.stylesheet,
        counts.script,
        counts.image
    );

    if !counts.has_content() {
        return Err(Error::empty_input(source));
    }

    let session = Session::with_files(&files);

    println!("Analyzing markup and stylesheets...");
    let analysis = Analyzer::new(cfg.clone())
        .with_verbose(verbose)
        .analyze(&files, &session);

    println!(
        "Analysis complete: {} classes, {} CSS variables, {} colors",
        analysis.classes.len(),
        analysis.css_variables.len(),
        analysis.colors.len()
    );

    let path = output_path(cfg);
    let contents = match cfg.output.format {
        OutputFormat::Html => {
            let options = BuildOptions::from_config(cfg);
            StyleGuideBuilder::new(&session, &options)?.build(&analysis, &files)?
        }
        OutputFormat::Json => serde_json::to_string_pretty(&analysis)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, contents)?;

    match cfg.output.format {
        OutputFormat::Html => println!("Style guide written to: {}", path.display()),
        OutputFormat::Json => println!("Analysis written to: {}", path.display()),
    }

    Ok(())
}
