// Integration tests for Stylemap

use assert_cmd::Command;
use chrono::NaiveDate;
use predicates::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use stylemap::analysis::TokenCategory;
use stylemap::config::AnalysisConfig;
use stylemap::input::{load_directory, load_path};
use stylemap::{
    AnalysisResult, Analyzer, BuildOptions, Component, Config, FileCounts, FileKind, SectionKind,
    Session, StyleGuideBuilder, UploadedFile,
};
use tempfile::TempDir;

fn fixtures_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixed_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

fn load_fixture_site() -> Vec<UploadedFile> {
    load_directory(&fixtures_path("legacy_site"), &AnalysisConfig::default())
        .expect("Failed to load fixture site")
}

fn analyze(files: &[UploadedFile], session: &Session) -> AnalysisResult {
    Analyzer::new(Config::default()).analyze(files, session)
}

fn build(files: &[UploadedFile], options: &BuildOptions) -> String {
    let session = Session::with_files(files);
    let result = analyze(files, &session);
    StyleGuideBuilder::new(&session, options)
        .expect("Failed to create builder")
        .with_date(fixed_date())
        .build(&result, files)
        .expect("Build failed")
}

// ============================================================================
// Analysis Tests
// ============================================================================

#[test]
fn test_minimal_site_end_to_end() {
    let files = vec![
        UploadedFile::text(
            "index.html",
            FileKind::Markup,
            r#"<html><body><button class="btn-primary">Go</button><span class="badge-new">New</span></body></html>"#,
        ),
        UploadedFile::text(
            "style.css",
            FileKind::Stylesheet,
            ":root{--primary-50:#246BEB;} .btn-primary{color:var(--primary-50);}",
        ),
    ];
    let session = Session::with_files(&files);
    let result = analyze(&files, &session);

    assert_eq!(result.bucket(Component::Buttons), ["btn-primary"]);
    assert_eq!(result.class_frequency["btn-primary"], 1);
    assert_eq!(result.samples(Component::Buttons)[0].occurrences, 1);
    assert_eq!(result.bucket(Component::Badges), ["badge-new"]);

    assert_eq!(result.css_variables.len(), 1);
    let variable = &result.css_variables[0];
    assert_eq!(variable.name, "primary-50");
    assert_eq!(variable.value, "#246BEB");
    assert_eq!(variable.category, TokenCategory::Color);

    let options = BuildOptions::default();
    let html = StyleGuideBuilder::new(&session, &options)
        .unwrap()
        .with_date(fixed_date())
        .build(&result, &files)
        .unwrap();
    assert!(html.contains("<button class=\"btn-primary\">Go</button>"));
    assert!(html.contains("background: #246BEB"));
}

#[test]
fn test_load_fixture_directory() {
    let files = load_fixture_site();
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        ["css/style.css", "img/logo.svg", "index.html", "sub/page.html"]
    );

    let counts = FileCounts::from_files(&files);
    assert_eq!(counts.markup, 2);
    assert_eq!(counts.stylesheet, 1);
    assert_eq!(counts.image, 1);
    assert!(counts.has_content());

    let logo = files.iter().find(|f| f.kind == FileKind::Image).unwrap();
    assert!(logo.content.starts_with("data:image/svg+xml;base64,"));
}

#[test]
fn test_exclude_patterns_applied() {
    let config = AnalysisConfig {
        exclude: vec!["sub/**".to_string()],
        ..Default::default()
    };
    let files = load_directory(&fixtures_path("legacy_site"), &config).unwrap();
    assert!(files.iter().all(|f| !f.name.starts_with("sub/")));
    assert_eq!(FileCounts::from_files(&files).markup, 1);
}

#[test]
fn test_analyze_fixture_site() {
    let files = load_fixture_site();
    let session = Session::with_files(&files);
    let result = analyze(&files, &session);

    let primary = result
        .samples(Component::Buttons)
        .iter()
        .find(|s| s.selector == "btn-primary")
        .expect("btn-primary sample");
    assert_eq!(primary.occurrences, 2);
    assert!(!primary.html.contains("onclick"));

    assert!(result.bucket(Component::Badges).contains(&"badge-new".to_string()));
    assert!(result.bucket(Component::Tables).contains(&"tbl-list".to_string()));

    let heading = result
        .typography
        .iter()
        .find(|t| t.selector == "tit-section")
        .expect("typography entry");
    assert_eq!(heading.tag, "h2");
    assert_eq!(heading.occurrences, 2);

    let names: Vec<_> = result.css_variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["primary-50", "gray-10", "font-base"]);
    assert_eq!(result.css_variables[2].category, TokenCategory::Font);
    assert!(result.colors.contains("#246BEB"));

    assert_eq!(result.favicons.len(), 1);
    assert_eq!(result.favicons[0].href, "img/logo.svg");
    assert_eq!(result.og_tags[0].property, "og:title");
}

#[test]
fn test_occurrences_count_every_document() {
    let files: Vec<_> = (0..5)
        .map(|i| {
            UploadedFile::text(
                format!("page{}.html", i),
                FileKind::Markup,
                format!("<span class=\"badge-new\">New {}</span>", i),
            )
        })
        .collect();
    let session = Session::with_files(&files);
    let result = analyze(&files, &session);

    let badges = result.samples(Component::Badges);
    assert_eq!(badges.len(), 1);
    assert_eq!(badges[0].occurrences, 5);
    assert_eq!(result.class_frequency["badge-new"], 5);
}

// ============================================================================
// Style Guide Tests
// ============================================================================

#[test]
fn test_guide_inlines_fixture_images() {
    let files = load_fixture_site();
    let html = build(&files, &BuildOptions::default());

    assert!(html.contains("data:image/svg+xml;base64,"));
    assert!(!html.contains("url(../img/logo.svg)"));
    assert!(!html.contains("onclick=\"apply()\""));
    assert!(html.contains("Generated: 2024-05-17"));
    assert!(html.contains("<section id=\"buttons\""));
    assert!(html.contains("<section id=\"meta\""));
}

#[test]
fn test_section_suppression() {
    let files = load_fixture_site();
    let mut config = Config::default();
    config.sections.set(SectionKind::Badges, false);
    config.sections.set(SectionKind::Meta, false);
    let html = build(&files, &BuildOptions::from_config(&config));

    assert!(!html.contains("<section id=\"badges\""));
    assert!(!html.contains("href=\"#badges\""));
    assert!(!html.contains("<section id=\"meta\""));
    assert!(html.contains("<section id=\"buttons\""));
}

#[test]
fn test_additional_classes_render_section() {
    let files = vec![UploadedFile::text(
        "index.html",
        FileKind::Markup,
        r#"<div class="notice-wrap"><p class="notice-txt">Closed today</p></div>"#,
    )];
    let mut config = Config::default();
    config
        .additional_classes
        .insert("boxes".to_string(), vec!["notice-wrap".to_string()]);
    let html = build(&files, &BuildOptions::from_config(&config));

    assert!(html.contains("<section id=\"boxes\""));
    assert!(html.contains("notice-wrap"));
}

#[test]
fn test_build_is_deterministic() {
    let files = load_fixture_site();
    let options = BuildOptions::default();
    assert_eq!(build(&files, &options), build(&files, &options));
}

#[test]
fn test_load_zip_matches_directory() {
    let temp = TempDir::new().unwrap();
    let zip_path = temp.path().join("site.zip");
    let root = fixtures_path("legacy_site");

    {
        let file = std::fs::File::create(&zip_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for name in ["index.html", "sub/page.html", "css/style.css", "img/logo.svg"] {
            writer.start_file(name, options).unwrap();
            writer
                .write_all(&std::fs::read(root.join(name)).unwrap())
                .unwrap();
        }
        writer.start_file("__MACOSX/._index.html", options).unwrap();
        writer.write_all(b"junk").unwrap();
        writer.finish().unwrap();
    }

    let from_zip = load_path(&zip_path, &AnalysisConfig::default()).unwrap();
    let from_dir = load_fixture_site();
    assert_eq!(from_zip, from_dir);
}

// ============================================================================
// CLI Tests
// ============================================================================

fn stylemap() -> Command {
    Command::cargo_bin("stylemap").unwrap()
}

#[test]
fn test_cli_analyze_writes_guide() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out").join("guide.html");

    stylemap()
        .current_dir(temp.path())
        .arg("analyze")
        .arg(fixtures_path("legacy_site"))
        .arg("--output")
        .arg(&output)
        .arg("--title")
        .arg("Legacy Portal")
        .assert()
        .success()
        .stdout(predicate::str::contains("Style guide written to"));

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains("Legacy Portal"));
    assert!(html.contains("<section id=\"buttons\""));
}

#[test]
fn test_cli_analyze_json() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("analysis.json");

    stylemap()
        .current_dir(temp.path())
        .arg("analyze")
        .arg(fixtures_path("legacy_site"))
        .args(["--format", "json", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Analysis written to"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["css_variables"][0]["name"], "primary-50");
    assert_eq!(json["css_variables"][0]["category"], "color");
    assert_eq!(json["counts"]["markup"], 2);
}

#[test]
fn test_cli_skip_section() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("guide.html");

    stylemap()
        .current_dir(temp.path())
        .arg("analyze")
        .arg(fixtures_path("legacy_site"))
        .args(["--skip", "badges", "--no-toc", "-o"])
        .arg(&output)
        .assert()
        .success();

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(!html.contains("<section id=\"badges\""));
    assert!(!html.contains("class=\"sg-toc\""));
}

#[test]
fn test_cli_empty_directory_fails() {
    let temp = TempDir::new().unwrap();
    let empty = temp.path().join("empty");
    std::fs::create_dir(&empty).unwrap();

    stylemap()
        .current_dir(temp.path())
        .arg("analyze")
        .arg(&empty)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No markup or stylesheet files"));
}

#[test]
fn test_cli_missing_path_fails() {
    let temp = TempDir::new().unwrap();

    stylemap()
        .current_dir(temp.path())
        .args(["analyze", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn test_cli_crawl_rejects_invalid_url() {
    stylemap()
        .args(["crawl", "ftp://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL"));
}

#[test]
fn test_cli_version() {
    stylemap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "stylemap {}",
            env!("CARGO_PKG_VERSION")
        )));
}
