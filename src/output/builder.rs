// Style guide document assembly

use crate::analysis::AnalysisResult;
use crate::config::{Config, OutputConfig, ProjectConfig, SectionKind, SectionOptions};
use crate::error::Result;
use crate::input::{FileKind, UploadedFile};
use crate::output::sections::SectionRenderer;
use crate::output::templates::{GuidePage, InlineStylesheet, SectionView, TemplateEngine, TocEntry};
use crate::session::Session;
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;
use tracing::{debug, info};

const GUIDE_CSS: &str = include_str!("../../assets/guide.css");
const GUIDE_JS: &str = include_str!("../../assets/guide.js");

/// Font and icon stylesheets referenced by URL, never fetched
pub const EXTERNAL_STYLESHEETS: &[&str] = &[
    "https://cdn.jsdelivr.net/gh/orioncactus/pretendard@v1.3.9/dist/web/static/pretendard.min.css",
    "https://fonts.googleapis.com/icon?family=Material+Icons",
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css",
];

/// Everything the user chose about the generated guide
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub sections: SectionOptions,
    pub style: OutputConfig,
    pub project: ProjectConfig,
    pub additional_classes: BTreeMap<SectionKind, Vec<String>>,
}

impl BuildOptions {
    pub fn from_config(config: &Config) -> Self {
        let additional_classes = SectionKind::ALL
            .into_iter()
            .map(|kind| (kind, config.additional_for(kind)))
            .filter(|(_, keywords)| !keywords.is_empty())
            .collect();

        Self {
            sections: config.sections.clone(),
            style: config.output.clone(),
            project: config.project.clone(),
            additional_classes,
        }
    }

    pub fn additional_for(&self, kind: SectionKind) -> &[String] {
        self.additional_classes
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Renders one self-contained HTML style guide
pub struct StyleGuideBuilder<'a> {
    session: &'a Session,
    options: &'a BuildOptions,
    engine: TemplateEngine,
    date: Option<NaiveDate>,
}

impl<'a> StyleGuideBuilder<'a> {
    pub fn new(session: &'a Session, options: &'a BuildOptions) -> Result<Self> {
        Ok(Self {
            session,
            options,
            engine: TemplateEngine::new()?,
            date: None,
        })
    }

    /// Fix the "Generated:" date instead of using today
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Render the guide.
    ///
    /// Sections render in fixed order; disabled and empty ones are skipped
    /// and numbering counts only rendered sections. Errors only come from
    /// the template engine.
    pub fn build(&self, result: &AnalysisResult, files: &[UploadedFile]) -> Result<String> {
        let renderer = SectionRenderer::new(self.session, self.options, result);

        let mut toc = Vec::new();
        let mut sections = Vec::new();

        for kind in SectionKind::ALL {
            if !self.options.sections.is_enabled(kind) {
                debug!("Section {} disabled", kind);
                continue;
            }
            if !renderer.should_render(kind) {
                debug!("Section {} has no content", kind);
                continue;
            }

            let number = sections.len() + 1;
            let body = renderer.render(kind);
            let view = SectionView {
                id: kind.id().to_string(),
                number,
                title: kind.title().to_string(),
                count: body.count,
                noun: body.noun,
                plural: body.plural,
                body: body.html,
            };
            sections.push(self.engine.render_section(&view)?);
            toc.push(TocEntry {
                id: view.id,
                number,
                title: view.title,
            });
        }

        let images = self.session.images();
        let stylesheets = files
            .iter()
            .filter(|f| f.kind == FileKind::Stylesheet)
            .map(|f| InlineStylesheet {
                name: f.name.clone(),
                css: images.rewrite_all(&f.content).replace("</style", "<\\/style"),
            })
            .collect();

        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let project = &self.options.project;

        let page = GuidePage {
            project_name: project.name.clone(),
            description: project.description.clone(),
            version: project.version.clone(),
            generated: date.format("%Y-%m-%d").to_string(),
            markup_files: result.counts.markup,
            stylesheet_files: result.counts.stylesheet,
            show_toc: self.options.style.toc,
            toc,
            sections,
            stylesheets,
            external_stylesheets: EXTERNAL_STYLESHEETS.to_vec(),
            guide_css: GUIDE_CSS,
            guide_js: GUIDE_JS,
        };

        info!("Rendered {} sections", page.sections.len());
        self.engine.render_guide(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, Component, MarkupSample};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn badge_result() -> AnalysisResult {
        let mut result = AnalysisResult::default();
        result.extracted.insert(
            Component::Badges,
            vec![MarkupSample {
                selector: "badge-new".to_string(),
                tag: "span".to_string(),
                html: "<span class=\"badge-new\">New</span>".to_string(),
                text: Some("New".to_string()),
                occurrences: 1,
            }],
        );
        result
            .components
            .insert(Component::Badges, vec!["badge-new".to_string()]);
        result
    }

    #[test]
    fn test_from_config_resolves_aliases() {
        let mut config = Config::default();
        config
            .additional_classes
            .insert("modal".to_string(), vec!["pop".to_string()]);
        let options = BuildOptions::from_config(&config);
        assert_eq!(options.additional_for(SectionKind::Modals), ["pop"]);
        assert!(options.additional_for(SectionKind::Buttons).is_empty());
    }

    #[test]
    fn test_section_suppressed_when_disabled() {
        let result = badge_result();
        let session = Session::new();

        let options = BuildOptions::default();
        let html = StyleGuideBuilder::new(&session, &options)
            .unwrap()
            .with_date(date())
            .build(&result, &[])
            .unwrap();
        assert!(html.contains("<section id=\"badges\""));
        assert!(html.contains("href=\"#badges\""));

        let mut options = BuildOptions::default();
        options.sections.badges = false;
        let html = StyleGuideBuilder::new(&session, &options)
            .unwrap()
            .with_date(date())
            .build(&result, &[])
            .unwrap();
        assert!(!html.contains("<section id=\"badges\""));
        assert!(!html.contains("href=\"#badges\""));
    }

    #[test]
    fn test_numbering_counts_rendered_sections_only() {
        let mut result = badge_result();
        result
            .components
            .insert(Component::Buttons, vec!["btn".to_string()]);
        let session = Session::new();
        let options = BuildOptions::default();
        let html = StyleGuideBuilder::new(&session, &options)
            .unwrap()
            .with_date(date())
            .build(&result, &[])
            .unwrap();

        let badges = html.find("<section id=\"badges\"").unwrap();
        let buttons = html.find("<section id=\"buttons\"").unwrap();
        assert!(badges < buttons);
        assert!(html[badges..buttons].contains("<span class=\"sg-section-number\">1.</span>"));
        assert!(html[buttons..].contains("<span class=\"sg-section-number\">2.</span>"));
    }

    #[test]
    fn test_toc_can_be_disabled() {
        let result = badge_result();
        let session = Session::new();
        let mut options = BuildOptions::default();
        options.style.toc = false;
        let html = StyleGuideBuilder::new(&session, &options)
            .unwrap()
            .with_date(date())
            .build(&result, &[])
            .unwrap();
        assert!(!html.contains("class=\"sg-toc\""));
        assert!(html.contains("<section id=\"badges\""));
    }

    #[test]
    fn test_inlines_stylesheets_with_images() {
        let files = vec![
            UploadedFile::text(
                "css/site.css",
                FileKind::Stylesheet,
                ".hero{background:url(../img/bg.png)}",
            ),
            UploadedFile::from_bytes("img/bg.png", &[1, 2, 3]).unwrap(),
        ];
        let session = Session::with_files(&files);
        let options = BuildOptions::default();
        let html = StyleGuideBuilder::new(&session, &options)
            .unwrap()
            .with_date(date())
            .build(&AnalysisResult::default(), &files)
            .unwrap();
        assert!(html.contains(".hero{background:url(\"data:image/png;base64,AQID\")}"));
        assert!(html.contains("Generated: 2024-03-01"));
        assert!(html.contains(EXTERNAL_STYLESHEETS[0]));
    }

    #[test]
    fn test_deterministic_with_fresh_sessions() {
        let files = vec![UploadedFile::text(
            "index.html",
            FileKind::Markup,
            "<div class=\"card\"><h2 class=\"tit\">Hi</h2><button class=\"btn\">Go</button></div>",
        )];
        let config = Config::default();
        let options = BuildOptions::from_config(&config);

        let render = || {
            let session = Session::with_files(&files);
            let result = Analyzer::new(config.clone()).analyze(&files, &session);
            StyleGuideBuilder::new(&session, &options)
                .unwrap()
                .with_date(date())
                .build(&result, &files)
                .unwrap()
        };

        assert_eq!(render(), render());
    }
}
