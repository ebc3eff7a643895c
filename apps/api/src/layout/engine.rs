//! Single-page CV layout.
//!
//! A vertical cursor starts at the top margin and only moves down the page.
//! Every drawn line takes the cursor's current value, so line positions are
//! strictly decreasing in draw order. Nothing wraps onto a second page: content
//! that runs past the bottom margin is still placed and the layout is flagged
//! as overflowed.

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cv::model::CvRenderModel;
use crate::layout::font_metrics::{get_metrics, FontFace, PageConfig};
use crate::layout::pdf::write_pdf;
use crate::layout::wrap::wrap_text;
use crate::models::profile::{Education, WorkExperience};

pub const PROFILE_HEADING: &str = "PROFILE";
pub const WORK_HEADING: &str = "WORK EXPERIENCE";
pub const EDUCATION_HEADING: &str = "EDUCATION";
pub const PROJECTS_HEADING: &str = "PROJECTS";
pub const CERTIFICATIONS_HEADING: &str = "CERTIFICATIONS";
pub const SKILLS_HEADING: &str = "SKILLS";

// ────────────────────────────────────────────────────────────────────────────
// Layout output
// ────────────────────────────────────────────────────────────────────────────

/// A span of text in one face, starting at `x` on its line's baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub x: f32,
    pub text: String,
    pub face: FontFace,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    /// Baseline, in points from the bottom edge.
    pub y: f32,
    pub runs: Vec<TextRun>,
}

/// Horizontal divider under a section heading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub y: f32,
    pub x1: f32,
    pub x2: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    /// In draw order.
    pub lines: Vec<PlacedLine>,
    pub rules: Vec<Rule>,
    /// Cursor position after the last section.
    pub final_cursor: f32,
    /// True when some line sits below the bottom margin.
    pub overflowed: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub struct DocumentLayoutEngine {
    config: PageConfig,
}

impl DocumentLayoutEngine {
    pub fn new(config: PageConfig) -> Self {
        Self { config }
    }

    /// Places every section of `model` on one page.
    pub fn layout(&self, model: &CvRenderModel) -> PageLayout {
        let mut page = Canvas::new(&self.config);

        page.centered(&model.name, FontFace::Bold, self.config.name_size_pt);
        page.advance(self.config.title_line_height_pt);
        page.centered(&model.contact_line, FontFace::Regular, self.config.body_size_pt);
        page.advance(self.config.section_gap_pt);

        page.section(PROFILE_HEADING, |page| {
            page.wrapped(&model.profile, 0.0);
        });

        page.section(WORK_HEADING, |page| {
            for work in &model.work_experience {
                page.work_header(work);
                page.wrapped(&work.job_description, page.config.indent_pt);
            }
        });

        page.section(EDUCATION_HEADING, |page| {
            for education in &model.education {
                page.education_line(education);
            }
        });

        page.section(PROJECTS_HEADING, |page| {
            for project in &model.projects {
                page.wrapped(&project.description, 0.0);
                page.advance(page.config.entry_gap_pt);
            }
        });

        page.section(CERTIFICATIONS_HEADING, |page| {
            for certification in &model.certifications {
                page.body_line(&certification.certificate);
            }
        });

        page.section(SKILLS_HEADING, |page| {
            page.wrapped(&model.skills, 0.0);
        });

        let layout = page.finish();
        if layout.overflowed {
            warn!(
                "CV layout for {} runs past the bottom margin (cursor at {:.1}pt, margin {:.1}pt)",
                model.name, layout.final_cursor, self.config.margin_pt
            );
        }
        layout
    }

    /// Lays out `model` and serializes it as a one-page PDF.
    pub fn render(&self, model: &CvRenderModel) -> Vec<u8> {
        write_pdf(&self.layout(model))
    }

    /// Renders `model` and replaces `path` with the result.
    ///
    /// The bytes go to a uniquely named sibling file first, which is then
    /// renamed over `path`, so concurrent renders never interleave.
    pub async fn render_to_file(&self, model: &CvRenderModel, path: &Path) -> anyhow::Result<Vec<u8>> {
        let bytes = self.render(model);
        let file_name = path
            .file_name()
            .with_context(|| format!("CV output path {} has no file name", path.display()))?;
        let staging = path.with_file_name(format!(
            ".{}.{}.tmp",
            file_name.to_string_lossy(),
            Uuid::new_v4()
        ));

        tokio::fs::write(&staging, &bytes)
            .await
            .with_context(|| format!("Failed to write CV to {}", staging.display()))?;
        if let Err(e) = tokio::fs::rename(&staging, path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                warn!("Failed to remove {}: {cleanup}", staging.display());
            }
            return Err(e).with_context(|| format!("Failed to replace CV at {}", path.display()));
        }
        info!("Wrote CV ({} bytes) to {}", bytes.len(), path.display());
        Ok(bytes)
    }
}

/// "Jan 2020 – Jan 2021", or "– Present" for an open-ended position.
pub fn date_range(start: NaiveDate, end: Option<NaiveDate>) -> String {
    let end = end
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| "Present".to_string());
    format!("{} – {}", start.format("%b %Y"), end)
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor state
// ────────────────────────────────────────────────────────────────────────────

struct Canvas<'c> {
    config: &'c PageConfig,
    cursor: f32,
    lines: Vec<PlacedLine>,
    rules: Vec<Rule>,
}

impl<'c> Canvas<'c> {
    fn new(config: &'c PageConfig) -> Self {
        Self {
            config,
            cursor: config.page_height_pt - config.margin_pt,
            lines: Vec::new(),
            rules: Vec::new(),
        }
    }

    fn advance(&mut self, by: f32) {
        self.cursor -= by;
    }

    fn place(&mut self, runs: Vec<TextRun>) {
        self.lines.push(PlacedLine {
            y: self.cursor,
            runs,
        });
    }

    fn centered(&mut self, text: &str, face: FontFace, size: f32) {
        let width = get_metrics(face).width_pt(text, size);
        let x = ((self.config.page_width_pt - width) / 2.0).max(self.config.margin_pt);
        self.place(vec![run(x, text, face, size)]);
    }

    /// Heading and divider, then the body, then the rest of the section gap.
    /// An empty body advances the cursor by exactly `section_gap_pt`.
    fn section(&mut self, heading: &str, body: impl FnOnce(&mut Self)) {
        let left = self.config.margin_pt;
        self.place(vec![run(
            left,
            heading,
            FontFace::Bold,
            self.config.heading_size_pt,
        )]);
        self.rules.push(Rule {
            y: self.cursor - self.config.rule_drop_pt,
            x1: left,
            x2: self.config.page_width_pt - self.config.margin_pt,
        });
        self.advance(self.config.heading_advance_pt);
        body(self);
        self.advance(self.config.section_gap_pt - self.config.heading_advance_pt);
    }

    fn body_line(&mut self, text: &str) {
        let x = self.config.margin_pt;
        self.place(vec![run(x, text, FontFace::Regular, self.config.body_size_pt)]);
        self.advance(self.config.line_height_pt);
    }

    fn wrapped(&mut self, text: &str, indent_pt: f32) {
        let width = self.config.wrap_width_chars(indent_pt);
        let x = self.config.margin_pt + indent_pt;
        for line in wrap_text(text, width) {
            self.place(vec![run(x, &line, FontFace::Regular, self.config.body_size_pt)]);
            self.advance(self.config.line_height_pt);
        }
    }

    fn work_header(&mut self, work: &WorkExperience) {
        let size = self.config.body_size_pt;
        let lead = format!("{}, {}, ", work.job_title, work.company);
        self.two_face_line(
            (lead, FontFace::Bold),
            (date_range(work.start_date, work.end_date), FontFace::Oblique),
            size,
        );
    }

    fn education_line(&mut self, education: &Education) {
        let size = self.config.body_size_pt;
        let qualification = match education.grade.as_deref().map(str::trim) {
            Some(grade) if !grade.is_empty() => format!("{} | {}", education.degree, grade),
            _ => education.degree.clone(),
        };
        self.two_face_line(
            (format!("{}, ", education.university), FontFace::Regular),
            (qualification, FontFace::Bold),
            size,
        );
    }

    /// Second run starts where the measured first run ends, on the same baseline.
    fn two_face_line(&mut self, first: (String, FontFace), second: (String, FontFace), size: f32) {
        let x = self.config.margin_pt;
        let offset = get_metrics(first.1).width_pt(&first.0, size);
        self.place(vec![
            run(x, &first.0, first.1, size),
            run(x + offset, &second.0, second.1, size),
        ]);
        self.advance(self.config.line_height_pt);
    }

    fn finish(self) -> PageLayout {
        let floor = self.config.margin_pt;
        let overflowed = self.lines.iter().any(|line| line.y < floor);
        PageLayout {
            width: self.config.page_width_pt,
            height: self.config.page_height_pt,
            lines: self.lines,
            rules: self.rules,
            final_cursor: self.cursor,
            overflowed,
        }
    }
}

fn run(x: f32, text: &str, face: FontFace, size: f32) -> TextRun {
    TextRun {
        x,
        text: text.to_string(),
        face,
        size,
    }
}
