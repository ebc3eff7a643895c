//! Data aggregation: reads a user's persisted entities and builds the CV render model.
//!
//! Flow: contact details → entities in storage order → delimiter-joined prompt
//! context → profile paragraph from the summary service → `CvRenderModel`.

use tracing::info;
use uuid::Uuid;

use crate::cv::model::{contact_line, CvRenderModel, PromptContext};
use crate::cv::prompts::{profile_prompt, tailored_directive, GENERAL_DIRECTIVE};
use crate::errors::AppError;
use crate::models::profile::{Education, Project, WorkExperience};
use crate::profile::skills::SkillSet;
use crate::profile::store::ProfileStore;
use crate::summary::{SummaryService, WordBudget};

pub const WORK_DELIMITER: &str = "NEXT JOB: ";
pub const EDUCATION_DELIMITER: &str = "NEXT DEGREE: ";
pub const PROJECT_DELIMITER: &str = "NEXT PROJECT: ";

/// Word budget of the generated profile paragraph.
pub const PROFILE_BUDGET: WordBudget = WordBudget::between(50, 70);

pub struct DataAggregator<'a> {
    store: &'a dyn ProfileStore,
    summarizer: &'a dyn SummaryService,
    max_skills: usize,
}

impl<'a> DataAggregator<'a> {
    pub fn new(
        store: &'a dyn ProfileStore,
        summarizer: &'a dyn SummaryService,
        max_skills: usize,
    ) -> Self {
        Self {
            store,
            summarizer,
            max_skills,
        }
    }

    /// Builds the render model for `user_id`. When `target_job` holds a job
    /// description, the profile paragraph is tailored to it.
    pub async fn build(
        &self,
        user_id: Uuid,
        target_job: Option<&str>,
    ) -> Result<CvRenderModel, AppError> {
        let contact = self
            .store
            .contact_details(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        let work_experience = self.store.work_experiences(user_id).await?;
        let education = self.store.education(user_id).await?;
        let projects = self.store.projects(user_id).await?;
        let certifications = self.store.certifications(user_id).await?;
        let skills = SkillSet::from_stored(self.store.skills(user_id).await?, self.max_skills);

        let prompt_context = PromptContext {
            work: join_descriptions(WORK_DELIMITER, work_experience.iter().map(work_text)),
            education: join_descriptions(EDUCATION_DELIMITER, education.iter().map(education_text)),
            projects: join_descriptions(PROJECT_DELIMITER, projects.iter().map(project_text)),
        };

        let prompt = build_profile_prompt(&skills, &prompt_context, target_job);
        let profile = self.summarizer.summarize(&prompt, PROFILE_BUDGET).await?;

        info!(
            "Built CV model for user {user_id}: {} jobs, {} degrees, {} projects, {} certifications, {} skills",
            work_experience.len(),
            education.len(),
            projects.len(),
            certifications.len(),
            skills.as_slice().len()
        );

        Ok(CvRenderModel {
            name: contact.display_name().to_string(),
            contact_line: contact_line(contact.phone.as_deref(), contact.email.as_deref()),
            profile,
            work_experience,
            education,
            projects,
            certifications,
            skills: skills.joined(),
            prompt_context,
        })
    }
}

/// Joins every entry's text in order, the delimiter opening each entry after the first.
pub fn join_descriptions<I>(delimiter: &str, texts: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut joined = String::new();
    for text in texts {
        if !joined.is_empty() {
            joined.push(' ');
            joined.push_str(delimiter);
        }
        joined.push_str(text.trim());
    }
    joined
}

fn work_text(work: &WorkExperience) -> String {
    let end = work
        .end_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "present".to_string());
    format!(
        "{} at {} ({} to {}): {}",
        work.job_title, work.company, work.start_date, end, work.job_description
    )
}

fn education_text(education: &Education) -> String {
    let mut text = format!("{}, {}", education.degree, education.university);
    if let Some(year) = education.graduation_year {
        text.push_str(&format!(", graduated {year}"));
    }
    if let Some(grade) = education.grade.as_deref().filter(|g| !g.trim().is_empty()) {
        text.push_str(&format!(", grade {grade}"));
    }
    text
}

fn project_text(project: &Project) -> String {
    project.description.clone()
}

fn build_profile_prompt(
    skills: &SkillSet,
    context: &PromptContext,
    target_job: Option<&str>,
) -> String {
    let directive = match target_job.map(str::trim).filter(|jd| !jd.is_empty()) {
        Some(jd) => tailored_directive(jd),
        None => GENERAL_DIRECTIVE.to_string(),
    };
    profile_prompt(
        &directive,
        &skills.joined(),
        &context.work,
        &context.education,
        &context.projects,
    )
}
