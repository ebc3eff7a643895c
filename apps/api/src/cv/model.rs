use serde::Serialize;

use crate::models::profile::{Certification, Education, Project, WorkExperience};

/// Render-ready aggregation of one user's CV, rebuilt on every generate request.
///
/// Every section is always present; an empty `Vec` (or empty `skills` string)
/// renders as a heading with no body lines. Entries keep storage order and are
/// addressed by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvRenderModel {
    pub name: String,
    /// "phone • email", either part omitted when unknown.
    pub contact_line: String,
    /// Generated profile paragraph.
    pub profile: String,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    /// Comma-and-space joined skills.
    pub skills: String,
    pub prompt_context: PromptContext,
}

/// Long-form text of each entity type, delimiter-joined across all entries in
/// order. Sent to the summary service as prompt context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PromptContext {
    pub work: String,
    pub education: String,
    pub projects: String,
}

pub fn contact_line(phone: Option<&str>, email: Option<&str>) -> String {
    [phone, email]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" • ")
}
