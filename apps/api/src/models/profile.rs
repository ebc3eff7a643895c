use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkExperience {
    pub id: i64,
    pub user_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub start_date: NaiveDate,
    /// `None` while the position is current.
    pub end_date: Option<NaiveDate>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub job_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Education {
    pub id: i64,
    pub user_id: Uuid,
    pub university: String,
    pub degree: String,
    pub graduation_year: Option<i32>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub user_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Certification {
    pub id: i64,
    pub user_id: Uuid,
    pub certificate: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Unsaved entities (profile drafts)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkExperience {
    pub job_title: String,
    pub company: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub job_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEducation {
    pub university: String,
    pub degree: String,
    pub graduation_year: Option<i32>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCertification {
    pub certificate: String,
}

/// One in-progress profile edit, tagged by the entity it will become.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftEntry {
    WorkExperience(NewWorkExperience),
    Education(NewEducation),
    Project(NewProject),
    Certification(NewCertification),
}

impl DraftEntry {
    pub fn kind_str(&self) -> &'static str {
        match self {
            DraftEntry::WorkExperience(_) => "work_experience",
            DraftEntry::Education(_) => "education",
            DraftEntry::Project(_) => "project",
            DraftEntry::Certification(_) => "certification",
        }
    }

    /// Rejects drafts the store would accept but the CV could not render sensibly.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            DraftEntry::WorkExperience(w) => {
                require("job_title", &w.job_title)?;
                require("company", &w.company)?;
                match w.end_date {
                    Some(end) if end < w.start_date => {
                        Err("end_date must not precede start_date".to_string())
                    }
                    _ => Ok(()),
                }
            }
            DraftEntry::Education(e) => {
                require("university", &e.university)?;
                require("degree", &e.degree)
            }
            DraftEntry::Project(p) => {
                require("description", &p.description)?;
                match (p.start_date, p.end_date) {
                    (Some(start), Some(end)) if end < start => {
                        Err("end_date must not precede start_date".to_string())
                    }
                    _ => Ok(()),
                }
            }
            DraftEntry::Certification(c) => require("certificate", &c.certificate),
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} cannot be empty"))
    } else {
        Ok(())
    }
}
