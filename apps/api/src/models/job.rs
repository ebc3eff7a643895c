use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One scraped posting as the browser adapter hands it over: untrimmed strings,
/// any field possibly missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPosting {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub application_link: Option<String>,
    pub company_rating: Option<String>,
}

/// Normalized shape of one scraped job posting.
///
/// Immutable once extracted. The session replaces it wholesale on every advance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub employment_type: Option<String>,
    pub salary: Option<String>,
    pub job_description: String,
    pub application_link: Option<String>,
    pub company_rating: Option<f32>,
}

impl From<RawPosting> for JobRecord {
    fn from(raw: RawPosting) -> Self {
        Self {
            job_title: normalize(raw.title).unwrap_or_default(),
            company: normalize(raw.company).unwrap_or_default(),
            location: normalize(raw.location).unwrap_or_default(),
            employment_type: normalize(raw.employment_type),
            salary: normalize(raw.salary),
            job_description: normalize(raw.description).unwrap_or_default(),
            application_link: normalize(raw.application_link),
            company_rating: normalize(raw.company_rating).and_then(|r| parse_rating(&r)),
        }
    }
}

/// Collapses internal whitespace runs and maps blank strings to `None`.
fn normalize(value: Option<String>) -> Option<String> {
    let collapsed = value?.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Ratings arrive as "4.2", "4.2 ★" or "Rating: 3.9"; keeps the first number.
fn parse_rating(text: &str) -> Option<f32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let number: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.parse().ok()
}

/// A posting the user saved, joined with the date it was saved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedJobRow {
    pub job_id: i64,
    pub job_title: String,
    pub company_name: String,
    pub location: String,
    pub salary: Option<String>,
    pub employment_type: Option<String>,
    pub job_description: String,
    pub company_rating: Option<f32>,
    pub link_to_application: Option<String>,
    pub saved_date: NaiveDate,
}
