//! Profile persistence. Every statement runs on its own pooled connection with
//! autocommit semantics; nothing here opens a transaction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{Certification, DraftEntry, Education, Project, WorkExperience};
use crate::profile::drafts::DraftRepository;
use crate::profile::skills::SkillSet;

/// Header details for the CV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ContactDetails {
    pub user_name: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactDetails {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.user_name)
    }
}

/// Storage seam for a user's career entities.
///
/// List methods return rows in storage order (insertion order). `PgProfileStore`
/// is the production backend.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn contact_details(&self, user_id: Uuid) -> Result<Option<ContactDetails>, sqlx::Error>;
    async fn work_experiences(&self, user_id: Uuid) -> Result<Vec<WorkExperience>, sqlx::Error>;
    async fn education(&self, user_id: Uuid) -> Result<Vec<Education>, sqlx::Error>;
    async fn projects(&self, user_id: Uuid) -> Result<Vec<Project>, sqlx::Error>;
    async fn certifications(&self, user_id: Uuid) -> Result<Vec<Certification>, sqlx::Error>;
    /// The raw stored skill array; an absent row reads as empty.
    async fn skills(&self, user_id: Uuid) -> Result<Vec<String>, sqlx::Error>;

    /// Inserts one entity and returns its row id.
    async fn insert_entry(&self, user_id: Uuid, entry: &DraftEntry) -> Result<i64, sqlx::Error>;
    async fn replace_skills(&self, user_id: Uuid, skills: &SkillSet) -> Result<(), sqlx::Error>;
}

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn contact_details(&self, user_id: Uuid) -> Result<Option<ContactDetails>, sqlx::Error> {
        sqlx::query_as::<_, ContactDetails>(
            "SELECT user_name, full_name, email, phone FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn work_experiences(&self, user_id: Uuid) -> Result<Vec<WorkExperience>, sqlx::Error> {
        sqlx::query_as::<_, WorkExperience>(
            r#"
            SELECT id, user_id, job_title, company, start_date, end_date,
                   city, country, job_description
            FROM work_experiences
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn education(&self, user_id: Uuid) -> Result<Vec<Education>, sqlx::Error> {
        sqlx::query_as::<_, Education>(
            r#"
            SELECT id, user_id, university, degree, graduation_year, grade
            FROM education
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn projects(&self, user_id: Uuid) -> Result<Vec<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, user_id, start_date, end_date, description
            FROM projects
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn certifications(&self, user_id: Uuid) -> Result<Vec<Certification>, sqlx::Error> {
        sqlx::query_as::<_, Certification>(
            "SELECT id, user_id, certificate FROM certifications WHERE user_id = $1 ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn skills(&self, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        let row: Option<Vec<String>> =
            sqlx::query_scalar("SELECT skill FROM skills WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.unwrap_or_default())
    }

    async fn insert_entry(&self, user_id: Uuid, entry: &DraftEntry) -> Result<i64, sqlx::Error> {
        match entry {
            DraftEntry::WorkExperience(w) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO work_experiences
                        (user_id, job_title, company, start_date, end_date,
                         city, country, job_description)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    RETURNING id
                    "#,
                )
                .bind(user_id)
                .bind(&w.job_title)
                .bind(&w.company)
                .bind(w.start_date)
                .bind(w.end_date)
                .bind(&w.city)
                .bind(&w.country)
                .bind(&w.job_description)
                .fetch_one(&self.pool)
                .await
            }
            DraftEntry::Education(e) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO education (user_id, university, degree, graduation_year, grade)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id
                    "#,
                )
                .bind(user_id)
                .bind(&e.university)
                .bind(&e.degree)
                .bind(e.graduation_year)
                .bind(&e.grade)
                .fetch_one(&self.pool)
                .await
            }
            DraftEntry::Project(p) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO projects (user_id, start_date, end_date, description)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(user_id)
                .bind(p.start_date)
                .bind(p.end_date)
                .bind(&p.description)
                .fetch_one(&self.pool)
                .await
            }
            DraftEntry::Certification(c) => {
                sqlx::query_scalar(
                    "INSERT INTO certifications (user_id, certificate) VALUES ($1, $2) RETURNING id",
                )
                .bind(user_id)
                .bind(&c.certificate)
                .fetch_one(&self.pool)
                .await
            }
        }
    }

    async fn replace_skills(&self, user_id: Uuid, skills: &SkillSet) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO skills (user_id, skill) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET skill = EXCLUDED.skill
            "#,
        )
        .bind(user_id)
        .bind(skills.as_slice())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Persisted entities of one user, in storage order.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSnapshot {
    pub work_experiences: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub skills: SkillSet,
}

pub async fn load_profile(
    store: &dyn ProfileStore,
    user_id: Uuid,
    max_skills: usize,
) -> Result<ProfileSnapshot, AppError> {
    Ok(ProfileSnapshot {
        work_experiences: store.work_experiences(user_id).await?,
        education: store.education(user_id).await?,
        projects: store.projects(user_id).await?,
        certifications: store.certifications(user_id).await?,
        skills: SkillSet::from_stored(store.skills(user_id).await?, max_skills),
    })
}

/// Persists every draft in draft order, one autocommitted insert each.
///
/// A draft leaves the repository only once its row is committed. On failure the
/// error propagates; rows inserted earlier in the batch stay committed and the
/// failed draft plus everything after it remain in the repository.
pub async fn commit_drafts(
    store: &dyn ProfileStore,
    user_id: Uuid,
    drafts: &mut DraftRepository<DraftEntry>,
) -> Result<usize, AppError> {
    let mut committed = 0usize;
    for id in drafts.ids() {
        let Some(entry) = drafts.get(id) else {
            continue;
        };
        match store.insert_entry(user_id, entry).await {
            Ok(row_id) => {
                info!(
                    "Committed {} draft {id} as row {row_id} for user {user_id}",
                    entry.kind_str()
                );
                drafts.remove(id);
                committed += 1;
            }
            Err(e) => {
                warn!(
                    "Draft commit for user {user_id} aborted after {committed} rows; {} drafts remain",
                    drafts.len()
                );
                return Err(e.into());
            }
        }
    }
    Ok(committed)
}
