//! Saved postings: `jobs` rows linked to a user through `users_jobs`.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::job::{JobRecord, SavedJobRow};

/// Stores `record` and links it to `user_id` with today's date. Two autocommitted
/// statements; a failure on the link leaves the `jobs` row in place.
pub async fn save_job(pool: &PgPool, user_id: Uuid, record: &JobRecord) -> Result<i64, sqlx::Error> {
    let job_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO jobs
            (job_title, company_name, location, salary, employment_type,
             job_description, company_rating, link_to_application)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING job_id
        "#,
    )
    .bind(&record.job_title)
    .bind(&record.company)
    .bind(&record.location)
    .bind(&record.salary)
    .bind(&record.employment_type)
    .bind(&record.job_description)
    .bind(record.company_rating)
    .bind(&record.application_link)
    .fetch_one(pool)
    .await?;

    sqlx::query("INSERT INTO users_jobs (user_id, job_id, saved_date) VALUES ($1, $2, CURRENT_DATE)")
        .bind(user_id)
        .bind(job_id)
        .execute(pool)
        .await?;

    info!("User {user_id} saved job {job_id} ({})", record.job_title);
    Ok(job_id)
}

/// Newest first.
pub async fn saved_jobs(pool: &PgPool, user_id: Uuid) -> Result<Vec<SavedJobRow>, sqlx::Error> {
    sqlx::query_as::<_, SavedJobRow>(
        r#"
        SELECT j.job_id, j.job_title, j.company_name, j.location, j.salary,
               j.employment_type, j.job_description, j.company_rating,
               j.link_to_application, uj.saved_date
        FROM users_jobs uj
        JOIN jobs j ON j.job_id = uj.job_id
        WHERE uj.user_id = $1
        ORDER BY uj.saved_date DESC, j.job_id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
