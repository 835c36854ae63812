use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::DataSource;
use crate::errors::AppError;
use crate::models::{Candidate, Experience, JobPosting, JobSearch, Profile, UserSkill};

const JOB_COLUMNS: &str = "id, title, company, required_skills, preferred_skills, \
    location, contact_email, created_at";

/// Record store backed by the platform's PostgreSQL schema.
#[derive(Clone)]
pub struct PgDataSource {
    pool: PgPool,
}

impl PgDataSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataSource for PgDataSource {
    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT user_id, full_name, email, headline, location, created_at \
             FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn skills(&self, user_id: Uuid) -> Result<Vec<UserSkill>, AppError> {
        let skills = sqlx::query_as::<_, UserSkill>(
            "SELECT name, proficiency, years_experience \
             FROM user_skills WHERE user_id = $1 ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    async fn experience(&self, user_id: Uuid) -> Result<Vec<Experience>, AppError> {
        let positions = sqlx::query_as::<_, Experience>(
            "SELECT title, company, start_date, end_date, is_current \
             FROM experiences WHERE user_id = $1 \
             ORDER BY is_current DESC, start_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(positions)
    }

    async fn job_posting(&self, job_id: Uuid) -> Result<Option<JobPosting>, AppError> {
        let job = sqlx::query_as::<_, JobPosting>(&format!(
            "SELECT {JOB_COLUMNS} FROM job_postings WHERE id = $1"
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn search_jobs(&self, query: &JobSearch) -> Result<Vec<JobPosting>, AppError> {
        // Skills arrive lowercased from the provider; compare against lowered arrays.
        let jobs = sqlx::query_as::<_, JobPosting>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM job_postings
            WHERE is_open
              AND (cardinality($1::text[]) = 0
                   OR ARRAY(SELECT lower(s) FROM unnest(required_skills || preferred_skills) s) && $1)
              AND ($2::text IS NULL OR location ILIKE $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#
        ))
        .bind(&query.skills)
        .bind(&query.location)
        .bind(i64::from(query.limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn search_candidates(&self, skills: &[String], limit: u32) -> Result<Vec<Candidate>, AppError> {
        let candidates = sqlx::query_as::<_, Candidate>(
            r#"
            SELECT p.user_id, p.full_name, p.email,
                   array_agg(s.name ORDER BY s.name) AS skills
            FROM profiles p
            JOIN user_skills s ON s.user_id = p.user_id
            GROUP BY p.user_id, p.full_name, p.email
            HAVING bool_or(lower(s.name) = ANY($1))
            LIMIT $2
            "#,
        )
        .bind(skills)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }
}
