//! Data Provider — cache-then-source access to profiles, skills, work history
//! and job postings.
//!
//! Every read checks the cache first, falls through to the `DataSource` on a
//! miss and writes the result back with a fixed per-resource TTL. Writes to the
//! underlying records are expected to call `invalidate_user`/`invalidate_job`;
//! otherwise entries age out at their TTL.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::Cache;
use crate::errors::AppError;
use crate::models::{Candidate, Experience, JobPosting, JobSearch, Profile, UserSkill};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgDataSource;

pub const PROFILE_TTL: Duration = Duration::from_secs(600);
pub const SKILLS_TTL: Duration = Duration::from_secs(300);
pub const EXPERIENCE_TTL: Duration = Duration::from_secs(300);
pub const JOB_POSTING_TTL: Duration = Duration::from_secs(180);
pub const SEARCH_TTL: Duration = Duration::from_secs(600);

/// The underlying record store.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;
    async fn skills(&self, user_id: Uuid) -> Result<Vec<UserSkill>, AppError>;
    /// Most recent position first.
    async fn experience(&self, user_id: Uuid) -> Result<Vec<Experience>, AppError>;
    async fn job_posting(&self, job_id: Uuid) -> Result<Option<JobPosting>, AppError>;
    async fn search_jobs(&self, query: &JobSearch) -> Result<Vec<JobPosting>, AppError>;
    /// Candidates holding at least one of `skills` (case-insensitive).
    async fn search_candidates(&self, skills: &[String], limit: u32) -> Result<Vec<Candidate>, AppError>;
}

pub struct DataProvider {
    source: Arc<dyn DataSource>,
    cache: Cache,
}

impl DataProvider {
    pub fn new(source: Arc<dyn DataSource>, cache: Cache) -> Self {
        Self { source, cache }
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        self.cached(profile_key(user_id), PROFILE_TTL, || self.source.profile(user_id))
            .await
    }

    pub async fn skills(&self, user_id: Uuid) -> Result<Vec<UserSkill>, AppError> {
        self.cached(skills_key(user_id), SKILLS_TTL, || self.source.skills(user_id))
            .await
    }

    pub async fn experience(&self, user_id: Uuid) -> Result<Vec<Experience>, AppError> {
        self.cached(experience_key(user_id), EXPERIENCE_TTL, || {
            self.source.experience(user_id)
        })
        .await
    }

    pub async fn job_posting(&self, job_id: Uuid) -> Result<Option<JobPosting>, AppError> {
        self.cached(job_key(job_id), JOB_POSTING_TTL, || self.source.job_posting(job_id))
            .await
    }

    pub async fn search_jobs(&self, query: &JobSearch) -> Result<Vec<JobPosting>, AppError> {
        let normalized = JobSearch {
            skills: normalize_skills(&query.skills),
            location: query.location.clone(),
            limit: query.limit,
        };
        let key = format!("jobs:search:{}", serde_json::to_string(&normalized).unwrap_or_default());
        self.cached(key, SEARCH_TTL, || self.source.search_jobs(&normalized))
            .await
    }

    pub async fn search_candidates(&self, skills: &[String], limit: u32) -> Result<Vec<Candidate>, AppError> {
        let skills = normalize_skills(skills);
        let key = format!("candidates:search:{}:{}", skills.join(","), limit);
        self.cached(key, SEARCH_TTL, || self.source.search_candidates(&skills, limit))
            .await
    }

    /// Drops the cached profile, skills and work history of one user.
    pub async fn invalidate_user(&self, user_id: Uuid) -> usize {
        let mut removed = 0;
        for key in [profile_key(user_id), skills_key(user_id), experience_key(user_id)] {
            removed += self.cache.invalidate(&key).await;
        }
        removed
    }

    pub async fn invalidate_job(&self, job_id: Uuid) -> usize {
        self.cache.invalidate(&job_key(job_id)).await + self.cache.invalidate("jobs:search:*").await
    }

    async fn cached<T, F, Fut>(&self, key: String, ttl: Duration, fetch: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(hit) = self.cache.get(&key).await {
            match serde_json::from_value::<T>(hit) {
                Ok(value) => return Ok(value),
                Err(e) => warn!(key = %key, "discarding unreadable cache entry: {e}"),
            }
        }

        let value = fetch().await?;
        match serde_json::to_value(&value) {
            // Absent records are not cached; the next read retries the source.
            Ok(serde_json::Value::Null) => {}
            Ok(json) => {
                self.cache.set(&key, &json, ttl).await;
            }
            Err(e) => warn!(key = %key, "value not cacheable: {e}"),
        }
        debug!(key = %key, "loaded from source");
        Ok(value)
    }
}

fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut out: Vec<String> = skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

fn profile_key(user_id: Uuid) -> String {
    format!("profile:{user_id}")
}

fn skills_key(user_id: Uuid) -> String {
    format!("skills:{user_id}")
}

fn experience_key(user_id: Uuid) -> String {
    format!("experience:{user_id}")
}

fn job_key(job_id: Uuid) -> String {
    format!("job:{job_id}")
}

#[cfg(test)]
mod tests {
    use super::memory::InMemorySource;
    use super::*;

    fn provider(source: Arc<InMemorySource>) -> DataProvider {
        DataProvider::new(source, Cache::in_memory())
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let source = Arc::new(InMemorySource::sample());
        let user = source.sample_user_id();
        let provider = provider(source.clone());

        let first = provider.skills(user).await.unwrap();
        let second = provider.skills(user).await.unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(source.source_reads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_profile_goes_stale_after_ttl() {
        let source = Arc::new(InMemorySource::sample());
        let user = source.sample_user_id();
        let provider = provider(source.clone());

        provider.profile(user).await.unwrap();
        tokio::time::advance(Duration::from_secs(599)).await;
        provider.profile(user).await.unwrap();
        assert_eq!(source.source_reads(), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        provider.profile(user).await.unwrap();
        assert_eq!(source.source_reads(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_posting_ttl_is_shorter_than_profile() {
        let source = Arc::new(InMemorySource::sample());
        let job = source.sample_job_id();
        let provider = provider(source.clone());

        provider.job_posting(job).await.unwrap();
        tokio::time::advance(JOB_POSTING_TTL + Duration::from_secs(1)).await;
        provider.job_posting(job).await.unwrap();
        assert_eq!(source.source_reads(), 2);
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_cached() {
        let source = Arc::new(InMemorySource::sample());
        let provider = provider(source.clone());
        let stranger = Uuid::new_v4();

        assert!(provider.profile(stranger).await.unwrap().is_none());
        assert!(provider.profile(stranger).await.unwrap().is_none());
        assert_eq!(source.source_reads(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_user_forces_reload() {
        let source = Arc::new(InMemorySource::sample());
        let user = source.sample_user_id();
        let provider = provider(source.clone());

        provider.profile(user).await.unwrap();
        provider.skills(user).await.unwrap();
        assert_eq!(provider.invalidate_user(user).await, 2);

        provider.profile(user).await.unwrap();
        assert_eq!(source.source_reads(), 3);
    }

    #[tokio::test]
    async fn test_search_key_ignores_skill_order_and_case() {
        let source = Arc::new(InMemorySource::sample());
        let provider = provider(source.clone());

        let a = JobSearch {
            skills: vec!["Rust".to_string(), "sql".to_string()],
            ..JobSearch::default()
        };
        let b = JobSearch {
            skills: vec!["SQL".to_string(), "rust".to_string()],
            ..JobSearch::default()
        };
        provider.search_jobs(&a).await.unwrap();
        provider.search_jobs(&b).await.unwrap();
        assert_eq!(source.source_reads(), 1);
    }

    #[test]
    fn test_normalize_skills_dedups() {
        let skills = vec![" Python ".to_string(), "python".to_string(), "".to_string()];
        assert_eq!(normalize_skills(&skills), vec!["python".to_string()]);
    }
}
