use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filters for open job postings. Doubles as part of the search cache key,
/// so field order must stay stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSearch {
    #[serde(default)]
    pub skills: Vec<String>,
    pub location: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

impl Default for JobSearch {
    fn default() -> Self {
        Self {
            skills: Vec::new(),
            location: None,
            limit: default_search_limit(),
        }
    }
}

pub fn default_search_limit() -> u32 {
    50
}

/// A candidate with their skill names, as returned by candidate search.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub skills: Vec<String>,
}
