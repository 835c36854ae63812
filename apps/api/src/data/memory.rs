//! In-memory `DataSource` for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::DataSource;
use crate::errors::AppError;
use crate::models::{Candidate, Experience, JobPosting, JobSearch, Profile, UserSkill};

#[derive(Default)]
pub struct InMemorySource {
    profiles: HashMap<Uuid, Profile>,
    skills: HashMap<Uuid, Vec<UserSkill>>,
    experience: HashMap<Uuid, Vec<Experience>>,
    jobs: Vec<JobPosting>,
    reads: AtomicUsize,
}

impl InMemorySource {
    /// One user (a senior backend engineer) and three open postings.
    pub fn sample() -> Self {
        let user_id = Uuid::from_u128(1);
        let mut source = Self::default();

        source.profiles.insert(
            user_id,
            Profile {
                user_id,
                full_name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                headline: Some("Backend engineer".to_string()),
                location: Some("London".to_string()),
                created_at: Utc::now(),
            },
        );
        source.skills.insert(
            user_id,
            vec![
                skill("Python", Some("expert"), Some(6.0)),
                skill("SQL", Some("advanced"), Some(4.0)),
                skill("Docker", None, Some(1.0)),
            ],
        );
        source.experience.insert(
            user_id,
            vec![
                position("Senior Engineer", "Acme", date(2021, 1, 1), None, true),
                position("Engineer", "Globex", date(2018, 6, 1), Some(date(2020, 12, 31)), false),
                position("Junior Engineer", "Initech", date(2016, 1, 1), Some(date(2018, 5, 31)), false),
            ],
        );

        source.jobs = vec![
            job(2, "Data Engineer", &["python", "sql", "aws"], &["docker"]),
            job(3, "Platform Engineer", &["python", "docker"], &["kubernetes"]),
            job(4, "iOS Developer", &["swift"], &[]),
        ];

        source
    }

    /// Adds a profile holding `skills` with no experience.
    pub fn with_user(mut self, user_id: Uuid, full_name: &str, skills: &[&str]) -> Self {
        self.profiles.insert(
            user_id,
            Profile {
                user_id,
                full_name: full_name.to_string(),
                email: format!("{}@example.com", full_name.to_lowercase().replace(' ', ".")),
                headline: None,
                location: None,
                created_at: Utc::now(),
            },
        );
        self.skills.insert(
            user_id,
            skills.iter().map(|name| skill(name, None, None)).collect(),
        );
        self
    }

    pub fn sample_user_id(&self) -> Uuid {
        Uuid::from_u128(1)
    }

    pub fn sample_job_id(&self) -> Uuid {
        Uuid::from_u128(2)
    }

    pub fn source_reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DataSource for InMemorySource {
    async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        self.touch();
        Ok(self.profiles.get(&user_id).cloned())
    }

    async fn skills(&self, user_id: Uuid) -> Result<Vec<UserSkill>, AppError> {
        self.touch();
        Ok(self.skills.get(&user_id).cloned().unwrap_or_default())
    }

    async fn experience(&self, user_id: Uuid) -> Result<Vec<Experience>, AppError> {
        self.touch();
        Ok(self.experience.get(&user_id).cloned().unwrap_or_default())
    }

    async fn job_posting(&self, job_id: Uuid) -> Result<Option<JobPosting>, AppError> {
        self.touch();
        Ok(self.jobs.iter().find(|j| j.id == job_id).cloned())
    }

    async fn search_jobs(&self, query: &JobSearch) -> Result<Vec<JobPosting>, AppError> {
        self.touch();
        let wanted: Vec<String> = query.skills.iter().map(|s| s.to_lowercase()).collect();
        Ok(self
            .jobs
            .iter()
            .filter(|j| {
                wanted.is_empty()
                    || j.required_skills
                        .iter()
                        .chain(j.preferred_skills.iter())
                        .any(|s| wanted.contains(&s.to_lowercase()))
            })
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn search_candidates(&self, skills: &[String], limit: u32) -> Result<Vec<Candidate>, AppError> {
        self.touch();
        let mut out = Vec::new();
        for (user_id, profile) in &self.profiles {
            let names: Vec<String> = self
                .skills
                .get(user_id)
                .map(|s| s.iter().map(|k| k.name.clone()).collect())
                .unwrap_or_default();
            if names.iter().any(|n| skills.contains(&n.to_lowercase())) {
                out.push(Candidate {
                    user_id: *user_id,
                    full_name: profile.full_name.clone(),
                    email: profile.email.clone(),
                    skills: names,
                });
            }
        }
        out.truncate(limit as usize);
        Ok(out)
    }
}

fn skill(name: &str, proficiency: Option<&str>, years: Option<f64>) -> UserSkill {
    UserSkill {
        name: name.to_string(),
        proficiency: proficiency.map(str::to_string),
        years_experience: years,
    }
}

fn position(
    title: &str,
    company: &str,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    is_current: bool,
) -> Experience {
    Experience {
        title: title.to_string(),
        company: company.to_string(),
        start_date,
        end_date,
        is_current,
    }
}

fn job(id: u128, title: &str, required: &[&str], preferred: &[&str]) -> JobPosting {
    JobPosting {
        id: Uuid::from_u128(id),
        title: title.to_string(),
        company: "Hooli".to_string(),
        required_skills: required.iter().map(|s| s.to_string()).collect(),
        preferred_skills: preferred.iter().map(|s| s.to_string()).collect(),
        location: Some("Remote".to_string()),
        contact_email: Some("hiring@hooli.example".to_string()),
        created_at: Utc::now(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
