use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSkill {
    pub name: String,
    pub proficiency: Option<String>,
    pub years_experience: Option<f64>,
}

/// One position in a work history. Rows come back most recent first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
}

/// A skill given either by name or as a full record.
///
/// Agent parameters accept both so a `get_skills` result can be bound
/// directly into an action that only needs names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillRef {
    Name(String),
    Record(UserSkill),
}

impl SkillRef {
    pub fn name(&self) -> &str {
        match self {
            SkillRef::Name(name) => name,
            SkillRef::Record(skill) => &skill.name,
        }
    }

    pub fn into_user_skill(self) -> UserSkill {
        match self {
            SkillRef::Name(name) => UserSkill {
                name,
                proficiency: None,
                years_experience: None,
            },
            SkillRef::Record(skill) => skill,
        }
    }
}

pub fn skill_names(skills: &[SkillRef]) -> Vec<String> {
    skills.iter().map(|s| s.name().to_string()).collect()
}
