pub mod job;
pub mod profile;

pub use job::{default_search_limit, Candidate, JobPosting, JobSearch};
pub use profile::{skill_names, Experience, Profile, SkillRef, UserSkill};
