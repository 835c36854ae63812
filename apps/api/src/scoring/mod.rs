//! Deterministic fallback scoring.
//!
//! Pure functions only: no I/O, no clock reads, no hidden state. Agents call
//! these when the language model is unavailable or its output is unusable.

use chrono::{Datelike, NaiveDate};

pub mod progression;
pub mod skill_match;
pub mod verification;

pub use progression::{career_progression_score, ProgressionScore};
pub use skill_match::{skill_match_score, MatchTier, SkillMatchScore};
pub use verification::{verification_confidence, SkillEvidence, VerificationDecision, VerificationScore};

/// Whole months between two dates, with a fractional day component (30-day months).
pub fn months_between(start: NaiveDate, end: NaiveDate) -> f64 {
    let years = end.year() - start.year();
    let months = end.month() as i32 - start.month() as i32;
    let total = years * 12 + months;
    let day_frac = (end.day() as f64 - start.day() as f64) / 30.0;
    (total as f64 + day_frac).max(0.0)
}
