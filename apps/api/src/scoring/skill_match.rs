use std::collections::HashSet;

use serde::{Deserialize, Serialize};

const REQUIRED_WEIGHT: f64 = 0.7;
const PREFERRED_WEIGHT: f64 = 0.3;
/// Ratio used when the posting lists no preferred skills.
const NEUTRAL_PREFERRED_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Strong,
    Good,
    Moderate,
    Weak,
}

impl MatchTier {
    /// Thresholds 80 / 60 / 40.
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 80 => MatchTier::Strong,
            s if s >= 60 => MatchTier::Good,
            s if s >= 40 => MatchTier::Moderate,
            _ => MatchTier::Weak,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::Strong => "Strong Match",
            MatchTier::Good => "Good Match",
            MatchTier::Moderate => "Moderate Match",
            MatchTier::Weak => "Weak Match",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            MatchTier::Strong => "Highly Recommended",
            MatchTier::Good => "Recommended",
            MatchTier::Moderate => "Consider",
            MatchTier::Weak => "Not Recommended",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatchScore {
    pub score: u32, // 0 – 100
    pub required_ratio: f64,
    pub preferred_ratio: f64,
    pub matched_required: Vec<String>,
    pub missing_required: Vec<String>,
    pub matched_preferred: Vec<String>,
    pub missing_preferred: Vec<String>,
    pub tier: MatchTier,
}

/// Scores a candidate's skills against a posting's required and preferred sets.
///
/// Comparison is case-insensitive and duplicate names count once. Output lists
/// keep the posting's spelling and order.
///
/// `score = round(100 * (0.7 * |U∩R|/|R| + 0.3 * |U∩P|/|P|))`, with the required
/// ratio 1.0 when `R` is empty and the preferred ratio 0.5 when `P` is empty.
pub fn skill_match_score<U, R, P>(candidate: &[U], required: &[R], preferred: &[P]) -> SkillMatchScore
where
    U: AsRef<str>,
    R: AsRef<str>,
    P: AsRef<str>,
{
    let have: HashSet<String> = candidate
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .collect();

    let (matched_required, missing_required) = partition(&have, required);
    let (matched_preferred, missing_preferred) = partition(&have, preferred);

    let required_total = matched_required.len() + missing_required.len();
    let preferred_total = matched_preferred.len() + missing_preferred.len();

    let required_ratio = if required_total == 0 {
        1.0
    } else {
        matched_required.len() as f64 / required_total as f64
    };
    let preferred_ratio = if preferred_total == 0 {
        NEUTRAL_PREFERRED_RATIO
    } else {
        matched_preferred.len() as f64 / preferred_total as f64
    };

    let raw = 100.0 * (REQUIRED_WEIGHT * required_ratio + PREFERRED_WEIGHT * preferred_ratio);
    let score = raw.round_ties_even().clamp(0.0, 100.0) as u32;

    SkillMatchScore {
        score,
        required_ratio,
        preferred_ratio,
        matched_required,
        missing_required,
        matched_preferred,
        missing_preferred,
        tier: MatchTier::from_score(score),
    }
}

fn partition<S: AsRef<str>>(have: &HashSet<String>, wanted: &[S]) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    let mut missing = Vec::new();

    for name in wanted {
        let name = name.as_ref().trim();
        let key = name.to_lowercase();
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        if have.contains(&key) {
            matched.push(name.to_string());
        } else {
            missing.push(name.to_string());
        }
    }
    (matched, missing)
}
