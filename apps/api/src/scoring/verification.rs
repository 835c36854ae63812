use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const CERTIFICATES_POINTS: u32 = 40;
const PROJECTS_POINTS: u32 = 30;
const REFERENCES_POINTS: u32 = 20;
const WORK_HISTORY_POINTS: u32 = 10;

/// Evidence submitted with a skill claim.
///
/// Each field accepts a boolean or the evidence itself (a list, string or
/// object); any non-empty value counts as present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEvidence {
    #[serde(default, deserialize_with = "presence")]
    pub certificates: bool,
    #[serde(default, deserialize_with = "presence")]
    pub projects: bool,
    #[serde(default, deserialize_with = "presence")]
    pub references: bool,
    #[serde(default, alias = "work_experience", deserialize_with = "presence")]
    pub work_history: bool,
}

fn presence<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationDecision {
    Approved,
    RequiresMoreInfo,
    Pending,
}

impl VerificationDecision {
    /// Thresholds 70 / 40.
    pub fn from_confidence(confidence: u32) -> Self {
        match confidence {
            c if c >= 70 => VerificationDecision::Approved,
            c if c >= 40 => VerificationDecision::RequiresMoreInfo,
            _ => VerificationDecision::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationScore {
    pub confidence: u32,
    pub decision: VerificationDecision,
    /// Human-readable list of what contributed to the confidence.
    pub factors: Vec<String>,
}

/// Confidence that a claimed skill is genuine, from the evidence on file and
/// the claimed years of experience.
pub fn verification_confidence(evidence: &SkillEvidence, years_experience: f64) -> VerificationScore {
    let mut confidence = 0;
    let mut factors = Vec::new();

    let weighted = [
        (evidence.certificates, CERTIFICATES_POINTS, "certificates"),
        (evidence.projects, PROJECTS_POINTS, "project evidence"),
        (evidence.references, REFERENCES_POINTS, "references"),
        (evidence.work_history, WORK_HISTORY_POINTS, "work history"),
    ];
    for (present, points, label) in weighted {
        if present {
            confidence += points;
            factors.push(format!("{label} (+{points})"));
        }
    }

    if years_experience >= 5.0 {
        confidence += 10;
        factors.push("5+ years claimed (+10)".to_string());
    } else if years_experience >= 2.0 {
        confidence += 5;
        factors.push("2+ years claimed (+5)".to_string());
    }

    VerificationScore {
        confidence,
        decision: VerificationDecision::from_confidence(confidence),
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_certificates_projects_six_years_approved() {
        let evidence = SkillEvidence {
            certificates: true,
            projects: true,
            ..SkillEvidence::default()
        };
        let result = verification_confidence(&evidence, 6.0);
        assert_eq!(result.confidence, 80);
        assert_eq!(result.decision, VerificationDecision::Approved);
        assert_eq!(result.factors.len(), 3);
    }

    #[test]
    fn test_all_evidence_caps_at_110_points() {
        let evidence = SkillEvidence {
            certificates: true,
            projects: true,
            references: true,
            work_history: true,
        };
        assert_eq!(verification_confidence(&evidence, 10.0).confidence, 110);
    }

    #[test]
    fn test_years_bonus_is_exclusive() {
        let none = SkillEvidence::default();
        assert_eq!(verification_confidence(&none, 1.9).confidence, 0);
        assert_eq!(verification_confidence(&none, 2.0).confidence, 5);
        assert_eq!(verification_confidence(&none, 5.0).confidence, 10);
    }

    #[test]
    fn test_decision_thresholds() {
        assert_eq!(VerificationDecision::from_confidence(70), VerificationDecision::Approved);
        assert_eq!(VerificationDecision::from_confidence(69), VerificationDecision::RequiresMoreInfo);
        assert_eq!(VerificationDecision::from_confidence(40), VerificationDecision::RequiresMoreInfo);
        assert_eq!(VerificationDecision::from_confidence(39), VerificationDecision::Pending);
    }

    #[test]
    fn test_references_plus_work_history_needs_more_info() {
        let evidence = SkillEvidence {
            references: true,
            work_history: true,
            ..SkillEvidence::default()
        };
        let result = verification_confidence(&evidence, 3.0);
        assert_eq!(result.confidence, 35);
        assert_eq!(result.decision, VerificationDecision::Pending);
    }

    #[test]
    fn test_evidence_accepts_lists_and_flags() {
        let evidence: SkillEvidence = serde_json::from_value(json!({
            "certificates": ["AWS SAA"],
            "projects": [],
            "references": "Jane Doe, CTO",
            "work_experience": true
        }))
        .unwrap();
        assert!(evidence.certificates);
        assert!(!evidence.projects);
        assert!(evidence.references);
        assert!(evidence.work_history);
    }

    #[test]
    fn test_missing_evidence_fields_default_to_absent() {
        let evidence: SkillEvidence = serde_json::from_value(json!({})).unwrap();
        assert_eq!(evidence, SkillEvidence::default());
    }
}
