use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::months_between;
use crate::models::Experience;

const BASE_SCORE: f64 = 5.0;
const MAX_SCORE: f64 = 10.0;
const SENIOR_MARKERS: &[&str] = &["senior", "lead"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionScore {
    pub score: f64, // 0.0 – 10.0
    pub distinct_positions: usize,
    pub average_tenure_months: f64,
    pub has_current_position: bool,
    pub recent_senior_title: bool,
    pub factors: Vec<String>,
}

/// Career-progression score on a 0–10 scale.
///
/// `today` closes open-ended positions. Positions may arrive in any order; the
/// two with the latest start dates count as most recent.
pub fn career_progression_score(positions: &[Experience], today: NaiveDate) -> ProgressionScore {
    let mut score = BASE_SCORE;
    let mut factors = Vec::new();

    let distinct_positions = positions
        .iter()
        .map(|p| (p.title.trim().to_lowercase(), p.company.trim().to_lowercase()))
        .collect::<HashSet<_>>()
        .len();
    if distinct_positions >= 3 {
        score += 1.0;
        factors.push(format!("{distinct_positions} distinct positions (+1.0)"));
    }

    let average_tenure_months = if positions.is_empty() {
        0.0
    } else {
        let total: f64 = positions
            .iter()
            .map(|p| {
                let end = if p.is_current {
                    today
                } else {
                    p.end_date.unwrap_or(today)
                };
                months_between(p.start_date, end)
            })
            .sum();
        total / positions.len() as f64
    };
    if average_tenure_months >= 24.0 {
        score += 1.0;
        factors.push(format!(
            "average tenure {average_tenure_months:.1} months (+1.0)"
        ));
    }

    let has_current_position = positions.iter().any(|p| p.is_current);
    if has_current_position {
        score += 0.5;
        factors.push("currently employed (+0.5)".to_string());
    }

    let mut by_recency: Vec<&Experience> = positions.iter().collect();
    by_recency.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    let recent_senior_title = by_recency.iter().take(2).any(|p| {
        let title = p.title.to_lowercase();
        SENIOR_MARKERS.iter().any(|m| title.contains(m))
    });
    if recent_senior_title {
        score += 1.5;
        factors.push("senior or lead title in recent roles (+1.5)".to_string());
    }

    ProgressionScore {
        score: score.min(MAX_SCORE),
        distinct_positions,
        average_tenure_months,
        has_current_position,
        recent_senior_title,
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn pos(title: &str, company: &str, start: NaiveDate, end: Option<NaiveDate>, current: bool) -> Experience {
        Experience {
            title: title.to_string(),
            company: company.to_string(),
            start_date: start,
            end_date: end,
            is_current: current,
        }
    }

    fn today() -> NaiveDate {
        d(2024, 7, 1)
    }

    #[test]
    fn test_four_positions_senior_current_scores_nine() {
        // Four 30-month stints, latest one ongoing.
        let positions = vec![
            pos("Senior Engineer", "Acme", d(2022, 1, 1), None, true),
            pos("Engineer", "Globex", d(2019, 7, 1), Some(d(2022, 1, 1)), false),
            pos("Developer", "Initech", d(2017, 1, 1), Some(d(2019, 7, 1)), false),
            pos("Junior Developer", "Hooli", d(2014, 7, 1), Some(d(2017, 1, 1)), false),
        ];
        let result = career_progression_score(&positions, today());
        assert_eq!(result.distinct_positions, 4);
        assert!((result.average_tenure_months - 30.0).abs() < 1e-9);
        assert!(result.has_current_position);
        assert!(result.recent_senior_title);
        assert_eq!(result.score, 9.0);
    }

    #[test]
    fn test_empty_history_is_base_score() {
        let result = career_progression_score(&[], today());
        assert_eq!(result.score, 5.0);
        assert!(result.factors.is_empty());
    }

    #[test]
    fn test_lead_in_second_most_recent_counts() {
        let positions = vec![
            pos("Engineering Manager", "Acme", d(2023, 1, 1), Some(d(2024, 1, 1)), false),
            pos("Tech Lead", "Globex", d(2021, 1, 1), Some(d(2022, 12, 31)), false),
        ];
        let result = career_progression_score(&positions, today());
        assert!(result.recent_senior_title);
        assert_eq!(result.score, 6.5);
    }

    #[test]
    fn test_senior_title_older_than_two_roles_ignored() {
        let positions = vec![
            pos("Consultant", "A", d(2023, 1, 1), None, true),
            pos("Analyst", "B", d(2022, 1, 1), Some(d(2022, 12, 1)), false),
            pos("Senior Analyst", "C", d(2020, 1, 1), Some(d(2021, 12, 1)), false),
        ];
        let result = career_progression_score(&positions, today());
        assert!(!result.recent_senior_title);
        assert_eq!(result.score, 6.5);
    }

    #[test]
    fn test_repeated_role_is_not_distinct() {
        let positions = vec![
            pos("Engineer", "Acme", d(2020, 1, 1), Some(d(2021, 1, 1)), false),
            pos("engineer", "ACME", d(2018, 1, 1), Some(d(2019, 1, 1)), false),
            pos("Engineer", "Globex", d(2016, 1, 1), Some(d(2017, 1, 1)), false),
        ];
        assert_eq!(career_progression_score(&positions, today()).distinct_positions, 2);
    }

    #[test]
    fn test_score_never_exceeds_ten() {
        let positions: Vec<Experience> = (0..6)
            .map(|i| {
                pos(
                    "Senior Lead",
                    &format!("Co{i}"),
                    d(2000 + i * 4, 1, 1),
                    Some(d(2003 + i * 4, 1, 1)),
                    i == 5,
                )
            })
            .collect();
        assert!(career_progression_score(&positions, today()).score <= 10.0);
    }
}
