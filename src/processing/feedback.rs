//! Template-driven improvement recommendations derived from a score

use crate::processing::format_checker::FormatCheck;
use crate::processing::scorer::{CandidateScore, ScoreComponent};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Components scoring below this are flagged as weak
const WEAK_COMPONENT_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

impl fmt::Display for RecommendationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationPriority::High => write!(f, "High"),
            RecommendationPriority::Medium => write!(f, "Medium"),
            RecommendationPriority::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub detail: String,
    pub priority: RecommendationPriority,
    /// Score component this addresses
    pub component: ScoreComponent,
}

/// Build recommendations for a scored candidate, highest priority first
pub fn recommendations(score: &CandidateScore) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for skill in &score.skill_match.missing {
        recommendations.push(Recommendation {
            title: format!("Add missing skill: {}", skill),
            detail: format!(
                "The job asks for '{}'. List it under skills and show where you used it, if you have it.",
                skill
            ),
            priority: RecommendationPriority::High,
            component: ScoreComponent::Skills,
        });
    }

    for component in ScoreComponent::ALL {
        let value = score.breakdown.component(component);
        if value < WEAK_COMPONENT_THRESHOLD && !score.breakdown.is_degraded(component) {
            recommendations.push(weak_component(component, value, score));
        }
    }

    for check in score.format.failed_checks() {
        recommendations.push(format_fix(check));
    }

    for degraded in &score.breakdown.degraded {
        recommendations.push(Recommendation {
            title: format!("{} score is approximate", capitalize(&degraded.component.to_string())),
            detail: format!("This component was not fully computed: {}", degraded.reason),
            priority: RecommendationPriority::Low,
            component: degraded.component,
        });
    }

    // stable, so template order holds within a priority
    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

fn weak_component(component: ScoreComponent, value: f64, score: &CandidateScore) -> Recommendation {
    let detail = match component {
        ScoreComponent::Keyword => {
            let terms: Vec<&str> = score
                .keyword_match
                .as_ref()
                .map(|k| k.missing_terms.iter().take(5).map(|t| t.term.as_str()).collect())
                .unwrap_or_default();
            if terms.is_empty() {
                "Mirror the job description's wording in your summary and experience bullets.".to_string()
            } else {
                format!("Work these job terms into your experience bullets: {}.", terms.join(", "))
            }
        }
        ScoreComponent::Skills => {
            "Most required skills are missing from your skills list.".to_string()
        }
        ScoreComponent::Experience => match &score.experience {
            Some(experience) => format!(
                "You show {:.1} years of relevant experience against {:.1} required. Include every relevant role with dates.",
                experience.years, experience.required_years
            ),
            None => "Include every relevant role with start and end dates.".to_string(),
        },
        ScoreComponent::Semantic => {
            "Your resume reads differently from the job description. Describe your work using the role's own responsibilities.".to_string()
        }
        ScoreComponent::Format => {
            "Fix the failed formatting checks so ATS parsers can read your resume.".to_string()
        }
    };

    Recommendation {
        title: format!("Strengthen {} match ({:.0}/100)", component, value),
        detail,
        priority: RecommendationPriority::Medium,
        component,
    }
}

fn format_fix(check: &FormatCheck) -> Recommendation {
    let (title, priority) = match check.name.as_str() {
        "contact_email" => ("Add a plain-text email address", RecommendationPriority::Medium),
        "experience_section" => ("Add a work experience section", RecommendationPriority::Medium),
        "education_section" => ("Add an education section", RecommendationPriority::Medium),
        "skills_section" => ("Add a skills section", RecommendationPriority::Medium),
        "length" => ("Adjust resume length", RecommendationPriority::Low),
        "no_layout_artifacts" => ("Avoid tables and multi-column layouts", RecommendationPriority::Low),
        _ => ("Fix formatting issue", RecommendationPriority::Low),
    };

    Recommendation {
        title: title.to_string(),
        detail: check.detail.clone(),
        priority,
        component: ScoreComponent::Format,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::processing::records::ResumeRecord;
    use crate::processing::scorer::AtsScorer;
    use chrono::NaiveDate;

    async fn score(record: &ResumeRecord, job: &str) -> CandidateScore {
        AtsScorer::builder(Config::default())
            .reference_date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
            .build()
            .unwrap()
            .score_text(record, job)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_skills_come_first() {
        let record = ResumeRecord::new("c1").with_skills(["python", "sql"]);
        let score = score(&record, "Data engineer with Python, SQL and AWS").await;
        let recs = recommendations(&score);

        assert_eq!(recs[0].priority, RecommendationPriority::High);
        assert_eq!(recs[0].title, "Add missing skill: aws");
        assert_eq!(recs[0].component, ScoreComponent::Skills);
        assert!(recs.windows(2).all(|w| w[0].priority <= w[1].priority));
    }

    #[tokio::test]
    async fn test_failed_format_checks_and_degraded_components() {
        let record = ResumeRecord::new("c1").with_skills(["python"]);
        let score = score(&record, "Python developer").await;
        let recs = recommendations(&score);

        assert!(recs.iter().any(|r| r.title == "Add a plain-text email address"
            && r.priority == RecommendationPriority::Medium));
        assert!(recs.iter().any(|r| r.title == "Adjust resume length"
            && r.priority == RecommendationPriority::Low));
        // no embedder, so semantic is always approximate
        assert!(recs.iter().any(|r| r.component == ScoreComponent::Semantic
            && r.priority == RecommendationPriority::Low));
        assert!(!recs.iter().any(|r| r.title.starts_with("Add missing skill")));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("semantic"), "Semantic");
        assert_eq!(capitalize(""), "");
    }
}
