//! Experience relevance: merged tenure against the job's minimum, nudged by
//! how closely past roles resemble the advertised one

use crate::config::ExperienceConfig;
use crate::error::{Result, ResumeRankerError};
use crate::processing::job::Seniority;
use crate::processing::records::ExperienceEntry;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

/// Average Gregorian month length in days
pub const DAYS_PER_MONTH: f64 = 30.436875;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceResult {
    pub score: f64,
    pub base_score: f64,
    pub title_adjustment: f64,
    pub total_months: u32,
    pub years: f64,
    pub required_years: f64,
    pub title_signal: Option<f64>,
    pub best_matching_role: Option<String>,
}

/// What the job asks for, as far as experience goes
#[derive(Debug, Clone, Copy, Default)]
pub struct ExperienceRequirement<'a> {
    pub min_years: Option<f64>,
    pub seniority: Option<Seniority>,
    pub title: Option<&'a str>,
}

pub struct ExperienceEvaluator {
    default_min_years: f64,
    max_title_adjustment: f64,
}

impl Default for ExperienceEvaluator {
    fn default() -> Self {
        Self::new(&ExperienceConfig::default())
    }
}

impl ExperienceEvaluator {
    pub fn new(config: &ExperienceConfig) -> Self {
        Self {
            default_min_years: config.default_min_years,
            max_title_adjustment: config.max_title_adjustment,
        }
    }

    pub fn evaluate(
        &self,
        entries: &[ExperienceEntry],
        requirement: &ExperienceRequirement<'_>,
        reference_date: NaiveDate,
    ) -> Result<ExperienceResult> {
        let total_months = merged_months(entries, reference_date)?;
        let years = f64::from(total_months) / 12.0;

        let required_years = requirement
            .min_years
            .filter(|years| years.is_finite() && *years > 0.0)
            .unwrap_or(self.default_min_years);
        let base_score = (years / required_years * 100.0).min(100.0);

        let (title_signal, best_matching_role) = if entries.is_empty() {
            (None, None)
        } else {
            title_signal(entries, requirement)
        };

        let title_adjustment = title_signal
            .map(|signal| (signal - 0.5) * 2.0 * self.max_title_adjustment)
            .unwrap_or(0.0);
        let score = (base_score + title_adjustment).clamp(0.0, 100.0);

        Ok(ExperienceResult {
            score,
            base_score,
            title_adjustment,
            total_months,
            years,
            required_years,
            title_signal,
            best_matching_role,
        })
    }
}

/// Total months covered by the entries, with overlapping or adjacent
/// inclusive day ranges merged first
pub fn merged_months(entries: &[ExperienceEntry], reference_date: NaiveDate) -> Result<u32> {
    let mut ranges: Vec<(NaiveDate, NaiveDate)> = Vec::with_capacity(entries.len());

    for entry in entries {
        let end = match entry.end_date() {
            Some(end) => end,
            None if entry.start_date() > reference_date => {
                return Err(ResumeRankerError::Scoring(format!(
                    "ongoing role '{}' starts {} after the reference date {}",
                    entry.title(),
                    entry.start_date(),
                    reference_date
                )));
            }
            None => reference_date,
        };
        ranges.push((entry.start_date(), end));
    }

    ranges.sort();

    let mut merged: Vec<(NaiveDate, NaiveDate)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some((_, last_end)) if start <= *last_end + Duration::days(1) => {
                if end > *last_end {
                    *last_end = end;
                }
            }
            _ => merged.push((start, end)),
        }
    }

    let days: i64 = merged
        .iter()
        .map(|(start, end)| (*end - *start).num_days() + 1)
        .sum();

    Ok((days as f64 / DAYS_PER_MONTH).round() as u32)
}

/// Best title similarity, or seniority agreement when the job names only a level
fn title_signal(
    entries: &[ExperienceEntry],
    requirement: &ExperienceRequirement<'_>,
) -> (Option<f64>, Option<String>) {
    if let Some(job_title) = requirement.title.filter(|t| !t.trim().is_empty()) {
        let job_title = job_title.to_lowercase();
        let best = entries
            .iter()
            .map(|entry| (jaro_winkler(&entry.title().to_lowercase(), &job_title), entry.title()))
            .max_by(|a, b| a.0.total_cmp(&b.0));

        return match best {
            Some((similarity, role)) => (Some(similarity), Some(role.to_string())),
            None => (None, None),
        };
    }

    let Some(wanted) = requirement.seniority else {
        return (None, None);
    };

    let latest = entries.iter().max_by_key(|entry| entry.start_date());
    let held = latest.and_then(|entry| Seniority::detect(entry.title()));

    match (held, latest) {
        (Some(held), Some(entry)) => {
            let distance = f64::from(held.level().abs_diff(wanted.level()));
            let agreement = 1.0 - distance / f64::from(Seniority::MAX_LEVEL);
            (Some(agreement), Some(entry.title().to_string()))
        }
        _ => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(title: &str, start: NaiveDate, end: Option<NaiveDate>) -> ExperienceEntry {
        ExperienceEntry::new(title, "Acme", start, end).unwrap()
    }

    #[test]
    fn test_overlapping_ranges_merge() {
        let entries = vec![
            entry("Engineer", date(2021, 1, 1), Some(date(2021, 12, 31))),
            entry("Consultant", date(2021, 6, 1), Some(date(2021, 12, 31))),
        ];
        assert_eq!(merged_months(&entries, date(2024, 1, 1)).unwrap(), 12);
    }

    #[test]
    fn test_adjacent_ranges_merge_and_gaps_do_not_count() {
        let adjacent = vec![
            entry("A", date(2020, 1, 1), Some(date(2020, 6, 30))),
            entry("B", date(2020, 7, 1), Some(date(2020, 12, 31))),
        ];
        assert_eq!(merged_months(&adjacent, date(2024, 1, 1)).unwrap(), 12);

        let with_gap = vec![
            entry("A", date(2019, 1, 1), Some(date(2019, 6, 30))),
            entry("B", date(2020, 1, 1), Some(date(2020, 6, 30))),
        ];
        assert_eq!(merged_months(&with_gap, date(2024, 1, 1)).unwrap(), 12);
    }

    #[test]
    fn test_ongoing_role_runs_to_reference_date() {
        let entries = vec![entry("Engineer", date(2022, 1, 1), None)];
        assert_eq!(merged_months(&entries, date(2023, 12, 31)).unwrap(), 24);
    }

    #[test]
    fn test_ongoing_role_after_reference_date_is_error() {
        let entries = vec![entry("Engineer", date(2030, 1, 1), None)];
        assert!(matches!(
            merged_months(&entries, date(2024, 1, 1)),
            Err(ResumeRankerError::Scoring(_))
        ));
    }

    #[test]
    fn test_linear_ramp_saturates() {
        let evaluator = ExperienceEvaluator::default();
        let entries = vec![entry("Engineer", date(2021, 1, 1), Some(date(2022, 12, 31)))];

        let requirement = ExperienceRequirement {
            min_years: Some(4.0),
            ..Default::default()
        };
        let result = evaluator.evaluate(&entries, &requirement, date(2024, 1, 1)).unwrap();
        assert_eq!(result.total_months, 24);
        assert!((result.score - 50.0).abs() < 1e-9);
        assert_eq!(result.title_adjustment, 0.0);

        let requirement = ExperienceRequirement {
            min_years: Some(1.0),
            ..Default::default()
        };
        let result = evaluator.evaluate(&entries, &requirement, date(2024, 1, 1)).unwrap();
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_missing_minimum_uses_default() {
        let evaluator = ExperienceEvaluator::default();
        let entries = vec![entry("Engineer", date(2023, 1, 1), Some(date(2023, 6, 30)))];

        let result = evaluator
            .evaluate(&entries, &ExperienceRequirement::default(), date(2024, 1, 1))
            .unwrap();
        assert_eq!(result.required_years, 1.0);
        assert!((result.score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_entries_scores_zero_without_adjustment() {
        let evaluator = ExperienceEvaluator::default();
        let requirement = ExperienceRequirement {
            min_years: Some(3.0),
            seniority: Some(Seniority::Senior),
            title: Some("Senior Engineer"),
        };
        let result = evaluator.evaluate(&[], &requirement, date(2024, 1, 1)).unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.title_signal, None);
    }

    #[test]
    fn test_title_similarity_adjusts_within_bounds() {
        let evaluator = ExperienceEvaluator::default();
        let entries = vec![
            entry("Senior Backend Engineer", date(2020, 1, 1), Some(date(2020, 12, 31))),
            entry("Barista", date(2018, 1, 1), Some(date(2018, 12, 31))),
        ];
        let requirement = ExperienceRequirement {
            min_years: Some(4.0),
            seniority: None,
            title: Some("Senior Backend Engineer"),
        };

        let result = evaluator.evaluate(&entries, &requirement, date(2024, 1, 1)).unwrap();
        assert_eq!(result.title_signal, Some(1.0));
        assert_eq!(result.best_matching_role.as_deref(), Some("Senior Backend Engineer"));
        assert!((result.title_adjustment - 15.0).abs() < 1e-9);
        assert!((result.score - (result.base_score + 15.0)).abs() < 1e-9);
    }

    #[test]
    fn test_seniority_agreement_when_no_title() {
        let evaluator = ExperienceEvaluator::default();
        let entries = vec![entry("Junior Developer", date(2023, 1, 1), Some(date(2023, 12, 31)))];
        let requirement = ExperienceRequirement {
            min_years: Some(1.0),
            seniority: Some(Seniority::Principal),
            title: None,
        };

        let result = evaluator.evaluate(&entries, &requirement, date(2024, 1, 1)).unwrap();
        let expected_signal = 1.0 - 4.0 / 5.0;
        assert!((result.title_signal.unwrap() - expected_signal).abs() < 1e-9);
        assert!(result.title_adjustment < 0.0);
        assert!(result.score >= 0.0 && result.score <= 100.0);
    }
}
