//! Candidate ranking by a profile composite of skills, experience, education
//! and projects

use crate::config::RankingConfig;
use crate::error::{Result, ResumeRankerError};
use crate::processing::experience::merged_months;
use crate::processing::records::{DegreeTier, ResumeRecord};
use crate::processing::scorer::ScoreBreakdown;
use crate::processing::taxonomy::SkillTaxonomy;
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingSubScores {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub projects: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub rank: usize,
    pub record: Arc<ResumeRecord>,
    pub breakdown: ScoreBreakdown,
    pub composite: f64,
    pub sub_scores: RankingSubScores,
    /// Distinct canonical skills; aliases of one skill count once
    pub distinct_skills: usize,
    pub experience_years: f64,
    pub education: DegreeTier,
}

impl RankedCandidate {
    pub fn id(&self) -> &str {
        self.record.id()
    }
}

/// Full ordering of a batch; sorted by composite descending, then id ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    candidates: Vec<RankedCandidate>,
}

impl Ranking {
    pub fn all(&self) -> &[RankedCandidate] {
        &self.candidates
    }

    /// First `k` candidates of the full ranking
    pub fn top(&self, k: usize) -> &[RankedCandidate] {
        &self.candidates[..k.min(self.candidates.len())]
    }

    pub fn get(&self, id: &str) -> Option<&RankedCandidate> {
        self.candidates.iter().find(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn into_vec(self) -> Vec<RankedCandidate> {
        self.candidates
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonWinner {
    First,
    Second,
    Tie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedCandidate {
    pub id: String,
    pub name: String,
    pub composite: f64,
    pub rank: usize,
    pub skills: usize,
    pub experience_years: f64,
    pub education: DegreeTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateComparison {
    pub first: ComparedCandidate,
    pub second: ComparedCandidate,
    pub winner: ComparisonWinner,
}

pub struct Ranker {
    config: RankingConfig,
    taxonomy: Arc<SkillTaxonomy>,
    reference_date: NaiveDate,
}

impl Ranker {
    pub fn new(config: RankingConfig, taxonomy: Arc<SkillTaxonomy>, reference_date: NaiveDate) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            taxonomy,
            reference_date,
        })
    }

    /// Number of distinct skills after alias resolution
    pub fn distinct_skills(&self, record: &ResumeRecord) -> usize {
        record
            .skills()
            .iter()
            .map(|skill| self.taxonomy.canonicalize(skill))
            .filter(|canonical| !canonical.is_empty())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn rank(&self, candidates: Vec<(Arc<ResumeRecord>, ScoreBreakdown)>) -> Result<Ranking> {
        let mut seen = HashSet::new();
        for (record, _) in &candidates {
            if !seen.insert(record.id().to_string()) {
                return Err(ResumeRankerError::Validation(format!(
                    "duplicate candidate id '{}' in ranking",
                    record.id()
                )));
            }
        }

        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .map(|(record, breakdown)| self.rank_one(record, breakdown))
            .collect();

        ranked.sort_by(compare_ranked);
        for (index, candidate) in ranked.iter_mut().enumerate() {
            candidate.rank = index + 1;
        }

        if let Some(best) = ranked.first() {
            info!(
                "Ranked {} candidates. Top: {} ({:.2})",
                ranked.len(),
                best.id(),
                best.composite
            );
        }

        Ok(Ranking { candidates: ranked })
    }

    /// Side-by-side view of two ranked candidates
    pub fn compare(&self, first: &RankedCandidate, second: &RankedCandidate) -> CandidateComparison {
        let winner = match first.composite.total_cmp(&second.composite) {
            Ordering::Greater => ComparisonWinner::First,
            Ordering::Less => ComparisonWinner::Second,
            Ordering::Equal => ComparisonWinner::Tie,
        };

        CandidateComparison {
            first: summarize(first),
            second: summarize(second),
            winner,
        }
    }

    /// Ranking sub-scores and merged experience years for one record
    pub fn sub_scores(&self, record: &ResumeRecord) -> (RankingSubScores, f64) {
        let months = merged_months(record.experience(), self.reference_date).unwrap_or_else(|e| {
            warn!("Counting no experience for {}: {}", record.id(), e);
            0
        });
        let years = f64::from(months) / 12.0;

        let sub_scores = RankingSubScores {
            skills: (self.distinct_skills(record) as f64 * self.config.points_per_skill).min(100.0),
            experience: (years * self.config.points_per_year).min(100.0),
            education: education_score(record.highest_degree()),
            projects: (record.projects().len() as f64 * self.config.points_per_project).min(100.0),
        };
        (sub_scores, years)
    }

    fn rank_one(&self, record: Arc<ResumeRecord>, breakdown: ScoreBreakdown) -> RankedCandidate {
        let (sub_scores, experience_years) = self.sub_scores(&record);
        let distinct_skills = self.distinct_skills(&record);
        let weights = &self.config.weights;

        let composite = sub_scores.skills * weights.skills
            + sub_scores.experience * weights.experience
            + sub_scores.education * weights.education
            + sub_scores.projects * weights.projects;

        RankedCandidate {
            rank: 0,
            education: record.highest_degree(),
            record,
            breakdown,
            composite: round2(composite),
            sub_scores,
            distinct_skills,
            experience_years,
        }
    }
}

pub fn education_score(tier: DegreeTier) -> f64 {
    match tier {
        DegreeTier::Doctorate => 100.0,
        DegreeTier::Master => 85.0,
        DegreeTier::Bachelor => 70.0,
        DegreeTier::Associate => 50.0,
        DegreeTier::Diploma => 40.0,
        DegreeTier::Unspecified => 30.0,
    }
}

fn compare_ranked(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.composite
        .total_cmp(&a.composite)
        .then_with(|| a.id().cmp(b.id()))
}

fn summarize(candidate: &RankedCandidate) -> ComparedCandidate {
    ComparedCandidate {
        id: candidate.id().to_string(),
        name: candidate.record.display_name().to_string(),
        composite: candidate.composite,
        rank: candidate.rank,
        skills: candidate.distinct_skills,
        experience_years: candidate.experience_years,
        education: candidate.education,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
