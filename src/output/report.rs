//! Report structures handed to the formatters

use crate::config::ScoringWeights;
use crate::processing::batch::{BatchOutcome, UnscoredCandidate};
use crate::processing::feedback::{recommendations, Recommendation};
use crate::processing::ranker::RankedCandidate;
use crate::processing::scorer::CandidateScore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub job_title: String,
    /// Embedding model used, if any
    pub embedder: Option<String>,
    pub reference_date: NaiveDate,
    pub processing_time_ms: u64,
}

impl ReportMetadata {
    pub fn new(job_title: impl Into<String>, embedder: Option<String>, reference_date: NaiveDate) -> Self {
        Self {
            generated_at: Utc::now(),
            job_title: job_title.into(),
            embedder,
            reference_date,
            processing_time_ms: 0,
        }
    }

    pub fn with_processing_time(mut self, ms: u64) -> Self {
        self.processing_time_ms = ms;
        self
    }
}

/// One resume scored against one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub metadata: ReportMetadata,
    pub candidate_name: String,
    pub weights: ScoringWeights,
    pub score: CandidateScore,
    pub recommendations: Vec<Recommendation>,
}

impl ScoreReport {
    pub fn new(
        metadata: ReportMetadata,
        candidate_name: impl Into<String>,
        weights: ScoringWeights,
        score: CandidateScore,
    ) -> Self {
        let recommendations = recommendations(&score);
        Self {
            metadata,
            candidate_name: candidate_name.into(),
            weights,
            score,
            recommendations,
        }
    }
}

/// Ranked batch, optionally cut to the top K
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub metadata: ReportMetadata,
    pub total_ranked: usize,
    pub candidates: Vec<RankedCandidate>,
    pub unscored: Vec<UnscoredCandidate>,
    pub cancelled: Vec<String>,
}

impl RankingReport {
    pub fn new(metadata: ReportMetadata, outcome: BatchOutcome, top: Option<usize>) -> Self {
        let total_ranked = outcome.ranking.len();
        let candidates = match top {
            Some(k) => outcome.ranking.top(k).to_vec(),
            None => outcome.ranking.into_vec(),
        };

        Self {
            metadata,
            total_ranked,
            candidates,
            unscored: outcome.unscored,
            cancelled: outcome.cancelled,
        }
    }

    pub fn was_cancelled(&self) -> bool {
        !self.cancelled.is_empty()
    }
}
