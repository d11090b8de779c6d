//! ATS scoring engine combining keyword, skill, experience, semantic and
//! format components into one explainable score

use crate::config::{Config, ScoringWeights};
use crate::error::Result;
use crate::processing::embeddings::Embedder;
use crate::processing::experience::{ExperienceEvaluator, ExperienceRequirement, ExperienceResult};
use crate::processing::format_checker::{FormatChecker, FormatResult};
use crate::processing::grade::{Grade, GradeTable, MatchStatus};
use crate::processing::job::{extract_min_years, extract_title, JobDescriptionRecord, Seniority};
use crate::processing::keyword_matcher::{BackgroundCorpus, KeywordMatchResult, KeywordMatcher};
use crate::processing::normalizer::TextNormalizer;
use crate::processing::records::ResumeRecord;
use crate::processing::semantic::{SemanticMethod, SemanticResult, SemanticScorer};
use crate::processing::skill_matcher::{SkillMatchResult, SkillMatcher};
use crate::processing::taxonomy::SkillTaxonomy;
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Score a component receives when its scorer fails
pub const NEUTRAL_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    Keyword,
    Skills,
    Experience,
    Semantic,
    Format,
}

impl ScoreComponent {
    pub const ALL: [ScoreComponent; 5] = [
        ScoreComponent::Keyword,
        ScoreComponent::Skills,
        ScoreComponent::Experience,
        ScoreComponent::Semantic,
        ScoreComponent::Format,
    ];

    pub fn weight(&self, weights: &ScoringWeights) -> f64 {
        match self {
            ScoreComponent::Keyword => weights.keyword,
            ScoreComponent::Skills => weights.skills,
            ScoreComponent::Experience => weights.experience,
            ScoreComponent::Semantic => weights.semantic,
            ScoreComponent::Format => weights.format,
        }
    }
}

impl fmt::Display for ScoreComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScoreComponent::Keyword => "keyword",
            ScoreComponent::Skills => "skills",
            ScoreComponent::Experience => "experience",
            ScoreComponent::Semantic => "semantic",
            ScoreComponent::Format => "format",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedComponent {
    pub component: ScoreComponent,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub components: BTreeMap<ScoreComponent, f64>,
    pub total: f64,
    pub grade: Grade,
    pub status: MatchStatus,
    pub degraded: Vec<DegradedComponent>,
    pub semantic_method: SemanticMethod,
}

impl ScoreBreakdown {
    pub fn component(&self, component: ScoreComponent) -> f64 {
        self.components.get(&component).copied().unwrap_or(0.0)
    }

    pub fn is_degraded(&self, component: ScoreComponent) -> bool {
        self.degraded.iter().any(|d| d.component == component)
    }
}

/// Breakdown plus the detail each sub-scorer produced.
///
/// A detail is `None` when that component fell back to the neutral score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub candidate_id: String,
    pub breakdown: ScoreBreakdown,
    pub skill_match: SkillMatchResult,
    pub keyword_match: Option<KeywordMatchResult>,
    pub experience: Option<ExperienceResult>,
    pub semantic: SemanticResult,
    pub format: FormatResult,
}

pub struct AtsScorerBuilder {
    config: Config,
    taxonomy: Option<Arc<SkillTaxonomy>>,
    embedder: Option<Arc<dyn Embedder>>,
    corpus: Option<Arc<BackgroundCorpus>>,
    normalizer: Option<TextNormalizer>,
    reference_date: Option<NaiveDate>,
}

impl AtsScorerBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            taxonomy: None,
            embedder: None,
            corpus: None,
            normalizer: None,
            reference_date: None,
        }
    }

    pub fn taxonomy(mut self, taxonomy: Arc<SkillTaxonomy>) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn background_corpus(mut self, corpus: Arc<BackgroundCorpus>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Date ongoing roles run until; defaults to today
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn build(self) -> Result<AtsScorer> {
        self.config.validate()?;
        let grades = self.config.grade_table()?;

        let taxonomy = match self.taxonomy {
            Some(taxonomy) => taxonomy,
            None => match &self.config.taxonomy.path {
                Some(path) => Arc::new(SkillTaxonomy::from_file(path)?),
                None => Arc::new(SkillTaxonomy::builtin()?),
            },
        };

        let normalizer = Arc::new(self.normalizer.unwrap_or_default());
        let corpus = self
            .corpus
            .unwrap_or_else(|| Arc::new(BackgroundCorpus::builtin(&normalizer)));

        info!(
            "ATS scorer ready: {} skills in taxonomy, embedder: {}",
            taxonomy.len(),
            self.embedder
                .as_ref()
                .map(|e| e.name().to_string())
                .unwrap_or_else(|| "none (lexical fallback)".to_string())
        );

        Ok(AtsScorer {
            weights: self.config.scoring,
            grades,
            skill_matcher: SkillMatcher::new(Arc::clone(&taxonomy)),
            keyword_matcher: KeywordMatcher::new(Arc::clone(&normalizer), corpus),
            experience: ExperienceEvaluator::new(&self.config.experience),
            semantic: SemanticScorer::new(
                self.embedder,
                Arc::clone(&normalizer),
                self.config.semantic.timeout(),
            ),
            format: FormatChecker::new(&self.config.format),
            taxonomy,
            reference_date: self
                .reference_date
                .unwrap_or_else(|| Local::now().date_naive()),
        })
    }
}

/// Scores one resume against one prepared job description
pub struct AtsScorer {
    weights: ScoringWeights,
    grades: GradeTable,
    taxonomy: Arc<SkillTaxonomy>,
    skill_matcher: SkillMatcher,
    keyword_matcher: KeywordMatcher,
    experience: ExperienceEvaluator,
    semantic: SemanticScorer,
    format: FormatChecker,
    reference_date: NaiveDate,
}

impl AtsScorer {
    pub fn builder(config: Config) -> AtsScorerBuilder {
        AtsScorerBuilder::new(config)
    }

    pub fn taxonomy(&self) -> &Arc<SkillTaxonomy> {
        &self.taxonomy
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn embedder_name(&self) -> Option<&str> {
        self.semantic.embedder_name()
    }

    /// Derive required skills, keyword weights and experience cues from JD text
    pub fn prepare_job(&self, text: &str) -> JobDescriptionRecord {
        let title = extract_title(text);
        let seniority = title
            .as_deref()
            .and_then(Seniority::detect)
            .or_else(|| Seniority::detect_in_description(text));

        let job = JobDescriptionRecord {
            raw_text: text.to_string(),
            required_skills: self.taxonomy.extract_skills(text),
            keyword_weights: self.keyword_matcher.job_weights(text),
            min_years: extract_min_years(text),
            seniority,
            title,
        };

        debug!(
            "Prepared job '{}': {} required skills, {} weighted terms, min years {:?}, seniority {:?}",
            job.display_title(),
            job.required_skills.len(),
            job.keyword_weights.len(),
            job.min_years,
            job.seniority
        );

        job
    }

    /// Score a resume. Only record validation failures are returned as errors;
    /// sub-scorer failures degrade the affected component instead.
    pub async fn score(&self, resume: &ResumeRecord, job: &JobDescriptionRecord) -> Result<CandidateScore> {
        resume.validate()?;

        let resume_text = resume.scoring_text();
        let mut degraded = Vec::new();

        let skill_match = self
            .skill_matcher
            .match_skills(resume.skills(), &job.required_skills);

        let keyword_match = self
            .keyword_matcher
            .score_with_weights(&resume_text, &job.keyword_weights);
        let keyword_match = Self::settle(ScoreComponent::Keyword, keyword_match, &mut degraded);

        let requirement = ExperienceRequirement {
            min_years: job.min_years,
            seniority: job.seniority,
            title: job.title.as_deref(),
        };
        let experience = self
            .experience
            .evaluate(resume.experience(), &requirement, self.reference_date);
        let experience = Self::settle(ScoreComponent::Experience, experience, &mut degraded);

        let semantic = self.semantic.score(&resume_text, &job.raw_text).await;
        if let Some(reason) = &semantic.fallback_reason {
            degraded.push(DegradedComponent {
                component: ScoreComponent::Semantic,
                reason: format!("lexical fallback: {}", reason),
            });
        }

        let format = self.format.check(resume);

        let mut components = BTreeMap::new();
        components.insert(ScoreComponent::Keyword, keyword_match.as_ref().map_or(NEUTRAL_SCORE, |k| k.score));
        components.insert(ScoreComponent::Skills, skill_match.score);
        components.insert(ScoreComponent::Experience, experience.as_ref().map_or(NEUTRAL_SCORE, |e| e.score));
        components.insert(ScoreComponent::Semantic, semantic.score);
        components.insert(ScoreComponent::Format, format.score);
        for score in components.values_mut() {
            *score = score.clamp(0.0, 100.0);
        }

        let total = self.combine(&components);
        let breakdown = ScoreBreakdown {
            total,
            grade: self.grades.grade(total),
            status: MatchStatus::from_total(total),
            degraded,
            semantic_method: semantic.method,
            components,
        };

        debug!("Component scores for {}: {:?}", resume.id(), breakdown.components);
        info!(
            "Scored candidate {}: {:.2} ({}, {})",
            resume.id(),
            breakdown.total,
            breakdown.grade,
            breakdown.status
        );

        Ok(CandidateScore {
            candidate_id: resume.id().to_string(),
            breakdown,
            skill_match,
            keyword_match,
            experience,
            semantic,
            format,
        })
    }

    /// Convenience wrapper that prepares the job text first
    pub async fn score_text(&self, resume: &ResumeRecord, job_text: &str) -> Result<CandidateScore> {
        let job = self.prepare_job(job_text);
        self.score(resume, &job).await
    }

    fn combine(&self, components: &BTreeMap<ScoreComponent, f64>) -> f64 {
        ScoreComponent::ALL
            .iter()
            .map(|component| {
                component.weight(&self.weights) * components.get(component).copied().unwrap_or(0.0)
            })
            .sum::<f64>()
            .clamp(0.0, 100.0)
    }

    fn settle<T>(
        component: ScoreComponent,
        result: Result<T>,
        degraded: &mut Vec<DegradedComponent>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{} scoring failed, using neutral {}: {}", component, NEUTRAL_SCORE, e);
                degraded.push(DegradedComponent {
                    component,
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

impl fmt::Debug for AtsScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtsScorer")
            .field("weights", &self.weights)
            .field("taxonomy", &self.taxonomy)
            .field("reference_date", &self.reference_date)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResumeRankerError;
    use crate::processing::records::{ContactInfo, EducationEntry, ExperienceEntry};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scorer() -> AtsScorer {
        AtsScorer::builder(Config::default())
            .reference_date(date(2024, 6, 30))
            .build()
            .unwrap()
    }

    fn resume() -> ResumeRecord {
        ResumeRecord::new("cand-1")
            .with_contact(ContactInfo {
                email: Some("dev@example.com".to_string()),
                ..Default::default()
            })
            .with_skills(["Rust", "Python", "Docker"])
            .with_experience(vec![ExperienceEntry::new(
                "Senior Backend Engineer",
                "Acme",
                date(2019, 1, 1),
                None,
            )
            .unwrap()
            .with_description("Built Rust services on Kubernetes")])
            .with_education(vec![EducationEntry::new("BSc Computer Science")])
    }

    const JOB: &str = "Senior Backend Engineer\n\nWe need 5+ years of experience with Rust, Python and AWS. Docker and Kubernetes a plus.";

    #[test]
    fn test_prepare_job_extracts_cues() {
        let job = scorer().prepare_job(JOB);

        assert_eq!(job.title.as_deref(), Some("Senior Backend Engineer"));
        assert_eq!(job.seniority, Some(Seniority::Senior));
        assert_eq!(job.min_years, Some(5.0));
        assert!(job.required_skills.contains("rust"));
        assert!(job.required_skills.contains("aws"));
        let weight_sum: f64 = job.keyword_weights.values().sum();
        assert!((weight_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_prepare_job_keeps_skill_behind_rejected_alias() {
        let job = scorer().prepare_job("Backend Engineer\nStrong Rust language skills and PostgreSQL");
        assert!(job.required_skills.contains("rust"));
        assert!(job.required_skills.contains("postgresql"));
    }

    #[test]
    fn test_prepare_job_without_title_ignores_incidental_levels() {
        let job = scorer().prepare_job(
            "We are a mid-sized company. You will lead a workstream with our support staff using Rust and Python every day.",
        );
        assert_eq!(job.title, None);
        assert_eq!(job.seniority, None);

        let job = scorer().prepare_job(
            "Join us as a staff engineer at a mid-sized company building Rust tooling for teams across the world.",
        );
        assert_eq!(job.title, None);
        assert_eq!(job.seniority, Some(Seniority::Principal));
    }

    #[tokio::test]
    async fn test_total_is_weighted_sum() {
        let scorer = scorer();
        let score = scorer.score_text(&resume(), JOB).await.unwrap();
        let breakdown = &score.breakdown;

        let expected: f64 = ScoreComponent::ALL
            .iter()
            .map(|c| c.weight(scorer.weights()) * breakdown.component(*c))
            .sum();
        assert!((breakdown.total - expected).abs() < 1e-9);
        assert_eq!(breakdown.components.len(), 5);
        assert_eq!(breakdown.semantic_method, SemanticMethod::LexicalFallback);
        assert!(breakdown.is_degraded(ScoreComponent::Semantic));
        assert!(score.skill_match.missing.contains(&"aws".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_record_rejected() {
        let result = scorer().score_text(&ResumeRecord::new(""), JOB).await;
        assert!(matches!(result, Err(ResumeRankerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_failed_experience_uses_neutral_score() {
        let future_role = ExperienceEntry::new("Engineer", "Acme", date(2030, 1, 1), None).unwrap();
        let record = resume().with_experience(vec![future_role]);

        let score = scorer().score_text(&record, JOB).await.unwrap();
        assert_eq!(score.breakdown.component(ScoreComponent::Experience), NEUTRAL_SCORE);
        assert!(score.breakdown.is_degraded(ScoreComponent::Experience));
        assert!(score.experience.is_none());
    }

    #[tokio::test]
    async fn test_bad_keyword_weights_use_neutral_score() {
        let scorer = scorer();
        let mut job = scorer.prepare_job(JOB);
        job.keyword_weights.insert("rust".to_string(), f64::INFINITY);

        let score = scorer.score(&resume(), &job).await.unwrap();
        assert_eq!(score.breakdown.component(ScoreComponent::Keyword), NEUTRAL_SCORE);
        assert!(score.breakdown.is_degraded(ScoreComponent::Keyword));
    }

    #[test]
    fn test_invalid_weights_fail_construction() {
        let mut config = Config::default();
        config.scoring.format = 0.2;
        assert!(AtsScorer::builder(config).build().is_err());
    }

    #[tokio::test]
    async fn test_empty_job_is_not_an_error() {
        let score = scorer().score_text(&resume(), "").await.unwrap();
        assert_eq!(score.breakdown.component(ScoreComponent::Skills), 100.0);
        assert_eq!(score.breakdown.component(ScoreComponent::Keyword), 0.0);
    }
}
