//! Configuration management for the resume ranker

use crate::error::{Result, ResumeRankerError};
use crate::processing::grade::{Grade, GradeBand, GradeTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tolerance used when checking that a weight set sums to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub scoring: ScoringWeights,
    pub ranking: RankingConfig,
    pub semantic: SemanticConfig,
    pub experience: ExperienceConfig,
    pub format: FormatConfig,
    pub batch: BatchConfig,
    pub taxonomy: TaxonomyConfig,
    pub grades: GradeBands,
}

/// Weights of the five ATS components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub keyword: f64,
    pub skills: f64,
    pub experience: f64,
    pub semantic: f64,
    pub format: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub weights: RankingWeights,
    pub points_per_skill: f64,
    pub points_per_year: f64,
    pub points_per_project: f64,
}

/// Weights of the four ranking sub-terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub projects: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    pub embedding_timeout_ms: u64,
    pub model_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    pub default_min_years: f64,
    pub max_title_adjustment: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub min_words: usize,
    pub max_words: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BatchConfig {
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TaxonomyConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeBands(pub Vec<GradeBand>);

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            keyword: 0.30,
            skills: 0.25,
            experience: 0.20,
            semantic: 0.15,
            format: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<()> {
        validate_weight_set(
            "scoring",
            &[
                ("keyword", self.keyword),
                ("skills", self.skills),
                ("experience", self.experience),
                ("semantic", self.semantic),
                ("format", self.format),
            ],
        )
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: RankingWeights::default(),
            points_per_skill: 5.0,
            points_per_year: 20.0,
            points_per_project: 25.0,
        }
    }
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            skills: 0.40,
            experience: 0.30,
            education: 0.20,
            projects: 0.10,
        }
    }
}

impl RankingWeights {
    pub fn validate(&self) -> Result<()> {
        validate_weight_set(
            "ranking",
            &[
                ("skills", self.skills),
                ("experience", self.experience),
                ("education", self.education),
                ("projects", self.projects),
            ],
        )
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        for (name, value) in [
            ("points_per_skill", self.points_per_skill),
            ("points_per_year", self.points_per_year),
            ("points_per_project", self.points_per_project),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ResumeRankerError::Configuration(format!(
                    "ranking.{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            embedding_timeout_ms: 2000,
            model_path: None,
        }
    }
}

impl SemanticConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.embedding_timeout_ms)
    }
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            default_min_years: 1.0,
            max_title_adjustment: 15.0,
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            min_words: 150,
            max_words: 1500,
        }
    }
}

impl Default for GradeBands {
    fn default() -> Self {
        Self(vec![
            GradeBand::new(Grade::APlus, 90.0),
            GradeBand::new(Grade::A, 80.0),
            GradeBand::new(Grade::B, 70.0),
            GradeBand::new(Grade::C, 60.0),
            GradeBand::new(Grade::D, 50.0),
            GradeBand::new(Grade::F, 0.0),
        ])
    }
}

impl Config {
    /// Load from the default location, writing defaults on first use
    pub fn load() -> Result<Self> {
        Self::load_or_init(&Self::config_path())
    }

    /// Load `path`, creating it with defaults if it does not exist yet
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Load and validate a configuration file that must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResumeRankerError::Configuration(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ResumeRankerError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-ranker")
            .join("config.toml")
    }

    /// Fail fast on anything that would make scores meaningless
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.ranking.validate()?;
        self.grade_table()?;

        if self.semantic.embedding_timeout_ms == 0 {
            return Err(ResumeRankerError::Configuration(
                "semantic.embedding_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if !self.experience.default_min_years.is_finite() || self.experience.default_min_years <= 0.0 {
            return Err(ResumeRankerError::Configuration(format!(
                "experience.default_min_years must be positive, got {}",
                self.experience.default_min_years
            )));
        }
        if !(0.0..=50.0).contains(&self.experience.max_title_adjustment) {
            return Err(ResumeRankerError::Configuration(format!(
                "experience.max_title_adjustment must be within [0, 50], got {}",
                self.experience.max_title_adjustment
            )));
        }
        if self.format.min_words == 0 || self.format.min_words >= self.format.max_words {
            return Err(ResumeRankerError::Configuration(format!(
                "format word band is invalid: min_words={} max_words={}",
                self.format.min_words, self.format.max_words
            )));
        }
        if self.batch.max_concurrency == Some(0) {
            return Err(ResumeRankerError::Configuration(
                "batch.max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn grade_table(&self) -> Result<GradeTable> {
        GradeTable::new(self.grades.0.clone())
    }

    /// Worker count for batch scoring
    pub fn max_concurrency(&self) -> usize {
        self.batch.max_concurrency.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

fn validate_weight_set(section: &str, weights: &[(&str, f64)]) -> Result<()> {
    for (name, weight) in weights {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(ResumeRankerError::Configuration(format!(
                "{}.{} must be a non-negative number, got {}",
                section, name, weight
            )));
        }
    }

    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ResumeRankerError::Configuration(format!(
            "{} weights must sum to 1.0, got {:.6}",
            section, sum
        )));
    }
    Ok(())
}
