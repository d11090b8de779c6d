//! Letter grades and match status labels derived from a total score

use crate::error::{Result, ResumeRankerError};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    const ALL: [Grade; 6] = [Grade::APlus, Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{}", label)
    }
}

/// Lower bound (inclusive) of a grade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub grade: Grade,
    pub min: f64,
}

impl GradeBand {
    pub fn new(grade: Grade, min: f64) -> Self {
        Self { grade, min }
    }
}

/// Validated, non-overlapping grade thresholds covering [0, 100]
#[derive(Debug, Clone, PartialEq)]
pub struct GradeTable {
    bands: Vec<GradeBand>,
}

impl GradeTable {
    /// Bands must list every grade once, best first, with strictly
    /// decreasing minimums ending at 0.
    pub fn new(bands: Vec<GradeBand>) -> Result<Self> {
        let order: Vec<Grade> = bands.iter().map(|band| band.grade).collect();
        if order != Grade::ALL {
            return Err(ResumeRankerError::Configuration(format!(
                "grades must list A+, A, B, C, D, F in order, got {:?}",
                order.iter().map(ToString::to_string).collect::<Vec<_>>()
            )));
        }

        for band in &bands {
            if !band.min.is_finite() || !(0.0..=100.0).contains(&band.min) {
                return Err(ResumeRankerError::Configuration(format!(
                    "grade {} minimum must be within [0, 100], got {}",
                    band.grade, band.min
                )));
            }
        }

        for pair in bands.windows(2) {
            if pair[1].min >= pair[0].min {
                return Err(ResumeRankerError::Configuration(format!(
                    "grade {} minimum ({}) must be below grade {} minimum ({})",
                    pair[1].grade, pair[1].min, pair[0].grade, pair[0].min
                )));
            }
        }

        if bands.last().map(|band| band.min) != Some(0.0) {
            return Err(ResumeRankerError::Configuration(
                "grade F must start at 0 so every score has a grade".to_string(),
            ));
        }

        Ok(Self { bands })
    }

    pub fn grade(&self, total: f64) -> Grade {
        self.bands
            .iter()
            .find(|band| total >= band.min)
            .map(|band| band.grade)
            .unwrap_or(Grade::F)
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }
}

impl Default for GradeTable {
    fn default() -> Self {
        Self {
            bands: crate::config::GradeBands::default().0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Strong,
    Good,
    Moderate,
    Weak,
}

impl MatchStatus {
    pub fn from_total(total: f64) -> Self {
        if total >= 85.0 {
            MatchStatus::Strong
        } else if total >= 70.0 {
            MatchStatus::Good
        } else if total >= 55.0 {
            MatchStatus::Moderate
        } else {
            MatchStatus::Weak
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            MatchStatus::Strong => "Highly Recommended",
            MatchStatus::Good => "Recommended",
            MatchStatus::Moderate => "Consider",
            MatchStatus::Weak => "Not Recommended",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchStatus::Strong => "Strong Match",
            MatchStatus::Good => "Good Match",
            MatchStatus::Moderate => "Moderate Match",
            MatchStatus::Weak => "Weak Match",
        };
        write!(f, "{}", label)
    }
}
