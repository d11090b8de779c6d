//! ATS parseability checklist

use crate::config::FormatConfig;
use crate::processing::normalizer::TextNormalizer;
use crate::processing::records::ResumeRecord;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid email regex")
});

const EMAIL_WEIGHT: f64 = 20.0;
const EXPERIENCE_WEIGHT: f64 = 25.0;
const EDUCATION_WEIGHT: f64 = 15.0;
const SKILLS_WEIGHT: f64 = 15.0;
const LENGTH_WEIGHT: f64 = 15.0;
const ARTIFACT_WEIGHT: f64 = 10.0;

/// Suspicious lines needed before a layout counts as table-like
const SUSPICIOUS_LINE_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatCheck {
    pub name: String,
    pub passed: bool,
    pub weight: f64,
    pub earned: f64,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatResult {
    pub score: f64,
    pub word_count: usize,
    pub checks: Vec<FormatCheck>,
}

impl FormatResult {
    pub fn failed_checks(&self) -> impl Iterator<Item = &FormatCheck> {
        self.checks.iter().filter(|check| !check.passed)
    }
}

pub struct FormatChecker {
    min_words: usize,
    max_words: usize,
}

impl Default for FormatChecker {
    fn default() -> Self {
        Self::new(&FormatConfig::default())
    }
}

impl FormatChecker {
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            min_words: config.min_words,
            max_words: config.max_words,
        }
    }

    pub fn check(&self, record: &ResumeRecord) -> FormatResult {
        let word_count = TextNormalizer::word_count(&record.scoring_text());

        let email = record.contact().email.as_deref().map(str::trim).unwrap_or_default();
        let email_ok = EMAIL.is_match(email);

        let checks = vec![
            binary_check(
                "contact_email",
                email_ok,
                EMAIL_WEIGHT,
                if email_ok { "Parsable contact email" } else { "No parsable contact email" },
            ),
            binary_check(
                "experience_section",
                !record.experience().is_empty(),
                EXPERIENCE_WEIGHT,
                &format!("{} experience entries", record.experience().len()),
            ),
            binary_check(
                "education_section",
                !record.education().is_empty(),
                EDUCATION_WEIGHT,
                &format!("{} education entries", record.education().len()),
            ),
            binary_check(
                "skills_section",
                !record.skills().is_empty(),
                SKILLS_WEIGHT,
                &format!("{} skills listed", record.skills().len()),
            ),
            self.length_check(word_count),
            artifact_check(record.raw_text()),
        ];

        let total: f64 = checks.iter().map(|check| check.weight).sum();
        let earned: f64 = checks.iter().map(|check| check.earned).sum();
        let score = if total > 0.0 { earned / total * 100.0 } else { 0.0 };

        FormatResult {
            score,
            word_count,
            checks,
        }
    }

    /// Full credit inside the band; words/min below it, max/words above it
    fn length_check(&self, word_count: usize) -> FormatCheck {
        let words = word_count as f64;
        let (fraction, detail) = if word_count < self.min_words {
            (
                words / self.min_words as f64,
                format!("{} words, below the {} word minimum", word_count, self.min_words),
            )
        } else if word_count > self.max_words {
            (
                self.max_words as f64 / words,
                format!("{} words, above the {} word maximum", word_count, self.max_words),
            )
        } else {
            (1.0, format!("{} words", word_count))
        };

        FormatCheck {
            name: "length".to_string(),
            passed: fraction >= 1.0,
            weight: LENGTH_WEIGHT,
            earned: LENGTH_WEIGHT * fraction,
            detail,
        }
    }
}

fn binary_check(name: &str, passed: bool, weight: f64, detail: &str) -> FormatCheck {
    FormatCheck {
        name: name.to_string(),
        passed,
        weight,
        earned: if passed { weight } else { 0.0 },
        detail: detail.to_string(),
    }
}

fn artifact_check(raw_text: &str) -> FormatCheck {
    let encoding_artifacts = raw_text.contains('\u{FFFD}') || raw_text.contains("(cid:");
    let suspicious_lines = raw_text.lines().filter(|line| is_table_like(line)).count();

    let passed = !encoding_artifacts && suspicious_lines < SUSPICIOUS_LINE_LIMIT;
    let detail = if encoding_artifacts {
        "Text contains encoding artifacts from PDF extraction".to_string()
    } else if !passed {
        format!("{} lines look like tables or columns", suspicious_lines)
    } else {
        "No table or column artifacts".to_string()
    };

    binary_check("no_layout_artifacts", passed, ARTIFACT_WEIGHT, &detail)
}

fn is_table_like(line: &str) -> bool {
    line.matches('|').count() >= 2
        || line.matches('\t').count() >= 2
        || line.chars().any(|c| ('\u{2500}'..='\u{257F}').contains(&c))
}
