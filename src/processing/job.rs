//! Job description records and the cues extracted from their text

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

static RANGE_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*(?:-|–|to)\s*\d{1,2}\s*\+?\s*(?:years?|yrs?)\b")
        .expect("Invalid range years regex")
});

static PLUS_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\+?\s*(?:years?|yrs?)\s+(?:of\s+)?(?:\w+\s+){0,3}?experience")
        .expect("Invalid years of experience regex")
});

static MINIMUM_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:minimum(?:\s+of)?|at\s+least)\s+(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b")
        .expect("Invalid minimum years regex")
});

static SENIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(internship|intern|junior|jr|entry[\s-]level|mid[\s-]level|mid|senior|sr|lead|staff|principal)\b")
        .expect("Invalid seniority regex")
});

// Outside a title, ambiguous words ("mid", "lead", "staff") only count next to a role noun
static BODY_SENIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(internship|intern|junior|entry[\s-]level|mid[\s-]level|senior)\b|(jr|sr|mid|lead|staff|principal)\.?[\s-]+(?:level|role|position|engineer|developer|programmer|analyst|scientist|architect|consultant|designer|administrator)s?\b)",
    )
    .expect("Invalid body seniority regex")
});

static TITLE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(engineer|developer|programmer|analyst|manager|scientist|architect|consultant|specialist|lead|director|designer|administrator|intern|officer|technician)s?\b")
        .expect("Invalid title keyword regex")
});

static TITLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:job\s+title|position|role|title)\s*:\s*").expect("Invalid title prefix regex")
});

const MAX_TITLE_WORDS: usize = 10;

/// Career level named in a title or job description
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Intern,
    Junior,
    Mid,
    Senior,
    Lead,
    Principal,
}

impl Seniority {
    pub const MAX_LEVEL: u8 = 5;

    pub fn level(&self) -> u8 {
        match self {
            Seniority::Intern => 0,
            Seniority::Junior => 1,
            Seniority::Mid => 2,
            Seniority::Senior => 3,
            Seniority::Lead => 4,
            Seniority::Principal => 5,
        }
    }

    /// First seniority word in a job title
    pub fn detect(text: &str) -> Option<Self> {
        let found = SENIORITY.find(text)?;
        Some(Self::from_word(found.as_str()))
    }

    /// Seniority stated in the body of a job description
    pub fn detect_in_description(text: &str) -> Option<Self> {
        let caps = BODY_SENIORITY.captures(text)?;
        let word = caps.get(1).or_else(|| caps.get(2))?;
        Some(Self::from_word(word.as_str()))
    }

    fn from_word(word: &str) -> Self {
        let word = word.to_lowercase();
        match word.as_str() {
            "intern" | "internship" => Seniority::Intern,
            "junior" | "jr" => Seniority::Junior,
            "senior" | "sr" => Seniority::Senior,
            "lead" => Seniority::Lead,
            "staff" | "principal" => Seniority::Principal,
            w if w.starts_with("entry") => Seniority::Junior,
            _ => Seniority::Mid,
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Seniority::Intern => "Intern",
            Seniority::Junior => "Junior",
            Seniority::Mid => "Mid-level",
            Seniority::Senior => "Senior",
            Seniority::Lead => "Lead",
            Seniority::Principal => "Principal",
        };
        write!(f, "{}", label)
    }
}

/// Minimum years of experience stated in a job description.
///
/// Ranges ("3-5 years") yield their lower bound.
pub fn extract_min_years(text: &str) -> Option<f64> {
    [&*RANGE_YEARS, &*PLUS_YEARS, &*MINIMUM_YEARS]
        .iter()
        .find_map(|pattern| {
            pattern
                .captures(text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
        })
        .filter(|years| *years > 0)
        .map(f64::from)
}

/// First short line that reads like a job title
pub fn extract_title(text: &str) -> Option<String> {
    text.lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .map(|line| TITLE_PREFIX.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .filter(|line| line.split_whitespace().count() <= MAX_TITLE_WORDS)
        .find(|line| TITLE_KEYWORD.is_match(line))
}

/// A job description prepared for scoring.
///
/// Built by the scorer so skills and keywords are canonicalized exactly like
/// resume content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionRecord {
    pub raw_text: String,
    pub required_skills: BTreeSet<String>,
    pub keyword_weights: BTreeMap<String, f64>,
    pub min_years: Option<f64>,
    pub seniority: Option<Seniority>,
    pub title: Option<String>,
}

impl JobDescriptionRecord {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Job description")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_years_patterns() {
        assert_eq!(extract_min_years("5+ years of experience with Rust"), Some(5.0));
        assert_eq!(extract_min_years("3 years experience required"), Some(3.0));
        assert_eq!(extract_min_years("Minimum 4 years in backend roles"), Some(4.0));
        assert_eq!(extract_min_years("at least 2 yrs"), Some(2.0));
        assert_eq!(extract_min_years("3-5 years of experience"), Some(3.0));
        assert_eq!(extract_min_years("7 years of professional experience"), Some(7.0));
        assert_eq!(extract_min_years("Great culture, no requirements"), None);
        assert_eq!(extract_min_years("0 years experience"), None);
    }

    #[test]
    fn test_seniority_detection() {
        assert_eq!(Seniority::detect("Senior Backend Engineer"), Some(Seniority::Senior));
        assert_eq!(Seniority::detect("Sr. Data Analyst"), Some(Seniority::Senior));
        assert_eq!(Seniority::detect("Entry-level support role"), Some(Seniority::Junior));
        assert_eq!(Seniority::detect("Staff Engineer"), Some(Seniority::Principal));
        assert_eq!(Seniority::detect("Software Engineer"), None);
        assert!(Seniority::Principal.level() > Seniority::Intern.level());
    }

    #[test]
    fn test_description_seniority_needs_role_context() {
        let text = "A mid-sized company where you lead a workstream alongside our support staff.";
        assert_eq!(Seniority::detect_in_description(text), None);

        assert_eq!(
            Seniority::detect_in_description("Looking for a staff engineer to own our platform"),
            Some(Seniority::Principal)
        );
        assert_eq!(
            Seniority::detect_in_description("This is a mid-level position in a mid-sized team"),
            Some(Seniority::Mid)
        );
        assert_eq!(
            Seniority::detect_in_description("You will lead developers and mentor junior colleagues"),
            Some(Seniority::Lead)
        );
    }

    #[test]
    fn test_title_extraction() {
        let text = "Acme Corp is hiring!\n\n# Senior Rust Engineer\n\nWe build fast systems.";
        assert_eq!(extract_title(text), Some("Senior Rust Engineer".to_string()));

        let text = "Job Title: Data Scientist\nLocation: Remote";
        assert_eq!(extract_title(text), Some("Data Scientist".to_string()));

        let text = "We need someone to work with our engineers on a very long list of different tasks every day";
        assert_eq!(extract_title(text), None);
    }
}
