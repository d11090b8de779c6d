//! Structured resume records produced by the parsing collaborator

use crate::error::{Result, ResumeRankerError};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

/// One position held by the candidate. An entry without an end date is ongoing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExperienceEntry")]
pub struct ExperienceEntry {
    title: String,
    company: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    description: String,
}

#[derive(Deserialize)]
struct RawExperienceEntry {
    title: String,
    #[serde(default)]
    company: String,
    start_date: NaiveDate,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    description: String,
}

impl TryFrom<RawExperienceEntry> for ExperienceEntry {
    type Error = ResumeRankerError;

    fn try_from(raw: RawExperienceEntry) -> Result<Self> {
        Self::new(raw.title, raw.company, raw.start_date, raw.end_date)
            .map(|entry| entry.with_description(raw.description))
    }
}

impl ExperienceEntry {
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Self> {
        let title = title.into();
        if let Some(end) = end_date {
            if end < start_date {
                return Err(ResumeRankerError::Validation(format!(
                    "experience '{}' ends ({}) before it starts ({})",
                    title, end, start_date
                )));
            }
        }

        Ok(Self {
            title,
            company: company.into(),
            start_date,
            end_date,
            description: String::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_ongoing(&self) -> bool {
        self.end_date.is_none()
    }
}

/// Highest academic level a degree string denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeTier {
    Unspecified,
    Diploma,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

static DEGREE_PATTERNS: LazyLock<Vec<(DegreeTier, Regex)>> = LazyLock::new(|| {
    [
        (DegreeTier::Doctorate, r"\b(ph\.?\s?d|doctorate|doctoral|doctor of)\b"),
        (
            DegreeTier::Master,
            r"\b(masters?|m\.?sc?|m\.?tech|m\.?eng|m\.?b\.?a|mba|m\.a)\b",
        ),
        (
            DegreeTier::Bachelor,
            r"\b(bachelors?|b\.?sc?|b\.?tech|b\.?eng|b\.e|b\.a|undergraduate)\b",
        ),
        (DegreeTier::Associate, r"\b(associates?|a\.a\.s?|a\.s)\b"),
        (DegreeTier::Diploma, r"\b(diploma|high school|ged)\b"),
    ]
    .into_iter()
    .map(|(tier, pattern)| (tier, Regex::new(pattern).expect("Invalid degree regex")))
    .collect()
});

impl DegreeTier {
    pub fn from_degree_text(text: &str) -> Self {
        let lowered = text.to_lowercase();
        DEGREE_PATTERNS
            .iter()
            .find(|(_, pattern)| pattern.is_match(&lowered))
            .map(|(tier, _)| *tier)
            .unwrap_or(DegreeTier::Unspecified)
    }
}

impl fmt::Display for DegreeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DegreeTier::Unspecified => "Not specified",
            DegreeTier::Diploma => "Diploma",
            DegreeTier::Associate => "Associate",
            DegreeTier::Bachelor => "Bachelor",
            DegreeTier::Master => "Master",
            DegreeTier::Doctorate => "Doctorate",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl EducationEntry {
    pub fn new(degree: impl Into<String>) -> Self {
        Self {
            degree: degree.into(),
            field: None,
            institution: None,
            year: None,
        }
    }

    pub fn tier(&self) -> DegreeTier {
        DegreeTier::from_degree_text(&self.degree)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ProjectEntry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Parsed resume. Skills are lowercased and deduplicated on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawResumeRecord")]
pub struct ResumeRecord {
    id: String,
    contact: ContactInfo,
    skills: Vec<String>,
    experience: Vec<ExperienceEntry>,
    education: Vec<EducationEntry>,
    projects: Vec<ProjectEntry>,
    certifications: Vec<String>,
    raw_text: String,
}

#[derive(Deserialize)]
struct RawResumeRecord {
    id: String,
    #[serde(default)]
    contact: ContactInfo,
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    experience: Vec<ExperienceEntry>,
    #[serde(default)]
    education: Vec<EducationEntry>,
    #[serde(default)]
    projects: Vec<ProjectEntry>,
    #[serde(default)]
    certifications: Vec<String>,
    #[serde(default)]
    raw_text: String,
}

impl From<RawResumeRecord> for ResumeRecord {
    fn from(raw: RawResumeRecord) -> Self {
        Self {
            id: raw.id,
            contact: raw.contact,
            skills: normalize_skill_list(raw.skills),
            experience: raw.experience,
            education: raw.education,
            projects: raw.projects,
            certifications: raw.certifications,
            raw_text: raw.raw_text,
        }
    }
}

impl ResumeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contact: ContactInfo::default(),
            skills: Vec::new(),
            experience: Vec::new(),
            education: Vec::new(),
            projects: Vec::new(),
            certifications: Vec::new(),
            raw_text: String::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = normalize_skill_list(skills.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_experience(mut self, experience: Vec<ExperienceEntry>) -> Self {
        self.experience = experience;
        self
    }

    pub fn with_education(mut self, education: Vec<EducationEntry>) -> Self {
        self.education = education;
        self
    }

    pub fn with_projects(mut self, projects: Vec<ProjectEntry>) -> Self {
        self.projects = projects;
        self
    }

    pub fn with_certifications(mut self, certifications: Vec<String>) -> Self {
        self.certifications = certifications;
        self
    }

    pub fn with_raw_text(mut self, raw_text: impl Into<String>) -> Self {
        self.raw_text = raw_text.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn experience(&self) -> &[ExperienceEntry] {
        &self.experience
    }

    pub fn education(&self) -> &[EducationEntry] {
        &self.education
    }

    pub fn projects(&self) -> &[ProjectEntry] {
        &self.projects
    }

    pub fn certifications(&self) -> &[String] {
        &self.certifications
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn display_name(&self) -> &str {
        self.contact
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.id)
    }

    pub fn highest_degree(&self) -> DegreeTier {
        self.education
            .iter()
            .map(EducationEntry::tier)
            .max()
            .unwrap_or(DegreeTier::Unspecified)
    }

    /// Checks that must pass before a record is scored
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ResumeRankerError::Validation(
                "candidate id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Text used for keyword and semantic comparison.
    ///
    /// Falls back to a composition of the structured fields when the parser
    /// supplied no raw text.
    pub fn scoring_text(&self) -> String {
        if !self.raw_text.trim().is_empty() {
            return self.raw_text.clone();
        }

        let mut parts: Vec<String> = Vec::new();
        if !self.skills.is_empty() {
            parts.push(self.skills.join(", "));
        }
        for entry in &self.experience {
            parts.push(format!("{} {} {}", entry.title, entry.company, entry.description));
        }
        for entry in &self.education {
            let field = entry.field.as_deref().unwrap_or_default();
            parts.push(format!("{} {}", entry.degree, field));
        }
        for project in &self.projects {
            parts.push(format!("{} {}", project.name, project.description));
        }
        parts.extend(self.certifications.iter().cloned());

        parts
            .into_iter()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn normalize_skill_list(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .into_iter()
        .map(|skill| skill.trim().to_lowercase())
        .filter(|skill| !skill.is_empty())
        .filter(|skill| seen.insert(skill.clone()))
        .collect()
}
