//! Overlap between a resume's skills and the skills a job requires

use crate::processing::taxonomy::{SkillCategory, SkillTaxonomy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatchResult {
    pub score: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    /// Resume skills the job did not ask for
    pub additional: Vec<String>,
    pub required_count: usize,
    pub missing_by_category: BTreeMap<String, Vec<String>>,
}

pub struct SkillMatcher {
    taxonomy: Arc<SkillTaxonomy>,
}

impl SkillMatcher {
    pub fn new(taxonomy: Arc<SkillTaxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Score = matched / max(1, required) × 100; no requirements scores 100
    pub fn match_skills<S: AsRef<str>>(
        &self,
        resume_skills: &[S],
        required: &BTreeSet<String>,
    ) -> SkillMatchResult {
        let present = self.canonical_set(resume_skills.iter().map(AsRef::as_ref));
        let required = self.canonical_set(required.iter().map(String::as_str));

        let matched: Vec<String> = required.intersection(&present).cloned().collect();
        let missing: Vec<String> = required.difference(&present).cloned().collect();
        let additional: Vec<String> = present.difference(&required).cloned().collect();

        let score = if required.is_empty() {
            100.0
        } else {
            matched.len() as f64 / required.len().max(1) as f64 * 100.0
        };

        let mut missing_by_category: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for skill in &missing {
            let category = self
                .taxonomy
                .categorize(skill)
                .map(|category: SkillCategory| category.to_string())
                .unwrap_or_else(|| "Other".to_string());
            missing_by_category.entry(category).or_default().push(skill.clone());
        }

        SkillMatchResult {
            score,
            matched,
            missing,
            additional,
            required_count: required.len(),
            missing_by_category,
        }
    }

    fn canonical_set<'a>(&self, skills: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
        skills
            .map(|skill| self.taxonomy.canonicalize(skill))
            .filter(|canonical| !canonical.is_empty())
            .collect()
    }
}
