//! TF-IDF weighted keyword overlap between a resume and a job description

use crate::error::{Result, ResumeRankerError};
use crate::processing::normalizer::TextNormalizer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Generic job-posting language. Terms common here carry little signal.
const BACKGROUND_DOCUMENTS: &[&str] = &[
    "We are looking for a motivated team member to join our growing company.",
    "Responsibilities include working closely with the team to deliver results.",
    "The ideal candidate has strong experience and excellent communication skills.",
    "Requirements: bachelor's degree or equivalent experience in a related field.",
    "We offer competitive salary, benefits, paid time off and a flexible work environment.",
    "You will collaborate with cross-functional teams and stakeholders across the business.",
    "Preferred qualifications include prior experience in a fast-paced environment.",
    "Join a dynamic team where you can grow your career and make an impact.",
    "The role requires the ability to work independently and manage multiple priorities.",
    "Candidates should demonstrate attention to detail and strong problem solving ability.",
    "We are an equal opportunity employer and value diversity at our company.",
    "This is a full-time position based in our office with hybrid or remote options.",
    "Key responsibilities: support the team, participate in meetings, and report progress.",
    "Applicants must be able to work in a professional environment and meet deadlines.",
    "Experience with modern tools and a willingness to learn new technologies is a plus.",
    "Please submit your resume and cover letter to apply for this job opening.",
    "Our mission is to build great products for customers around the world.",
    "Strong written and verbal skills, and the ability to work with a team.",
    "Minimum years of relevant work experience required for this position.",
    "Duties and responsibilities may change based on the needs of the business.",
];

/// Document frequencies over a corpus of unrelated job postings
#[derive(Debug, Clone)]
pub struct BackgroundCorpus {
    documents: usize,
    document_frequency: HashMap<String, usize>,
}

impl BackgroundCorpus {
    pub fn from_documents<S: AsRef<str>>(documents: &[S], normalizer: &TextNormalizer) -> Self {
        let mut document_frequency = HashMap::new();
        for document in documents {
            for term in normalizer.token_set(document.as_ref()) {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        Self {
            documents: documents.len(),
            document_frequency,
        }
    }

    pub fn builtin(normalizer: &TextNormalizer) -> Self {
        Self::from_documents(BACKGROUND_DOCUMENTS, normalizer)
    }

    /// Smoothed inverse document frequency: ln((1 + N) / (1 + df)) + 1
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.document_frequency.get(term).copied().unwrap_or(0);
        ((1.0 + self.documents as f64) / (1.0 + df as f64)).ln() + 1.0
    }

    pub fn len(&self) -> usize {
        self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMatchResult {
    pub score: f64,
    pub matched_terms: Vec<WeightedTerm>,
    pub missing_terms: Vec<WeightedTerm>,
    /// Fraction of job terms found, unweighted
    pub coverage: f64,
    /// Percentage of resume tokens that are job terms
    pub keyword_density: f64,
}

impl KeywordMatchResult {
    fn empty(missing_terms: Vec<WeightedTerm>) -> Self {
        Self {
            score: 0.0,
            matched_terms: Vec::new(),
            missing_terms,
            coverage: 0.0,
            keyword_density: 0.0,
        }
    }
}

pub struct KeywordMatcher {
    normalizer: Arc<TextNormalizer>,
    corpus: Arc<BackgroundCorpus>,
}

impl KeywordMatcher {
    pub fn new(normalizer: Arc<TextNormalizer>, corpus: Arc<BackgroundCorpus>) -> Self {
        Self { normalizer, corpus }
    }

    /// Term weights for a job description, summing to 1 (empty for empty text)
    pub fn job_weights(&self, job_text: &str) -> BTreeMap<String, f64> {
        let frequencies = self.normalizer.term_frequencies(job_text);

        let raw: BTreeMap<String, f64> = frequencies
            .into_iter()
            .map(|(term, tf)| {
                let weight = (1.0 + (tf as f64).ln()) * self.corpus.idf(&term);
                (term, weight)
            })
            .collect();

        let total: f64 = raw.values().sum();
        if total <= 0.0 {
            return BTreeMap::new();
        }

        raw.into_iter()
            .map(|(term, weight)| (term, weight / total))
            .collect()
    }

    pub fn score_text(&self, resume_text: &str, job_text: &str) -> Result<KeywordMatchResult> {
        let weights = self.job_weights(job_text);
        self.score_with_weights(resume_text, &weights)
    }

    /// Score against a precomputed weight map
    pub fn score_with_weights(
        &self,
        resume_text: &str,
        weights: &BTreeMap<String, f64>,
    ) -> Result<KeywordMatchResult> {
        validate_weights(weights)?;

        let mut all_terms: Vec<WeightedTerm> = weights
            .iter()
            .map(|(term, weight)| WeightedTerm {
                term: term.clone(),
                weight: *weight,
            })
            .collect();
        sort_by_weight(&mut all_terms);

        let resume_tokens = self.normalizer.normalize(resume_text);
        let total_weight: f64 = weights.values().sum();
        if resume_tokens.is_empty() || weights.is_empty() || total_weight <= 0.0 {
            return Ok(KeywordMatchResult::empty(all_terms));
        }

        let present: HashSet<&str> = resume_tokens.iter().map(String::as_str).collect();
        let (matched_terms, missing_terms): (Vec<_>, Vec<_>) = all_terms
            .into_iter()
            .partition(|term| present.contains(term.term.as_str()));

        let matched_weight: f64 = matched_terms.iter().map(|t| t.weight).sum();
        let score = (matched_weight / total_weight * 100.0).clamp(0.0, 100.0);
        let coverage = matched_terms.len() as f64 / weights.len() as f64;

        let keyword_occurrences = resume_tokens
            .iter()
            .filter(|token| weights.contains_key(token.as_str()))
            .count();
        let keyword_density = keyword_occurrences as f64 / resume_tokens.len() as f64 * 100.0;

        Ok(KeywordMatchResult {
            score,
            matched_terms,
            missing_terms,
            coverage,
            keyword_density,
        })
    }
}

fn validate_weights(weights: &BTreeMap<String, f64>) -> Result<()> {
    for (term, weight) in weights {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(ResumeRankerError::Scoring(format!(
                "keyword weight for '{}' is invalid: {}",
                term, weight
            )));
        }
    }
    Ok(())
}

fn sort_by_weight(terms: &mut [WeightedTerm]) {
    terms.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.term.cmp(&b.term))
    });
}
