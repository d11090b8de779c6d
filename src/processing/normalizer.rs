//! Text normalization shared by every lexical comparison

use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

const MIN_STEM_LEN: usize = 3;
const MIN_TOKEN_LEN: usize = 2;

/// Lowercases, tokenizes, removes stopwords and applies light suffix stemming.
///
/// `+` and `#` are kept inside tokens so `c++` and `c#` survive. Output is a
/// fixed point: normalizing the space-joined tokens again yields the same
/// sequence.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    stop_words: HashSet<&'static str>,
    stemming: bool,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
            stemming: true,
        }
    }

    pub fn with_stemming(mut self, enabled: bool) -> Self {
        self.stemming = enabled;
        self
    }

    pub fn stemming_enabled(&self) -> bool {
        self.stemming
    }

    /// Normalize text into an ordered token sequence
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();

        lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
            .filter_map(|raw| self.normalize_token(raw))
            .collect()
    }

    /// Distinct normalized tokens
    pub fn token_set(&self, text: &str) -> HashSet<String> {
        self.normalize(text).into_iter().collect()
    }

    /// Raw term counts over the normalized tokens
    pub fn term_frequencies(&self, text: &str) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for token in self.normalize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }

    /// Jaccard similarity of the normalized token sets, 0.0 when both are empty
    pub fn jaccard_similarity(&self, text1: &str, text2: &str) -> f64 {
        let set1 = self.token_set(text1);
        let set2 = self.token_set(text2);

        let union = set1.union(&set2).count();
        if union == 0 {
            return 0.0;
        }
        set1.intersection(&set2).count() as f64 / union as f64
    }

    /// Word count in the Unicode sense, before any filtering
    pub fn word_count(text: &str) -> usize {
        text.unicode_words().count()
    }

    fn normalize_token(&self, raw: &str) -> Option<String> {
        let token = raw.trim_start_matches(['+', '#']);
        if !self.keep(token) {
            return None;
        }

        if !self.stemming {
            return Some(token.to_string());
        }

        let stemmed = stem(token);
        self.keep(&stemmed).then_some(stemmed)
    }

    fn keep(&self, token: &str) -> bool {
        token.chars().count() >= MIN_TOKEN_LEN
            && token.chars().any(char::is_alphabetic)
            && !self.stop_words.contains(token)
    }
}

/// Apply suffix rules until none fires
fn stem(token: &str) -> String {
    let mut current = token.to_string();
    while let Some(next) = stem_once(&current) {
        current = next;
    }
    current
}

fn stem_once(token: &str) -> Option<String> {
    let len = token.chars().count();
    let strip = |suffix: &str, replacement: &str| -> Option<String> {
        let base = token.strip_suffix(suffix)?;
        let stem_len = base.chars().count() + replacement.chars().count();
        (stem_len >= MIN_STEM_LEN).then(|| format!("{}{}", base, replacement))
    };

    if token.ends_with("ies") {
        return strip("ies", "y");
    }
    if token.ends_with("sses") {
        return strip("sses", "ss");
    }
    if token.ends_with("ing") {
        return strip("ing", "");
    }
    if token.ends_with("ed") {
        return strip("ed", "");
    }
    if len > 1
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return strip("s", "");
    }
    None
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "etc", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours",
    "yourself", "yourselves", "also", "may", "must", "within", "via", "per",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        let normalizer = TextNormalizer::new();
        let tokens = normalizer.normalize("Rust programming is awesome!");

        assert_eq!(tokens, vec!["rust", "programm", "awesome"]);
    }

    #[test]
    fn test_plus_and_sharp_survive() {
        let normalizer = TextNormalizer::new();
        let tokens = normalizer.normalize("Expert in C++, C# and Node.js");

        assert!(tokens.contains(&"c++".to_string()));
        assert!(tokens.contains(&"c#".to_string()));
        assert!(tokens.contains(&"node".to_string()));
        assert!(tokens.contains(&"js".to_string()));
        assert!(!tokens.contains(&"in".to_string()));
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        let normalizer = TextNormalizer::new();
        assert!(normalizer.normalize("").is_empty());
        assert!(normalizer.normalize("   \n\t ").is_empty());
        assert!(normalizer.normalize("2021 - 2023 | 42").is_empty());
    }

    #[test]
    fn test_stemming_rules() {
        assert_eq!(stem("companies"), "company");
        assert_eq!(stem("classes"), "class");
        assert_eq!(stem("listings"), "list");
        assert_eq!(stem("developed"), "develop");
        assert_eq!(stem("analysis"), "analysis");
        assert_eq!(stem("status"), "status");
        assert_eq!(stem("aws"), "aws");
        assert_eq!(stem("sing"), "sing");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalizer = TextNormalizer::new();
        let samples = [
            "Senior Engineers building scalable microservices with Kubernetes clusters",
            "Managed teams; delivered C++ libraries and #hashtags ++plus",
            "Classes, processes, analyses and studies were completed",
            "Things being sings this isses",
        ];

        for sample in samples {
            let once = normalizer.normalize(sample);
            let twice = normalizer.normalize(&once.join(" "));
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_stemming_can_be_disabled() {
        let normalizer = TextNormalizer::new().with_stemming(false);
        assert!(!normalizer.stemming_enabled());
        assert_eq!(normalizer.normalize("Testing engineers"), vec!["testing", "engineers"]);
    }

    #[test]
    fn test_case_insensitive() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("PYTHON Developer"), normalizer.normalize("python developer"));
    }

    #[test]
    fn test_jaccard_similarity() {
        let normalizer = TextNormalizer::new();
        let similarity = normalizer.jaccard_similarity("Rust programming language", "Programming in Rust language");
        assert!((similarity - 1.0).abs() < 1e-9);

        assert_eq!(normalizer.jaccard_similarity("", ""), 0.0);
        assert_eq!(normalizer.jaccard_similarity("rust", "python"), 0.0);
    }

    #[test]
    fn test_term_frequencies_and_word_count() {
        let normalizer = TextNormalizer::new();
        let counts = normalizer.term_frequencies("Rust rust RUST python");
        assert_eq!(counts.get("rust"), Some(&3));
        assert_eq!(counts.get("python"), Some(&1));

        assert_eq!(TextNormalizer::word_count("Hello, big world!"), 3);
    }
}
