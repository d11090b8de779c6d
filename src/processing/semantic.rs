//! Semantic similarity between resume and job text

use crate::error::{Result, ResumeRankerError};
use crate::processing::embeddings::{cosine_similarity, Embedder};
use crate::processing::normalizer::TextNormalizer;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticMethod {
    Embedding,
    LexicalFallback,
}

impl fmt::Display for SemanticMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticMethod::Embedding => write!(f, "embedding"),
            SemanticMethod::LexicalFallback => write!(f, "lexical_fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticResult {
    pub score: f64,
    pub method: SemanticMethod,
    pub embedder: Option<String>,
    pub fallback_reason: Option<String>,
}

/// Embedding similarity with a Jaccard fallback that never fails
pub struct SemanticScorer {
    embedder: Option<Arc<dyn Embedder>>,
    normalizer: Arc<TextNormalizer>,
    timeout: Duration,
}

impl SemanticScorer {
    pub fn new(
        embedder: Option<Arc<dyn Embedder>>,
        normalizer: Arc<TextNormalizer>,
        timeout: Duration,
    ) -> Self {
        Self {
            embedder,
            normalizer,
            timeout,
        }
    }

    pub fn embedder_name(&self) -> Option<&str> {
        self.embedder.as_ref().map(|embedder| embedder.name())
    }

    pub async fn score(&self, resume_text: &str, job_text: &str) -> SemanticResult {
        let Some(embedder) = self.embedder.clone() else {
            return self.lexical(resume_text, job_text, "no embedder configured".to_string());
        };

        let name = embedder.name().to_string();
        match self.embedding_score(embedder, resume_text, job_text).await {
            Ok(score) => {
                debug!("Semantic similarity via {}: {:.2}", name, score);
                SemanticResult {
                    score,
                    method: SemanticMethod::Embedding,
                    embedder: Some(name),
                    fallback_reason: None,
                }
            }
            Err(e) => {
                warn!("Embedding similarity unavailable ({}), using lexical fallback", e);
                let mut result = self.lexical(resume_text, job_text, e.to_string());
                result.embedder = Some(name);
                result
            }
        }
    }

    /// Jaccard similarity of normalized token sets, scaled to [0, 100]
    pub fn lexical_score(&self, resume_text: &str, job_text: &str) -> f64 {
        (self.normalizer.jaccard_similarity(resume_text, job_text) * 100.0).clamp(0.0, 100.0)
    }

    fn lexical(&self, resume_text: &str, job_text: &str, reason: String) -> SemanticResult {
        SemanticResult {
            score: self.lexical_score(resume_text, job_text),
            method: SemanticMethod::LexicalFallback,
            embedder: None,
            fallback_reason: Some(reason),
        }
    }

    async fn embedding_score(
        &self,
        embedder: Arc<dyn Embedder>,
        resume_text: &str,
        job_text: &str,
    ) -> Result<f64> {
        let resume_text = resume_text.to_string();
        let job_text = job_text.to_string();

        // The model is CPU-bound; keep it off the async workers.
        let task = tokio::task::spawn_blocking(move || -> Result<(Vec<f32>, Vec<f32>)> {
            Ok((embedder.embed(&resume_text)?, embedder.embed(&job_text)?))
        });

        let (resume_vec, job_vec) = tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| ResumeRankerError::EmbeddingTimeout(self.timeout.as_millis() as u64))?
            .map_err(|e| ResumeRankerError::Embedding(format!("Embedding task failed: {}", e)))??;

        let cosine = cosine_similarity(&resume_vec, &job_vec)?;
        Ok(((cosine + 1.0) / 2.0 * 100.0).clamp(0.0, 100.0))
    }
}
