//! Embedding backends using Model2Vec

use crate::error::{Result, ResumeRankerError};
use anyhow::Context;
use log::info;
use model2vec_rs::model::StaticModel;
use std::path::Path;
use std::time::Instant;

/// Turns text into a dense vector. Implementations may fail; callers fall
/// back to lexical similarity.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn name(&self) -> &str;
}

/// Static Model2Vec model loaded from a local directory
pub struct Model2VecEmbedder {
    model: StaticModel,
    model_name: String,
}

impl Model2VecEmbedder {
    /// Load a model directory. Nothing is downloaded.
    pub fn load(model_path: &Path) -> Result<Self> {
        if !model_path.is_dir() {
            return Err(ResumeRankerError::Embedding(format!(
                "Model directory not found: {}",
                model_path.display()
            )));
        }

        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        let model = StaticModel::from_pretrained(
            model_path,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .context("Failed to load model")?;

        info!("Model loaded in {:.2?}", start_time.elapsed());

        let model_name = model_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model2vec".to_string());

        Ok(Self { model, model_name })
    }
}

impl Embedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.model.encode_single(text))
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Cosine similarity in [-1, 1].
///
/// Mismatched dimensions, empty vectors and zero vectors are errors so the
/// caller can switch to its fallback.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(ResumeRankerError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    if a.is_empty() {
        return Err(ResumeRankerError::Embedding("Empty embedding".to_string()));
    }

    let dot_product: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(ResumeRankerError::Embedding("Zero-length embedding vector".to_string()));
    }

    let similarity = dot_product / (norm_a * norm_b);
    if !similarity.is_finite() {
        return Err(ResumeRankerError::Embedding("Non-finite similarity".to_string()));
    }
    Ok(similarity.clamp(-1.0, 1.0))
}
