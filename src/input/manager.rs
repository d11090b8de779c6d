//! Input manager for resume records and job descriptions

use crate::error::{Result, ResumeRankerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PlainTextExtractor, TextExtractor};
use crate::processing::records::ResumeRecord;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Records that loaded, plus files that could not be parsed
#[derive(Debug, Default)]
pub struct LoadedResumes {
    pub records: Vec<ResumeRecord>,
    pub failures: Vec<(PathBuf, String)>,
}

pub struct InputManager {
    cache: HashMap<PathBuf, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Read a `.txt` or `.md` job description as plain text
    pub async fn read_job_description(&mut self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(path) {
                debug!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        ensure_exists(path)?;

        let text = match FileType::from_path(path) {
            FileType::Text => {
                info!("Reading job description: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Rendering markdown job description: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Json | FileType::Unknown => {
                return Err(ResumeRankerError::UnsupportedFormat(format!(
                    "Job descriptions must be .txt or .md: {}",
                    path.display()
                )));
            }
        };

        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), text.clone());
        }

        Ok(text)
    }

    /// Load one JSON resume record
    pub async fn load_resume(&self, path: &Path) -> Result<ResumeRecord> {
        ensure_exists(path)?;

        if FileType::from_path(path) != FileType::Json {
            return Err(ResumeRankerError::UnsupportedFormat(format!(
                "Resume records must be JSON: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).await?;
        ResumeRecord::from_json(&content).map_err(|e| {
            ResumeRankerError::InvalidInput(format!("Invalid resume record '{}': {}", path.display(), e))
        })
    }

    /// Expand files and directories into the JSON files they name.
    /// Directory entries are sorted; non-JSON files inside directories are skipped.
    pub async fn collect_resume_paths(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        for input in inputs {
            ensure_exists(input)?;

            if input.is_dir() {
                let mut found = Vec::new();
                let mut entries = fs::read_dir(input).await?;
                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();
                    if path.is_file() && FileType::from_path(&path) == FileType::Json {
                        found.push(path);
                    }
                }
                found.sort();
                debug!("Found {} resume records in {}", found.len(), input.display());
                paths.extend(found);
            } else {
                paths.push(input.clone());
            }
        }

        Ok(paths)
    }

    /// Load every resume under `inputs`; unparsable files are collected, not fatal
    pub async fn load_resumes(&self, inputs: &[PathBuf]) -> Result<LoadedResumes> {
        let mut loaded = LoadedResumes::default();

        for path in self.collect_resume_paths(inputs).await? {
            match self.load_resume(&path).await {
                Ok(record) => loaded.records.push(record),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    loaded.failures.push((path, e.to_string()));
                }
            }
        }

        info!(
            "Loaded {} resume records ({} failed)",
            loaded.records.len(),
            loaded.failures.len()
        );
        Ok(loaded)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ResumeRankerError::InvalidInput(format!(
            "File does not exist: {}",
            path.display()
        )))
    }
}
