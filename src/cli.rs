//! CLI interface for the resume ranker

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-ranker")]
#[command(about = "ATS-style resume scoring and candidate ranking")]
#[command(long_about = "Score parsed resumes against a job description using keywords, a skills taxonomy, experience and semantic similarity, then rank candidates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one resume against a job description
    Score {
        /// Path to the resume record (JSON)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to the job description (TXT, MD)
        #[arg(short, long)]
        job: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Console)]
        output: OutputFormat,

        /// Show the full breakdown and every recommendation
        #[arg(short, long)]
        detailed: bool,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Skip the embedding model and use lexical similarity
        #[arg(long)]
        no_embeddings: bool,
    },

    /// Score and rank many resumes against one job description
    Rank {
        /// Path to the job description (TXT, MD)
        #[arg(short, long)]
        job: PathBuf,

        /// Resume records (JSON) or directories containing them
        #[arg(required = true)]
        resumes: Vec<PathBuf>,

        /// Only show the top K candidates
        #[arg(short, long)]
        top: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Console)]
        output: OutputFormat,

        /// Show sub-scores for each candidate
        #[arg(short, long)]
        detailed: bool,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Skip the embedding model and use lexical similarity
        #[arg(long)]
        no_embeddings: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Check that the configuration is valid
    Validate,

    /// Print the configuration file path
    Path,
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
