//! Resume ranker: ATS-style resume scoring and candidate ranking

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_ranker::cli::{self, Cli, Commands, ConfigAction};
use resume_ranker::input::InputManager;
use resume_ranker::output::formatter::save_report_to_file;
use resume_ranker::output::{OutputFormat, RankingReport, ReportGenerator, ReportMetadata, ScoreReport};
use resume_ranker::processing::batch::{BatchScorer, UnscoredCandidate};
use resume_ranker::processing::embeddings::{Embedder, Model2VecEmbedder};
use resume_ranker::processing::scorer::AtsScorer;
use resume_ranker::{Config, Result, ResumeRankerError};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run_command(cli.command, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Score {
            resume,
            job,
            output,
            detailed,
            save,
            no_embeddings,
        } => {
            let config = load_config(config_path.as_deref())?;

            cli::validate_file_extension(&resume, &["json"])
                .map_err(|e| ResumeRankerError::InvalidInput(format!("Resume file: {}", e)))?;
            cli::validate_file_extension(&job, &["txt", "md", "markdown"])
                .map_err(|e| ResumeRankerError::InvalidInput(format!("Job description file: {}", e)))?;

            let start_time = Instant::now();
            let mut input_manager = InputManager::new();
            let job_text = input_manager.read_job_description(&job).await?;
            let record = input_manager.load_resume(&resume).await?;

            let scorer = build_scorer(&config, no_embeddings)?;
            let job_record = scorer.prepare_job(&job_text);
            let score = scorer.score(&record, &job_record).await?;

            let metadata = ReportMetadata::new(
                job_record.display_title(),
                scorer.embedder_name().map(str::to_string),
                scorer.reference_date(),
            )
            .with_processing_time(start_time.elapsed().as_millis() as u64);
            let report = ScoreReport::new(metadata, record.display_name(), *scorer.weights(), score);

            let generator = ReportGenerator::with_options(save.is_none(), detailed, true);
            let content = generator.score_report(&report, output)?;
            emit(&content, save.as_deref(), output).await?;
        }

        Commands::Rank {
            job,
            resumes,
            top,
            output,
            detailed,
            save,
            no_embeddings,
        } => {
            let config = load_config(config_path.as_deref())?;

            cli::validate_file_extension(&job, &["txt", "md", "markdown"])
                .map_err(|e| ResumeRankerError::InvalidInput(format!("Job description file: {}", e)))?;

            let start_time = Instant::now();
            let mut input_manager = InputManager::new();
            let job_text = input_manager.read_job_description(&job).await?;
            let loaded = input_manager.load_resumes(&resumes).await?;

            let scorer = Arc::new(build_scorer(&config, no_embeddings)?);
            let job_record = Arc::new(scorer.prepare_job(&job_text));
            let batch = BatchScorer::new(Arc::clone(&scorer), &config)?;

            let cancel = batch.cancel_flag();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, finishing in-flight candidates");
                    cancel.store(true, Ordering::SeqCst);
                }
            });

            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
                spinner.set_style(style);
            }
            spinner.set_message(format!("Scoring {} candidates...", loaded.records.len()));
            spinner.enable_steady_tick(Duration::from_millis(100));

            let outcome = batch.run(Arc::clone(&job_record), loaded.records).await;
            spinner.finish_and_clear();
            let mut outcome = outcome?;

            for (path, reason) in loaded.failures {
                let candidate_id = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                outcome.unscored.push(UnscoredCandidate { candidate_id, reason });
            }
            outcome.unscored.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));

            info!(
                "Ranked {} candidates, {} unscored, {} cancelled",
                outcome.ranking.len(),
                outcome.unscored.len(),
                outcome.cancelled.len()
            );

            let metadata = ReportMetadata::new(
                job_record.display_title(),
                scorer.embedder_name().map(str::to_string),
                scorer.reference_date(),
            )
            .with_processing_time(start_time.elapsed().as_millis() as u64);
            let report = RankingReport::new(metadata, outcome, top);

            let generator = ReportGenerator::with_options(save.is_none(), detailed, true);
            let content = generator.ranking_report(&report, output)?;
            emit(&content, save.as_deref(), output).await?;
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);

            match action {
                Some(ConfigAction::Show) | None => {
                    let config = Config::load_or_init(&path)?;
                    let rendered = toml::to_string_pretty(&config).map_err(|e| {
                        ResumeRankerError::Configuration(format!("Failed to render config: {}", e))
                    })?;
                    println!("Configuration ({})\n", path.display());
                    println!("{}", rendered);
                }

                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    println!("Configuration reset to defaults: {}", path.display());
                }

                Some(ConfigAction::Validate) => {
                    Config::load_from(&path)?;
                    println!("Configuration is valid: {}", path.display());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
        }
    }

    Ok(())
}

/// Scorer with the configured embedding model, unless disabled or unavailable
fn build_scorer(config: &Config, no_embeddings: bool) -> Result<AtsScorer> {
    let mut builder = AtsScorer::builder(config.clone());

    match (&config.semantic.model_path, no_embeddings) {
        (_, true) => info!("Embeddings disabled; semantic score uses lexical similarity"),
        (None, false) => info!("No embedding model configured; semantic score uses lexical similarity"),
        (Some(model_path), false) => match Model2VecEmbedder::load(model_path) {
            Ok(embedder) => {
                let embedder: Arc<dyn Embedder> = Arc::new(embedder);
                builder = builder.embedder(embedder);
            }
            Err(e) => warn!("Embedding model unavailable, using lexical similarity: {}", e),
        },
    }

    builder.build()
}

async fn emit(content: &str, save: Option<&Path>, format: OutputFormat) -> Result<()> {
    match save {
        Some(path) => {
            save_report_to_file(content, path).await?;
            println!("Saved {:?} report to {}", format, path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
