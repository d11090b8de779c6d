//! Bounded concurrent scoring of many resumes against one job description

use crate::config::Config;
use crate::error::{Result, ResumeRankerError};
use crate::processing::job::JobDescriptionRecord;
use crate::processing::ranker::{Ranker, Ranking};
use crate::processing::records::ResumeRecord;
use crate::processing::scorer::AtsScorer;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A candidate excluded from ranking, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscoredCandidate {
    pub candidate_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub ranking: Ranking,
    pub unscored: Vec<UnscoredCandidate>,
    /// Candidates never scheduled because the batch was cancelled
    pub cancelled: Vec<String>,
}

impl BatchOutcome {
    pub fn was_cancelled(&self) -> bool {
        !self.cancelled.is_empty()
    }
}

pub struct BatchScorer {
    scorer: Arc<AtsScorer>,
    ranker: Ranker,
    max_concurrency: usize,
    cancel: Arc<AtomicBool>,
}

impl BatchScorer {
    pub fn new(scorer: Arc<AtsScorer>, config: &Config) -> Result<Self> {
        let ranker = Ranker::new(
            config.ranking.clone(),
            Arc::clone(scorer.taxonomy()),
            scorer.reference_date(),
        )?;
        Ok(Self {
            scorer,
            ranker,
            max_concurrency: config.max_concurrency(),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    /// Flag that stops scheduling new candidates once set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Score every record and rank the ones that succeed.
    ///
    /// Per-candidate failures end up in `unscored`; only ranking or runtime
    /// failures are returned as errors.
    pub async fn run(&self, job: Arc<JobDescriptionRecord>, records: Vec<ResumeRecord>) -> Result<BatchOutcome> {
        info!(
            "Scoring {} candidates for '{}' with up to {} concurrent tasks",
            records.len(),
            job.display_title(),
            self.max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut unscored = Vec::new();
        let mut cancelled = Vec::new();
        let mut seen = HashSet::new();

        let mut pending = records.into_iter();
        while let Some(record) = pending.next() {
            if !seen.insert(record.id().to_string()) {
                warn!("Skipping duplicate candidate id '{}'", record.id());
                unscored.push(UnscoredCandidate {
                    candidate_id: record.id().to_string(),
                    reason: "duplicate candidate id".to_string(),
                });
                continue;
            }

            let permit = if self.is_cancelled() {
                None
            } else {
                let permit = Arc::clone(&semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|e| ResumeRankerError::Processing(format!("Scheduler closed: {}", e)))?;
                // cancellation may arrive while waiting for a slot
                (!self.is_cancelled()).then_some(permit)
            };

            let Some(permit) = permit else {
                cancelled.push(record.id().to_string());
                cancelled.extend(pending.by_ref().map(|r| r.id().to_string()));
                break;
            };

            let scorer = Arc::clone(&self.scorer);
            let job = Arc::clone(&job);
            let record = Arc::new(record);

            tasks.spawn(async move {
                let task_record = Arc::clone(&record);
                // inner task so a panic is reported against this candidate
                let outcome = tokio::spawn(async move { scorer.score(&task_record, &job).await }).await;
                drop(permit);

                let outcome = match outcome {
                    Ok(Ok(score)) => Ok(score.breakdown),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(e) if e.is_panic() => Err("scoring task panicked".to_string()),
                    Err(e) => Err(format!("scoring task failed: {}", e)),
                };
                (record, outcome)
            });
        }

        let mut scored = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (record, outcome) =
                joined.map_err(|e| ResumeRankerError::Processing(format!("Batch task failed: {}", e)))?;

            match outcome {
                Ok(breakdown) => {
                    debug!("Finished {}: {:.2}", record.id(), breakdown.total);
                    scored.push((record, breakdown));
                }
                Err(reason) => {
                    warn!("Candidate {} left unscored: {}", record.id(), reason);
                    unscored.push(UnscoredCandidate {
                        candidate_id: record.id().to_string(),
                        reason,
                    });
                }
            }
        }

        if !cancelled.is_empty() {
            warn!("Batch cancelled; {} candidates were not scheduled", cancelled.len());
        }

        unscored.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id).then_with(|| a.reason.cmp(&b.reason)));
        let ranking = self.ranker.rank(scored)?;

        Ok(BatchOutcome {
            ranking,
            unscored,
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::Embedder;
    use crate::processing::records::ExperienceEntry;
    use chrono::NaiveDate;
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    const JOB: &str = "Backend Engineer\n\nRust, Python and PostgreSQL. 3+ years of experience.";

    fn batch(max_concurrency: usize) -> BatchScorer {
        let config = Config::default();
        let scorer = AtsScorer::builder(config.clone())
            .reference_date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
            .build()
            .unwrap();
        BatchScorer::new(Arc::new(scorer), &config)
            .unwrap()
            .with_max_concurrency(max_concurrency)
    }

    /// Embedder that reports the first call and then holds until the batch is cancelled
    struct HoldingEmbedder {
        started: Mutex<Option<mpsc::Sender<()>>>,
        cancel: Arc<AtomicBool>,
    }

    impl Embedder for HoldingEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if let Some(started) = self.started.lock().unwrap().take() {
                let _ = started.send(());
            }
            for _ in 0..200 {
                if self.cancel.load(Ordering::SeqCst) {
                    break;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            Ok(vec![text.len() as f32 + 1.0, 1.0])
        }

        fn name(&self) -> &str {
            "holding"
        }
    }

    fn records() -> Vec<ResumeRecord> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..6)
            .map(|i| {
                let skills: Vec<String> = ["rust", "python", "postgresql", "docker", "git", "linux"]
                    .iter()
                    .take(i + 1)
                    .map(|s| s.to_string())
                    .collect();
                ResumeRecord::new(format!("cand-{}", i))
                    .with_skills(skills)
                    .with_experience(vec![ExperienceEntry::new("Engineer", "Acme", start, None).unwrap()])
            })
            .collect()
    }

    fn order(outcome: &BatchOutcome) -> Vec<String> {
        outcome.ranking.all().iter().map(|c| c.id().to_string()).collect()
    }

    #[tokio::test]
    async fn test_batch_ranks_all_candidates() {
        let scorer = batch(2);
        let job = Arc::new(scorer.scorer.prepare_job(JOB));
        let outcome = scorer.run(job, records()).await.unwrap();

        assert_eq!(outcome.ranking.len(), 6);
        assert!(outcome.unscored.is_empty());
        assert!(!outcome.was_cancelled());
        assert_eq!(order(&outcome)[0], "cand-5");
    }

    #[tokio::test]
    async fn test_order_independent_of_concurrency() {
        let serial = batch(1);
        let job = Arc::new(serial.scorer.prepare_job(JOB));
        let serial_outcome = serial.run(Arc::clone(&job), records()).await.unwrap();

        let mut reversed = records();
        reversed.reverse();
        let parallel_outcome = batch(8).run(job, reversed).await.unwrap();

        assert_eq!(order(&serial_outcome), order(&parallel_outcome));
    }

    #[tokio::test]
    async fn test_invalid_and_duplicate_records_unscored() {
        let scorer = batch(4);
        let job = Arc::new(scorer.scorer.prepare_job(JOB));

        let mut input = records();
        input.push(ResumeRecord::new(""));
        input.push(ResumeRecord::new("cand-0"));

        let outcome = scorer.run(job, input).await.unwrap();
        assert_eq!(outcome.ranking.len(), 6);
        assert_eq!(outcome.unscored.len(), 2);
        assert!(outcome.unscored.iter().any(|u| u.reason == "duplicate candidate id"));
        assert!(outcome.unscored.iter().any(|u| u.candidate_id.is_empty()));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let scorer = batch(2);
        let job = Arc::new(scorer.scorer.prepare_job(JOB));
        scorer.cancel();

        let outcome = scorer.run(job, records()).await.unwrap();
        assert!(outcome.ranking.is_empty());
        assert_eq!(outcome.cancelled.len(), 6);
        assert_eq!(outcome.cancelled[0], "cand-0");
    }

    #[tokio::test]
    async fn test_cancel_during_batch_keeps_in_flight_candidate() {
        let config = Config::default();
        let cancel = Arc::new(AtomicBool::new(false));
        let (started_tx, started_rx) = mpsc::channel();
        let embedder: Arc<dyn Embedder> = Arc::new(HoldingEmbedder {
            started: Mutex::new(Some(started_tx)),
            cancel: Arc::clone(&cancel),
        });

        let scorer = AtsScorer::builder(config.clone())
            .reference_date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
            .embedder(embedder)
            .build()
            .unwrap();
        let mut batch = BatchScorer::new(Arc::new(scorer), &config)
            .unwrap()
            .with_max_concurrency(1);
        batch.cancel = Arc::clone(&cancel);
        let job = Arc::new(batch.scorer.prepare_job(JOB));

        let flag = batch.cancel_flag();
        let interrupter = tokio::task::spawn_blocking(move || {
            if started_rx.recv_timeout(Duration::from_secs(5)).is_ok() {
                flag.store(true, Ordering::SeqCst);
            }
        });

        let outcome = batch.run(job, records()).await.unwrap();
        interrupter.await.unwrap();

        assert_eq!(order(&outcome), vec!["cand-0".to_string()]);
        assert!(outcome.unscored.is_empty());
        let expected: Vec<String> = (1..6).map(|i| format!("cand-{}", i)).collect();
        assert_eq!(outcome.cancelled, expected);
        assert!(outcome.was_cancelled());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let scorer = batch(2);
        let job = Arc::new(scorer.scorer.prepare_job(JOB));
        let outcome = scorer.run(job, Vec::new()).await.unwrap();
        assert_eq!(outcome, BatchOutcome::default());
    }
}
