//! Resume ranker library
//!
//! Scores parsed resumes against a job description and ranks candidates.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{Result, ResumeRankerError};
pub use processing::batch::{BatchOutcome, BatchScorer};
pub use processing::records::ResumeRecord;
pub use processing::scorer::{AtsScorer, CandidateScore, ScoreBreakdown};
