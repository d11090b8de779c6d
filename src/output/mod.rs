//! Report generation and formatting

pub mod formatter;
pub mod report;

pub use formatter::{OutputFormat, ReportGenerator};
pub use report::{RankingReport, ReportMetadata, ScoreReport};
