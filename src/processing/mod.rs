//! Scoring and ranking engine

pub mod batch;
pub mod embeddings;
pub mod experience;
pub mod feedback;
pub mod format_checker;
pub mod grade;
pub mod job;
pub mod keyword_matcher;
pub mod normalizer;
pub mod ranker;
pub mod records;
pub mod scorer;
pub mod semantic;
pub mod skill_matcher;
pub mod taxonomy;
