//! Input handling
//! Loads resume records and job description text from disk

pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use manager::{InputManager, LoadedResumes};
