//! Descriptive analytics over tabular student records: statistics, pass/fail
//! rates, rankings, subject averages, correlations and score trends.

pub mod analyzer;
pub mod config;
pub mod dataset;
pub mod error;
pub mod grades;
pub mod grid;
pub mod loader;
pub mod models;
pub mod report;
pub mod sample;
pub mod stats;

pub use analyzer::Analyzer;
pub use dataset::{Cell, Dataset};
pub use error::{AnalysisError, LoadError};
pub use grades::{assign_letter_grade, LetterGrade};
