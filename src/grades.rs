use std::fmt;

use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::AnalysisError;
use crate::grid::{format_cell, Grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        })
    }
}

/// Bands are inclusive at their lower bound. Anything that is not at least
/// 60, `NaN` included, is an F.
pub fn assign_letter_grade(score: f64) -> LetterGrade {
    if score >= 90.0 {
        LetterGrade::A
    } else if score >= 80.0 {
        LetterGrade::B
    } else if score >= 70.0 {
        LetterGrade::C
    } else if score >= 60.0 {
        LetterGrade::D
    } else {
        LetterGrade::F
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceCategory {
    Excellent,
    Good,
    Average,
    BelowAverage,
    Failing,
}

impl PerformanceCategory {
    pub const ALL: [PerformanceCategory; 5] = [
        PerformanceCategory::Excellent,
        PerformanceCategory::Good,
        PerformanceCategory::Average,
        PerformanceCategory::BelowAverage,
        PerformanceCategory::Failing,
    ];

    pub fn classify(score: f64) -> Self {
        match assign_letter_grade(score) {
            LetterGrade::A => PerformanceCategory::Excellent,
            LetterGrade::B => PerformanceCategory::Good,
            LetterGrade::C => PerformanceCategory::Average,
            LetterGrade::D => PerformanceCategory::BelowAverage,
            LetterGrade::F => PerformanceCategory::Failing,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceCategory::Excellent => "Excellent (90-100)",
            PerformanceCategory::Good => "Good (80-89)",
            PerformanceCategory::Average => "Average (70-79)",
            PerformanceCategory::BelowAverage => "Below Average (60-69)",
            PerformanceCategory::Failing => "Failing (<60)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: &'static str,
    pub count: usize,
}

/// Counts per category in fixed best-to-worst order, zero-filled.
pub fn categorize_scores(scores: &[Option<f64>]) -> Vec<CategoryCount> {
    let mut counts = [0usize; 5];
    for score in scores.iter().flatten() {
        let category = PerformanceCategory::classify(*score);
        if let Some(slot) = PerformanceCategory::ALL.iter().position(|c| *c == category) {
            counts[slot] += 1;
        }
    }

    PerformanceCategory::ALL
        .iter()
        .zip(counts)
        .map(|(category, count)| CategoryCount {
            category: category.label(),
            count,
        })
        .collect()
}

/// The full dataset with a `<score>_Grade` column appended. Rows without a
/// score get an empty grade.
pub fn graded_export(dataset: &Dataset, score_column: &str) -> Result<Grid, AnalysisError> {
    let scores = dataset.numeric_values(score_column)?;

    let mut headers = dataset.columns().to_vec();
    headers.push(format!("{score_column}_Grade"));

    let rows = dataset
        .rows()
        .iter()
        .zip(&scores)
        .map(|(cells, score)| {
            let mut out: Vec<String> = cells.iter().map(format_cell).collect();
            out.push(
                score
                    .map(|s| assign_letter_grade(s).to_string())
                    .unwrap_or_default(),
            );
            out
        })
        .collect();

    Ok(Grid { headers, rows })
}
