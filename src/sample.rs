//! Built-in datasets for exploring the tool without a file of your own.

use std::fmt;

use clap::ValueEnum;

use crate::dataset::{Cell, Dataset};
use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleDataset {
    StudentGrades,
    ClassPerformance,
    MultiSubject,
}

impl fmt::Display for SampleDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SampleDataset::StudentGrades => "Student Grades",
            SampleDataset::ClassPerformance => "Class Performance",
            SampleDataset::MultiSubject => "Multi-Subject Analysis",
        })
    }
}

impl SampleDataset {
    pub fn load(self) -> Result<Dataset, AnalysisError> {
        match self {
            SampleDataset::StudentGrades => student_grades(),
            SampleDataset::ClassPerformance => class_performance(),
            SampleDataset::MultiSubject => multi_subject(),
        }
    }
}

fn build(columns: &[&str], rows: Vec<Vec<Cell>>) -> Result<Dataset, AnalysisError> {
    Dataset::new(columns.iter().map(|c| c.to_string()).collect(), rows)
}

fn record(id: &str, name: &str, scores: &[Option<f64>]) -> Vec<Cell> {
    let mut cells = vec![Cell::from(id), Cell::from(name)];
    cells.extend(scores.iter().map(|s| Cell::from(*s)));
    cells
}

fn student_grades() -> Result<Dataset, AnalysisError> {
    build(
        &["Student_ID", "Name", "Math", "Science", "English", "Attendance"],
        vec![
            record("S001", "Avery Lee", &[Some(92.0), Some(88.0), Some(85.0), Some(97.0)]),
            record("S002", "Jules Moreno", &[Some(78.0), Some(74.0), Some(81.0), Some(89.0)]),
            record("S003", "Kiara Patel", &[Some(65.0), Some(70.0), Some(72.0), Some(82.0)]),
            record("S004", "Noah Kim", &[Some(45.0), Some(52.0), Some(58.0), Some(61.0)]),
            record("S005", "Maya Singh", &[Some(98.0), Some(95.0), Some(91.0), Some(99.0)]),
            record("S006", "Leo Garcia", &[Some(83.0), None, Some(77.0), Some(90.0)]),
            record("S007", "Zoe Chen", &[Some(58.0), Some(61.0), Some(66.0), Some(74.0)]),
            record("S008", "Omar Haddad", &[Some(71.0), Some(79.0), Some(68.0), Some(85.0)]),
            record("S009", "Ines Rossi", &[Some(88.0), Some(91.0), Some(94.0), Some(93.0)]),
            record("S010", "Sam Okafor", &[Some(39.0), Some(47.0), Some(51.0), Some(55.0)]),
        ],
    )
}

fn class_performance() -> Result<Dataset, AnalysisError> {
    build(
        &["Student_ID", "Name", "Quiz1", "Quiz2", "Midterm", "Final", "Attendance"],
        vec![
            record(
                "C101",
                "Harper Diaz",
                &[Some(72.0), Some(78.0), Some(81.0), Some(86.0), Some(94.0)],
            ),
            record(
                "C102",
                "Eli Novak",
                &[Some(88.0), Some(84.0), Some(79.0), Some(75.0), Some(80.0)],
            ),
            record(
                "C103",
                "Rina Sato",
                &[Some(65.0), Some(65.0), Some(70.0), Some(65.0), Some(88.0)],
            ),
            record("C104", "Theo Brandt", &[Some(55.0), None, None, None, Some(52.0)]),
            record(
                "C105",
                "Ada Mensah",
                &[Some(91.0), Some(93.0), Some(95.0), Some(97.0), Some(98.0)],
            ),
            record(
                "C106",
                "Luca Ferri",
                &[Some(60.0), Some(58.0), Some(62.0), Some(59.0), Some(70.0)],
            ),
            record("C107", "Nia Walker", &[None, Some(74.0), Some(80.0), Some(83.0), Some(91.0)]),
            record(
                "C108",
                "Ivan Petrov",
                &[Some(82.0), Some(76.0), Some(71.0), Some(68.0), Some(66.0)],
            ),
        ],
    )
}

fn multi_subject() -> Result<Dataset, AnalysisError> {
    build(
        &[
            "Student_ID", "Name", "Math", "Physics", "Chemistry", "Biology", "History", "English",
        ],
        vec![
            record(
                "M01",
                "Aria Novak",
                &[Some(94.0), Some(90.0), Some(87.0), Some(82.0), Some(76.0), Some(80.0)],
            ),
            record(
                "M02",
                "Ben Adler",
                &[Some(67.0), Some(63.0), Some(70.0), Some(75.0), Some(88.0), Some(91.0)],
            ),
            record(
                "M03",
                "Cleo Ward",
                &[Some(81.0), Some(78.0), Some(84.0), Some(80.0), Some(72.0), Some(69.0)],
            ),
            record(
                "M04",
                "Dev Shah",
                &[Some(56.0), Some(49.0), Some(58.0), Some(64.0), Some(79.0), Some(83.0)],
            ),
            record(
                "M05",
                "Esme Laurent",
                &[Some(99.0), Some(96.0), Some(92.0), Some(90.0), Some(85.0), Some(88.0)],
            ),
            record(
                "M06",
                "Finn Murphy",
                &[Some(73.0), Some(70.0), None, Some(68.0), Some(61.0), Some(65.0)],
            ),
            record(
                "M07",
                "Gia Romano",
                &[Some(62.0), Some(58.0), Some(66.0), Some(71.0), Some(93.0), Some(95.0)],
            ),
            record(
                "M08",
                "Hugo Berg",
                &[Some(88.0), Some(85.0), Some(79.0), Some(77.0), Some(70.0), Some(74.0)],
            ),
            record(
                "M09",
                "Isla Grant",
                &[Some(45.0), Some(42.0), Some(50.0), Some(55.0), Some(68.0), Some(72.0)],
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_sample_builds() {
        for sample in SampleDataset::value_variants() {
            let data = sample.load().unwrap();
            assert!(!data.is_empty(), "{sample} is empty");
            assert_eq!(data.candidate_id_columns()[0], "Student_ID");
        }
    }

    #[test]
    fn sample_scores_are_numeric() {
        let data = SampleDataset::StudentGrades.load().unwrap();
        assert_eq!(
            data.numeric_columns(),
            vec!["Math", "Science", "English", "Attendance"]
        );
        let science = data.numeric_values("Science").unwrap();
        assert_eq!(science.iter().filter(|v| v.is_none()).count(), 1);
    }
}
