use std::fmt;

use serde::{Serialize, Serializer};

use crate::dataset::Cell;

/// Describe-style summary of one numeric column. Undefined entries are `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassFailResult {
    pub total_students: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub fail_rate: f64,
}

/// A row copied out of the dataset, tagged with its original position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub position: usize,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub score_column: String,
    pub columns: Vec<String>,
    pub rows: Vec<RankedRow>,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of `column` for each ranked row, in ranking order.
    pub fn values(&self, column: &str) -> Vec<&Cell> {
        match self.columns.iter().position(|name| name == column) {
            Some(idx) => self.rows.iter().map(|row| &row.cells[idx]).collect(),
            None => Vec::new(),
        }
    }

    pub fn scores(&self) -> Vec<f64> {
        self.values(&self.score_column)
            .into_iter()
            .filter_map(Cell::as_number)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAverage {
    pub subject: String,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAverages {
    pub subjects: Vec<SubjectAverage>,
    /// Requested names that are not columns of the dataset.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, left: &str, right: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == left)?;
        let j = self.columns.iter().position(|c| c == right)?;
        Some(self.values[i][j])
    }

    /// Off-diagonal pairs with a defined coefficient, strongest first.
    pub fn strongest_pairs(&self) -> Vec<(&str, &str, f64)> {
        let mut pairs = Vec::new();
        for i in 0..self.columns.len() {
            for j in (i + 1)..self.columns.len() {
                let value = self.values[i][j];
                if value.is_finite() {
                    pairs.push((self.columns[i].as_str(), self.columns[j].as_str(), value));
                }
            }
        }
        pairs.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
            Trend::InsufficientData => "insufficient_data",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub student_id: Cell,
    pub trend: Trend,
    pub avg_change: f64,
    pub first_score: Option<f64>,
    pub last_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
    VeryWeak,
}

impl Strength {
    pub fn from_correlation(r: f64) -> Self {
        match r.abs() {
            v if v >= 0.7 => Strength::Strong,
            v if v >= 0.4 => Strength::Moderate,
            v if v >= 0.2 => Strength::Weak,
            _ => Strength::VeryWeak,
        }
    }

    /// Coarser three-level label used when comparing two chosen variables.
    pub fn detail(r: f64) -> Self {
        match r.abs() {
            v if v >= 0.7 => Strength::Strong,
            v if v >= 0.4 => Strength::Moderate,
            _ => Strength::Weak,
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strength::Strong => "strong",
            Strength::Moderate => "moderate",
            Strength::Weak => "weak",
            Strength::VeryWeak => "very weak",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Negative,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Positive => "positive",
            Direction::Negative => "negative",
        })
    }
}

/// Categorical reading of a correlation, e.g. "moderate positive".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpretation {
    pub strength: Strength,
    pub direction: Direction,
}

impl Interpretation {
    /// Zero counts as positive.
    pub fn from_correlation(r: f64) -> Self {
        Self {
            strength: Strength::from_correlation(r),
            direction: if r >= 0.0 {
                Direction::Positive
            } else {
                Direction::Negative
            },
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.strength, self.direction)
    }
}

impl Serialize for Interpretation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceImpact {
    pub correlation: f64,
    pub p_value: f64,
    pub observations: usize,
    pub interpretation: Interpretation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairCorrelation {
    pub left: String,
    pub right: String,
    pub correlation: f64,
    pub observations: usize,
    pub strength: Strength,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub records: usize,
    pub columns: usize,
    pub numeric_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub position: usize,
    pub fields: Vec<(String, Cell)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpretation_bands() {
        assert_eq!(
            Interpretation::from_correlation(0.85).to_string(),
            "strong positive"
        );
        assert_eq!(
            Interpretation::from_correlation(-0.4).to_string(),
            "moderate negative"
        );
        assert_eq!(
            Interpretation::from_correlation(0.25).to_string(),
            "weak positive"
        );
        assert_eq!(
            Interpretation::from_correlation(-0.1).to_string(),
            "very weak negative"
        );
    }

    #[test]
    fn zero_correlation_reads_as_positive() {
        let interpretation = Interpretation::from_correlation(0.0);
        assert_eq!(interpretation.direction, Direction::Positive);
        assert_eq!(interpretation.to_string(), "very weak positive");
    }

    #[test]
    fn detail_strength_has_three_levels() {
        assert_eq!(Strength::detail(0.72), Strength::Strong);
        assert_eq!(Strength::detail(-0.5), Strength::Moderate);
        assert_eq!(Strength::detail(0.1), Strength::Weak);
    }

    #[test]
    fn interpretation_serializes_as_label() {
        let json = serde_json::to_string(&Interpretation::from_correlation(-0.75)).unwrap();
        assert_eq!(json, "\"strong negative\"");
    }

    #[test]
    fn strongest_pairs_skip_undefined_entries() {
        let matrix = CorrelationMatrix {
            columns: vec!["a".into(), "b".into(), "c".into()],
            values: vec![
                vec![1.0, 0.3, -0.9],
                vec![0.3, 1.0, f64::NAN],
                vec![-0.9, f64::NAN, 1.0],
            ],
        };
        let pairs = matrix.strongest_pairs();
        assert_eq!(pairs, vec![("a", "c", -0.9), ("a", "b", 0.3)]);
        assert_eq!(matrix.get("c", "a"), Some(-0.9));
    }
}
