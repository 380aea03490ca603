use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::AnalysisError;

/// A single typed cell of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Matches a user-supplied identifier against this cell. Numeric cells
    /// compare numerically so "7" finds a cell holding `7.0`.
    pub fn matches_key(&self, key: &str) -> bool {
        match self {
            Cell::Text(text) => text == key,
            Cell::Number(value) => key
                .trim()
                .parse::<f64>()
                .map(|parsed| parsed == *value)
                .unwrap_or(false),
            Cell::Missing => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(value) => write!(f, "{value}"),
            Cell::Text(text) => f.write_str(text),
            Cell::Missing => Ok(()),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Missing)
    }
}

/// Immutable tabular snapshot. Columns keep their declared order and every
/// row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Non-finite numbers are stored as missing cells.
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Result<Self, AnalysisError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(AnalysisError::DuplicateColumn(name.clone()));
            }
        }

        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(AnalysisError::RaggedRow {
                    row,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
        }

        for cell in rows.iter_mut().flatten() {
            if matches!(cell, Cell::Number(value) if !value.is_finite()) {
                *cell = Cell::Missing;
            }
        }

        Ok(Self {
            columns,
            index,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize, AnalysisError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| AnalysisError::ColumnNotFound(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Cell> + '_, AnalysisError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Values of a numeric column with missing cells kept as `None` so
    /// positions still line up with rows.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>, AnalysisError> {
        self.column(name)?
            .map(|cell| match cell {
                Cell::Number(value) => Ok(Some(*value)),
                Cell::Missing => Ok(None),
                Cell::Text(_) => Err(AnalysisError::NonNumericColumn(name.to_string())),
            })
            .collect()
    }

    pub fn is_numeric_column(&self, idx: usize) -> bool {
        self.rows
            .iter()
            .all(|row| !matches!(row.get(idx), Some(Cell::Text(_))))
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.is_numeric_column(*idx))
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Columns that look like student identifiers or names.
    pub fn candidate_id_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|name| {
                let lower = name.to_lowercase();
                lower.contains("id") || lower.contains("name")
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["name".into(), "score".into(), "notes".into()],
            vec![
                vec!["Avery".into(), 91.0.into(), "steady".into()],
                vec!["Jules".into(), Cell::Missing, Cell::Missing],
                vec!["Kiara".into(), 77.5.into(), "improving".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0.into(), 2.0.into()], vec![3.0.into()]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn non_finite_numbers_become_missing() {
        let data = Dataset::new(
            vec!["score".into()],
            vec![
                vec![f64::NAN.into()],
                vec![f64::INFINITY.into()],
                vec![72.0.into()],
            ],
        )
        .unwrap();
        assert_eq!(data.rows()[0][0], Cell::Missing);
        assert_eq!(
            data.numeric_values("score").unwrap(),
            vec![None, None, Some(72.0)]
        );
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = Dataset::new(vec!["a".into(), "a".into()], Vec::new()).unwrap_err();
        assert_eq!(err, AnalysisError::DuplicateColumn("a".into()));
    }

    #[test]
    fn numeric_detection_ignores_missing_cells() {
        let data = sample();
        assert_eq!(data.numeric_columns(), vec!["score".to_string()]);
        assert_eq!(
            data.numeric_values("score").unwrap(),
            vec![Some(91.0), None, Some(77.5)]
        );
    }

    #[test]
    fn numeric_values_reject_text_columns() {
        let data = sample();
        assert_eq!(
            data.numeric_values("notes").unwrap_err(),
            AnalysisError::NonNumericColumn("notes".into())
        );
    }

    #[test]
    fn unknown_column_is_reported_by_name() {
        let data = sample();
        assert_eq!(
            data.column_index("gpa").unwrap_err(),
            AnalysisError::ColumnNotFound("gpa".into())
        );
        assert!(!data.has_column("gpa"));
    }

    #[test]
    fn id_candidates_match_case_insensitively() {
        let data = Dataset::new(
            vec!["Student_ID".into(), "Full Name".into(), "Math".into()],
            Vec::new(),
        )
        .unwrap();
        assert_eq!(
            data.candidate_id_columns(),
            vec!["Student_ID".to_string(), "Full Name".to_string()]
        );
    }

    #[test]
    fn numeric_cells_match_numeric_keys() {
        assert!(Cell::Number(7.0).matches_key("7"));
        assert!(Cell::Text("S007".into()).matches_key("S007"));
        assert!(!Cell::Missing.matches_key(""));
    }
}
