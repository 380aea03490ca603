use std::collections::HashMap;

use tracing::{debug, warn};

use crate::dataset::{Cell, Dataset};
use crate::error::AnalysisError;
use crate::grades::{self, CategoryCount};
use crate::grid::{format_number, Grid};
use crate::models::{
    AttendanceImpact, ColumnSummary, CorrelationMatrix, DatasetOverview, Interpretation,
    PairCorrelation, PassFailResult, RankedRow, Ranking, StatisticsSummary, Strength,
    StudentRecord, SubjectAverage, SubjectAverages, Trend, TrendResult, ValueCount,
};
use crate::stats;

/// Read-only query engine over one dataset snapshot. Every method is a pure
/// function of the snapshot and its arguments, and results own their data.
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'a> {
    dataset: &'a Dataset,
}

impl<'a> Analyzer<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn overview(&self) -> DatasetOverview {
        DatasetOverview {
            records: self.dataset.len(),
            columns: self.dataset.columns().len(),
            numeric_columns: self.dataset.numeric_columns(),
        }
    }

    /// Describe-style summary. Without an explicit list every numeric column
    /// is summarized.
    pub fn basic_statistics(
        &self,
        columns: Option<&[String]>,
    ) -> Result<StatisticsSummary, AnalysisError> {
        let columns = self.resolve_columns(columns)?;
        debug!("computing statistics for {} columns", columns.len());

        let mut summaries = Vec::with_capacity(columns.len());
        for column in columns {
            let sorted = stats::present_sorted(&self.dataset.numeric_values(&column)?);
            summaries.push(ColumnSummary {
                count: sorted.len(),
                mean: stats::mean(&sorted),
                std: stats::std_dev(&sorted),
                min: sorted.first().copied().unwrap_or(f64::NAN),
                p25: stats::quantile_sorted(&sorted, 0.25),
                median: stats::median_sorted(&sorted),
                p75: stats::quantile_sorted(&sorted, 0.75),
                max: sorted.last().copied().unwrap_or(f64::NAN),
                column,
            });
        }

        Ok(StatisticsSummary { columns: summaries })
    }

    /// `score >= passing_score` passes. Rows without a score are not counted.
    pub fn pass_fail_rate(
        &self,
        score_column: &str,
        passing_score: f64,
    ) -> Result<PassFailResult, AnalysisError> {
        let values = self.dataset.numeric_values(score_column)?;
        let scores: Vec<f64> = values.into_iter().flatten().collect();

        let total = scores.len();
        let passed = scores.iter().filter(|s| **s >= passing_score).count();
        let failed = total - passed;
        let rate = |part: usize| {
            if total == 0 {
                0.0
            } else {
                part as f64 / total as f64 * 100.0
            }
        };

        debug!(
            "pass/fail on '{}' at {}: {} of {} passed",
            score_column, passing_score, passed, total
        );

        Ok(PassFailResult {
            total_students: total,
            passed,
            failed,
            pass_rate: rate(passed),
            fail_rate: rate(failed),
        })
    }

    /// Highest scores first; equal scores keep their original order.
    pub fn top_performers(&self, score_column: &str, n: usize) -> Result<Ranking, AnalysisError> {
        let mut scored = self.scored_rows(score_column)?;
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(self.ranking(score_column, scored, n))
    }

    /// Rows strictly below `threshold`, lowest first.
    pub fn struggling_students(
        &self,
        score_column: &str,
        threshold: f64,
        n: usize,
    ) -> Result<Ranking, AnalysisError> {
        let mut scored: Vec<(usize, f64)> = self
            .scored_rows(score_column)?
            .into_iter()
            .filter(|(_, score)| *score < threshold)
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(self.ranking(score_column, scored, n))
    }

    /// Per-subject mean, median, std, min and max. Names that are not columns
    /// are skipped and listed in the result instead of failing the call.
    pub fn subject_averages(&self, subjects: &[String]) -> Result<SubjectAverages, AnalysisError> {
        let mut averages = Vec::new();
        let mut skipped = Vec::new();

        for subject in subjects {
            if !self.dataset.has_column(subject) {
                warn!("skipping unknown subject column '{}'", subject);
                skipped.push(subject.clone());
                continue;
            }

            let sorted = stats::present_sorted(&self.dataset.numeric_values(subject)?);
            averages.push(SubjectAverage {
                subject: subject.clone(),
                mean: stats::mean(&sorted),
                median: stats::median_sorted(&sorted),
                std: stats::std_dev(&sorted),
                min: sorted.first().copied().unwrap_or(f64::NAN),
                max: sorted.last().copied().unwrap_or(f64::NAN),
            });
        }

        Ok(SubjectAverages {
            subjects: averages,
            skipped,
        })
    }

    /// Pairwise Pearson matrix over complete pairs. Undefined pairs are `NaN`;
    /// the diagonal is always 1.
    pub fn correlation_matrix(
        &self,
        columns: Option<&[String]>,
    ) -> Result<CorrelationMatrix, AnalysisError> {
        let columns = self.resolve_columns(columns)?;
        let series = columns
            .iter()
            .map(|c| self.dataset.numeric_values(c))
            .collect::<Result<Vec<_>, _>>()?;

        let size = columns.len();
        let mut values = vec![vec![f64::NAN; size]; size];
        for i in 0..size {
            values[i][i] = 1.0;
            for j in (i + 1)..size {
                let r = stats::pearson(&stats::paired(&series[i], &series[j]));
                if r.is_none() {
                    warn!(
                        "correlation between '{}' and '{}' is undefined",
                        columns[i], columns[j]
                    );
                }
                let r = r.unwrap_or(f64::NAN);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(CorrelationMatrix { columns, values })
    }

    /// Single coefficient between two chosen variables.
    pub fn correlation_between(
        &self,
        left: &str,
        right: &str,
    ) -> Result<PairCorrelation, AnalysisError> {
        let pairs = stats::paired(
            &self.dataset.numeric_values(left)?,
            &self.dataset.numeric_values(right)?,
        );
        if pairs.len() < 2 {
            return Err(AnalysisError::InsufficientData {
                operation: "correlation",
                required: 2,
                found: pairs.len(),
            });
        }
        let correlation =
            stats::pearson(&pairs).ok_or_else(|| AnalysisError::UndefinedCorrelation {
                left: left.to_string(),
                right: right.to_string(),
            })?;

        Ok(PairCorrelation {
            left: left.to_string(),
            right: right.to_string(),
            correlation,
            observations: pairs.len(),
            strength: Strength::detail(correlation),
        })
    }

    /// One trend per row, comparing the first and last present score across
    /// the chronologically ordered `score_columns`.
    pub fn grade_trends(
        &self,
        student_id_column: &str,
        score_columns: &[String],
    ) -> Result<Vec<TrendResult>, AnalysisError> {
        let id_idx = self.dataset.column_index(student_id_column)?;
        let series = score_columns
            .iter()
            .map(|c| self.dataset.numeric_values(c))
            .collect::<Result<Vec<_>, _>>()?;

        let trends = self
            .dataset
            .rows()
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let scores: Vec<f64> = series.iter().filter_map(|s| s[row]).collect();
                classify_trend(cells[id_idx].clone(), &scores)
            })
            .collect();

        Ok(trends)
    }

    /// Pearson r between attendance and score with its two-sided p-value.
    pub fn attendance_impact(
        &self,
        score_column: &str,
        attendance_column: &str,
    ) -> Result<AttendanceImpact, AnalysisError> {
        let pairs = stats::paired(
            &self.dataset.numeric_values(attendance_column)?,
            &self.dataset.numeric_values(score_column)?,
        );
        if pairs.len() < 3 {
            return Err(AnalysisError::InsufficientData {
                operation: "attendance impact",
                required: 3,
                found: pairs.len(),
            });
        }

        let correlation =
            stats::pearson(&pairs).ok_or_else(|| AnalysisError::UndefinedCorrelation {
                left: attendance_column.to_string(),
                right: score_column.to_string(),
            })?;
        let p_value = stats::pearson_p_value(correlation, pairs.len());

        Ok(AttendanceImpact {
            correlation,
            p_value,
            observations: pairs.len(),
            interpretation: Interpretation::from_correlation(correlation),
        })
    }

    /// Occurrences of each distinct value, most frequent first. Ties keep the
    /// order of first appearance.
    pub fn grade_distribution(&self, column: &str) -> Result<Vec<ValueCount>, AnalysisError> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<ValueCount> = Vec::new();

        for cell in self.dataset.column(column)? {
            let value = match cell {
                Cell::Missing => continue,
                Cell::Number(n) => format_number(*n),
                Cell::Text(t) => t.clone(),
            };
            match seen.get(&value) {
                Some(&slot) => counts[slot].count += 1,
                None => {
                    seen.insert(value.clone(), counts.len());
                    counts.push(ValueCount { value, count: 1 });
                }
            }
        }

        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(counts)
    }

    pub fn performance_categories(
        &self,
        score_column: &str,
    ) -> Result<Vec<CategoryCount>, AnalysisError> {
        Ok(grades::categorize_scores(
            &self.dataset.numeric_values(score_column)?,
        ))
    }

    /// First row whose id cell matches `id`.
    pub fn student_record(
        &self,
        id_column: &str,
        id: &str,
    ) -> Result<Option<StudentRecord>, AnalysisError> {
        let id_idx = self.dataset.column_index(id_column)?;
        let found = self
            .dataset
            .rows()
            .iter()
            .position(|cells| cells[id_idx].matches_key(id));

        Ok(found.map(|position| StudentRecord {
            position,
            fields: self
                .dataset
                .columns()
                .iter()
                .cloned()
                .zip(self.dataset.rows()[position].iter().cloned())
                .collect(),
        }))
    }

    pub fn graded_export(&self, score_column: &str) -> Result<Grid, AnalysisError> {
        grades::graded_export(self.dataset, score_column)
    }

    fn resolve_columns(&self, columns: Option<&[String]>) -> Result<Vec<String>, AnalysisError> {
        match columns {
            None => Ok(self.dataset.numeric_columns()),
            Some(names) => {
                for name in names {
                    self.dataset.column_index(name)?;
                }
                Ok(names.to_vec())
            }
        }
    }

    fn scored_rows(&self, score_column: &str) -> Result<Vec<(usize, f64)>, AnalysisError> {
        Ok(self
            .dataset
            .numeric_values(score_column)?
            .into_iter()
            .enumerate()
            .filter_map(|(idx, score)| score.map(|s| (idx, s)))
            .collect())
    }

    fn ranking(&self, score_column: &str, ordered: Vec<(usize, f64)>, n: usize) -> Ranking {
        Ranking {
            score_column: score_column.to_string(),
            columns: self.dataset.columns().to_vec(),
            rows: ordered
                .into_iter()
                .take(n)
                .map(|(position, _)| RankedRow {
                    position,
                    cells: self.dataset.rows()[position].clone(),
                })
                .collect(),
        }
    }
}

fn classify_trend(student_id: Cell, scores: &[f64]) -> TrendResult {
    let first_score = scores.first().copied();
    let last_score = scores.last().copied();

    let (trend, avg_change) = match (first_score, last_score) {
        (Some(first), Some(last)) if scores.len() >= 2 => {
            let trend = if last > first {
                Trend::Improving
            } else if last < first {
                Trend::Declining
            } else {
                Trend::Stable
            };
            (trend, (last - first) / scores.len() as f64)
        }
        _ => (Trend::InsufficientData, 0.0),
    };

    TrendResult {
        student_id,
        trend,
        avg_change,
        first_score,
        last_score,
    }
}
