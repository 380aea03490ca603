//! Row/column rendering of analysis results for tables, CSV exports and
//! chart input.

use std::fmt::Write as _;
use std::io;

use crate::dataset::Cell;
use crate::grades::CategoryCount;
use crate::models::{
    AttendanceImpact, ColumnSummary, CorrelationMatrix, DatasetOverview, PairCorrelation,
    PassFailResult, Ranking, StatisticsSummary, StudentRecord, SubjectAverages, TrendResult,
    ValueCount,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(&self.headers)?;
        for row in &self.rows {
            out.write_record(row)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Left-aligned plain-text table.
    pub fn render_text(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (idx, value) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(idx) {
                    *width = (*width).max(value.chars().count());
                }
            }
        }

        let mut output = String::new();
        write_line(&mut output, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(&mut output, &rule, &widths);
        for row in &self.rows {
            write_line(&mut output, row, &widths);
        }
        output
    }
}

fn write_line(output: &mut String, values: &[String], widths: &[usize]) {
    let cells: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("{value:<width$}"))
        .collect();
    let _ = writeln!(output, "{}", cells.join("  ").trim_end());
}

/// Missing and undefined numbers render as empty cells.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

pub fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Number(value) => format_number(*value),
        other => other.to_string(),
    }
}

fn metrics(pairs: Vec<(&str, String)>) -> Grid {
    Grid {
        headers: vec!["metric".into(), "value".into()],
        rows: pairs
            .into_iter()
            .map(|(name, value)| vec![name.to_string(), value])
            .collect(),
    }
}

fn stat_row(
    label: &str,
    columns: &[ColumnSummary],
    pick: impl Fn(&ColumnSummary) -> String,
) -> Vec<String> {
    let mut out = vec![label.to_string()];
    out.extend(columns.iter().map(pick));
    out
}

pub trait ToGrid {
    fn to_grid(&self) -> Grid;
}

impl ToGrid for StatisticsSummary {
    fn to_grid(&self) -> Grid {
        let mut headers = vec!["statistic".to_string()];
        headers.extend(self.columns.iter().map(|c| c.column.clone()));

        let cols = &self.columns;
        let rows = vec![
            stat_row("count", cols, |c| c.count.to_string()),
            stat_row("mean", cols, |c| format_number(c.mean)),
            stat_row("std", cols, |c| format_number(c.std)),
            stat_row("min", cols, |c| format_number(c.min)),
            stat_row("25%", cols, |c| format_number(c.p25)),
            stat_row("50%", cols, |c| format_number(c.median)),
            stat_row("75%", cols, |c| format_number(c.p75)),
            stat_row("max", cols, |c| format_number(c.max)),
        ];

        Grid { headers, rows }
    }
}

impl ToGrid for PassFailResult {
    fn to_grid(&self) -> Grid {
        metrics(vec![
            ("total_students", self.total_students.to_string()),
            ("passed", self.passed.to_string()),
            ("failed", self.failed.to_string()),
            ("pass_rate", format_number(self.pass_rate)),
            ("fail_rate", format_number(self.fail_rate)),
        ])
    }
}

impl ToGrid for Ranking {
    fn to_grid(&self) -> Grid {
        let mut headers = vec!["row".to_string()];
        headers.extend(self.columns.iter().cloned());
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = vec![row.position.to_string()];
                out.extend(row.cells.iter().map(format_cell));
                out
            })
            .collect();
        Grid { headers, rows }
    }
}

impl ToGrid for SubjectAverages {
    fn to_grid(&self) -> Grid {
        Grid {
            headers: ["subject", "mean", "median", "std", "min", "max"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            rows: self
                .subjects
                .iter()
                .map(|s| {
                    vec![
                        s.subject.clone(),
                        format_number(s.mean),
                        format_number(s.median),
                        format_number(s.std),
                        format_number(s.min),
                        format_number(s.max),
                    ]
                })
                .collect(),
        }
    }
}

impl ToGrid for CorrelationMatrix {
    fn to_grid(&self) -> Grid {
        let mut headers = vec![String::new()];
        headers.extend(self.columns.iter().cloned());
        let rows = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(name, values)| {
                let mut out = vec![name.clone()];
                out.extend(values.iter().map(|v| format_number(*v)));
                out
            })
            .collect();
        Grid { headers, rows }
    }
}

impl ToGrid for [TrendResult] {
    fn to_grid(&self) -> Grid {
        Grid {
            headers: ["student_id", "trend", "avg_change", "first_score", "last_score"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            rows: self
                .iter()
                .map(|t| {
                    vec![
                        format_cell(&t.student_id),
                        t.trend.to_string(),
                        format_number(t.avg_change),
                        format_optional(t.first_score),
                        format_optional(t.last_score),
                    ]
                })
                .collect(),
        }
    }
}

impl ToGrid for AttendanceImpact {
    fn to_grid(&self) -> Grid {
        metrics(vec![
            ("correlation", format_number(self.correlation)),
            ("p_value", format_number(self.p_value)),
            ("observations", self.observations.to_string()),
            ("interpretation", self.interpretation.to_string()),
        ])
    }
}

impl ToGrid for PairCorrelation {
    fn to_grid(&self) -> Grid {
        metrics(vec![
            ("left", self.left.clone()),
            ("right", self.right.clone()),
            ("correlation", format_number(self.correlation)),
            ("observations", self.observations.to_string()),
            ("strength", self.strength.to_string()),
        ])
    }
}

impl ToGrid for DatasetOverview {
    fn to_grid(&self) -> Grid {
        metrics(vec![
            ("records", self.records.to_string()),
            ("columns", self.columns.to_string()),
            ("numeric_columns", self.numeric_columns.len().to_string()),
        ])
    }
}

impl ToGrid for [ValueCount] {
    fn to_grid(&self) -> Grid {
        Grid {
            headers: vec!["value".into(), "count".into()],
            rows: self
                .iter()
                .map(|v| vec![v.value.clone(), v.count.to_string()])
                .collect(),
        }
    }
}

impl ToGrid for [CategoryCount] {
    fn to_grid(&self) -> Grid {
        Grid {
            headers: vec!["category".into(), "count".into()],
            rows: self
                .iter()
                .map(|c| vec![c.category.to_string(), c.count.to_string()])
                .collect(),
        }
    }
}

impl ToGrid for StudentRecord {
    fn to_grid(&self) -> Grid {
        Grid {
            headers: vec!["field".into(), "value".into()],
            rows: self
                .fields
                .iter()
                .map(|(name, cell)| vec![name.clone(), format_cell(cell)])
                .collect(),
        }
    }
}

impl ToGrid for Grid {
    fn to_grid(&self) -> Grid {
        self.clone()
    }
}
