use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::analyzer::Analyzer;
use crate::error::AnalysisError;
use crate::grid::format_number;
use crate::models::{Interpretation, RankedRow, Ranking};

pub struct ReportOptions<'a> {
    pub source: &'a str,
    pub score_column: &'a str,
    pub id_column: Option<&'a str>,
    pub passing_score: f64,
    pub struggling_threshold: f64,
    pub top_n: usize,
    pub subjects: &'a [String],
}

pub fn build_report(
    analyzer: &Analyzer<'_>,
    options: &ReportOptions<'_>,
    generated_at: DateTime<Utc>,
) -> Result<String, AnalysisError> {
    let overview = analyzer.overview();
    let pass_fail = analyzer.pass_fail_rate(options.score_column, options.passing_score)?;
    let top = analyzer.top_performers(options.score_column, options.top_n)?;
    let struggling = analyzer.struggling_students(
        options.score_column,
        options.struggling_threshold,
        options.top_n,
    )?;
    let subjects = analyzer.subject_averages(options.subjects)?;
    let correlations = analyzer.correlation_matrix(None)?;

    let mut output = String::new();

    let _ = writeln!(output, "# Educational Data Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        options.source,
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Records: {}", overview.records);
    let _ = writeln!(output, "- Columns: {}", overview.columns);
    let _ = writeln!(
        output,
        "- Numeric columns: {}",
        if overview.numeric_columns.is_empty() {
            "none".to_string()
        } else {
            overview.numeric_columns.join(", ")
        }
    );

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## Pass/Fail on {} (passing score {})",
        options.score_column,
        format_number(options.passing_score)
    );
    if pass_fail.total_students == 0 {
        let _ = writeln!(output, "No scores recorded in this column.");
    } else {
        let _ = writeln!(
            output,
            "- {} of {} students passed ({:.1}%), {} failed ({:.1}%)",
            pass_fail.passed,
            pass_fail.total_students,
            pass_fail.pass_rate,
            pass_fail.failed,
            pass_fail.fail_rate
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Performers");
    write_ranking(&mut output, &top, options.id_column, "No scored students.");

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## Students Needing Support (below {})",
        format_number(options.struggling_threshold)
    );
    write_ranking(
        &mut output,
        &struggling,
        options.id_column,
        "No students below the threshold.",
    );

    if !options.subjects.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Subject Averages");
        for subject in &subjects.subjects {
            let _ = writeln!(
                output,
                "- {}: mean {:.1}, median {:.1}, range {}-{}",
                subject.subject,
                subject.mean,
                subject.median,
                format_number(subject.min),
                format_number(subject.max)
            );
        }
        if !subjects.skipped.is_empty() {
            let _ = writeln!(output, "- Not found: {}", subjects.skipped.join(", "));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Strongest Correlations");
    let pairs = correlations.strongest_pairs();
    if pairs.is_empty() {
        let _ = writeln!(output, "Not enough numeric data to correlate.");
    } else {
        for (left, right, r) in pairs.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} vs {}: {:.3} ({})",
                left,
                right,
                r,
                Interpretation::from_correlation(*r)
            );
        }
    }

    Ok(output)
}

fn write_ranking(output: &mut String, ranking: &Ranking, id_column: Option<&str>, empty: &str) {
    if ranking.is_empty() {
        let _ = writeln!(output, "{empty}");
        return;
    }

    let labels = id_column.map(|column| ranking.values(column));
    let scores = ranking.values(&ranking.score_column);
    for (idx, row) in ranking.rows.iter().enumerate() {
        let label = match &labels {
            Some(values) if idx < values.len() => values[idx].to_string(),
            _ => row_label(row),
        };
        let score = scores.get(idx).map(|c| c.to_string()).unwrap_or_default();
        let _ = writeln!(output, "- {label}: {score}");
    }
}

fn row_label(row: &RankedRow) -> String {
    format!("row {}", row.position)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dataset::{Cell, Dataset};

    fn roster() -> Dataset {
        Dataset::new(
            vec!["Student_ID".into(), "Math".into(), "Science".into()],
            vec![
                vec!["S1".into(), 95.0.into(), 80.0.into()],
                vec!["S2".into(), 40.0.into(), 55.0.into()],
                vec!["S3".into(), 70.0.into(), Cell::Missing],
                vec!["S4".into(), 61.0.into(), 85.0.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn report_lists_each_section() {
        let data = roster();
        let analyzer = Analyzer::new(&data);
        let subjects = vec!["Math".to_string(), "Art".to_string()];
        let options = ReportOptions {
            source: "roster.csv",
            score_column: "Math",
            id_column: Some("Student_ID"),
            passing_score: 60.0,
            struggling_threshold: 50.0,
            top_n: 2,
            subjects: &subjects,
        };
        let generated_at = Utc.with_ymd_and_hms(2026, 2, 3, 9, 30, 0).unwrap();

        let report = build_report(&analyzer, &options, generated_at).unwrap();
        let expected = "\
# Educational Data Report
Generated for roster.csv on 2026-02-03 09:30 UTC

## Overview
- Records: 4
- Columns: 3
- Numeric columns: Math, Science

## Pass/Fail on Math (passing score 60)
- 3 of 4 students passed (75.0%), 1 failed (25.0%)

## Top Performers
- S1: 95
- S3: 70

## Students Needing Support (below 50)
- S2: 40

## Subject Averages
- Math: mean 66.5, median 65.5, range 40-95
- Not found: Art

## Strongest Correlations
- Math vs Science: 0.686 (moderate positive)
";
        assert_eq!(report, expected);
    }

    #[test]
    fn report_without_ids_uses_row_positions() {
        let data = roster();
        let analyzer = Analyzer::new(&data);
        let options = ReportOptions {
            source: "sample",
            score_column: "Math",
            id_column: None,
            passing_score: 60.0,
            struggling_threshold: 50.0,
            top_n: 1,
            subjects: &[],
        };
        let report = build_report(&analyzer, &options, Utc::now()).unwrap();
        assert!(report.contains("## Top Performers\n- row 0: 95\n"));
        assert!(!report.contains("## Subject Averages"));
    }

    #[test]
    fn report_requires_score_column() {
        let data = roster();
        let analyzer = Analyzer::new(&data);
        let options = ReportOptions {
            source: "sample",
            score_column: "History",
            id_column: None,
            passing_score: 60.0,
            struggling_threshold: 50.0,
            top_n: 3,
            subjects: &[],
        };
        assert_eq!(
            build_report(&analyzer, &options, Utc::now()).unwrap_err(),
            AnalysisError::ColumnNotFound("History".into())
        );
    }
}
