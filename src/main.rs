use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgAction, ArgGroup, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, Level};

use edu_insights::config::{load_settings, OutputFormat, Settings};
use edu_insights::grid::ToGrid;
use edu_insights::report::{self, ReportOptions};
use edu_insights::sample::SampleDataset;
use edu_insights::{assign_letter_grade, loader, Analyzer, Dataset};

#[derive(Parser)]
#[command(name = "edu-insights")]
#[command(about = "Explore student performance data: statistics, rankings, correlations and trends", long_about = None)]
#[command(group(
    ArgGroup::new("source")
        .args(["data", "sample"])
        .multiple(false)
))]
struct Cli {
    /// CSV or Excel file to analyze
    #[arg(long)]
    data: Option<PathBuf>,
    /// Built-in dataset to analyze instead of a file
    #[arg(long, value_enum)]
    sample: Option<SampleDataset>,
    /// JSON settings file
    #[arg(long, env = "EDU_INSIGHTS_CONFIG")]
    config: Option<PathBuf>,
    /// Output format for query results
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    /// Statistics summary of every numeric column
    Statistics,
    /// Full data with a letter grade column
    Graded,
}

#[derive(Subcommand)]
enum Commands {
    /// Record, column and numeric column counts
    Overview,
    /// Descriptive statistics for numeric columns
    Stats {
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Pass/fail counts and rates for a score column
    PassFail {
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        passing_score: Option<f64>,
    },
    /// Highest scoring students
    Top {
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Students scoring below a threshold
    Struggling {
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Mean, median, spread and range per subject
    Subjects {
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Pearson correlation matrix
    Correlations {
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Correlation between two chosen variables
    Correlate {
        #[arg(long)]
        left: String,
        #[arg(long)]
        right: String,
    },
    /// Per-student trend across chronologically ordered score columns
    Trends {
        #[arg(long)]
        id_column: Option<String>,
        #[arg(long, value_delimiter = ',', required = true)]
        scores: Vec<String>,
    },
    /// Relationship between attendance and performance
    Attendance {
        #[arg(long)]
        score_column: String,
        #[arg(long)]
        attendance_column: Option<String>,
    },
    /// Value counts of a column, e.g. an existing letter grade column
    Distribution {
        #[arg(long)]
        column: String,
    },
    /// Students per performance category
    Categories {
        #[arg(long)]
        column: Option<String>,
    },
    /// All fields of one student
    Student {
        #[arg(long)]
        id_column: Option<String>,
        #[arg(long)]
        id: String,
    },
    /// Letter grade for a single score
    Grade {
        #[arg(allow_negative_numbers = true)]
        score: f64,
    },
    /// Write a CSV export
    Export {
        #[arg(long, value_enum)]
        kind: ExportKind,
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        id_column: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let settings = load_settings(cli.config.as_deref())?;
    let format = cli.format.unwrap_or(settings.format);

    let (dataset, source) = match (&cli.data, cli.sample) {
        (Some(path), _) => (
            loader::load_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            path.display().to_string(),
        ),
        (None, sample) => {
            let sample = sample.unwrap_or(SampleDataset::StudentGrades);
            info!("using sample dataset {}", sample);
            (sample.load()?, sample.to_string())
        }
    };

    let analyzer = Analyzer::new(&dataset);
    run(cli.command, &analyzer, &settings, format, &source)
}

fn run(
    command: Commands,
    analyzer: &Analyzer<'_>,
    settings: &Settings,
    format: OutputFormat,
    source: &str,
) -> anyhow::Result<()> {
    let dataset = analyzer.dataset();

    match command {
        Commands::Overview => emit(&analyzer.overview(), format)?,
        Commands::Stats { columns } => {
            let summary = analyzer.basic_statistics(non_empty(&columns))?;
            emit(&summary, format)?;
        }
        Commands::PassFail {
            column,
            passing_score,
        } => {
            let column = score_column(dataset, column)?;
            let passing_score = passing_score.unwrap_or(settings.passing_score);
            emit(&analyzer.pass_fail_rate(&column, passing_score)?, format)?;
        }
        Commands::Top { column, limit } => {
            let column = score_column(dataset, column)?;
            let ranking = analyzer.top_performers(&column, limit.unwrap_or(settings.top_n))?;
            emit(&ranking, format)?;
        }
        Commands::Struggling {
            column,
            threshold,
            limit,
        } => {
            let column = score_column(dataset, column)?;
            let ranking = analyzer.struggling_students(
                &column,
                threshold.unwrap_or(settings.struggling_threshold),
                limit.unwrap_or(settings.top_n),
            )?;
            if ranking.is_empty() && format == OutputFormat::Text {
                println!("No students below the threshold.");
            } else {
                emit(&ranking, format)?;
            }
        }
        Commands::Subjects { columns } => {
            let subjects = subject_columns(dataset, columns, settings);
            emit(&analyzer.subject_averages(&subjects)?, format)?;
        }
        Commands::Correlations { columns } => {
            let matrix = analyzer.correlation_matrix(non_empty(&columns))?;
            if matrix.columns.len() < 2 {
                bail!("need at least 2 numeric columns for correlation analysis");
            }
            emit(&matrix, format)?;
        }
        Commands::Correlate { left, right } => {
            emit(&analyzer.correlation_between(&left, &right)?, format)?;
        }
        Commands::Trends { id_column, scores } => {
            let id_column = id_column_or_default(dataset, id_column)?;
            let trends = analyzer.grade_trends(&id_column, &scores)?;
            emit(trends.as_slice(), format)?;
        }
        Commands::Attendance {
            score_column,
            attendance_column,
        } => {
            let attendance_column = match attendance_column {
                Some(column) => column,
                None => dataset
                    .columns()
                    .iter()
                    .find(|c| c.to_lowercase().contains("attendance"))
                    .cloned()
                    .context("no attendance column found, pass --attendance-column")?,
            };
            emit(
                &analyzer.attendance_impact(&score_column, &attendance_column)?,
                format,
            )?;
        }
        Commands::Distribution { column } => {
            let counts = analyzer.grade_distribution(&column)?;
            emit(counts.as_slice(), format)?;
        }
        Commands::Categories { column } => {
            let column = score_column(dataset, column)?;
            let counts = analyzer.performance_categories(&column)?;
            emit(counts.as_slice(), format)?;
        }
        Commands::Student { id_column, id } => {
            let id_column = id_column_or_default(dataset, id_column)?;
            match analyzer.student_record(&id_column, &id)? {
                Some(record) => emit(&record, format)?,
                None => println!("No student with {id_column} = {id}."),
            }
        }
        Commands::Grade { score } => println!("{}", assign_letter_grade(score)),
        Commands::Export { kind, column, out } => {
            let grid = match kind {
                ExportKind::Statistics => analyzer.basic_statistics(None)?.to_grid(),
                ExportKind::Graded => {
                    let column = score_column(dataset, column)?;
                    analyzer.graded_export(&column)?
                }
            };
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            grid.write_csv(file)?;
            info!("wrote {} rows to {}", grid.rows.len(), out.display());
            println!("Export written to {}.", out.display());
        }
        Commands::Report {
            column,
            id_column,
            out,
        } => {
            let column = score_column(dataset, column)?;
            let id_column = id_column.or_else(|| dataset.candidate_id_columns().into_iter().next());
            let subjects = subject_columns(dataset, Vec::new(), settings);
            let options = ReportOptions {
                source,
                score_column: &column,
                id_column: id_column.as_deref(),
                passing_score: settings.passing_score,
                struggling_threshold: settings.struggling_threshold,
                top_n: settings.top_n,
                subjects: &subjects,
            };
            let report = report::build_report(analyzer, &options, chrono::Utc::now())?;
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn emit<T: Serialize + ToGrid + ?Sized>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", value.to_grid().render_text()),
        OutputFormat::Csv => value.to_grid().write_csv(io::stdout().lock())?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn non_empty(columns: &[String]) -> Option<&[String]> {
    if columns.is_empty() {
        None
    } else {
        Some(columns)
    }
}

/// Explicit column, or the first numeric column of the dataset.
fn score_column(dataset: &Dataset, column: Option<String>) -> anyhow::Result<String> {
    match column {
        Some(column) => Ok(column),
        None => dataset
            .numeric_columns()
            .into_iter()
            .next()
            .context("dataset has no numeric columns"),
    }
}

fn id_column_or_default(dataset: &Dataset, column: Option<String>) -> anyhow::Result<String> {
    match column {
        Some(column) => Ok(column),
        None => dataset
            .candidate_id_columns()
            .into_iter()
            .next()
            .context("no student ID or name column detected, pass --id-column"),
    }
}

/// Requested subjects, then configured ones, then up to five numeric columns.
fn subject_columns(dataset: &Dataset, requested: Vec<String>, settings: &Settings) -> Vec<String> {
    if !requested.is_empty() {
        return requested;
    }
    if !settings.subjects.is_empty() {
        return settings.subjects.clone();
    }
    dataset.numeric_columns().into_iter().take(5).collect()
}
