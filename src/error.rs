use thiserror::Error;

/// Errors raised by the analytical queries over a [`crate::dataset::Dataset`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("column '{0}' not found in dataset")]
    ColumnNotFound(String),

    #[error("column '{0}' contains non-numeric values")]
    NonNumericColumn(String),

    #[error("{operation} needs at least {required} paired observations, found {found}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        found: usize,
    },

    #[error("correlation between '{left}' and '{right}' is undefined (zero variance)")]
    UndefinedCorrelation { left: String, right: String },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
}

/// Errors raised while turning a file into a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file format '{0}', use CSV or Excel files")]
    UnsupportedFormat(String),

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read workbook: {0}")]
    Excel(#[from] calamine::Error),

    #[error("workbook has no worksheets")]
    EmptyWorkbook,

    #[error("input has no header row")]
    NoHeader,

    #[error(transparent)]
    Dataset(#[from] AnalysisError),
}
