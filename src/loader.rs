use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::info;

use crate::dataset::{Cell, Dataset};
use crate::error::LoadError;

/// Tokens read as a missing value.
const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Loads a CSV or Excel file, choosing the reader from the file extension.
pub fn load_path(path: &Path) -> Result<Dataset, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let dataset = match extension.as_str() {
        "csv" => load_csv(std::fs::File::open(path)?)?,
        "xlsx" | "xls" | "xlsm" | "ods" => load_workbook(path)?,
        _ => return Err(LoadError::UnsupportedFormat(path.display().to_string())),
    };

    info!(
        "loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.columns().len(),
        path.display()
    );
    Ok(dataset)
}

pub fn load_csv<R: Read>(input: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(LoadError::NoHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut cells: Vec<Cell> = record.iter().map(parse_cell).collect();
        // Short records are padded so trailing empty fields still count.
        cells.resize(headers.len().max(cells.len()), Cell::Missing);
        rows.push(cells);
    }

    Ok(Dataset::new(headers, rows)?)
}

pub fn load_workbook(path: &Path) -> Result<Dataset, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::EmptyWorkbook)??;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .ok_or(LoadError::NoHeader)?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let rows = sheet_rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(Dataset::new(headers, rows)?)
}

/// Parses one raw field: NA tokens become missing, numbers become numeric,
/// anything else stays text.
pub fn parse_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if MISSING_TOKENS.contains(&trimmed) {
        return Cell::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Cell::Number(value),
        // "inf", "NAN" and friends parse as floats but carry no score.
        Ok(_) => Cell::Missing,
        Err(_) => Cell::Text(raw.to_string()),
    }
}

fn workbook_cell(cell: &Data) -> Cell {
    match cell {
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) if value.is_finite() => Cell::Number(*value),
        Data::Float(_) => Cell::Missing,
        Data::String(text) if MISSING_TOKENS.contains(&text.trim()) => Cell::Missing,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Empty | Data::Error(_) => Cell::Missing,
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_typed_cells() {
        assert_eq!(parse_cell("87.5"), Cell::Number(87.5));
        assert_eq!(parse_cell(" 90 "), Cell::Number(90.0));
        assert_eq!(parse_cell("NA"), Cell::Missing);
        assert_eq!(parse_cell(""), Cell::Missing);
        assert_eq!(parse_cell("Avery Lee"), Cell::Text("Avery Lee".into()));
    }

    #[test]
    fn non_finite_numbers_load_as_missing() {
        for raw in ["NAN", "Nan", "-nan", "inf", "-Infinity"] {
            assert_eq!(parse_cell(raw), Cell::Missing, "{raw}");
        }
        assert_eq!(workbook_cell(&Data::Float(f64::INFINITY)), Cell::Missing);

        let input = "id,score\nA,90\nB,NAN\nC,inf\nD,50\n";
        let data = load_csv(input.as_bytes()).unwrap();
        assert_eq!(
            data.numeric_values("score").unwrap(),
            vec![Some(90.0), None, None, Some(50.0)]
        );
    }

    #[test]
    fn csv_with_gaps_loads_as_missing() {
        let input = "student_id,math,notes\nS1,91,ok\nS2,,\nS3,77,\n";
        let data = load_csv(input.as_bytes()).unwrap();
        assert_eq!(data.columns(), &["student_id", "math", "notes"]);
        assert_eq!(data.len(), 3);
        assert_eq!(
            data.numeric_values("math").unwrap(),
            vec![Some(91.0), None, Some(77.0)]
        );
        assert_eq!(data.numeric_columns(), vec!["math".to_string()]);
    }

    #[test]
    fn csv_with_too_many_fields_is_rejected() {
        let input = "a,b\n1,2,3\n";
        assert!(matches!(
            load_csv(input.as_bytes()),
            Err(LoadError::Dataset(_))
        ));
    }

    #[test]
    fn loads_csv_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "name,score").unwrap();
        writeln!(file, "Avery,88").unwrap();
        writeln!(file, "Jules,NA").unwrap();

        let data = load_path(file.path()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(
            data.numeric_values("score").unwrap(),
            vec![Some(88.0), None]
        );
    }

    #[test]
    fn rejects_unknown_extensions() {
        let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        assert!(matches!(
            load_path(file.path()),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }
}
