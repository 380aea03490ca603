use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Json,
}

/// Defaults for the dashboard queries. Command-line flags win over these.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub passing_score: f64,
    pub struggling_threshold: f64,
    pub top_n: usize,
    pub subjects: Vec<String>,
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            passing_score: 60.0,
            struggling_threshold: 50.0,
            top_n: 10,
            subjects: Vec::new(),
            format: OutputFormat::Text,
        }
    }
}

pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_path_gives_defaults() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.passing_score, 60.0);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"passing_score": 65, "subjects": ["Math"], "format": "json"}}"#).unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.passing_score, 65.0);
        assert_eq!(settings.subjects, vec!["Math".to_string()]);
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.top_n, 10);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "passing_score = 65").unwrap();
        assert!(load_settings(Some(file.path())).is_err());
    }
}
