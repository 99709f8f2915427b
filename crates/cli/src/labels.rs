//! Reading label collections from files.
//!
//! - `.json`: an array of strings, or an object whose keys are the labels
//!   (in document order)
//! - `.csv`: the header row, one label per column
//! - anything else: one label per non-empty line

use std::path::Path;

use crate::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    Json,
    Csv,
    Lines,
}

impl LabelFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Lines,
        }
    }
}

pub fn load_labels(path: &Path) -> Result<Vec<String>, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
    parse_labels(&content, LabelFormat::from_path(path))
        .map_err(|msg| CliError::parse(format!("{}: {msg}", path.display())))
}

pub fn parse_labels(content: &str, format: LabelFormat) -> Result<Vec<String>, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    match format {
        LabelFormat::Json => parse_json(content),
        LabelFormat::Csv => parse_csv_header(content),
        LabelFormat::Lines => Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()),
    }
}

fn parse_json(content: &str) -> Result<Vec<String>, String> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}"))?;
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                serde_json::Value::String(s) => Ok(s),
                other => Err(format!("element {i} is not a string: {other}")),
            })
            .collect(),
        serde_json::Value::Object(map) => Ok(map.into_iter().map(|(k, _)| k).collect()),
        _ => Err("expected a JSON array of strings or an object".into()),
    }
}

fn parse_csv_header(content: &str) -> Result<Vec<String>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| format!("invalid CSV header: {e}"))?;
    Ok(headers
        .iter()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect())
}
