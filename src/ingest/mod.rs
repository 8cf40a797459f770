//! File ingestion
//!
//! Produces finished batches of phrases; it never touches a list. Each
//! file either contributes all of its entries or a single keyed error,
//! and a failing file never stops the rest of the batch.

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};

use crate::models::Phrase;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{file}: unsupported file format (expected .txt, .tsv, .csv, .xls or .xlsx)")]
    UnsupportedFormat { file: String },

    #[error("{file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("{file}: {source}")]
    Spreadsheet {
        file: String,
        #[source]
        source: calamine::Error,
    },

    #[error("ingestion task failed: {0}")]
    Task(String),
}

impl IngestError {
    /// File name the error is keyed by
    pub fn file(&self) -> &str {
        match self {
            IngestError::UnsupportedFormat { file }
            | IngestError::Io { file, .. }
            | IngestError::Csv { file, .. }
            | IngestError::Spreadsheet { file, .. } => file,
            IngestError::Task(_) => "",
        }
    }
}

#[derive(Debug, Default)]
pub struct IngestBatch {
    pub phrases: Vec<Phrase>,
    pub errors: Vec<IngestError>,
    pub loaded_files: Vec<String>,
}

impl IngestBatch {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Frequency column: digits only, anything else is 0
fn parse_frequency(raw: Option<&str>) -> u64 {
    raw.map(str::trim)
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// `text<TAB>frequency` lines; blank lines are skipped
pub fn parse_tsv(content: &str) -> Vec<Phrase> {
    content
        .lines()
        .filter_map(|line| {
            let mut parts = line.split('\t');
            let text = parts.next()?.trim();
            if text.is_empty() {
                return None;
            }
            Some(Phrase::new(text, parse_frequency(parts.next())))
        })
        .collect()
}

/// Rows with text in column 0 and optional frequency in column 1
pub fn parse_rows<R: std::io::Read>(reader: R) -> Result<Vec<Phrase>, csv::Error> {
    let mut rows = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut phrases = Vec::new();
    for record in rows.records() {
        let record = record?;
        let text = record.get(0).map(str::trim).unwrap_or_default();
        if text.is_empty() {
            continue;
        }
        phrases.push(Phrase::new(text, parse_frequency(record.get(1))));
    }
    Ok(phrases)
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => return None,
    };
    Some(text).filter(|t| !t.is_empty())
}

fn cell_frequency(cell: Option<&Data>) -> u64 {
    match cell {
        Some(Data::Int(i)) => u64::try_from(*i).unwrap_or(0),
        Some(Data::Float(f)) if f.is_finite() && *f >= 0.0 => f.trunc() as u64,
        Some(Data::String(s)) => parse_frequency(Some(s.as_str())),
        _ => 0,
    }
}

/// First worksheet rows after the header row: text in column 0,
/// optional frequency in column 1
pub fn parse_sheet_rows<'a, I>(rows: I) -> Vec<Phrase>
where
    I: IntoIterator<Item = &'a [Data]>,
{
    rows.into_iter()
        .skip(1)
        .filter_map(|row| {
            let text = row.first().and_then(cell_text)?;
            Some(Phrase::new(text, cell_frequency(row.get(1))))
        })
        .collect()
}

/// `.xls`/`.xlsx`: the first worksheet only
pub fn read_spreadsheet(path: &Path) -> Result<Vec<Phrase>, calamine::Error> {
    let mut book = open_workbook_auto(path)?;
    match book.worksheet_range_at(0) {
        Some(range) => Ok(parse_sheet_rows(range?.rows())),
        None => Ok(Vec::new()),
    }
}

pub fn read_file(path: &Path) -> Result<Vec<Phrase>, IngestError> {
    let file = display_name(path);
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "txt" | "tsv" => {
            let content = fs::read_to_string(path).map_err(|source| IngestError::Io {
                file: file.clone(),
                source,
            })?;
            Ok(parse_tsv(&content))
        }
        "csv" => {
            let handle = fs::File::open(path).map_err(|source| IngestError::Io {
                file: file.clone(),
                source,
            })?;
            parse_rows(handle).map_err(|source| IngestError::Csv { file, source })
        }
        "xls" | "xlsx" => {
            read_spreadsheet(path).map_err(|source| IngestError::Spreadsheet { file, source })
        }
        _ => Err(IngestError::UnsupportedFormat { file }),
    }
}

/// Read every file, collecting per-file errors instead of stopping
pub fn read_batch(paths: &[PathBuf]) -> IngestBatch {
    let mut batch = IngestBatch::default();
    for path in paths {
        match read_file(path) {
            Ok(phrases) => {
                tracing::info!(file = %path.display(), count = phrases.len(), "read phrases");
                batch.phrases.extend(phrases);
                batch.loaded_files.push(display_name(path));
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "skipping file");
                batch.errors.push(e);
            }
        }
    }
    batch
}

/// Run [`read_batch`] on the blocking pool
pub async fn ingest_batch(paths: Vec<PathBuf>) -> Result<IngestBatch, IngestError> {
    tokio::task::spawn_blocking(move || read_batch(&paths))
        .await
        .map_err(|e| IngestError::Task(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tsv() {
        let content = "buy car\t120\nsell car\tmany\n\n  rent car  \n";
        assert_eq!(
            parse_tsv(content),
            vec![
                Phrase::new("buy car", 120),
                Phrase::new("sell car", 0),
                Phrase::new("rent car", 0),
            ]
        );
    }

    #[test]
    fn test_parse_rows_with_optional_frequency() {
        let data = "buy car,120\nsell car\n\"car, used\",7\n";
        let phrases = parse_rows(data.as_bytes()).unwrap();
        assert_eq!(
            phrases,
            vec![
                Phrase::new("buy car", 120),
                Phrase::new("sell car", 0),
                Phrase::new("car, used", 7),
            ]
        );
    }

    #[test]
    fn test_frequency_rejects_signs() {
        assert_eq!(parse_frequency(Some("-5")), 0);
        assert_eq!(parse_frequency(Some(" 42 ")), 42);
        assert_eq!(parse_frequency(None), 0);
    }

    #[test]
    fn test_sheet_rows_skip_header_and_coerce_frequency() {
        let rows: Vec<Vec<Data>> = vec![
            vec![Data::String("Phrase".into()), Data::String("Frequency".into())],
            vec![Data::String(" buy car ".into()), Data::Float(120.0)],
            vec![Data::String("sell car".into()), Data::Int(-3)],
            vec![Data::Empty, Data::Int(9)],
            vec![Data::Int(2024)],
            vec![Data::String("rent car".into()), Data::String("n/a".into())],
        ];
        let phrases = parse_sheet_rows(rows.iter().map(Vec::as_slice));
        assert_eq!(
            phrases,
            vec![
                Phrase::new("buy car", 120),
                Phrase::new("sell car", 0),
                Phrase::new("2024", 0),
                Phrase::new("rent car", 0),
            ]
        );
    }
}
