//! Export formats
//!
//! Tab-separated text, clipboard text, and tabular workbooks. A workbook
//! is a list of named sheets. It saves as a real `.xlsx` file, or as a
//! directory with one CSV table per sheet for any other target path.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::filter::SearchQuery;
use crate::folders::FolderSet;
use crate::grouping::PhraseGroup;
use crate::models::{Phrase, StopWords};
use crate::workspace::{Workspace, WorkspaceError};

pub const SHEET_NAME_LIMIT: usize = 31;
pub const PHRASE_HEADER: [&str; 2] = ["Phrase", "Frequency"];
pub const STOP_WORD_HEADER: [&str; 1] = ["Stop word"];

// Excel keeps this name for itself
const RESERVED_SHEET_NAMES: [&str; 1] = ["history"];

/// `text<TAB>frequency` per line
pub fn write_tsv<W: Write>(phrases: &[Phrase], mut out: W) -> std::io::Result<()> {
    for phrase in phrases {
        writeln!(out, "{}\t{}", phrase.text, phrase.frequency)?;
    }
    Ok(())
}

pub fn to_tsv(phrases: &[Phrase]) -> String {
    phrases
        .iter()
        .map(|p| format!("{}\t{}\n", p.text, p.frequency))
        .collect()
}

/// Texts only, one per line
pub fn clipboard_text(phrases: &[Phrase]) -> String {
    phrases
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn stop_words_clipboard_text(words: &StopWords) -> String {
    words.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Number(u64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => write!(f, "{}", text),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Cell::Number(n)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Add a sheet under a unique, limit-respecting name; returns that name
    pub fn add_sheet(&mut self, name: &str, header: &[&str], rows: Vec<Vec<Cell>>) -> String {
        let taken: HashSet<&str> = self.sheets.iter().map(|s| s.name.as_str()).collect();
        let name = sheet_name(name, &taken);
        self.sheets.push(Sheet {
            name: name.clone(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows,
        });
        name
    }

    pub fn add_phrases(&mut self, name: &str, phrases: &[Phrase]) -> String {
        let rows = phrases
            .iter()
            .map(|p| vec![Cell::from(p.text.as_str()), Cell::from(p.frequency)])
            .collect();
        self.add_sheet(name, &PHRASE_HEADER, rows)
    }

    pub fn add_stop_words(&mut self, name: &str, words: &StopWords) -> String {
        let rows = words.iter().map(|w| vec![Cell::from(w.as_str())]).collect();
        self.add_sheet(name, &STOP_WORD_HEADER, rows)
    }

    /// `.xlsx` targets get a spreadsheet file; anything else a CSV directory
    pub fn save(&self, target: &Path) -> Result<()> {
        let is_xlsx = target
            .extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("xlsx"));
        if is_xlsx {
            self.save_xlsx(target)
        } else {
            self.save_csv_dir(target)
        }
    }

    /// One worksheet per sheet, header in row 0
    pub fn save_xlsx(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut book = rust_xlsxwriter::Workbook::new();
        for sheet in &self.sheets {
            let worksheet = book.add_worksheet();
            worksheet
                .set_name(sheet.name.as_str())
                .with_context(|| format!("Invalid sheet name '{}'", sheet.name))?;
            for (col, title) in sheet.header.iter().enumerate() {
                worksheet.write_string(0, column(col)?, title.as_str())?;
            }
            for (index, row) in sheet.rows.iter().enumerate() {
                let at = u32::try_from(index + 1).context("Too many rows for one sheet")?;
                for (col, cell) in row.iter().enumerate() {
                    match cell {
                        Cell::Text(text) => {
                            worksheet.write_string(at, column(col)?, text.as_str())?;
                        }
                        Cell::Number(n) => {
                            worksheet.write_number(at, column(col)?, *n as f64)?;
                        }
                    }
                }
            }
        }
        book.save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), sheets = self.sheets.len(), "exported workbook");
        Ok(())
    }

    /// Write one `NN_<sheet>.csv` per sheet into `dir`
    pub fn save_csv_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
        for (index, sheet) in self.sheets.iter().enumerate() {
            let path = dir.join(format!("{:02}_{}.csv", index + 1, file_stem(&sheet.name)));
            let mut writer = csv::Writer::from_path(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            writer.write_record(&sheet.header)?;
            for row in &sheet.rows {
                writer.write_record(row.iter().map(Cell::to_string))?;
            }
            writer
                .flush()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        tracing::info!(dir = %dir.display(), sheets = self.sheets.len(), "exported workbook");
        Ok(())
    }
}

fn column(index: usize) -> Result<u16> {
    u16::try_from(index).context("Too many columns for one sheet")
}

/// Sheet names compare case-insensitively, as spreadsheet apps do
fn is_taken(candidate: &str, taken: &HashSet<&str>) -> bool {
    let lower = candidate.to_lowercase();
    RESERVED_SHEET_NAMES.contains(&lower.as_str())
        || taken.iter().any(|t| t.to_lowercase() == lower)
}

/// Truncate to [`SHEET_NAME_LIMIT`] chars and disambiguate collisions with
/// a `~N` tail that still fits the limit.
pub fn sheet_name(raw: &str, taken: &HashSet<&str>) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .collect();
    // no leading or trailing apostrophe
    let cleaned = cleaned.trim_matches('\'');
    let base = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.to_string()
    };
    let truncated: String = base.chars().take(SHEET_NAME_LIMIT).collect();
    let truncated = truncated.trim_end_matches('\'').to_string();
    if !is_taken(&truncated, taken) {
        return truncated;
    }
    (2..)
        .map(|n| {
            let suffix = format!("~{}", n);
            let keep = SHEET_NAME_LIMIT.saturating_sub(suffix.chars().count());
            let head: String = base.chars().take(keep).collect();
            format!("{}{}", head, suffix)
        })
        .find(|candidate| !is_taken(candidate, taken))
        .unwrap_or(truncated)
}

fn file_stem(sheet: &str) -> String {
    sheet
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || " -_~()".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The list after stop words, plus its local stop words
pub fn list_workbook(workspace: &Workspace, list: &str) -> Result<Workbook, WorkspaceError> {
    let view = workspace.visible(list, &SearchQuery::none())?;
    let mut book = Workbook::new();
    book.add_phrases("Phrases", &view.phrases());
    book.add_stop_words("StopWords", &workspace.list(list)?.stop_words);
    Ok(book)
}

/// Every list (filtered) with its stop words, then the global stop words
pub fn workspace_workbook(workspace: &Workspace) -> Result<Workbook, WorkspaceError> {
    let mut book = Workbook::new();
    for list in workspace.lists() {
        let view = workspace.visible(list.name(), &SearchQuery::none())?;
        book.add_phrases(&format!("{}_Phrases", list.name()), &view.phrases());
        book.add_stop_words(&format!("{}_Stop", list.name()), &list.stop_words);
    }
    book.add_stop_words("Global_Stop", &workspace.global().stop_words);
    Ok(book)
}

pub fn groups_workbook(groups: &[PhraseGroup]) -> Workbook {
    let mut book = Workbook::new();
    for group in groups {
        book.add_phrases(group.label(), &group.phrases);
    }
    book
}

/// One sheet per non-empty folder
pub fn folders_workbook(folders: &FolderSet) -> Workbook {
    let mut book = Workbook::new();
    for folder in folders.iter().filter(|f| !f.is_empty()) {
        book.add_phrases(&folder.name, &folder.phrases);
    }
    book
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tsv_and_clipboard() {
        let phrases = vec![Phrase::new("buy car", 10), Phrase::new("sell car", 0)];
        assert_eq!(to_tsv(&phrases), "buy car\t10\nsell car\t0\n");
        let mut buf = Vec::new();
        write_tsv(&phrases, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), to_tsv(&phrases));
        assert_eq!(clipboard_text(&phrases), "buy car\nsell car");
    }

    #[test]
    fn test_sheet_names_truncate_and_disambiguate() {
        let long_a = "a".repeat(40);
        let mut book = Workbook::new();
        let first = book.add_phrases(&long_a, &[]);
        let second = book.add_phrases(&format!("{}b", long_a), &[]);
        let third = book.add_phrases(&long_a, &[]);

        assert_eq!(first.chars().count(), SHEET_NAME_LIMIT);
        assert_eq!(second, format!("{}~2", "a".repeat(29)));
        assert_eq!(third, format!("{}~3", "a".repeat(29)));
        assert_eq!(book.add_phrases("", &[]), "Sheet");
        assert_eq!(book.add_phrases("a/b", &[]), "a_b");
    }

    #[test]
    fn test_cyrillic_names_count_chars() {
        let name = "ж".repeat(35);
        let truncated = sheet_name(&name, &HashSet::new());
        assert_eq!(truncated, "ж".repeat(31));
    }

    #[test]
    fn test_folders_workbook_skips_empty() {
        let mut folders = FolderSet::new();
        folders.create("empty").unwrap();
        folders.create("full").unwrap().add_phrase("x", 1);
        let book = folders_workbook(&folders);
        assert_eq!(book.sheets().len(), 1);
        assert_eq!(book.sheets()[0].header, vec!["Phrase", "Frequency"]);
        assert_eq!(book.sheets()[0].rows, vec![vec![Cell::from("x"), Cell::Number(1)]]);
    }

    #[test]
    fn test_sheet_names_ignore_case_and_apostrophes() {
        let mut book = Workbook::new();
        assert_eq!(book.add_phrases("Cars", &[]), "Cars");
        assert_eq!(book.add_phrases("cars", &[]), "cars~2");
        assert_eq!(book.add_phrases("'quoted'", &[]), "quoted");
        assert_eq!(book.add_phrases("History", &[]), "History~2");
    }

    #[test]
    fn test_save_picks_format_by_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut book = Workbook::new();
        book.add_phrases("garden", &[Phrase::new("garden hose", 3)]);

        let xlsx = dir.path().join("out.xlsx");
        book.save(&xlsx).unwrap();
        assert!(xlsx.is_file());

        let sheets = dir.path().join("out");
        book.save(&sheets).unwrap();
        assert!(sheets.join("01_garden.csv").is_file());
    }
}
