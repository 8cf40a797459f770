//! CLI commands for phrasedesk
//!
//! Every command works on one session file: it is loaded (or started
//! empty), the action runs against the workspace, and mutating commands
//! write it back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

use crate::config::{Config, PhrasedeskPaths};
use crate::export;
use crate::filter::{MatchNavigator, SearchMode, SearchQuery, StopWordMode};
use crate::ingest;
use crate::models::{FrequencyTier, Phrase, Transfer};
use crate::processor::Transform;
use crate::session::SessionStore;
use crate::workspace::{FolderScope, Workspace};

/// A workspace bound to the file it was loaded from
pub struct Session {
    pub path: PathBuf,
    pub config: Config,
    pub workspace: Workspace,
}

impl Session {
    /// Open `path`, or the default session, with the user's config
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let paths = PhrasedeskPaths::new()?;
        let config = paths.load_config()?;
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or(paths.default_session);
        Self::open_with(path, config)
    }

    pub fn open_with(path: PathBuf, config: Config) -> Result<Self> {
        let mut workspace = config.new_workspace();
        if path.exists() {
            let bytes = fs::read(&path)
                .with_context(|| format!("Failed to read session {}", path.display()))?;
            SessionStore::restore_into(&mut workspace, &bytes)
                .with_context(|| format!("Failed to restore session {}", path.display()))?;
        }
        Ok(Self {
            path,
            config,
            workspace,
        })
    }

    pub fn save(&self) -> Result<()> {
        SessionStore::save(&self.workspace, &self.path)
            .with_context(|| format!("Failed to save session {}", self.path.display()))
    }

    /// The named list, or the active one
    pub fn target(&self, list: Option<&str>) -> Result<String> {
        match list {
            Some(name) => {
                self.workspace.list(name)?;
                Ok(name.to_string())
            }
            None => self.workspace.active_name().map_err(|_| {
                anyhow!("No active list. Load one with `phrasedesk load <files..>` first.")
            }),
        }
    }
}

/// Initialize phrasedesk for first-time setup
pub fn init() -> Result<()> {
    let paths = PhrasedeskPaths::new()?;

    if paths.is_initialized() {
        println!("phrasedesk is already initialized at {}", paths.root.display());
        return Ok(());
    }

    println!("Initializing phrasedesk at {}...", paths.root.display());

    paths.ensure_dirs()?;
    println!("  Created directory structure");

    let config = Config::default();
    paths.save_config(&config)?;
    println!("  Created config.toml");

    if !paths.default_session.exists() {
        SessionStore::save(&config.new_workspace(), &paths.default_session)
            .context("Failed to create default session")?;
        println!("  Created sessions/default.json");
    }

    println!();
    println!("phrasedesk initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  phrasedesk load <files..>      Load phrase files into a new list");
    println!("  phrasedesk show                Show the active list");
    println!("  phrasedesk transform dedup     Remove duplicate phrases");

    Ok(())
}

/// Ingest files into a new list, or into `into` when given
pub async fn load(
    session: &mut Session,
    files: Vec<PathBuf>,
    name: Option<&str>,
    into: Option<&str>,
) -> Result<()> {
    if files.is_empty() {
        bail!("No files given");
    }
    let base = name
        .map(str::to_string)
        .unwrap_or_else(|| default_list_name(&files));

    let batch = ingest::ingest_batch(files).await?;
    for error in &batch.errors {
        println!("  ✗ {}", error);
    }
    if batch.loaded_files.is_empty() {
        bail!("No files could be loaded");
    }

    let list = match into {
        Some(existing) => session.target(Some(existing))?,
        None => {
            let unique = session.workspace.unique_list_name(&base);
            session.workspace.open_list(&unique)?;
            unique
        }
    };
    let merged = session.workspace.merge_batch(&list, &batch.phrases)?;
    session.save()?;

    println!(
        "✓ Loaded {} phrases from {} file(s) into '{}'",
        merged,
        batch.loaded_files.len(),
        list
    );
    Ok(())
}

fn default_list_name(files: &[PathBuf]) -> String {
    files
        .first()
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "phrases".to_string())
}

/// Show open lists with their counts
pub fn lists(session: &Session) -> Result<()> {
    let ws = &session.workspace;
    if ws.lists().is_empty() {
        println!("No lists open.");
        println!("Load one with: phrasedesk load <files..>");
        return Ok(());
    }

    println!(
        "{:<4} {:<30} {:>8} {:>8} {:>6}",
        "#", "NAME", "TOTAL", "VISIBLE", "STEPS"
    );
    println!("{}", "-".repeat(60));

    for (index, list) in ws.lists().iter().enumerate() {
        let (total, visible) = ws.counts(list.name())?;
        let marker = if ws.active_index() == Some(index) { '*' } else { ' ' };
        println!(
            "{}{:<3} {:<30} {:>8} {:>8} {:>6}",
            marker,
            index,
            truncate(list.name(), 28),
            total,
            visible,
            list.history().len()
        );
    }

    println!();
    println!(
        "Global: {} stop word(s), {} folder(s)",
        ws.global().stop_words.len(),
        ws.global().folders.len()
    );
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct ShowOptions {
    pub list: Option<String>,
    pub search: Option<String>,
    pub whole_word: bool,
    pub only_matches: bool,
    pub substring_stop_words: bool,
    /// Bare texts, one per line
    pub plain: bool,
}

/// Print the visible rows of a list
pub fn show(session: &mut Session, options: &ShowOptions) -> Result<()> {
    if options.substring_stop_words {
        session.workspace.set_stop_word_mode(StopWordMode::Substring);
    }
    let list = session.target(options.list.as_deref())?;
    let mode = if options.whole_word {
        SearchMode::WholeWord
    } else {
        session.config.search_mode
    };
    let query = options
        .search
        .as_deref()
        .map(|term| SearchQuery::new(term, mode, options.only_matches))
        .unwrap_or_else(SearchQuery::none);
    let view = session.workspace.visible(&list, &query)?;

    if options.plain {
        println!("{}", export::clipboard_text(&view.phrases()));
        return Ok(());
    }

    println!("List: {}", list);
    println!("{}", "=".repeat(72));
    for row in &view.rows {
        let marker = if row.is_match { '>' } else { ' ' };
        println!(
            "{} {:<50} {:>10}  {}",
            marker,
            truncate(&row.phrase.text, 50),
            row.phrase.frequency,
            FrequencyTier::of(row.phrase.frequency)
        );
    }

    println!();
    println!(
        "Showing {} of {} phrases (stop words: {})",
        view.visible_count(),
        view.total,
        session.workspace.stop_word_mode()
    );
    if query.is_active() {
        let (position, total) = MatchNavigator::new(&view).status();
        println!("Matches: {}/{}", position, total);
    }
    Ok(())
}

pub fn transform(
    session: &mut Session,
    op: &str,
    list: Option<&str>,
    max_words: Option<usize>,
) -> Result<()> {
    let mut transform: Transform = op.parse().map_err(|e: String| anyhow!(e))?;
    if let Transform::RemoveLongPhrases { max_words: limit } = &mut transform {
        *limit = max_words.unwrap_or(session.config.max_words);
    }
    let list = session.target(list)?;

    if session.workspace.apply(&list, transform)? {
        session.save()?;
        println!(
            "✓ Applied {} to '{}' ({} phrases)",
            transform,
            list,
            session.workspace.list(&list)?.len()
        );
    } else {
        println!("No change: {} left '{}' as it was", transform, list);
    }
    Ok(())
}

pub fn undo(session: &mut Session, list: Option<&str>) -> Result<()> {
    let list = session.target(list)?;
    if session.workspace.undo(&list)? {
        session.save()?;
        println!("✓ Undid last change to '{}'", list);
    } else {
        println!("Nothing to undo for '{}'", list);
    }
    Ok(())
}

pub fn redo(session: &mut Session, list: Option<&str>) -> Result<()> {
    let list = session.target(list)?;
    if session.workspace.redo(&list)? {
        session.save()?;
        println!("✓ Redid change to '{}'", list);
    } else {
        println!("Nothing to redo for '{}'", list);
    }
    Ok(())
}

pub fn add(session: &mut Session, text: &str, list: Option<&str>) -> Result<()> {
    let list = session.target(list)?;
    session.workspace.add_phrase(&list, text)?;
    session.save()?;
    println!("✓ Added '{}' to '{}'", text.trim(), list);
    Ok(())
}

pub fn delete(session: &mut Session, texts: &[String], list: Option<&str>) -> Result<()> {
    let list = session.target(list)?;
    let removed = session.workspace.delete_phrases(&list, texts)?;
    if removed > 0 {
        session.save()?;
    }
    println!("✓ Removed {} phrase(s) from '{}'", removed, list);
    Ok(())
}

#[derive(Debug, Clone)]
pub enum StopOperation {
    Add { words: Vec<String> },
    Remove { words: Vec<String> },
    Clear,
    List,
}

/// Stop words of one list, or the global set with `global`
pub fn stop(
    session: &mut Session,
    operation: StopOperation,
    global: bool,
    list: Option<&str>,
) -> Result<()> {
    let scope = if global {
        None
    } else {
        Some(session.target(list)?)
    };
    let label = scope.as_deref().unwrap_or("global");
    let ws = &mut session.workspace;

    match operation {
        StopOperation::Add { words } => {
            let mut added = 0;
            for word in &words {
                let inserted = match scope.as_deref() {
                    Some(list) => ws.add_stop_word(list, word)?,
                    None => ws.add_global_stop_word(word),
                };
                if inserted {
                    added += 1;
                }
            }
            session.save()?;
            println!("✓ Added {} stop word(s) to {}", added, label);
        }
        StopOperation::Remove { words } => {
            let mut removed = 0;
            for word in &words {
                let dropped = match scope.as_deref() {
                    Some(list) => ws.remove_stop_word(list, word)?,
                    None => ws.remove_global_stop_word(word),
                };
                if dropped {
                    removed += 1;
                }
            }
            session.save()?;
            println!("✓ Removed {} stop word(s) from {}", removed, label);
        }
        StopOperation::Clear => {
            match scope.as_deref() {
                Some(list) => ws.clear_stop_words(list)?,
                None => ws.clear_global_stop_words(),
            }
            session.save()?;
            println!("✓ Cleared stop words of {}", label);
        }
        StopOperation::List => {
            let words = match scope.as_deref() {
                Some(list) => &ws.list(list)?.stop_words,
                None => &ws.global().stop_words,
            };
            if words.is_empty() {
                println!("No stop words for {}", label);
            } else {
                println!("{}", export::stop_words_clipboard_text(words));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub enum FolderOperation {
    Create { name: String },
    Delete { name: String },
    Clear { name: String },
    /// List phrases into a folder
    Send {
        folder: String,
        texts: Vec<String>,
        transfer: Transfer,
    },
    /// Folder phrases back into the list
    Back {
        folder: String,
        texts: Vec<String>,
        transfer: Transfer,
    },
    Remove { folder: String, texts: Vec<String> },
    List { folder: Option<String> },
}

/// Folders of one list, or the global folders with `global`
pub fn folder(
    session: &mut Session,
    operation: FolderOperation,
    global: bool,
    list: Option<&str>,
) -> Result<()> {
    let needs_list = !global
        || matches!(
            operation,
            FolderOperation::Send { .. } | FolderOperation::Back { .. }
        );
    let list = if needs_list {
        session.target(list)?
    } else {
        String::new()
    };
    let scope = if global {
        FolderScope::Global
    } else {
        FolderScope::Local(&list)
    };
    let ws = &mut session.workspace;

    match operation {
        FolderOperation::Create { name } => {
            ws.create_folder(scope, &name)?;
            session.save()?;
            println!("✓ Created folder '{}' ({})", name, scope);
        }
        FolderOperation::Delete { name } => {
            ws.delete_folder(scope, &name)?;
            session.save()?;
            println!("✓ Deleted folder '{}' ({})", name, scope);
        }
        FolderOperation::Clear { name } => {
            ws.clear_folder(scope, &name)?;
            session.save()?;
            println!("✓ Cleared folder '{}' ({})", name, scope);
        }
        FolderOperation::Send {
            folder,
            texts,
            transfer,
        } => {
            let entries = ws.list(&list)?.select(&texts);
            if entries.is_empty() {
                bail!("None of the given phrases are in '{}'", list);
            }
            let added = ws.send_to_folder(&list, scope, &folder, &entries, transfer)?;
            session.save()?;
            println!(
                "✓ {} {} phrase(s) to folder '{}' ({} new)",
                verb(transfer),
                entries.len(),
                folder,
                added
            );
        }
        FolderOperation::Back {
            folder,
            texts,
            transfer,
        } => {
            let added = ws.take_from_folder(&list, scope, &folder, &texts, transfer)?;
            session.save()?;
            println!(
                "✓ {} {} phrase(s) from folder '{}' into '{}'",
                verb(transfer),
                added,
                folder,
                list
            );
        }
        FolderOperation::Remove { folder, texts } => {
            let removed = ws.remove_from_folder(scope, &folder, &texts)?;
            session.save()?;
            println!("✓ Removed {} phrase(s) from folder '{}'", removed, folder);
        }
        FolderOperation::List { folder: None } => {
            let folders = ws.folders(scope)?;
            if folders.is_empty() {
                println!("No folders ({})", scope);
            }
            for f in folders.iter() {
                println!("{:<40} {:>8}", truncate(&f.name, 38), f.len());
            }
        }
        FolderOperation::List { folder: Some(name) } => {
            let f = ws.folders(scope)?.require(&name)?;
            println!("Folder: {} ({})", f.name, scope);
            println!("{}", "=".repeat(50));
            print_phrases(&f.phrases);
        }
    }
    Ok(())
}

fn verb(transfer: Transfer) -> &'static str {
    match transfer {
        Transfer::Copy => "Copied",
        Transfer::Move => "Moved",
    }
}

/// Groups of one list, or across every list with `all`
pub fn groups(session: &Session, all: bool, list: Option<&str>) -> Result<()> {
    let groups = if all {
        session.workspace.global_groups()
    } else {
        let list = session.target(list)?;
        session.workspace.groups(&list)?
    };

    if groups.is_empty() {
        println!("No groups.");
        return Ok(());
    }
    for group in &groups {
        println!("{} ({})", group.label(), group.phrases.len());
        print_phrases(&group.phrases);
        println!();
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    /// Visible phrases as tab-separated text
    Tsv,
    /// One list and its stop words
    List,
    /// Every list plus the global stop words
    All,
    Groups,
    Folders,
}

impl std::str::FromStr for ExportTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(ExportTarget::Tsv),
            "list" => Ok(ExportTarget::List),
            "all" => Ok(ExportTarget::All),
            "groups" => Ok(ExportTarget::Groups),
            "folders" => Ok(ExportTarget::Folders),
            _ => Err(format!(
                "Invalid export target: {}. Use: tsv, list, all, groups, or folders",
                s
            )),
        }
    }
}

/// Write an export to `output`: a file for `tsv`, a spreadsheet for an
/// `.xlsx` path, otherwise a directory of CSV sheets
pub fn export(
    session: &Session,
    target: ExportTarget,
    output: &Path,
    global: bool,
    list: Option<&str>,
) -> Result<()> {
    let ws = &session.workspace;
    let book = match target {
        ExportTarget::Tsv => {
            let list = session.target(list)?;
            let phrases = ws.visible(&list, &SearchQuery::none())?.phrases();
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = fs::File::create(output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            export::write_tsv(&phrases, std::io::BufWriter::new(file))
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("✓ Exported {} phrases to {}", phrases.len(), output.display());
            return Ok(());
        }
        ExportTarget::List => export::list_workbook(ws, &session.target(list)?)?,
        ExportTarget::All => export::workspace_workbook(ws)?,
        ExportTarget::Groups if global => export::groups_workbook(&ws.global_groups()),
        ExportTarget::Groups => export::groups_workbook(&ws.groups(&session.target(list)?)?),
        ExportTarget::Folders if global => export::folders_workbook(&ws.global().folders),
        ExportTarget::Folders => {
            let list = session.target(list)?;
            export::folders_workbook(ws.folders(FolderScope::Local(&list))?)
        }
    };

    if book.is_empty() {
        println!("Nothing to export.");
        return Ok(());
    }
    book.save(output)?;
    println!(
        "✓ Exported {} sheet(s) to {}",
        book.sheets().len(),
        output.display()
    );
    Ok(())
}

pub fn rename(session: &mut Session, old: &str, new: &str) -> Result<()> {
    session.workspace.rename_list(old, new)?;
    session.save()?;
    println!("✓ Renamed '{}' to '{}'", old, new.trim());
    Ok(())
}

pub fn close(session: &mut Session, name: &str) -> Result<()> {
    let closed = session.workspace.close_list(name)?;
    session.save()?;
    println!("✓ Closed '{}' ({} phrases discarded)", name, closed.len());
    Ok(())
}

pub fn activate(session: &mut Session, index: usize) -> Result<()> {
    session.workspace.set_active(index)?;
    session.save()?;
    println!("✓ Active list: {}", session.workspace.active_name()?);
    Ok(())
}

fn print_phrases(phrases: &[Phrase]) {
    for phrase in phrases {
        println!("  {:<48} {:>10}", truncate(&phrase.text, 48), phrase.frequency);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open_with(dir.path().join("s.json"), Config::default()).unwrap();
        (dir, session)
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("короткий", 10), "короткий");
        assert_eq!(truncate("очень длинная фраза", 8), "очень...");
    }

    #[test]
    fn test_target_requires_active_list() {
        let (_dir, mut session) = scratch();
        assert!(session.target(None).is_err());
        session.workspace.open_list("a").unwrap();
        assert_eq!(session.target(None).unwrap(), "a");
        assert!(session.target(Some("b")).is_err());
    }

    #[test]
    fn test_drop_long_uses_config_limit() {
        let (_dir, mut session) = scratch();
        session.config.max_words = 2;
        session.workspace.open_list("a").unwrap();
        session
            .workspace
            .merge_batch("a", &[Phrase::new("one two", 1), Phrase::new("one two three", 1)])
            .unwrap();

        transform(&mut session, "drop-long", None, None).unwrap();
        assert_eq!(session.workspace.list("a").unwrap().phrases(), &[Phrase::new("one two", 1)]);
        assert!(session.path.exists());
    }

    #[test]
    fn test_export_target_parse() {
        assert_eq!("Folders".parse::<ExportTarget>().unwrap(), ExportTarget::Folders);
        assert!("xlsx".parse::<ExportTarget>().is_err());
    }
}
