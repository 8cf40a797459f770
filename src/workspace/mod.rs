//! Workspace: every open list plus the shared global scope
//!
//! Cross-scope operations (sending phrases to a folder, taking them back)
//! are staged on copies first and only committed once every step has
//! succeeded, so a failure leaves both list and folder untouched.

mod list;

pub use list::PhraseList;

use crate::filter::{FilteredView, SearchQuery, StopWordMode};
use crate::folders::{FolderError, FolderSet};
use crate::grouping::{GroupingEngine, PhraseGroup};
use crate::history::DEFAULT_CAPACITY;
use crate::models::{Phrase, StopWords, Transfer};
use crate::processor::{PhraseProcessor, Transform};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("List already exists: {0}")]
    DuplicateList(String),

    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("List name must not be empty")]
    EmptyListName,

    #[error("No active list")]
    NoActiveList,

    #[error("List index {index} out of range ({count} lists open)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Phrase text must not be empty")]
    EmptyPhrase,

    #[error(transparent)]
    Folder(#[from] FolderError),
}

/// Stop words and folders shared by every list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalScope {
    pub stop_words: StopWords,
    pub folders: FolderSet,
}

/// Which folder mapping an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderScope<'a> {
    /// Folders owned by the named list
    Local(&'a str),
    Global,
}

impl std::fmt::Display for FolderScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FolderScope::Local(list) => write!(f, "local:{}", list),
            FolderScope::Global => write!(f, "global"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    lists: Vec<PhraseList>,
    global: GlobalScope,
    active: Option<usize>,
    history_capacity: usize,
    stop_word_mode: StopWordMode,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, StopWordMode::default())
    }
}

impl Workspace {
    pub fn new(history_capacity: usize, stop_word_mode: StopWordMode) -> Self {
        Self {
            lists: Vec::new(),
            global: GlobalScope::default(),
            active: None,
            history_capacity: history_capacity.max(1),
            stop_word_mode,
        }
    }

    /// Assemble a workspace from restored parts. The caller validates.
    pub(crate) fn from_parts(lists: Vec<PhraseList>, global: GlobalScope, active: Option<usize>) -> Self {
        Self {
            lists,
            global,
            active,
            ..Self::default()
        }
    }

    /// Keep current filter and history settings when swapping in restored data
    pub(crate) fn adopt_settings(&mut self, other: &Workspace) {
        self.history_capacity = other.history_capacity;
        self.stop_word_mode = other.stop_word_mode;
    }

    pub fn stop_word_mode(&self) -> StopWordMode {
        self.stop_word_mode
    }

    pub fn set_stop_word_mode(&mut self, mode: StopWordMode) {
        self.stop_word_mode = mode;
    }

    pub fn lists(&self) -> &[PhraseList] {
        &self.lists
    }

    pub fn global(&self) -> &GlobalScope {
        &self.global
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_list(&self) -> Option<&PhraseList> {
        self.active.and_then(|i| self.lists.get(i))
    }

    pub fn active_name(&self) -> Result<String, WorkspaceError> {
        self.active_list()
            .map(|l| l.name().to_string())
            .ok_or(WorkspaceError::NoActiveList)
    }

    pub fn set_active(&mut self, index: usize) -> Result<(), WorkspaceError> {
        if index >= self.lists.len() {
            return Err(WorkspaceError::IndexOutOfRange {
                index,
                count: self.lists.len(),
            });
        }
        self.active = Some(index);
        Ok(())
    }

    pub fn list(&self, name: &str) -> Result<&PhraseList, WorkspaceError> {
        self.lists
            .iter()
            .find(|l| l.name() == name)
            .ok_or_else(|| WorkspaceError::ListNotFound(name.to_string()))
    }

    pub fn list_mut(&mut self, name: &str) -> Result<&mut PhraseList, WorkspaceError> {
        self.lists
            .iter_mut()
            .find(|l| l.name() == name)
            .ok_or_else(|| WorkspaceError::ListNotFound(name.to_string()))
    }

    fn position(&self, name: &str) -> Result<usize, WorkspaceError> {
        self.lists
            .iter()
            .position(|l| l.name() == name)
            .ok_or_else(|| WorkspaceError::ListNotFound(name.to_string()))
    }

    /// `base`, or `base (1)`, `base (2)`, ... whichever is free first
    pub fn unique_list_name(&self, base: &str) -> String {
        let base = base.trim();
        if self.list(base).is_err() {
            return base.to_string();
        }
        (1..)
            .map(|i| format!("{} ({})", base, i))
            .find(|candidate| self.list(candidate).is_err())
            .unwrap_or_else(|| base.to_string())
    }

    /// Open an empty list and make it active
    pub fn open_list(&mut self, name: &str) -> Result<usize, WorkspaceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceError::EmptyListName);
        }
        if self.list(name).is_ok() {
            return Err(WorkspaceError::DuplicateList(name.to_string()));
        }
        self.lists.push(PhraseList::new(name, self.history_capacity));
        let index = self.lists.len() - 1;
        self.active = Some(index);
        tracing::debug!(list = %name, index, "opened list");
        Ok(index)
    }

    /// Close a list, discarding its folders and history
    pub fn close_list(&mut self, name: &str) -> Result<PhraseList, WorkspaceError> {
        let index = self.position(name)?;
        let removed = self.lists.remove(index);
        self.active = match self.active {
            _ if self.lists.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) => Some(active.min(self.lists.len() - 1)),
            None => None,
        };
        tracing::debug!(list = %name, "closed list");
        Ok(removed)
    }

    pub fn rename_list(&mut self, old: &str, new: &str) -> Result<(), WorkspaceError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(WorkspaceError::EmptyListName);
        }
        if old == new {
            return self.list(old).map(|_| ());
        }
        if self.list(new).is_ok() {
            return Err(WorkspaceError::DuplicateList(new.to_string()));
        }
        self.list_mut(old)?.set_name(new.to_string());
        Ok(())
    }

    pub fn apply(&mut self, list: &str, transform: Transform) -> Result<bool, WorkspaceError> {
        Ok(self.list_mut(list)?.apply(transform))
    }

    pub fn undo(&mut self, list: &str) -> Result<bool, WorkspaceError> {
        Ok(self.list_mut(list)?.undo())
    }

    pub fn redo(&mut self, list: &str) -> Result<bool, WorkspaceError> {
        Ok(self.list_mut(list)?.redo())
    }

    /// Append a single `(text, 0)` entry
    pub fn add_phrase(&mut self, list: &str, text: &str) -> Result<(), WorkspaceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WorkspaceError::EmptyPhrase);
        }
        let target = self.list_mut(list)?;
        let mut next = target.phrases().to_vec();
        next.push(Phrase::new(text, 0));
        target.commit(next);
        Ok(())
    }

    pub fn delete_phrases(&mut self, list: &str, texts: &[String]) -> Result<usize, WorkspaceError> {
        Ok(self.list_mut(list)?.delete_phrases(texts))
    }

    /// Merge a finished ingestion batch into a list
    pub fn merge_batch(&mut self, list: &str, batch: &[Phrase]) -> Result<usize, WorkspaceError> {
        let merged = self.list_mut(list)?.merge(batch);
        tracing::info!(list = %list, merged, "merged ingested phrases");
        Ok(merged)
    }

    // Stop words

    pub fn add_stop_word(&mut self, list: &str, word: &str) -> Result<bool, WorkspaceError> {
        Ok(self.list_mut(list)?.stop_words.insert(word))
    }

    pub fn remove_stop_word(&mut self, list: &str, word: &str) -> Result<bool, WorkspaceError> {
        Ok(self.list_mut(list)?.stop_words.remove(word))
    }

    pub fn clear_stop_words(&mut self, list: &str) -> Result<(), WorkspaceError> {
        self.list_mut(list)?.stop_words.clear();
        Ok(())
    }

    pub fn add_global_stop_word(&mut self, word: &str) -> bool {
        self.global.stop_words.insert(word)
    }

    pub fn remove_global_stop_word(&mut self, word: &str) -> bool {
        self.global.stop_words.remove(word)
    }

    pub fn clear_global_stop_words(&mut self) {
        self.global.stop_words.clear();
    }

    // Folders

    pub fn folders(&self, scope: FolderScope<'_>) -> Result<&FolderSet, WorkspaceError> {
        match scope {
            FolderScope::Local(list) => Ok(&self.list(list)?.folders),
            FolderScope::Global => Ok(&self.global.folders),
        }
    }

    fn folders_mut(&mut self, scope: FolderScope<'_>) -> Result<&mut FolderSet, WorkspaceError> {
        match scope {
            FolderScope::Local(list) => Ok(&mut self.list_mut(list)?.folders),
            FolderScope::Global => Ok(&mut self.global.folders),
        }
    }

    pub fn create_folder(&mut self, scope: FolderScope<'_>, name: &str) -> Result<(), WorkspaceError> {
        self.folders_mut(scope)?.create(name)?;
        tracing::debug!(%scope, folder = %name, "created folder");
        Ok(())
    }

    pub fn delete_folder(&mut self, scope: FolderScope<'_>, name: &str) -> Result<(), WorkspaceError> {
        self.folders_mut(scope)?.delete(name)?;
        Ok(())
    }

    pub fn clear_folder(&mut self, scope: FolderScope<'_>, name: &str) -> Result<(), WorkspaceError> {
        self.folders_mut(scope)?.require_mut(name)?.clear();
        Ok(())
    }

    /// Remove every entry with one of these texts from a folder
    pub fn remove_from_folder(
        &mut self,
        scope: FolderScope<'_>,
        folder: &str,
        texts: &[String],
    ) -> Result<usize, WorkspaceError> {
        let target = self.folders_mut(scope)?.require_mut(folder)?;
        Ok(texts.iter().map(|t| target.remove_phrase(t)).sum())
    }

    /// Add `entries` to a folder; with [`Transfer::Move`] also remove them
    /// (by identity) from the source list. Both effects land or neither does.
    pub fn send_to_folder(
        &mut self,
        list: &str,
        scope: FolderScope<'_>,
        folder: &str,
        entries: &[Phrase],
        transfer: Transfer,
    ) -> Result<usize, WorkspaceError> {
        if entries.iter().any(|p| p.text.trim().is_empty()) {
            return Err(FolderError::EmptyPhrase.into());
        }

        let mut staged_folder = self.folders(scope)?.require(folder)?.clone();
        let added = entries
            .iter()
            .filter(|p| staged_folder.add_phrase(&p.text, p.frequency))
            .count();
        let staged_list = match transfer {
            Transfer::Move => Some(self.list(list)?.without(entries)),
            Transfer::Copy => {
                self.list(list)?;
                None
            }
        };

        *self.folders_mut(scope)?.require_mut(folder)? = staged_folder;
        if let Some(next) = staged_list {
            self.list_mut(list)?.commit(next);
        }
        tracing::debug!(list = %list, %scope, folder = %folder, added, ?transfer, "sent phrases to folder");
        Ok(added)
    }

    /// Bring folder entries with the given texts back into a list, skipping
    /// identities the list already holds. [`Transfer::Move`] also removes
    /// them from the folder. Both effects land or neither does.
    pub fn take_from_folder(
        &mut self,
        list: &str,
        scope: FolderScope<'_>,
        folder: &str,
        texts: &[String],
        transfer: Transfer,
    ) -> Result<usize, WorkspaceError> {
        let source = self.folders(scope)?.require(folder)?;
        let picked: Vec<Phrase> = source
            .phrases
            .iter()
            .filter(|p| texts.iter().any(|t| *t == p.text))
            .cloned()
            .collect();

        let mut staged_folder = source.clone();
        if transfer == Transfer::Move {
            for text in texts {
                staged_folder.remove_phrase(text);
            }
        }
        let target = self.list(list)?;
        let staged_list = target.with_new(&picked);
        let added = staged_list.len() - target.len();

        *self.folders_mut(scope)?.require_mut(folder)? = staged_folder;
        self.list_mut(list)?.commit(staged_list);
        tracing::debug!(list = %list, %scope, folder = %folder, added, ?transfer, "took phrases from folder");
        Ok(added)
    }

    // Derived views

    pub fn visible(&self, list: &str, query: &SearchQuery) -> Result<FilteredView, WorkspaceError> {
        Ok(self.list(list)?.visible(&self.global, query, self.stop_word_mode))
    }

    /// (total, visible after stop words)
    pub fn counts(&self, list: &str) -> Result<(usize, usize), WorkspaceError> {
        let view = self.visible(list, &SearchQuery::none())?;
        Ok((view.total, view.visible_count()))
    }

    pub fn groups(&self, list: &str) -> Result<Vec<PhraseGroup>, WorkspaceError> {
        Ok(self.list(list)?.groups(&self.global, self.stop_word_mode))
    }

    /// Every list's phrases, in list order
    pub fn all_phrases(&self) -> Vec<Phrase> {
        self.lists
            .iter()
            .flat_map(|l| l.phrases().iter().cloned())
            .collect()
    }

    /// Groups across all lists, filtered by the global stop words only
    pub fn global_groups(&self) -> Vec<PhraseGroup> {
        let filtered = PhraseProcessor::filter_by_stop_words(
            &self.all_phrases(),
            &self.global.stop_words,
            self.stop_word_mode,
        );
        GroupingEngine::group(&filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(items: &[(&str, u64)]) -> Vec<Phrase> {
        items.iter().map(|&(t, f)| Phrase::new(t, f)).collect()
    }

    fn workspace_with(name: &str, items: &[(&str, u64)]) -> Workspace {
        let mut ws = Workspace::default();
        ws.open_list(name).unwrap();
        ws.merge_batch(name, &phrases(items)).unwrap();
        ws
    }

    #[test]
    fn test_unique_list_names() {
        let mut ws = Workspace::default();
        ws.open_list("keys").unwrap();
        assert_eq!(ws.unique_list_name("keys"), "keys (1)");
        ws.open_list("keys (1)").unwrap();
        assert_eq!(ws.unique_list_name("keys"), "keys (2)");
        assert_eq!(
            ws.open_list("keys").unwrap_err(),
            WorkspaceError::DuplicateList("keys".into())
        );
    }

    #[test]
    fn test_close_list_reclamps_active() {
        let mut ws = Workspace::default();
        ws.open_list("a").unwrap();
        ws.open_list("b").unwrap();
        ws.open_list("c").unwrap();
        assert_eq!(ws.active_index(), Some(2));
        ws.close_list("c").unwrap();
        assert_eq!(ws.active_index(), Some(1));
        ws.close_list("a").unwrap();
        assert_eq!(ws.active_name().unwrap(), "b");
        ws.close_list("b").unwrap();
        assert_eq!(ws.active_index(), None);
    }

    #[test]
    fn test_rename_rejects_collision() {
        let mut ws = Workspace::default();
        ws.open_list("a").unwrap();
        ws.open_list("b").unwrap();
        assert!(ws.rename_list("a", "b").is_err());
        ws.rename_list("a", "z").unwrap();
        assert!(ws.list("z").is_ok());
    }

    #[test]
    fn test_undo_right_after_load_keeps_the_batch() {
        let mut ws = workspace_with("a", &[("x", 1), ("y", 2)]);
        assert!(!ws.undo("a").unwrap());
        assert_eq!(ws.list("a").unwrap().phrases(), phrases(&[("x", 1), ("y", 2)]).as_slice());
        assert_eq!(ws.list("a").unwrap().history().len(), 1);
    }

    #[test]
    fn test_global_stop_words_affect_every_list() {
        let mut ws = workspace_with("a", &[("cheap tv", 1), ("tv", 2)]);
        ws.open_list("b").unwrap();
        ws.merge_batch("b", &phrases(&[("cheap radio", 3)])).unwrap();

        ws.add_global_stop_word("Cheap");
        assert_eq!(ws.counts("a").unwrap(), (2, 1));
        assert_eq!(ws.counts("b").unwrap(), (1, 0));

        ws.remove_global_stop_word("cheap");
        assert_eq!(ws.counts("b").unwrap(), (1, 1));
    }

    #[test]
    fn test_move_to_local_folder_is_one_history_step() {
        let mut ws = workspace_with("a", &[("Red Car", 10), ("blue car", 5)]);
        ws.create_folder(FolderScope::Local("a"), "cars").unwrap();

        let entries = phrases(&[("red car ", 10)]);
        let added = ws
            .send_to_folder("a", FolderScope::Local("a"), "cars", &entries, Transfer::Move)
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(ws.list("a").unwrap().phrases(), phrases(&[("blue car", 5)]).as_slice());

        ws.undo("a").unwrap();
        assert_eq!(ws.list("a").unwrap().len(), 2);
        let folder = ws.folders(FolderScope::Local("a")).unwrap().require("cars").unwrap();
        assert_eq!(folder.phrases, entries);
    }

    #[test]
    fn test_copy_to_global_folder_leaves_list() {
        let mut ws = workspace_with("a", &[("tv", 1)]);
        ws.create_folder(FolderScope::Global, "shared").unwrap();
        let entries = ws.list("a").unwrap().select(&["TV".to_string()]);
        ws.send_to_folder("a", FolderScope::Global, "shared", &entries, Transfer::Copy)
            .unwrap();
        assert_eq!(ws.list("a").unwrap().len(), 1);
        assert_eq!(ws.global().folders.require("shared").unwrap().len(), 1);
    }

    #[test]
    fn test_failed_move_changes_nothing() {
        let mut ws = workspace_with("a", &[("tv", 1)]);
        ws.create_folder(FolderScope::Global, "shared").unwrap();
        let before = ws.clone();

        let missing = ws.send_to_folder("a", FolderScope::Global, "nope", &phrases(&[("tv", 1)]), Transfer::Move);
        assert!(matches!(missing, Err(WorkspaceError::Folder(FolderError::NotFound(_)))));

        let blank = ws.send_to_folder(
            "a",
            FolderScope::Global,
            "shared",
            &phrases(&[("tv", 1), ("  ", 0)]),
            Transfer::Move,
        );
        assert_eq!(blank, Err(WorkspaceError::Folder(FolderError::EmptyPhrase)));

        let no_list = ws.send_to_folder("zzz", FolderScope::Global, "shared", &phrases(&[("tv", 1)]), Transfer::Move);
        assert!(matches!(no_list, Err(WorkspaceError::ListNotFound(_))));

        assert_eq!(ws, before);
    }

    #[test]
    fn test_take_back_skips_existing_and_moves() {
        let mut ws = workspace_with("a", &[("tv", 1)]);
        ws.create_folder(FolderScope::Global, "shared").unwrap();
        ws.send_to_folder(
            "a",
            FolderScope::Global,
            "shared",
            &phrases(&[("TV", 1), ("radio", 2)]),
            Transfer::Copy,
        )
        .unwrap();

        let added = ws
            .take_from_folder(
                "a",
                FolderScope::Global,
                "shared",
                &["TV".to_string(), "radio".to_string()],
                Transfer::Move,
            )
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(ws.list("a").unwrap().phrases(), phrases(&[("tv", 1), ("radio", 2)]).as_slice());
        assert!(ws.global().folders.require("shared").unwrap().is_empty());
    }

    #[test]
    fn test_global_groups_span_lists() {
        let mut ws = workspace_with("a", &[("garden hose", 1)]);
        ws.open_list("b").unwrap();
        ws.merge_batch("b", &phrases(&[("garden tools", 2), ("cheap garden", 3)])).unwrap();
        ws.add_global_stop_word("cheap");

        let groups = ws.global_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key.as_deref(), Some("garden"));
        assert_eq!(groups[0].phrases.len(), 2);
    }
}
