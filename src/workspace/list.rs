//! A single phrase list (one tab): data, local scope and history

use std::collections::HashSet;

use crate::filter::{FilterPipeline, FilteredView, SearchQuery, StopWordMode};
use crate::folders::FolderSet;
use crate::grouping::{GroupingEngine, PhraseGroup};
use crate::history::HistoryManager;
use crate::models::{identity_of, Phrase, StopWords};
use crate::processor::Transform;

use super::GlobalScope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseList {
    name: String,
    phrases: Vec<Phrase>,
    pub stop_words: StopWords,
    pub folders: FolderSet,
    history: HistoryManager,
}

impl PhraseList {
    pub fn new(name: impl Into<String>, history_capacity: usize) -> Self {
        Self {
            name: name.into(),
            phrases: Vec::new(),
            stop_words: StopWords::new(),
            folders: FolderSet::new(),
            history: HistoryManager::new(history_capacity),
        }
    }

    /// Reassemble a list from restored parts without touching history
    pub fn from_parts(
        name: String,
        phrases: Vec<Phrase>,
        stop_words: StopWords,
        folders: FolderSet,
        history: HistoryManager,
    ) -> Self {
        Self {
            name,
            phrases,
            stop_words,
            folders,
            history,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Replace the data with `next` as one history step.
    ///
    /// The snapshot under the history cursor always equals the live data,
    /// so the prior state is recorded before the swap. Returns false when
    /// `next` is identical to the current data.
    pub fn commit(&mut self, next: Vec<Phrase>) -> bool {
        if next == self.phrases {
            return false;
        }
        if self.history.is_empty() {
            self.history.set_initial_state(&self.phrases);
        }
        self.history.add_state(&next);
        tracing::debug!(
            list = %self.name,
            before = self.phrases.len(),
            after = next.len(),
            cursor = self.history.current_index(),
            "committed list state"
        );
        self.phrases = next;
        true
    }

    pub fn apply(&mut self, transform: Transform) -> bool {
        let next = transform.apply(&self.phrases);
        let changed = self.commit(next);
        if changed {
            tracing::debug!(list = %self.name, %transform, "applied transform");
        }
        changed
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(state) => {
                self.phrases = state;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(state) => {
                self.phrases = state;
                true
            }
            None => false,
        }
    }

    /// Append an ingested batch. The first population becomes the initial
    /// snapshot; later merges are one undoable step each.
    pub fn merge(&mut self, batch: &[Phrase]) -> usize {
        if batch.is_empty() {
            return 0;
        }
        let mut next = self.phrases.clone();
        next.extend_from_slice(batch);
        if self.history.is_empty() {
            self.history.set_initial_state(&next);
            tracing::debug!(list = %self.name, count = next.len(), "set initial list state");
            self.phrases = next;
        } else {
            self.commit(next);
        }
        batch.len()
    }

    /// Remove every entry whose text equals one of `texts` exactly
    pub fn delete_phrases(&mut self, texts: &[String]) -> usize {
        let doomed: HashSet<&str> = texts.iter().map(String::as_str).collect();
        let next: Vec<Phrase> = self
            .phrases
            .iter()
            .filter(|p| !doomed.contains(p.text.as_str()))
            .cloned()
            .collect();
        let removed = self.phrases.len() - next.len();
        self.commit(next);
        removed
    }

    /// Entries whose identity matches one of `texts`, in list order
    pub fn select(&self, texts: &[String]) -> Vec<Phrase> {
        let wanted: HashSet<String> = texts.iter().map(|t| identity_of(t)).collect();
        self.phrases
            .iter()
            .filter(|p| wanted.contains(&p.identity()))
            .cloned()
            .collect()
    }

    /// Data with every entry sharing an identity with `removed` dropped
    pub(crate) fn without(&self, removed: &[Phrase]) -> Vec<Phrase> {
        let doomed: HashSet<String> = removed.iter().map(Phrase::identity).collect();
        self.phrases
            .iter()
            .filter(|p| !doomed.contains(&p.identity()))
            .cloned()
            .collect()
    }

    /// Data with `incoming` appended, skipping identities already present
    pub(crate) fn with_new(&self, incoming: &[Phrase]) -> Vec<Phrase> {
        let mut seen: HashSet<String> = self.phrases.iter().map(Phrase::identity).collect();
        let mut next = self.phrases.clone();
        for phrase in incoming {
            if seen.insert(phrase.identity()) {
                next.push(phrase.clone());
            }
        }
        next
    }

    pub fn visible(&self, global: &GlobalScope, query: &SearchQuery, mode: StopWordMode) -> FilteredView {
        FilterPipeline::apply(&self.phrases, &self.stop_words, global, query, mode)
    }

    /// Groups over the stop-word-filtered data
    pub fn groups(&self, global: &GlobalScope, mode: StopWordMode) -> Vec<PhraseGroup> {
        let view = self.visible(global, &SearchQuery::none(), mode);
        GroupingEngine::group(&view.phrases())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(items: &[(&str, u64)]) -> Vec<Phrase> {
        items.iter().map(|&(t, f)| Phrase::new(t, f)).collect()
    }

    #[test]
    fn test_first_load_is_the_initial_state() {
        let mut list = PhraseList::new("seo", 50);
        list.merge(&phrases(&[("Banana", 50), ("Apple", 100), ("apple", 5)]));
        assert_eq!(list.history().len(), 1);
        assert_eq!(list.history().current_index(), 0);
        assert!(!list.undo());
        assert_eq!(list.len(), 3);

        assert!(list.apply(Transform::RemoveDuplicates));
        assert!(list.apply(Transform::SortByFrequency { descending: true }));
        assert_eq!(list.phrases(), phrases(&[("Apple", 100), ("Banana", 50)]).as_slice());

        assert!(list.undo());
        assert!(list.undo());
        assert_eq!(list.len(), 3);
        assert!(!list.undo());

        assert!(list.redo());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_later_merge_is_undoable() {
        let mut list = PhraseList::new("seo", 50);
        list.merge(&phrases(&[("a", 1)]));
        list.merge(&phrases(&[("b", 2)]));
        assert_eq!(list.history().len(), 2);
        assert!(list.undo());
        assert_eq!(list.phrases(), phrases(&[("a", 1)]).as_slice());
        assert!(!list.undo());
    }

    #[test]
    fn test_edit_before_any_load_records_empty_start() {
        let mut list = PhraseList::new("seo", 50);
        assert!(list.commit(phrases(&[("typed", 0)])));
        assert!(list.undo());
        assert!(list.is_empty());
    }

    #[test]
    fn test_noop_transform_is_not_recorded() {
        let mut list = PhraseList::new("seo", 50);
        list.merge(&phrases(&[("a", 1), ("b", 2)]));
        let depth = list.history().len();
        assert!(!list.apply(Transform::RemoveDuplicates));
        assert_eq!(list.history().len(), depth);
    }

    #[test]
    fn test_delete_phrases_matches_exact_text() {
        let mut list = PhraseList::new("seo", 50);
        list.merge(&phrases(&[("Car", 1), ("car", 2), ("boat", 3)]));
        assert_eq!(list.delete_phrases(&["car".to_string()]), 1);
        assert_eq!(list.phrases(), phrases(&[("Car", 1), ("boat", 3)]).as_slice());
    }

    #[test]
    fn test_groups_skip_stop_words() {
        let mut list = PhraseList::new("seo", 50);
        list.merge(&phrases(&[("cheap house", 1), ("house plans", 2)]));
        list.stop_words.insert("cheap");
        let groups = list.groups(&GlobalScope::default(), StopWordMode::Token);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key.as_deref(), Some("house"));
        assert_eq!(groups[0].phrases, phrases(&[("house plans", 2)]));
    }
}
