//! Filter pipeline: stop-word exclusion, then optional search inclusion
//!
//! Pure functions of (list phrases, local stop words, shared scope, query).
//! Nothing is cached; callers recompute after every mutation.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{Phrase, StopWords};
use crate::workspace::GlobalScope;

/// How a stop word excludes a phrase
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopWordMode {
    /// A whitespace token of the lowercased phrase equals a stop word
    #[default]
    Token,
    /// A stop word occurs anywhere in the lowercased phrase
    Substring,
}

impl StopWordMode {
    pub fn excludes(&self, phrase: &Phrase, stop_words: &StopWords) -> bool {
        match self {
            StopWordMode::Token => phrase.tokens().iter().any(|t| stop_words.contains(t)),
            StopWordMode::Substring => {
                let lower = phrase.text.to_lowercase();
                stop_words.iter().any(|w| lower.contains(w.as_str()))
            }
        }
    }
}

impl std::fmt::Display for StopWordMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopWordMode::Token => write!(f, "token"),
            StopWordMode::Substring => write!(f, "substring"),
        }
    }
}

/// How the search term matches a phrase
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Substring,
    WholeWord,
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub term: String,
    pub mode: SearchMode,
    pub only_matches: bool,
    pattern: Option<Regex>,
}

impl SearchQuery {
    pub fn new(term: &str, mode: SearchMode, only_matches: bool) -> Self {
        let term = term.trim().to_lowercase();
        let pattern = match mode {
            SearchMode::WholeWord if !term.is_empty() => whole_word_pattern(&term).ok(),
            _ => None,
        };
        Self {
            term,
            mode,
            only_matches,
            pattern,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.term.is_empty()
    }

    /// Case-insensitive match against the phrase text
    pub fn matches(&self, text: &str) -> bool {
        if !self.is_active() {
            return false;
        }
        let lower = text.to_lowercase();
        match &self.pattern {
            Some(re) => re.is_match(&lower),
            None => lower.contains(&self.term),
        }
    }
}

/// `\b` only anchors next to word characters, so edges made of
/// punctuation fall back to whitespace/line boundaries.
fn whole_word_pattern(term: &str) -> Result<Regex, regex::Error> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = match term.chars().next() {
        Some(c) if is_word(c) => r"\b",
        _ => r"(?:^|\s)",
    };
    let tail = match term.chars().last() {
        Some(c) if is_word(c) => r"\b",
        _ => r"(?:$|\s)",
    };
    Regex::new(&format!("{}{}{}", lead, regex::escape(term), tail))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    /// Index into the list's phrases
    pub source_index: usize,
    pub phrase: Phrase,
    pub is_match: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    pub rows: Vec<VisibleRow>,
    /// Row positions (into `rows`) that match the search term
    pub matches: Vec<usize>,
    pub total: usize,
}

impl FilteredView {
    pub fn phrases(&self) -> Vec<Phrase> {
        self.rows.iter().map(|r| r.phrase.clone()).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.rows.len()
    }
}

pub struct FilterPipeline;

impl FilterPipeline {
    pub fn effective_stop_words(local: &StopWords, global: &GlobalScope) -> StopWords {
        local.union(&global.stop_words)
    }

    /// Stop words first, then search inclusion when `only_matches` is set
    pub fn apply(
        phrases: &[Phrase],
        local_stop_words: &StopWords,
        global: &GlobalScope,
        query: &SearchQuery,
        mode: StopWordMode,
    ) -> FilteredView {
        let stop_words = Self::effective_stop_words(local_stop_words, global);
        let mut rows = Vec::new();
        let mut matches = Vec::new();

        for (source_index, phrase) in phrases.iter().enumerate() {
            if !stop_words.is_empty() && mode.excludes(phrase, &stop_words) {
                continue;
            }
            let is_match = query.matches(&phrase.text);
            if query.is_active() && query.only_matches && !is_match {
                continue;
            }
            if is_match {
                matches.push(rows.len());
            }
            rows.push(VisibleRow {
                source_index,
                phrase: phrase.clone(),
                is_match,
            });
        }

        FilteredView {
            rows,
            matches,
            total: phrases.len(),
        }
    }
}

/// Cyclic cursor over the matching rows of a view
#[derive(Debug, Clone, Default)]
pub struct MatchNavigator {
    matches: Vec<usize>,
    position: usize,
}

impl MatchNavigator {
    pub fn new(view: &FilteredView) -> Self {
        Self {
            matches: view.matches.clone(),
            position: 0,
        }
    }

    /// Row of the current match
    pub fn current(&self) -> Option<usize> {
        self.matches.get(self.position).copied()
    }

    pub fn next(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.position = (self.position + 1) % self.matches.len();
        self.current()
    }

    pub fn previous(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.position = (self.position + self.matches.len() - 1) % self.matches.len();
        self.current()
    }

    /// (1-based position, total), or (0, 0) with no matches
    pub fn status(&self) -> (usize, usize) {
        if self.matches.is_empty() {
            (0, 0)
        } else {
            (self.position + 1, self.matches.len())
        }
    }
}
