//! Data models for phrasedesk
//!
//! Plain records shared by every layer: the phrase entry, transfer kind,
//! frequency tiers and the normalised stop-word set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single (text, frequency) entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phrase {
    pub text: String,
    #[serde(default)]
    pub frequency: u64,
}

impl Phrase {
    pub fn new(text: impl Into<String>, frequency: u64) -> Self {
        Self {
            text: text.into(),
            frequency,
        }
    }

    /// Deduplication identity: trimmed, lowercased text
    pub fn identity(&self) -> String {
        identity_of(&self.text)
    }

    /// Lowercased whitespace tokens
    pub fn tokens(&self) -> Vec<String> {
        self.text
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl From<(&str, u64)> for Phrase {
    fn from((text, frequency): (&str, u64)) -> Self {
        Phrase::new(text, frequency)
    }
}

pub fn identity_of(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Copy leaves the source untouched, move removes from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Copy,
    Move,
}

/// Frequency bucket used by renderers to colour rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FrequencyTier {
    Minimal,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl FrequencyTier {
    pub fn of(frequency: u64) -> Self {
        match frequency {
            f if f >= 100_000 => FrequencyTier::VeryHigh,
            f if f >= 10_000 => FrequencyTier::High,
            f if f >= 1_000 => FrequencyTier::Medium,
            f if f >= 100 => FrequencyTier::Low,
            _ => FrequencyTier::Minimal,
        }
    }
}

impl std::fmt::Display for FrequencyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrequencyTier::Minimal => write!(f, "minimal"),
            FrequencyTier::Low => write!(f, "low"),
            FrequencyTier::Medium => write!(f, "medium"),
            FrequencyTier::High => write!(f, "high"),
            FrequencyTier::VeryHigh => write!(f, "very-high"),
        }
    }
}

/// Set of trimmed, lowercased stop-word tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords(BTreeSet<String>);

impl StopWords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a word; returns false for blank input or an existing word
    pub fn insert(&mut self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return false;
        }
        self.0.insert(word)
    }

    pub fn remove(&mut self, word: &str) -> bool {
        self.0.remove(&word.trim().to_lowercase())
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.contains(word)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Words in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn union(&self, other: &StopWords) -> StopWords {
        StopWords(self.0.union(&other.0).cloned().collect())
    }
}

impl<'a> FromIterator<&'a str> for StopWords {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut words = StopWords::new();
        for word in iter {
            words.insert(word);
        }
        words
    }
}
