//! Phrase transformations
//!
//! Every operation takes a slice of entries and returns a new vector.
//! Inputs are never mutated and nothing here can fail: per-entry problems
//! leave the entry as it was.

pub mod translit;

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::filter::StopWordMode;
use crate::grouping::{GroupingEngine, PhraseGroup};
use crate::models::{Phrase, StopWords};

/// Default word limit for [`PhraseProcessor::remove_long_phrases`]
pub const DEFAULT_MAX_WORDS: usize = 7;

/// Stateless phrase transformations
pub struct PhraseProcessor;

impl PhraseProcessor {
    /// Drop later entries whose trimmed, lowercased text was already seen
    pub fn remove_duplicates(phrases: &[Phrase]) -> Vec<Phrase> {
        let mut seen = HashSet::new();
        phrases
            .iter()
            .filter(|p| seen.insert(p.identity()))
            .cloned()
            .collect()
    }

    /// Case-insensitive sort by text, stable for ties
    pub fn sort_alphabetically(phrases: &[Phrase], descending: bool) -> Vec<Phrase> {
        let mut keyed: Vec<(String, &Phrase)> =
            phrases.iter().map(|p| (p.text.to_lowercase(), p)).collect();
        keyed.sort_by(|a, b| directed(a.0.cmp(&b.0), descending));
        keyed.into_iter().map(|(_, p)| p.clone()).collect()
    }

    /// Numeric sort by frequency, stable for ties
    pub fn sort_by_frequency(phrases: &[Phrase], descending: bool) -> Vec<Phrase> {
        let mut sorted = phrases.to_vec();
        sorted.sort_by(|a, b| directed(a.frequency.cmp(&b.frequency), descending));
        sorted
    }

    pub fn convert_case(phrases: &[Phrase], to_upper: bool) -> Vec<Phrase> {
        phrases
            .iter()
            .map(|p| {
                let text = if to_upper {
                    p.text.to_uppercase()
                } else {
                    p.text.to_lowercase()
                };
                Phrase::new(text, p.frequency)
            })
            .collect()
    }

    /// Replace anything but letters, digits and whitespace with a space,
    /// collapse whitespace, drop entries left empty
    pub fn remove_special_chars(phrases: &[Phrase]) -> Vec<Phrase> {
        phrases
            .iter()
            .filter_map(|p| {
                let replaced: String = p
                    .text
                    .chars()
                    .map(|c| {
                        if c.is_alphanumeric() || c.is_whitespace() {
                            c
                        } else {
                            ' '
                        }
                    })
                    .collect();
                let cleaned = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
                (!cleaned.is_empty()).then(|| Phrase::new(cleaned, p.frequency))
            })
            .collect()
    }

    /// Keep entries with at most `max_words` whitespace tokens
    pub fn remove_long_phrases(phrases: &[Phrase], max_words: usize) -> Vec<Phrase> {
        phrases
            .iter()
            .filter(|p| p.text.split_whitespace().count() <= max_words)
            .cloned()
            .collect()
    }

    /// Cyrillic -> Latin (or Latin -> Cyrillic when `reverse`). Only entries
    /// not already in the target script are touched.
    pub fn transliterate(phrases: &[Phrase], reverse: bool) -> Vec<Phrase> {
        phrases
            .iter()
            .map(|p| {
                let has_cyrillic = translit::contains_cyrillic(&p.text);
                let converted = match (reverse, has_cyrillic) {
                    (false, true) => match translit::to_latin(&p.text) {
                        Ok(text) => Some(text),
                        Err(e) => {
                            tracing::debug!(text = %p.text, error = %e, "transliteration skipped");
                            None
                        }
                    },
                    (true, false) => Some(translit::to_cyrillic(&p.text)),
                    _ => None,
                };
                match converted {
                    Some(text) => Phrase::new(text, p.frequency),
                    None => p.clone(),
                }
            })
            .collect()
    }

    /// Drop entries matched by the stop-word predicate
    pub fn filter_by_stop_words(
        phrases: &[Phrase],
        stop_words: &StopWords,
        mode: StopWordMode,
    ) -> Vec<Phrase> {
        if stop_words.is_empty() {
            return phrases.to_vec();
        }
        phrases
            .iter()
            .filter(|p| !mode.excludes(p, stop_words))
            .cloned()
            .collect()
    }

    pub fn group_phrases(phrases: &[Phrase]) -> Vec<PhraseGroup> {
        GroupingEngine::group(phrases)
    }
}

fn directed(ordering: Ordering, descending: bool) -> Ordering {
    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

/// A list-level transformation that goes through history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    RemoveDuplicates,
    SortAlphabetically { descending: bool },
    SortByFrequency { descending: bool },
    ConvertCase { to_upper: bool },
    RemoveSpecialChars,
    RemoveLongPhrases { max_words: usize },
    Transliterate { reverse: bool },
}

impl Transform {
    pub fn apply(&self, phrases: &[Phrase]) -> Vec<Phrase> {
        match *self {
            Transform::RemoveDuplicates => PhraseProcessor::remove_duplicates(phrases),
            Transform::SortAlphabetically { descending } => {
                PhraseProcessor::sort_alphabetically(phrases, descending)
            }
            Transform::SortByFrequency { descending } => {
                PhraseProcessor::sort_by_frequency(phrases, descending)
            }
            Transform::ConvertCase { to_upper } => PhraseProcessor::convert_case(phrases, to_upper),
            Transform::RemoveSpecialChars => PhraseProcessor::remove_special_chars(phrases),
            Transform::RemoveLongPhrases { max_words } => {
                PhraseProcessor::remove_long_phrases(phrases, max_words)
            }
            Transform::Transliterate { reverse } => PhraseProcessor::transliterate(phrases, reverse),
        }
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transform::RemoveDuplicates => write!(f, "dedup"),
            Transform::SortAlphabetically { descending: false } => write!(f, "sort-az"),
            Transform::SortAlphabetically { descending: true } => write!(f, "sort-za"),
            Transform::SortByFrequency { descending: true } => write!(f, "sort-freq-desc"),
            Transform::SortByFrequency { descending: false } => write!(f, "sort-freq-asc"),
            Transform::ConvertCase { to_upper: true } => write!(f, "upper"),
            Transform::ConvertCase { to_upper: false } => write!(f, "lower"),
            Transform::RemoveSpecialChars => write!(f, "strip-special"),
            Transform::RemoveLongPhrases { max_words } => write!(f, "drop-long({})", max_words),
            Transform::Transliterate { reverse: false } => write!(f, "translit"),
            Transform::Transliterate { reverse: true } => write!(f, "translit-back"),
        }
    }
}

impl std::str::FromStr for Transform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dedup" => Ok(Transform::RemoveDuplicates),
            "sort-az" => Ok(Transform::SortAlphabetically { descending: false }),
            "sort-za" => Ok(Transform::SortAlphabetically { descending: true }),
            "sort-freq-desc" => Ok(Transform::SortByFrequency { descending: true }),
            "sort-freq-asc" => Ok(Transform::SortByFrequency { descending: false }),
            "upper" => Ok(Transform::ConvertCase { to_upper: true }),
            "lower" => Ok(Transform::ConvertCase { to_upper: false }),
            "strip-special" => Ok(Transform::RemoveSpecialChars),
            "drop-long" => Ok(Transform::RemoveLongPhrases {
                max_words: DEFAULT_MAX_WORDS,
            }),
            "translit" => Ok(Transform::Transliterate { reverse: false }),
            "translit-back" => Ok(Transform::Transliterate { reverse: true }),
            _ => Err(format!(
                "Invalid transform: {}. Use: dedup, sort-az, sort-za, sort-freq-desc, sort-freq-asc, \
                 upper, lower, strip-special, drop-long, translit, translit-back",
                s
            )),
        }
    }
}
