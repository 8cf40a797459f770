//! Deterministic grouping by each phrase's most significant token

use std::collections::HashMap;

use crate::models::Phrase;

/// Label of the bucket for phrases with no token longer than [`MIN_KEY_LEN`]
pub const UNGROUPED: &str = "ungrouped";

/// Tokens must be strictly longer than this (in chars) to become a key
pub const MIN_KEY_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseGroup {
    /// `None` for the ungrouped bucket
    pub key: Option<String>,
    pub phrases: Vec<Phrase>,
}

impl PhraseGroup {
    /// Display name; the bucket shows as [`UNGROUPED`]
    pub fn label(&self) -> &str {
        self.key.as_deref().unwrap_or(UNGROUPED)
    }

    pub fn is_ungrouped(&self) -> bool {
        self.key.is_none()
    }
}

pub struct GroupingEngine;

impl GroupingEngine {
    /// Longest qualifying token of the lowercased text; the first one wins ties
    pub fn group_key(text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        let mut best: Option<(&str, usize)> = None;
        for token in lower.split_whitespace() {
            let len = token.chars().count();
            if len <= MIN_KEY_LEN {
                continue;
            }
            if best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((token, len));
            }
        }
        best.map(|(token, _)| token.to_string())
    }

    /// Groups appear in order of first key production; members keep input order
    pub fn group(phrases: &[Phrase]) -> Vec<PhraseGroup> {
        let mut groups: Vec<PhraseGroup> = Vec::new();
        let mut index: HashMap<Option<String>, usize> = HashMap::new();
        for phrase in phrases {
            let key = Self::group_key(&phrase.text);
            match index.get(&key) {
                Some(&at) => groups[at].phrases.push(phrase.clone()),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(PhraseGroup {
                        key,
                        phrases: vec![phrase.clone()],
                    });
                }
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyrillic_key_uses_char_length() {
        assert_eq!(
            GroupingEngine::group_key("красивый дом"),
            Some("красивый".to_string())
        );
        assert_eq!(
            GroupingEngine::group_key("дом большой"),
            Some("большой".to_string())
        );
    }

    #[test]
    fn test_tie_goes_to_first_token() {
        assert_eq!(GroupingEngine::group_key("White House"), Some("white".to_string()));
        assert_eq!(GroupingEngine::group_key("house white"), Some("house".to_string()));
    }

    #[test]
    fn test_group_order_and_ungrouped_bucket() {
        let input = vec![
            Phrase::new("buy cars", 1),
            Phrase::new("a b", 2),
            Phrase::new("red cars", 3),
            Phrase::new("cars", 4),
            Phrase::new("dog", 5),
        ];
        let groups = GroupingEngine::group(&input);
        let keys: Vec<Option<&str>> = groups.iter().map(|g| g.key.as_deref()).collect();
        assert_eq!(keys, vec![Some("cars"), None]);
        assert_eq!(groups[1].label(), UNGROUPED);
        assert_eq!(
            groups[0].phrases,
            vec![Phrase::new("buy cars", 1), Phrase::new("red cars", 3), Phrase::new("cars", 4)]
        );
        assert_eq!(groups[1].phrases.len(), 2);
    }

    #[test]
    fn test_literal_ungrouped_token_is_a_real_group() {
        let input = vec![
            Phrase::new("ungrouped items", 1),
            Phrase::new("on it", 2),
            Phrase::new("more ungrouped", 3),
        ];
        let groups = GroupingEngine::group(&input);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.as_deref(), Some("ungrouped"));
        assert_eq!(groups[0].phrases.len(), 2);
        assert!(groups[1].is_ungrouped());
        assert_eq!(groups[1].phrases, vec![Phrase::new("on it", 2)]);
    }

    #[test]
    fn test_many_keys_keep_first_seen_order() {
        let input: Vec<Phrase> = (0..500)
            .map(|i| Phrase::new(format!("word{} tail", i % 250), i))
            .collect();
        let groups = GroupingEngine::group(&input);
        assert_eq!(groups.len(), 250);
        assert_eq!(groups[0].key.as_deref(), Some("word0"));
        assert_eq!(groups[249].key.as_deref(), Some("word249"));
        assert_eq!(groups[7].phrases, vec![Phrase::new("word7 tail", 7), Phrase::new("word7 tail", 257)]);
    }
}
