//! Russian Cyrillic <-> Latin transliteration tables

use once_cell::sync::Lazy;
use regex::Regex;

static CYRILLIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Cyrillic}").expect("static pattern"));

/// Lowercase Cyrillic letter -> Latin unit
const FORWARD: &[(char, &str)] = &[
    ('а', "a"),
    ('б', "b"),
    ('в', "v"),
    ('г', "g"),
    ('д', "d"),
    ('е', "e"),
    ('ё', "yo"),
    ('ж', "zh"),
    ('з', "z"),
    ('и', "i"),
    ('й', "j"),
    ('к', "k"),
    ('л', "l"),
    ('м', "m"),
    ('н', "n"),
    ('о', "o"),
    ('п', "p"),
    ('р', "r"),
    ('с', "s"),
    ('т', "t"),
    ('у', "u"),
    ('ф', "f"),
    ('х', "kh"),
    ('ц', "ts"),
    ('ч', "ch"),
    ('ш', "sh"),
    ('щ', "shch"),
    ('ъ', "''"),
    ('ы', "y"),
    ('ь', "'"),
    ('э', "e'"),
    ('ю', "yu"),
    ('я', "ya"),
];

/// Latin units tried longest first when converting back to Cyrillic
static REVERSE: Lazy<Vec<(&'static str, char)>> = Lazy::new(|| {
    let mut units: Vec<(&'static str, char)> = FORWARD
        .iter()
        .map(|(cyr, lat)| (*lat, *cyr))
        .chain([("sch", 'щ'), ("h", 'х'), ("c", 'ц'), ("w", 'в'), ("x", 'х')])
        .collect();
    units.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    units
});

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransliterationError {
    #[error("No Latin mapping for Cyrillic letter '{0}'")]
    Unmapped(char),
}

pub fn contains_cyrillic(text: &str) -> bool {
    CYRILLIC.is_match(text)
}

/// Cyrillic -> Latin. Non-Cyrillic characters pass through.
pub fn to_latin(text: &str) -> Result<String, TransliterationError> {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let lower = ch.to_lowercase().next().unwrap_or(ch);
        match FORWARD.iter().find(|(cyr, _)| *cyr == lower) {
            Some((_, latin)) if ch != lower => push_capitalized(&mut out, latin),
            Some((_, latin)) => out.push_str(latin),
            None if contains_cyrillic(&ch.to_string()) => {
                return Err(TransliterationError::Unmapped(ch));
            }
            None => out.push(ch),
        }
    }
    Ok(out)
}

/// Latin -> Cyrillic, greedy longest unit first
pub fn to_cyrillic(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() * 2);
    let mut i = 0;
    'outer: while i < chars.len() {
        for (latin, cyr) in REVERSE.iter() {
            let len = latin.chars().count();
            if i + len > chars.len() {
                continue;
            }
            let window: String = chars[i..i + len].iter().collect();
            if window.to_lowercase() == *latin {
                if chars[i].is_uppercase() {
                    out.extend(cyr.to_uppercase());
                } else {
                    out.push(*cyr);
                }
                i += len;
                continue 'outer;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn push_capitalized(out: &mut String, unit: &str) {
    let mut chars = unit.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_latin_preserves_capitals() {
        assert_eq!(to_latin("Щука и ёж").unwrap(), "Shchuka i yozh");
    }

    #[test]
    fn test_unmapped_cyrillic_fails() {
        assert_eq!(to_latin("їжак"), Err(TransliterationError::Unmapped('ї')));
    }

    #[test]
    fn test_to_cyrillic_prefers_digraphs() {
        assert_eq!(to_cyrillic("Zhuk shchi"), "Жук щи");
        assert_eq!(to_cyrillic("moskva 2024"), "москва 2024");
    }
}
