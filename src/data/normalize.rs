//! String normalization shared by the loaders and the join.

use super::counties::lookup_code;
use serde::Serialize;

/// Title-case a label: the first letter after any non-letter is uppercased,
/// every other letter lowercased. Unlike plain title-casing, leading and
/// trailing whitespace is also trimmed, so padded cells still join.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;

    for c in s.trim().chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}

/// Lowercase alphanumerics only, so "Taita-Taveta" and "taita taveta" fold alike.
pub fn fold(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Join key for a county name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CountyKey {
    /// Official county code (1..=47)
    Code(u8),
    /// Folded name for counties outside the lookup table
    Name(String),
}

/// Resolve a county name to its canonical join key.
pub fn county_key(name: &str) -> CountyKey {
    let folded = fold(name);
    match lookup_code(&folded) {
        Some(code) => CountyKey::Code(code),
        None => CountyKey::Name(folded),
    }
}
