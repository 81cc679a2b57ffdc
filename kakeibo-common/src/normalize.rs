//! Reading keys for display ordering
//!
//! Names mix kanji, hiragana, katakana and latin script. Lists are ordered
//! by the hiragana reading of each name so that e.g. `キャベツ`, `玉ねぎ` and
//! `しょうゆ` sort in gojūon order regardless of how they were written.
//!
//! Keys are only ever used for sorting. They are not stored and are not
//! identities: two different names may share a key.

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;

/// Katakana block range that has a hiragana counterpart (ァ..ヶ)
const KATAKANA_FIRST: char = '\u{30A1}';
const KATAKANA_LAST: char = '\u{30F6}';
const KATAKANA_TO_HIRAGANA: u32 = 0x60;

/// Map a display name to its phonetic sort key.
///
/// Total: never fails and never panics, whatever the input.
pub fn reading_key(name: &str) -> String {
    let folded: String = name.trim().nfkc().collect();
    let reading = kakasi::convert(&folded).hiragana;

    reading
        .chars()
        .map(katakana_to_hiragana)
        .flat_map(char::to_lowercase)
        .collect()
}

fn katakana_to_hiragana(c: char) -> char {
    if (KATAKANA_FIRST..=KATAKANA_LAST).contains(&c) {
        char::from_u32(c as u32 - KATAKANA_TO_HIRAGANA).unwrap_or(c)
    } else {
        c
    }
}

/// Compare two names by reading, then by the raw name to keep ties stable
pub fn compare_by_reading(a: &str, b: &str) -> Ordering {
    reading_key(a).cmp(&reading_key(b)).then_with(|| a.cmp(b))
}

/// Sort `items` in place by the reading of the name returned by `name_of`.
pub fn sort_by_reading<T, F>(items: &mut [T], name_of: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| {
        let name = name_of(item);
        (reading_key(name), name.to_string())
    });
}
