//! Kitchen measure reference shown next to the ingredient lists

/// Default usage memo: rough volume/weight equivalents for common measures.
pub const DEFAULT_USAGE_MEMO: &str = "\u{1F4A1} Usage reference:\n\
    - 1 tablespoon = about 15 ml\n\
    - 1 teaspoon = about 5 ml\n\
    - 1 cup = about 200 ml\n\
    - 1 tablespoon of solids = about 9 g";

/// Resolve the memo text, falling back to the default when the override is
/// missing or blank.
pub fn usage_memo(override_text: Option<&str>) -> &str {
    match override_text {
        Some(text) if !text.trim().is_empty() => text,
        _ => DEFAULT_USAGE_MEMO,
    }
}
