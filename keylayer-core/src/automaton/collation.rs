//! Locale-insensitive ordering of action ids

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Sort key of an action id.
///
/// Accents are stripped through NFKD decomposition. Each remaining
/// character ranks lowercase first, then uppercase, then everything else.
pub fn collation_key(id: &str) -> Vec<(u8, char)> {
    id.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            let rank = if c.is_lowercase() {
                0
            } else if c.is_uppercase() {
                1
            } else {
                2
            };
            (rank, c)
        })
        .collect()
}

/// Total order on action ids; ties on the collation key fall back to the raw id
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(ids: &[&str]) -> Vec<String> {
        let mut ids: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
        ids.sort_by(|a, b| compare_ids(a, b));
        ids
    }

    #[test]
    fn test_lowercase_before_uppercase_before_symbols() {
        assert_eq!(sorted(&["^", "A", "b", "a"]), vec!["a", "b", "A", "^"]);
    }

    #[test]
    fn test_accents_sort_with_base_letter() {
        assert_eq!(sorted(&["f", "é", "e"]), vec!["e", "é", "f"]);
        assert_eq!(collation_key("ê"), collation_key("e"));
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(sorted(&["ab", "a"]), vec!["a", "ab"]);
    }
}
