//! Label parsing
//!
//! Claimed texts carry `label: value` pairs ("Size: M", "Piece Name:
//! boke_Sleeve"). The colon may be ASCII or full-width; label lookup is
//! case- and whitespace-insensitive. Strings without a separator are
//! ignored — a missing label never fails assembly.

use std::collections::HashMap;

/// Normalized label key to raw value, first occurrence wins.
pub type LabelMap = HashMap<String, String>;

/// Lowercases and strips whitespace and underscores, so "Piece Name",
/// "pieceName", and "piece_name" share one lookup key.
pub fn normalize_label_key(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Splits one claimed text into `(key, value)` at the first ASCII or
/// full-width colon.
pub fn parse_label(raw: &str) -> Option<(String, String)> {
    let split_at = raw.find(':').into_iter().chain(raw.find('：')).min()?;
    let (label, rest) = raw.split_at(split_at);
    let value = rest
        .trim_start_matches([':', '：'])
        .trim()
        .to_string();
    let key = normalize_label_key(label);
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Folds a piece's claimed texts into a label map.
pub fn label_map<'a>(texts: impl Iterator<Item = &'a str>) -> LabelMap {
    let mut map = LabelMap::new();
    for raw in texts {
        if let Some((key, value)) = parse_label(raw) {
            map.entry(key).or_insert(value);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ascii_colon() {
        let (key, value) = parse_label("Size: M").unwrap();
        assert_eq!(key, "size");
        assert_eq!(value, "M");
    }

    #[test]
    fn parses_full_width_colon() {
        let (key, value) = parse_label("Piece Name：boke_Sleeve").unwrap();
        assert_eq!(key, "piecename");
        assert_eq!(value, "boke_Sleeve");
    }

    #[test]
    fn no_separator_is_ignored() {
        assert!(parse_label("just a note").is_none());
        assert!(parse_label(": value without label").is_none());
    }

    #[test]
    fn first_occurrence_wins() {
        let map = label_map(["Size: M", "size: L"].into_iter());
        assert_eq!(map.get("size").map(String::as_str), Some("M"));
    }
}
