use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::literal;

/// Comment token that marks an entry as manually curated
pub const DEFAULT_PROTECT_MARKER: &str = "[ignorei18n]";

/// Delimiter used by a string literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Single,
    Double,
    Backtick,
}

impl QuoteStyle {
    pub fn from_delimiter(ch: char) -> Option<Self> {
        match ch {
            '\'' => Some(Self::Single),
            '"' => Some(Self::Double),
            '`' => Some(Self::Backtick),
            _ => None,
        }
    }

    pub fn delimiter(&self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
            Self::Backtick => '`',
        }
    }
}

/// A single translatable leaf of a locale document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Dot-joined nesting path (e.g., "menu.file.open")
    pub key_path: String,
    /// Unescaped string content
    pub value: String,
    /// Delimiter the literal was written with
    pub quote: QuoteStyle,
    /// The literal exactly as written, delimiters included
    pub raw: String,
    /// Trailing same-line comment, markers included (e.g., "// [ignorei18n]")
    pub comment: Option<String>,
    /// Line of the literal (1-indexed, 0 when synthesised)
    pub line: usize,
}

impl Entry {
    /// Create an entry whose raw literal is generated from `value`
    pub fn new(key_path: impl Into<String>, value: impl Into<String>, quote: QuoteStyle) -> Self {
        let value = value.into();
        Self {
            key_path: key_path.into(),
            raw: literal::quote(&value, quote),
            value,
            quote,
            comment: None,
            line: 0,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Same key, quote style and comment, carrying a different value
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            key_path: self.key_path.clone(),
            raw: literal::quote(&value, self.quote),
            value,
            quote: self.quote,
            comment: self.comment.clone(),
            line: self.line,
        }
    }

    /// Whether the trailing comment carries `marker`
    pub fn is_protected(&self, marker: &str) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|comment| comment.contains(marker))
    }

    /// Literal text for a slot written with `quote`.
    ///
    /// The raw literal is reused untouched whenever the delimiters agree.
    pub fn literal_for(&self, quote: QuoteStyle) -> Cow<'_, str> {
        if quote == self.quote {
            Cow::Borrowed(&self.raw)
        } else {
            Cow::Owned(literal::quote(&self.value, quote))
        }
    }

    /// Nesting depth, 1 for top-level keys
    pub fn depth(&self) -> usize {
        self.key_path.split('.').count()
    }
}

/// Ordered mapping of key path to entry for one document snapshot.
///
/// Iteration follows insertion (document) order. Re-inserting an existing key
/// replaces the entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMap {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl EntryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the one it replaced
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        match self.index.get(&entry.key_path) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos], entry)),
            None => {
                self.index.insert(entry.key_path.clone(), self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    pub fn get(&self, key_path: &str) -> Option<&Entry> {
        self.index.get(key_path).map(|&pos| &self.entries[pos])
    }

    pub fn contains_key(&self, key_path: &str) -> bool {
        self.index.contains_key(key_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key_path.as_str())
    }
}

impl FromIterator<Entry> for EntryMap {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut map = EntryMap::new();
        for entry in iter {
            map.insert(entry);
        }
        map
    }
}

impl<'a> IntoIterator for &'a EntryMap {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_new_builds_raw_literal() {
        let entry = Entry::new("menu.title", "It's here", QuoteStyle::Single);
        assert_eq!(entry.raw, r"'It\'s here'");
        assert_eq!(entry.depth(), 2);
    }

    #[test]
    fn test_protect_marker_detection() {
        let entry = Entry::new("a", "Bonjour", QuoteStyle::Double)
            .with_comment("// [ignorei18n] brand name");
        assert!(entry.is_protected(DEFAULT_PROTECT_MARKER));
        assert!(!entry.is_protected("[keep]"));

        let plain = Entry::new("b", "Monde", QuoteStyle::Double).with_comment("// todo");
        assert!(!plain.is_protected(DEFAULT_PROTECT_MARKER));
    }

    #[test]
    fn test_literal_for_reuses_raw_on_same_quote() {
        let mut entry = Entry::new("a", "x", QuoteStyle::Single);
        entry.raw = r"'\x78'".to_string();
        assert_eq!(entry.literal_for(QuoteStyle::Single), r"'\x78'");
        assert_eq!(entry.literal_for(QuoteStyle::Double), "\"x\"");
    }

    #[test]
    fn test_with_value_keeps_comment_and_quote() {
        let entry = Entry::new("a", "Hello", QuoteStyle::Backtick).with_comment("// note");
        let translated = entry.with_value("Hallo");
        assert_eq!(translated.raw, "`Hallo`");
        assert_eq!(translated.comment.as_deref(), Some("// note"));
    }

    #[test]
    fn test_entry_map_last_wins_keeps_position() {
        let mut map = EntryMap::new();
        map.insert(Entry::new("a", "1", QuoteStyle::Single));
        map.insert(Entry::new("b", "2", QuoteStyle::Single));
        let replaced = map.insert(Entry::new("a", "3", QuoteStyle::Single));

        assert_eq!(replaced.map(|e| e.value), Some("1".to_string()));
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a").map(|e| e.value.as_str()), Some("3"));
    }
}
