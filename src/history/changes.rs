use std::collections::BTreeSet;

use crate::parse::LocaleParser;

/// Key paths whose value is new or different in the later snapshot
pub type ChangeSet = BTreeSet<String>;

/// Compare two snapshots of a locale document.
///
/// Returns `None` when there is no earlier snapshot to compare against, which
/// callers must treat differently from `Some(empty)` ("nothing changed").
/// Keys removed between snapshots are not reported.
pub fn changed_keys(old_text: Option<&str>, new_text: &str, parser: &LocaleParser) -> Option<ChangeSet> {
    let old_text = old_text?;
    if old_text == new_text {
        return Some(ChangeSet::new());
    }

    let old_map = parser.parse(old_text).entries;
    let new_map = parser.parse(new_text).entries;

    let changed = new_map
        .iter()
        .filter(|entry| {
            old_map
                .get(&entry.key_path)
                .map_or(true, |previous| previous.value != entry.value)
        })
        .map(|entry| entry.key_path.clone())
        .collect();

    Some(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> LocaleParser {
        LocaleParser::default()
    }

    #[test]
    fn test_no_history_is_none() {
        assert_eq!(changed_keys(None, "export default { a: 'x' };", &parser()), None);
    }

    #[test]
    fn test_identical_snapshots_are_empty_not_none() {
        let text = "export default { a: 'x', b: { c: 'y' } };";
        assert_eq!(changed_keys(Some(text), text, &parser()), Some(ChangeSet::new()));
    }

    #[test]
    fn test_modified_and_added_keys() {
        let old = "export default {\n  a: 'Hello',\n  b: 'World',\n  gone: 'Bye',\n};\n";
        let new = "export default {\n  a: 'Hi',\n  b: 'World',\n  nested: { c: 'New' },\n};\n";
        let changed = changed_keys(Some(old), new, &parser()).unwrap();
        assert_eq!(
            changed.into_iter().collect::<Vec<_>>(),
            vec!["a".to_string(), "nested.c".to_string()]
        );
    }

    #[test]
    fn test_formatting_only_changes_are_ignored() {
        let old = "export default { a: 'Hello', b: \"World\" };";
        let new = "export default {\n  a: \"Hello\", // reformatted\n  b: 'World',\n};\n";
        assert_eq!(changed_keys(Some(old), new, &parser()), Some(ChangeSet::new()));
    }
}
