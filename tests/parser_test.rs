use i18n_sync::{render, LocaleParser, LocaleSyntax, QuoteStyle};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

#[test]
fn test_fixture_keys_in_document_order() {
    let path = fixture_path("locales/en.ts");
    let doc = LocaleParser::for_path(&path).parse(&fixture("locales/en.ts"));

    let keys: Vec<&str> = doc.entries.keys().collect();
    assert_eq!(
        keys,
        vec![
            "common.save",
            "common.cancel",
            "common.brand",
            "common.sign-out",
            "greeting",
            "empty",
            "menu.title",
            "menu.items.home",
            "menu.items.about",
            "errors.404",
            "errors.network",
        ]
    );
    assert!(!doc.has_syntax_errors);
    assert!(doc.duplicates.is_empty());
}

#[test]
fn test_fixture_values_and_quotes() {
    let doc = LocaleParser::new(LocaleSyntax::TypeScript).parse(&fixture("locales/en.ts"));
    let entries = &doc.entries;

    assert_eq!(entries.get("common.cancel").unwrap().quote, QuoteStyle::Double);
    assert_eq!(entries.get("greeting").unwrap().quote, QuoteStyle::Backtick);
    assert_eq!(entries.get("greeting").unwrap().value, "Hello there");
    assert_eq!(entries.get("menu.items.about").unwrap().value, "About \"us\"");
    assert_eq!(
        entries.get("errors.network").unwrap().value,
        "Can't reach the server.\nCheck your connection."
    );
    assert_eq!(entries.get("empty").unwrap().value, "");
    assert_eq!(entries.get("menu.items.home").unwrap().depth(), 3);
}

#[test]
fn test_fixture_comments_and_markers() {
    let doc = LocaleParser::default().parse(&fixture("locales/en.ts"));
    let entries = &doc.entries;

    let brand = entries.get("common.brand").unwrap();
    assert_eq!(brand.comment.as_deref(), Some("// [ignorei18n]"));
    assert!(brand.is_protected("[ignorei18n]"));

    let sign_out = entries.get("common.sign-out").unwrap();
    assert_eq!(sign_out.comment.as_deref(), Some("// shown in the header"));
    assert!(!sign_out.is_protected("[ignorei18n]"));

    assert!(entries.get("common.save").unwrap().comment.is_none());
}

#[test]
fn test_interpolated_templates_and_non_strings_are_not_entries() {
    let doc = LocaleParser::default().parse(&fixture("locales/en.ts"));

    assert!(!doc.entries.contains_key("farewell"));
    assert!(!doc.entries.contains_key("retries"));
    assert!(!doc.entries.contains_key("steps"));
    assert!(!doc.entries.keys().any(|key| key.starts_with("steps")));
}

#[test]
fn test_fixture_renders_back_unchanged() {
    let text = fixture("locales/en.ts");
    let entries = LocaleParser::default().parse(&text).entries;
    assert_eq!(render(&text, &entries), text);
}

#[test]
fn test_tsx_and_javascript_grammars() {
    let tsx = LocaleParser::for_path(std::path::Path::new("strings/en.tsx"));
    assert_eq!(tsx.syntax(), LocaleSyntax::Tsx);
    let entries = tsx
        .parse("export const strings = { title: 'Title' } as const;\n")
        .entries;
    assert_eq!(entries.get("title").unwrap().value, "Title");

    let js = LocaleParser::for_path(std::path::Path::new("strings/en.mjs"));
    assert_eq!(js.syntax(), LocaleSyntax::JavaScript);
    let entries = js
        .parse("exports.messages = {\n  ok: \"OK\",\n  nested: { deep: 'Deep' },\n};\n")
        .entries;
    assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["ok", "nested.deep"]);
}

#[test]
fn test_broken_entry_does_not_hide_the_rest() {
    let text = "export default {\n  good: 'Fine',\n  bad: 'Unterminated,\n  other: { inner: 'Still here' },\n};\n";
    let doc = LocaleParser::default().parse(text);

    assert!(doc.has_syntax_errors);
    assert!(doc
        .entries
        .iter()
        .all(|entry| !entry.value.contains("Unterminated")));
}

#[test]
fn test_duplicate_keys_are_reported() {
    let text = "export default {\n  a: 'First',\n  b: 'Middle',\n  a: 'Second',\n};\n";
    let doc = LocaleParser::default().parse(text);

    assert_eq!(doc.entries.len(), 2);
    assert_eq!(doc.entries.get("a").unwrap().value, "Second");
    assert_eq!(doc.duplicates, vec!["a".to_string()]);
    // First occurrence keeps its position in document order
    assert_eq!(doc.entries.keys().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_empty_and_non_object_documents() {
    assert!(LocaleParser::default().parse("").entries.is_empty());
    assert!(LocaleParser::default()
        .parse("export const version = '1.2.3';\n")
        .entries
        .is_empty());
    assert!(LocaleParser::default()
        .parse("export default {};\n")
        .entries
        .is_empty());
}
