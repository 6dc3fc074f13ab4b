use std::ops::Range;
use std::path::Path;
use tracing::{debug, warn};
use tree_sitter::{Language, Node, Parser, Tree};

use super::entry::{Entry, EntryMap, QuoteStyle};
use super::literal;
use crate::error::{Result, SyncError};

/// Concrete syntax of a locale source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LocaleSyntax {
    JavaScript,
    #[default]
    TypeScript,
    Tsx,
}

impl LocaleSyntax {
    /// Pick the grammar from the file extension; unknown extensions read as JavaScript
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ts" | "mts" | "cts") => Self::TypeScript,
            Some("tsx") => Self::Tsx,
            _ => Self::JavaScript,
        }
    }

    pub fn language(&self) -> Language {
        match self {
            Self::JavaScript => tree_sitter_javascript::language(),
            Self::TypeScript => tree_sitter_typescript::language_typescript(),
            Self::Tsx => tree_sitter_typescript::language_tsx(),
        }
    }
}

/// Where a leaf lives in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSite {
    pub key_path: String,
    /// Byte span of the literal, delimiters included
    pub literal: Range<usize>,
    /// Byte span of the trailing comment, if any
    pub comment: Option<Range<usize>>,
    pub quote: QuoteStyle,
}

/// Result of parsing one locale document
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub entries: EntryMap,
    /// Every leaf in document order, duplicates included
    pub sites: Vec<LeafSite>,
    /// Key paths that occurred more than once (last occurrence wins)
    pub duplicates: Vec<String>,
    pub has_syntax_errors: bool,
}

/// Tree-sitter backed reader for `export default { ... }` style locale files
#[derive(Debug, Clone, Copy, Default)]
pub struct LocaleParser {
    syntax: LocaleSyntax,
}

/// A leaf found while walking, before comments are attached
struct RawLeaf {
    key_path: String,
    literal: Range<usize>,
    end_row: usize,
    line: usize,
    quote: QuoteStyle,
}

struct RawComment {
    span: Range<usize>,
    row: usize,
}

impl LocaleParser {
    pub fn new(syntax: LocaleSyntax) -> Self {
        Self { syntax }
    }

    pub fn for_path(path: &Path) -> Self {
        Self::new(LocaleSyntax::from_path(path))
    }

    pub fn syntax(&self) -> LocaleSyntax {
        self.syntax
    }

    fn build_tree(&self, text: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(self.syntax.language())
            .map_err(|e| SyncError::Parse(format!("failed to load grammar: {}", e)))?;
        parser
            .parse(text, None)
            .ok_or_else(|| SyncError::Parse("parser returned no tree".to_string()))
    }

    /// Parse a document into entries and leaf sites.
    ///
    /// Never fails: damaged regions simply contribute no entries.
    pub fn parse(&self, text: &str) -> ParsedDocument {
        let mut doc = ParsedDocument::default();

        let tree = match self.build_tree(text) {
            Ok(tree) => tree,
            Err(e) => {
                warn!("{}; treating document as empty", e);
                return doc;
            }
        };

        let root = tree.root_node();
        doc.has_syntax_errors = root.has_error();
        if doc.has_syntax_errors {
            warn!("locale document contains syntax errors; entries in damaged regions are skipped");
        }

        let mut leaves = Vec::new();
        for object in root_objects(root) {
            let mut path = Vec::new();
            collect_object(object, text, &mut path, &mut leaves);
        }

        let mut comments = Vec::new();
        collect_comments(root, &mut comments);
        let attached = attach_comments(&leaves, &comments, text);

        for (leaf, comment) in leaves.into_iter().zip(attached) {
            let raw = &text[leaf.literal.clone()];
            let body = &raw[1..raw.len() - 1];
            let mut entry = Entry {
                key_path: leaf.key_path.clone(),
                value: literal::unescape(body),
                quote: leaf.quote,
                raw: raw.to_string(),
                comment: None,
                line: leaf.line,
            };
            if let Some(span) = &comment {
                entry.comment = Some(text[span.clone()].to_string());
            }

            if doc.entries.insert(entry).is_some() {
                warn!(
                    "duplicate key '{}' at line {}; the later value wins",
                    leaf.key_path, leaf.line
                );
                doc.duplicates.push(leaf.key_path.clone());
            }

            doc.sites.push(LeafSite {
                key_path: leaf.key_path,
                literal: leaf.literal,
                comment,
                quote: leaf.quote,
            });
        }

        debug!(
            "parsed {} entries ({} leaf sites) with {:?} grammar",
            doc.entries.len(),
            doc.sites.len(),
            self.syntax
        );
        doc
    }
}

/// Find the object literals a locale module exports or declares
fn root_objects(root: Node<'_>) -> Vec<Node<'_>> {
    let mut objects = Vec::new();
    let mut cursor = root.walk();

    for statement in root.named_children(&mut cursor) {
        match statement.kind() {
            "export_statement" => {
                if let Some(value) = statement.child_by_field_name("value") {
                    objects.extend(unwrap_object(value));
                }
                if let Some(declaration) = statement.child_by_field_name("declaration") {
                    objects.extend(declared_objects(declaration));
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                objects.extend(declared_objects(statement));
            }
            "expression_statement" => {
                let mut inner = statement.walk();
                for expr in statement.named_children(&mut inner) {
                    if expr.kind() == "assignment_expression" {
                        if let Some(right) = expr.child_by_field_name("right") {
                            objects.extend(unwrap_object(right));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    objects
}

fn declared_objects(declaration: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = declaration.walk();
    declaration
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "variable_declarator")
        .filter_map(|declarator| declarator.child_by_field_name("value"))
        .filter_map(unwrap_object)
        .collect()
}

/// Look through `( ... )`, `as const`, `satisfies T` and `define({ ... })`
fn unwrap_object(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "object" => Some(node),
        "parenthesized_expression" | "as_expression" | "satisfies_expression" => {
            node.named_child(0).and_then(unwrap_object)
        }
        "call_expression" => {
            let arguments = node.child_by_field_name("arguments")?;
            if arguments.named_child_count() != 1 {
                return None;
            }
            arguments.named_child(0).and_then(unwrap_object)
        }
        _ => None,
    }
}

/// Walk one object level, pushing/popping `path` around nested objects
fn collect_object(object: Node<'_>, text: &str, path: &mut Vec<String>, out: &mut Vec<RawLeaf>) {
    let mut cursor = object.walk();

    for pair in object.named_children(&mut cursor) {
        if pair.kind() != "pair" {
            continue;
        }
        let (Some(key), Some(value)) = (
            pair.child_by_field_name("key"),
            pair.child_by_field_name("value"),
        ) else {
            continue;
        };
        let Some(name) = key_name(key, text) else {
            continue;
        };
        let value = unwrap_value(value);

        match value.kind() {
            "object" => {
                path.push(name);
                collect_object(value, text, path, out);
                path.pop();
            }
            "string" | "template_string" => {
                if let Some(leaf) = leaf_from_literal(value, text, path, name) {
                    out.push(leaf);
                }
            }
            _ => {}
        }
    }
}

fn unwrap_value(node: Node<'_>) -> Node<'_> {
    match node.kind() {
        "parenthesized_expression" | "as_expression" | "satisfies_expression" => node
            .named_child(0)
            .map(unwrap_value)
            .unwrap_or(node),
        _ => node,
    }
}

fn key_name(key: Node<'_>, text: &str) -> Option<String> {
    if key.is_missing() || key.has_error() {
        return None;
    }
    let raw = &text[key.byte_range()];
    match key.kind() {
        "property_identifier" | "identifier" | "private_property_identifier" | "number" => {
            Some(raw.to_string())
        }
        "string" if raw.len() >= 2 => {
            let name = literal::unescape(&raw[1..raw.len() - 1]);
            if name.contains('.') {
                warn!(
                    "key '{}' at line {} contains '.'; it shares a key path with a nested key of the same name",
                    name,
                    key.start_position().row + 1
                );
            }
            Some(name)
        }
        _ => None,
    }
}

fn leaf_from_literal(
    value: Node<'_>,
    text: &str,
    path: &[String],
    name: String,
) -> Option<RawLeaf> {
    if value.is_missing() || value.has_error() {
        return None;
    }
    if value.kind() == "template_string" {
        let mut cursor = value.walk();
        let interpolated = value
            .named_children(&mut cursor)
            .any(|child| child.kind() == "template_substitution");
        if interpolated {
            return None;
        }
    }

    let span = value.byte_range();
    let raw = &text[span.clone()];
    let quote = QuoteStyle::from_delimiter(raw.chars().next()?)?;
    if raw.len() < 2 || !raw.ends_with(quote.delimiter()) {
        return None;
    }

    let mut segments = path.to_vec();
    segments.push(name);

    Some(RawLeaf {
        key_path: segments.join("."),
        literal: span,
        end_row: value.end_position().row,
        line: value.start_position().row + 1,
        quote,
    })
}

fn collect_comments(node: Node<'_>, out: &mut Vec<RawComment>) {
    if node.kind() == "comment" {
        out.push(RawComment {
            span: node.byte_range(),
            row: node.start_position().row,
        });
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_comments(child, out);
    }
}

/// Pair each leaf with the first comment that trails it on the same line.
///
/// Only whitespace and commas may separate the literal from its comment.
fn attach_comments(
    leaves: &[RawLeaf],
    comments: &[RawComment],
    text: &str,
) -> Vec<Option<Range<usize>>> {
    leaves
        .iter()
        .map(|leaf| {
            comments
                .iter()
                .filter(|c| c.row == leaf.end_row && c.span.start >= leaf.literal.end)
                .min_by_key(|c| c.span.start)
                .filter(|c| {
                    text[leaf.literal.end..c.span.start]
                        .chars()
                        .all(|ch| ch == ',' || (ch.is_whitespace() && ch != '\n'))
                })
                .map(|c| c.span.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ts(text: &str) -> ParsedDocument {
        LocaleParser::new(LocaleSyntax::TypeScript).parse(text)
    }

    #[test]
    fn test_syntax_from_path() {
        assert_eq!(LocaleSyntax::from_path(Path::new("en.ts")), LocaleSyntax::TypeScript);
        assert_eq!(LocaleSyntax::from_path(Path::new("en.tsx")), LocaleSyntax::Tsx);
        assert_eq!(LocaleSyntax::from_path(Path::new("en.js")), LocaleSyntax::JavaScript);
        assert_eq!(LocaleSyntax::from_path(Path::new("en.mjs")), LocaleSyntax::JavaScript);
    }

    #[test]
    fn test_nested_keys_in_document_order() {
        let doc = parse_ts(
            r#"export default {
  menu: {
    title: 'Menu',
    file: { open: "Open", close: "Close" },
  },
  footer: 'Bye',
};
"#,
        );
        let keys: Vec<_> = doc.entries.keys().collect();
        assert_eq!(keys, vec!["menu.title", "menu.file.open", "menu.file.close", "footer"]);
        assert_eq!(doc.entries.get("menu.file.open").unwrap().quote, QuoteStyle::Double);
        assert_eq!(doc.entries.get("menu.title").unwrap().line, 3);
        assert!(!doc.has_syntax_errors);
    }

    #[test]
    fn test_trailing_comment_is_attached_to_its_leaf() {
        let doc = parse_ts(
            "export default {\n  a: 'Hello', // [ignorei18n]\n  b: 'World',\n  c: 'Bye' /* note */\n};\n",
        );
        assert_eq!(
            doc.entries.get("a").unwrap().comment.as_deref(),
            Some("// [ignorei18n]")
        );
        assert_eq!(doc.entries.get("b").unwrap().comment, None);
        assert_eq!(
            doc.entries.get("c").unwrap().comment.as_deref(),
            Some("/* note */")
        );
    }

    #[test]
    fn test_comment_on_next_line_is_not_attached() {
        let doc = parse_ts("export default {\n  a: 'Hello',\n  // [ignorei18n]\n  b: 'World',\n};\n");
        assert_eq!(doc.entries.get("a").unwrap().comment, None);
        assert_eq!(doc.entries.get("b").unwrap().comment, None);
    }

    #[test]
    fn test_comment_belongs_to_last_leaf_on_line() {
        let doc = parse_ts("export default {\n  a: 'A', b: 'B', // [ignorei18n]\n};\n");
        assert_eq!(doc.entries.get("a").unwrap().comment, None);
        assert_eq!(
            doc.entries.get("b").unwrap().comment.as_deref(),
            Some("// [ignorei18n]")
        );
    }

    #[test]
    fn test_comment_after_closing_brace_is_not_attached() {
        let doc = parse_ts("export default { a: 'A', b: 'B' } // [ignorei18n]\n");
        assert_eq!(doc.entries.get("a").unwrap().comment, None);
        assert_eq!(doc.entries.get("b").unwrap().comment, None);
    }

    #[test]
    fn test_template_literals() {
        let doc = parse_ts("export default {\n  plain: `Multi\nline`,\n  dynamic: `Hi ${name}`,\n};\n");
        let plain = doc.entries.get("plain").unwrap();
        assert_eq!(plain.quote, QuoteStyle::Backtick);
        assert_eq!(plain.value, "Multi\nline");
        assert!(doc.entries.get("dynamic").is_none());
    }

    #[test]
    fn test_non_string_values_are_skipped() {
        let doc = parse_ts(
            "export default {\n  count: 3,\n  list: ['a', 'b'],\n  flag: true,\n  [computed]: 'x',\n  ok: 'yes',\n};\n",
        );
        assert_eq!(doc.entries.keys().collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn test_declared_object_with_type_annotation() {
        let doc = parse_ts(
            "import type { Messages } from './types';\n\nconst en: Messages = {\n  'quoted-key': \"Value\",\n  42: 'Answer',\n} as const;\n\nexport default en;\n",
        );
        assert_eq!(doc.entries.keys().collect::<Vec<_>>(), vec!["quoted-key", "42"]);
    }

    #[test]
    fn test_commonjs_export() {
        let doc = LocaleParser::new(LocaleSyntax::JavaScript)
            .parse("module.exports = {\n  greeting: { hello: \"Hello\" }\n};\n");
        assert_eq!(doc.entries.get("greeting.hello").unwrap().value, "Hello");
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let doc = parse_ts("export default {\n  a: 'first',\n  a: 'second',\n};\n");
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries.get("a").unwrap().value, "second");
        assert_eq!(doc.duplicates, vec!["a".to_string()]);
        assert_eq!(doc.sites.len(), 2);
    }

    #[test]
    fn test_dotted_quoted_key_collides_with_nested_key() {
        let doc = parse_ts("export default {\n  a: { b: 'Nested' },\n  'a.b': 'Flat',\n};\n");
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries.get("a.b").unwrap().value, "Flat");
        assert_eq!(doc.duplicates, vec!["a.b".to_string()]);
        assert_eq!(doc.sites.len(), 2);
    }

    #[test]
    fn test_empty_string_is_an_entry() {
        let doc = parse_ts("export default { empty: '', full: 'x' };\n");
        assert_eq!(doc.entries.get("empty").unwrap().value, "");
        assert_eq!(doc.entries.get("empty").unwrap().raw, "''");
    }

    #[test]
    fn test_garbage_input_does_not_panic() {
        let doc = parse_ts("this is { not : valid ' javascript");
        assert!(doc.has_syntax_errors);
        assert!(doc.entries.is_empty());

        let doc = parse_ts("");
        assert!(doc.entries.is_empty());
    }

    #[test]
    fn test_escaped_quotes_in_values() {
        let doc = parse_ts(r#"export default { a: 'It\'s', b: "Say \"hi\"" };"#);
        assert_eq!(doc.entries.get("a").unwrap().value, "It's");
        assert_eq!(doc.entries.get("b").unwrap().value, "Say \"hi\"");
        assert_eq!(doc.entries.get("a").unwrap().raw, r"'It\'s'");
    }
}
