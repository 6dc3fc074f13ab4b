use std::ops::Range;

use crate::parse::{EntryMap, LocaleParser, ParsedDocument, DEFAULT_PROTECT_MARKER};

/// Rebuilds a document from the source layout and a final entry map.
///
/// Only leaf literals (and protect-marker comments) are rewritten; every other
/// byte of the source text is copied through.
pub struct Renderer<'a> {
    parser: LocaleParser,
    protect_marker: &'a str,
}

impl Default for Renderer<'_> {
    fn default() -> Self {
        Self::new(LocaleParser::default(), DEFAULT_PROTECT_MARKER)
    }
}

struct Edit {
    span: Range<usize>,
    replacement: String,
}

impl<'a> Renderer<'a> {
    pub fn new(parser: LocaleParser, protect_marker: &'a str) -> Self {
        Self {
            parser,
            protect_marker,
        }
    }

    pub fn render(&self, source_text: &str, final_map: &EntryMap) -> String {
        let doc = self.parser.parse(source_text);
        self.render_parsed(source_text, &doc, final_map)
    }

    /// Same as [`Renderer::render`] for a document that is already parsed
    pub fn render_parsed(
        &self,
        source_text: &str,
        doc: &ParsedDocument,
        final_map: &EntryMap,
    ) -> String {
        let mut edits = Vec::new();

        for site in &doc.sites {
            let Some(entry) = final_map.get(&site.key_path) else {
                continue;
            };

            let literal = entry.literal_for(site.quote);
            if literal != source_text[site.literal.clone()] {
                edits.push(Edit {
                    span: site.literal.clone(),
                    replacement: literal.into_owned(),
                });
            }

            if !entry.is_protected(self.protect_marker) {
                continue;
            }
            let Some(comment) = entry.comment.as_deref() else {
                continue;
            };

            match &site.comment {
                Some(span) if &source_text[span.clone()] == comment => {}
                Some(span) => {
                    // Anything at all after the old comment forces a block comment
                    let inline = !rest_of_line(source_text, span.end).trim().is_empty();
                    edits.push(Edit {
                        span: span.clone(),
                        replacement: format_comment(comment, inline),
                    });
                }
                None => {
                    let rest = rest_of_line(source_text, site.literal.end);
                    let inline = rest.chars().any(|c| !c.is_whitespace() && c != ',');
                    if inline {
                        let at = site.literal.end;
                        edits.push(Edit {
                            span: at..at,
                            replacement: format!(" {}", format_comment(comment, true)),
                        });
                    } else {
                        let at = site.literal.end + rest.trim_end().len();
                        edits.push(Edit {
                            span: at..at,
                            replacement: format!(" {}", comment),
                        });
                    }
                }
            }
        }

        apply_edits(source_text, edits)
    }
}

/// Render with the default grammar and protect marker
pub fn render(source_text: &str, final_map: &EntryMap) -> String {
    Renderer::default().render(source_text, final_map)
}

fn rest_of_line(text: &str, from: usize) -> &str {
    let rest = &text[from..];
    match rest.find('\n') {
        Some(end) => rest[..end].trim_end_matches('\r'),
        None => rest,
    }
}

/// Line comments become block comments when code follows them on the line.
///
/// A `*/` inside the body would end the block early, so it is split up.
fn format_comment(comment: &str, inline: bool) -> String {
    match comment.strip_prefix("//") {
        Some(body) if inline => format!("/* {} */", body.trim().replace("*/", "* /")),
        _ => comment.to_string(),
    }
}

fn apply_edits(text: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|edit| edit.span.start);

    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in edits {
        if edit.span.start < cursor {
            continue;
        }
        output.push_str(&text[cursor..edit.span.start]);
        output.push_str(&edit.replacement);
        cursor = edit.span.end;
    }
    output.push_str(&text[cursor..]);
    output
}
