pub mod entry;
pub mod literal;
pub mod sitter;

pub use entry::{Entry, EntryMap, QuoteStyle, DEFAULT_PROTECT_MARKER};
pub use sitter::{LeafSite, LocaleParser, LocaleSyntax, ParsedDocument};

/// Parse a locale document with the default (TypeScript) grammar
pub fn parse(text: &str) -> EntryMap {
    LocaleParser::default().parse(text).entries
}
