//! Decoding and encoding of JavaScript string literal bodies.
//!
//! Entry values are stored unescaped; everything written back to a document
//! goes through [`quote`] so the result is a valid literal for the chosen
//! delimiter.

use super::entry::QuoteStyle;

/// Decode the escape sequences of a literal body (delimiters already removed)
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };

        match next {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let hex: String = chars.clone().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().filter(|_| hex.len() == 2) {
                    Some(code) => {
                        chars.nth(1);
                        out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                    }
                    None => out.push('x'),
                }
            }
            'u' => match read_unicode_escape(&mut chars) {
                Some(code) => push_code_unit(&mut out, &mut chars, code),
                None => out.push('u'),
            },
            // Line continuation
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Read the digits of a `\u` escape, either `XXXX` or `{X...}`
fn read_unicode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<u32> {
    if chars.peek() == Some(&'{') {
        let lookahead: String = chars.clone().skip(1).take_while(|c| *c != '}').collect();
        let code = u32::from_str_radix(&lookahead, 16).ok()?;
        // '{' + digits + '}'
        for _ in 0..lookahead.chars().count() + 2 {
            chars.next();
        }
        return Some(code);
    }

    let hex: String = chars.clone().take(4).collect();
    if hex.len() != 4 {
        return None;
    }
    let code = u32::from_str_radix(&hex, 16).ok()?;
    for _ in 0..4 {
        chars.next();
    }
    Some(code)
}

/// Push a UTF-16 code unit, pairing a high surrogate with a following `\uDCxx`
fn push_code_unit(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    code: u32,
) {
    if (0xD800..0xDC00).contains(&code) {
        let mut lookahead = chars.clone();
        if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
            if let Some(low) = read_unicode_escape(&mut lookahead) {
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    *chars = lookahead;
                    out.push(char::from_u32(combined).unwrap_or('\u{fffd}'));
                    return;
                }
            }
        }
    }
    out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
}

/// Escape a value so it can sit between `quote` delimiters
pub fn escape(value: &str, quote: QuoteStyle) -> String {
    let delimiter = quote.delimiter();
    let mut out = String::with_capacity(value.len() + 2);
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            '\n' if quote != QuoteStyle::Backtick => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' if quote == QuoteStyle::Backtick && chars.peek() == Some(&'{') => {
                out.push_str("\\$")
            }
            c if c.is_control() && c != '\n' => {
                out.push_str(&format!("\\u{{{:x}}}", c as u32));
            }
            c => out.push(c),
        }
    }

    out
}

/// Build a full literal, delimiters included
pub fn quote(value: &str, quote: QuoteStyle) -> String {
    let delimiter = quote.delimiter();
    format!("{}{}{}", delimiter, escape(value, quote), delimiter)
}
