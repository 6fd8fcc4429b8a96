//! XML character data codec.
//!
//! Decoding understands the five predefined entities (`&quot;`, `&apos;`,
//! `&lt;`, `&gt;`, `&amp;`). Encoding is deliberately minimal and only escapes
//! `&` and `<`, the two characters that cannot appear raw in character data.
//! So `unescape(&escape(s)) == s` always holds, while `escape(unescape(t))`
//! may differ from `t` when `t` spelled `>`, `'` or `"` as entities.

use crate::cursor::{Cursor, Failure, PResult};
use crate::error::{ErrorKind, ParseError};
use std::borrow::Cow;

fn entity(name: &str) -> Option<char> {
    match name {
        "quot" => Some('"'),
        "apos" => Some('\''),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        _ => None,
    }
}

/// Decode character data up to (not including) the next `<` or end of input.
pub(crate) fn decode_text(cur: &mut Cursor<'_>) -> PResult<String> {
    let mut out = String::new();
    loop {
        out.push_str(cur.take_while(|c| c != '<' && c != '&'));
        if cur.peek() != Some('&') {
            return Ok(out);
        }
        let start = cur.pos();
        cur.char('&')?;
        let name = cur.take_while(|c| c != ';' && c != '<');
        if cur.char(';').is_err() {
            return Err(Failure::new(
                ErrorKind::InvalidEscape,
                format!("unterminated entity reference `&{}`", name),
                start,
            ));
        }
        match entity(name) {
            Some(c) => out.push(c),
            None => {
                return Err(Failure::new(
                    ErrorKind::InvalidEscape,
                    format!("unknown entity `&{};`", name),
                    start,
                ));
            }
        }
    }
}

/// Escape `&` and `<`; every other character is emitted as-is.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Decode a complete run of XML character data.
///
/// The whole input must be character data: a raw `<` is rejected.
pub fn unescape(text: &str) -> Result<String, ParseError> {
    let mut cur = Cursor::new(text);
    decode_text(&mut cur)
        .and_then(|decoded| cur.eof().map(|()| decoded))
        .map_err(|failure| failure.into_parse_error(text, "text"))
}
