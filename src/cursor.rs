//! Parser combinator foundation.
//!
//! Every parser in the crate is a plain function `fn(&mut Cursor) -> PResult<T>`.
//! The cursor only ever moves forward, except where a combinator explicitly
//! saves and restores its position ([`attempt`] and [`lookahead`]).
//!
//! Alternation follows the classic parsec contract: [`alt`] only tries its
//! second branch when the first failed *without consuming input*. Grammar
//! positions that are locally ambiguous must opt into rewinding by wrapping
//! the first branch in [`attempt`].

use crate::error::{ErrorKind, ParseError};
use std::borrow::Cow;

pub(crate) type PResult<T> = std::result::Result<T, Failure>;

/// An internal parse failure: what went wrong and how far the parser got.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Failure {
    pub kind: ErrorKind,
    pub message: Cow<'static, str>,
    pub pos: usize,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>, pos: usize) -> Self {
        Failure {
            kind,
            message: message.into(),
            pos,
        }
    }

    /// Combine the failures of two alternatives. The one that got further
    /// wins; syntax failures at the same offset merge their expectations.
    pub fn merge(self, other: Failure) -> Failure {
        if other.pos > self.pos {
            return other;
        }
        if other.pos < self.pos {
            return self;
        }
        match (self.kind, other.kind) {
            (ErrorKind::Syntax, ErrorKind::Syntax) if self.message != other.message => Failure {
                message: format!("{} or {}", self.message, other.message).into(),
                ..self
            },
            (ErrorKind::Syntax, _) => other,
            _ => self,
        }
    }

    /// Resolve the byte offset into line and column and attach the source label.
    pub fn into_parse_error(self, input: &str, source: &str) -> ParseError {
        let pos = self.pos.min(input.len());
        let consumed = &input[..pos];
        let line = consumed.matches('\n').count() + 1;
        let line_start = consumed.rfind('\n').map_or(0, |i| i + 1);
        let column = consumed[line_start..].chars().count() + 1;
        let description = format!(
            "{}:{}:{}: {}: {}",
            source, line, column, self.kind, self.message
        );
        ParseError::new(self.kind, description, line, column)
    }
}

/// XML whitespace: space, tab, carriage return, line feed.
pub(crate) fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// A forward-only position in a borrowed input string.
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
    max_depth: Option<usize>,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Cursor {
            input,
            pos: 0,
            depth: 0,
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The unconsumed remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn fail(&self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Failure {
        Failure::new(kind, message, self.pos)
    }

    fn expected(&self, what: &str) -> Failure {
        let found = match self.peek() {
            Some(c) => format!("{:?}", c),
            None => "end of input".to_string(),
        };
        self.fail(ErrorKind::Syntax, format!("expected {}, found {}", what, found))
    }

    /// Match one exact character.
    pub fn char(&mut self, expected: char) -> PResult<char> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(c)
            }
            _ => Err(self.expected(&format!("{:?}", expected))),
        }
    }

    /// Match an exact string. Atomic: on mismatch nothing is consumed.
    pub fn literal(&mut self, expected: &str) -> PResult<&'a str> {
        if self.rest().starts_with(expected) {
            let start = self.pos;
            self.pos += expected.len();
            Ok(&self.input[start..self.pos])
        } else {
            Err(self.expected(&format!("`{}`", expected)))
        }
    }

    /// Match one character satisfying `pred`.
    pub fn satisfy(&mut self, pred: impl Fn(char) -> bool, what: &str) -> PResult<char> {
        match self.peek() {
            Some(c) if pred(c) => {
                self.pos += c.len_utf8();
                Ok(c)
            }
            _ => Err(self.expected(what)),
        }
    }

    /// Zero or more characters satisfying `pred`.
    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// One or more characters satisfying `pred`.
    pub fn take_while1(&mut self, pred: impl Fn(char) -> bool, what: &str) -> PResult<&'a str> {
        let taken = self.take_while(pred);
        if taken.is_empty() {
            Err(self.expected(what))
        } else {
            Ok(taken)
        }
    }

    /// Exactly `n` characters satisfying `pred`.
    pub fn count(&mut self, n: usize, pred: impl Fn(char) -> bool, what: &str) -> PResult<&'a str> {
        let start = self.pos;
        for _ in 0..n {
            self.satisfy(&pred, what)?;
        }
        Ok(&self.input[start..self.pos])
    }

    /// Skip optional XML whitespace.
    pub fn skip_ws(&mut self) {
        self.take_while(is_xml_space);
    }

    pub fn eof(&self) -> PResult<()> {
        if self.pos == self.input.len() {
            Ok(())
        } else {
            Err(self.expected("end of input"))
        }
    }

    /// Run `p` one nesting level deeper, enforcing the configured depth cap.
    pub fn nested<T>(&mut self, p: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if let Some(max) = self.max_depth {
            if self.depth >= max {
                return Err(self.fail(
                    ErrorKind::DepthLimitExceeded,
                    format!("values nested deeper than {} levels", max),
                ));
            }
        }
        self.depth += 1;
        let result = p(self);
        self.depth -= 1;
        result
    }
}

/// Run `p`; on failure rewind to where it started so the failure counts as
/// non-consuming.
pub(crate) fn attempt<'a, T>(
    cur: &mut Cursor<'a>,
    p: impl FnOnce(&mut Cursor<'a>) -> PResult<T>,
) -> PResult<T> {
    let start = cur.pos;
    let result = p(cur);
    if result.is_err() {
        cur.pos = start;
    }
    result
}

/// Run `p` and always restore the position afterwards.
pub(crate) fn lookahead<'a, T>(
    cur: &mut Cursor<'a>,
    p: impl FnOnce(&mut Cursor<'a>) -> PResult<T>,
) -> PResult<T> {
    let start = cur.pos;
    let result = p(cur);
    cur.pos = start;
    result
}

/// Try `a`; only if it failed without consuming input, try `b`.
pub(crate) fn alt<'a, T>(
    cur: &mut Cursor<'a>,
    a: impl FnOnce(&mut Cursor<'a>) -> PResult<T>,
    b: impl FnOnce(&mut Cursor<'a>) -> PResult<T>,
) -> PResult<T> {
    let start = cur.pos;
    match a(cur) {
        Ok(v) => Ok(v),
        Err(first) if cur.pos == start => b(cur).map_err(|second| first.merge(second)),
        Err(first) => Err(first),
    }
}

/// A parser that can sit in a [`choice`] table.
pub(crate) type Alternative<T> = fn(&mut Cursor<'_>) -> PResult<T>;

/// Try each alternative in order with backtracking between all of them.
pub(crate) fn choice<T>(cur: &mut Cursor<'_>, alternatives: &[Alternative<T>]) -> PResult<T> {
    let mut failure: Option<Failure> = None;
    for parse in alternatives {
        match attempt(cur, parse) {
            Ok(v) => return Ok(v),
            Err(e) => {
                failure = Some(match failure {
                    Some(prev) => prev.merge(e),
                    None => e,
                })
            }
        }
    }
    Err(failure.unwrap_or_else(|| cur.fail(ErrorKind::Syntax, "no alternatives")))
}

/// `Some` on success, `None` when `p` failed without consuming input.
pub(crate) fn optional<'a, T>(
    cur: &mut Cursor<'a>,
    p: impl FnOnce(&mut Cursor<'a>) -> PResult<T>,
) -> PResult<Option<T>> {
    let start = cur.pos;
    match p(cur) {
        Ok(v) => Ok(Some(v)),
        Err(_) if cur.pos == start => Ok(None),
        Err(e) => Err(e),
    }
}

/// Repeat `p` until `end` matches. `end` is a probe and should not consume
/// input (see [`closing_tag`]); the terminator is left for the caller.
pub(crate) fn many_till<'a, T>(
    cur: &mut Cursor<'a>,
    mut p: impl FnMut(&mut Cursor<'a>) -> PResult<T>,
    mut end: impl FnMut(&mut Cursor<'a>) -> PResult<()>,
) -> PResult<Vec<T>> {
    let mut items = Vec::new();
    loop {
        let start = cur.pos;
        match end(cur) {
            Ok(()) => return Ok(items),
            Err(e) if cur.pos != start => return Err(e),
            Err(stop) => match p(cur) {
                Ok(item) => items.push(item),
                Err(e) => return Err(stop.merge(e)),
            },
        }
    }
}

/// Like [`many_till`] but requires at least one `p`.
pub(crate) fn many1_till<'a, T>(
    cur: &mut Cursor<'a>,
    mut p: impl FnMut(&mut Cursor<'a>) -> PResult<T>,
    end: impl FnMut(&mut Cursor<'a>) -> PResult<()>,
) -> PResult<Vec<T>> {
    let first = p(cur)?;
    let mut items = vec![first];
    items.extend(many_till(cur, p, end)?);
    Ok(items)
}

/// Name parser matching one fixed tag name.
pub(crate) fn tag<'a>(name: &'static str) -> impl FnOnce(&mut Cursor<'a>) -> PResult<&'a str> {
    move |cur: &mut Cursor<'a>| cur.literal(name)
}

/// Non-consuming probe for `</ name >` after optional whitespace.
pub(crate) fn closing_tag<'a>(name: &'static str) -> impl FnMut(&mut Cursor<'a>) -> PResult<()> {
    move |cur: &mut Cursor<'a>| {
        lookahead(cur, |cur| {
            cur.skip_ws();
            cur.literal("</")?;
            cur.skip_ws();
            cur.literal(name)?;
            cur.skip_ws();
            cur.char('>')?;
            Ok(())
        })
    }
}

/// `< name > body </ name >` with optional whitespace around every delimiter.
///
/// The close tag must repeat exactly the name the open tag matched.
pub(crate) fn xml_tag<'a, T>(
    cur: &mut Cursor<'a>,
    name: impl FnOnce(&mut Cursor<'a>) -> PResult<&'a str>,
    body: impl FnOnce(&mut Cursor<'a>) -> PResult<T>,
) -> PResult<T> {
    cur.skip_ws();
    cur.char('<')?;
    cur.skip_ws();
    let name = name(cur)?;
    cur.skip_ws();
    cur.char('>')?;
    let value = body(cur)?;
    cur.literal("</")?;
    cur.skip_ws();
    if cur.literal(name).is_err() {
        return Err(cur.expected(&format!("closing tag `</{}>`", name)));
    }
    cur.skip_ws();
    cur.char('>')?;
    cur.skip_ws();
    Ok(value)
}
