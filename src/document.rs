//! Method-call and method-response documents, and the text entry points.

use crate::cursor::{
    Cursor, Failure, PResult, alt, attempt, closing_tag, is_xml_space, lookahead, many1_till,
    optional, tag, xml_tag,
};
use crate::error::{ErrorKind, ParseError};
use crate::grammar::value;
use crate::value::{Call, Fault, Params, Response, Value, is_method_name_char};

const DEFAULT_SOURCE: &str = "XMLRPC";

/// Knobs for the `deserialize_with` entry points.
///
/// ```rust
/// use xmlrpc_codec::{ParseOptions, Value};
///
/// let options = ParseOptions::new().source("request body").max_depth(32);
/// let value = Value::deserialize_with("<value><i4>7</i4></value>", &options).unwrap();
/// assert_eq!(value, Value::Int32(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    source: String,
    max_depth: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            source: DEFAULT_SOURCE.to_string(),
            max_depth: None,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label used in error descriptions. Has no effect on parsing.
    pub fn source(mut self, label: impl Into<String>) -> Self {
        self.source = label.into();
        self
    }

    /// Reject documents whose `<value>` elements nest deeper than `depth`.
    /// Unlimited by default.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    fn labeled(source: Option<&str>) -> Self {
        match source {
            Some(label) => Self::default().source(label),
            None => Self::default(),
        }
    }
}

/// Run `parser` over the whole of `input`, converting any failure into the
/// public error type.
fn run<T>(
    input: &str,
    options: &ParseOptions,
    what: &'static str,
    parser: impl FnOnce(&mut Cursor<'_>) -> PResult<T>,
) -> Result<T, ParseError> {
    tracing::trace!(source = %options.source, bytes = input.len(), "parsing xml-rpc {}", what);
    let mut cur = Cursor::new(input).with_max_depth(options.max_depth);
    parser(&mut cur)
        .and_then(|parsed| cur.eof().map(|()| parsed))
        .map_err(|failure| {
            let err = failure.into_parse_error(input, &options.source);
            tracing::debug!(
                source = %options.source,
                kind = %err.kind(),
                "xml-rpc {} rejected: {}",
                what,
                err
            );
            err
        })
}

/// `<?xml ... ?>`; the content is skipped without validation.
fn xml_declaration(cur: &mut Cursor<'_>) -> PResult<()> {
    cur.literal("<?xml")?;
    cur.take_while(|c| c != '?' && c != '>');
    cur.literal("?>")?;
    Ok(())
}

fn prolog(cur: &mut Cursor<'_>) -> PResult<()> {
    cur.skip_ws();
    optional(cur, |cur| attempt(cur, xml_declaration))?;
    Ok(())
}

fn method_name(cur: &mut Cursor<'_>) -> PResult<String> {
    let start = cur.pos();
    let name = cur.take_while(|c| c != '<').trim_matches(is_xml_space);
    if name.is_empty() || !name.chars().all(is_method_name_char) {
        return Err(Failure::new(
            ErrorKind::InvalidMethodName,
            format!("method name {:?} must match [A-Za-z0-9_.:/]+", name),
            start,
        ));
    }
    Ok(name.to_string())
}

fn param(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, tag("param"), value)
}

fn params(cur: &mut Cursor<'_>) -> PResult<Params> {
    xml_tag(cur, tag("params"), |cur| {
        if lookahead(cur, closing_tag("params")).is_ok() {
            return Err(cur.fail(
                ErrorKind::EmptyParams,
                "<params> must contain at least one <param>",
            ));
        }
        let values = many1_till(cur, param, closing_tag("params"))?;
        cur.skip_ws();
        Ok(Params::from_parsed(values))
    })
}

fn call(cur: &mut Cursor<'_>) -> PResult<Call> {
    prolog(cur)?;
    xml_tag(cur, tag("methodCall"), |cur| {
        let method = xml_tag(cur, tag("methodName"), method_name)?;
        let params = params(cur)?;
        Ok(Call::from_parsed(method, params))
    })
}

fn fault(cur: &mut Cursor<'_>) -> PResult<Fault> {
    xml_tag(cur, tag("fault"), |cur| {
        let start = cur.pos();
        let found = value(cur)?;
        Fault::from_value(&found).ok_or_else(|| {
            Failure::new(
                ErrorKind::InvalidFault,
                "fault must be a struct of exactly faultCode (int) and faultString (string)",
                start,
            )
        })
    })
}

fn response(cur: &mut Cursor<'_>) -> PResult<Response> {
    prolog(cur)?;
    xml_tag(cur, tag("methodResponse"), |cur| {
        alt(
            cur,
            |cur| attempt(cur, |cur| params(cur).map(Response::Params)),
            |cur| fault(cur).map(Response::Fault),
        )
    })
}

fn lone_value(cur: &mut Cursor<'_>) -> PResult<Value> {
    cur.skip_ws();
    value(cur)
}

impl Value {
    /// Parse a single `<value>` element.
    ///
    /// `source` labels error descriptions and defaults to `XMLRPC`.
    pub fn deserialize(input: &str, source: Option<&str>) -> Result<Value, ParseError> {
        Self::deserialize_with(input, &ParseOptions::labeled(source))
    }

    pub fn deserialize_with(input: &str, options: &ParseOptions) -> Result<Value, ParseError> {
        run(input, options, "value", lone_value)
    }
}

impl Call {
    /// Parse a `<methodCall>` document, with or without an XML declaration.
    pub fn deserialize(input: &str, source: Option<&str>) -> Result<Call, ParseError> {
        Self::deserialize_with(input, &ParseOptions::labeled(source))
    }

    pub fn deserialize_with(input: &str, options: &ParseOptions) -> Result<Call, ParseError> {
        run(input, options, "call", call)
    }
}

impl Response {
    /// Parse a `<methodResponse>` document holding either params or a fault.
    pub fn deserialize(input: &str, source: Option<&str>) -> Result<Response, ParseError> {
        Self::deserialize_with(input, &ParseOptions::labeled(source))
    }

    pub fn deserialize_with(input: &str, options: &ParseOptions) -> Result<Response, ParseError> {
        run(input, options, "response", response)
    }
}
