use serde::{de, ser};
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// The category of a grammar violation reported by [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or mismatched tags, unexpected end of input, trailing content
    Syntax,

    /// An `&name;` entity reference with an unknown or missing name
    InvalidEscape,

    /// A malformed or out-of-range integer or double body
    InvalidNumber,

    /// A base64 body with characters outside the alphabet or bad padding
    InvalidBase64,

    /// A date body that does not match `YYYYMMDDTHH:MM:SS` or names no real instant
    InvalidDate,

    /// A fault value that is not exactly `{faultCode: int, faultString: string}`
    InvalidFault,

    /// A `<params>` element with no `<param>` children
    EmptyParams,

    /// A method name containing characters outside `[A-Za-z0-9_.:/]`
    InvalidMethodName,

    /// Values nested deeper than the configured limit
    DepthLimitExceeded,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::InvalidEscape => "invalid escape",
            ErrorKind::InvalidNumber => "invalid number",
            ErrorKind::InvalidBase64 => "invalid base64",
            ErrorKind::InvalidDate => "invalid date",
            ErrorKind::InvalidFault => "invalid fault",
            ErrorKind::EmptyParams => "empty params",
            ErrorKind::InvalidMethodName => "invalid method name",
            ErrorKind::DepthLimitExceeded => "nesting too deep",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single failure value returned by every `deserialize` entry point.
///
/// Parsing is all-or-nothing: the first grammar violation fails the whole
/// document and no partial value is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ErrorKind,
    description: String,
    line: usize,
    column: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, description: String, line: usize, column: usize) -> Self {
        ParseError {
            kind,
            description,
            line,
            column,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable `source:line:column: message` text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 1-based line of the failure.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column (in characters) of the failure.
    pub fn column(&self) -> usize {
        self.column
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl std::error::Error for ParseError {}

/// Errors from building values by hand or converting them through serde.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A custom error message from serde
    Message(String),

    /// Text failed to parse as XML-RPC
    Parse(ParseError),

    /// A method name outside `[A-Za-z0-9_.:/]+`
    InvalidMethodName(String),

    /// A params list must hold at least one value
    EmptyParams,

    /// A date outside the representable range or not in `YYYYMMDDTHH:MM:SS` form
    InvalidDate(String),

    /// Struct member names must be strings
    KeyMustBeString,

    /// An unsigned integer too large for `i64`
    IntegerOutOfRange(u64),

    /// NaN and infinities have no XML-RPC representation
    NonFiniteDouble(f64),

    /// XML-RPC has no representation for this serde data model type
    Unsupported(&'static str),

    /// An I/O error occurred during writing
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Message(msg) => write!(f, "{}", msg),
            Error::Parse(err) => write!(f, "{}", err),
            Error::InvalidMethodName(name) => {
                write!(f, "invalid method name {:?} (allowed: A-Z a-z 0-9 _ . : /)", name)
            }
            Error::EmptyParams => write!(f, "params must contain at least one value"),
            Error::InvalidDate(text) => write!(f, "invalid date: {}", text),
            Error::KeyMustBeString => write!(f, "struct member names must be strings"),
            Error::IntegerOutOfRange(v) => write!(f, "integer {} does not fit in i64", v),
            Error::NonFiniteDouble(v) => write!(f, "double {} is not finite", v),
            Error::Unsupported(t) => write!(f, "XML-RPC does not support type: {}", t),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
