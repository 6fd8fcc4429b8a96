//! # xmlrpc-codec
//!
//! A pure-Rust codec for the XML-RPC wire format: parse method calls, method
//! responses and single values out of text, and write them back as canonical
//! XML-RPC text. Transport is out of scope; this crate only turns text into
//! values and values into text.
//!
//! ## Overview
//!
//! Parsing is a hand-written backtracking recursive-descent grammar. Any
//! amount of whitespace may surround tags and scalar bodies, every close tag
//! must repeat its open tag's name, integers are range-checked against their
//! declared width, and dates use the fixed `YYYYMMDDTHH:MM:SS` form. A single
//! violation fails the whole document with a [`ParseError`].
//!
//! Serialization never fails and emits no insignificant whitespace. Text is
//! escaped minimally (`&` and `<` only), so `deserialize(serialize(v)) == v`
//! for every value with a finite `Double`.
//!
//! ## Value tags
//!
//! | Tag | [`Value`] variant |
//! |-----|-------------------|
//! | `<nil/>` | `Nil` (extension) |
//! | `<i1>` | `Int8` (extension) |
//! | `<i2>` | `Int16` (extension) |
//! | `<i4>`, `<int>` | `Int32` |
//! | `<i8>` | `Int64` (extension) |
//! | `<boolean>` | `Bool` (`0` or `1`) |
//! | `<double>` | `Double` (a decimal point is required) |
//! | `<string>` | `String` |
//! | `<dateTime.iso8601>` | `Date` |
//! | `<base64>` | `Bytes` |
//! | `<array><data>` | `Array` |
//! | `<struct>` | `Struct` |
//!
//! ## Example
//!
//! ```rust
//! use xmlrpc_codec::{Call, Params, Response, Value};
//!
//! let call = Call::new("math.add", Params::new(vec![Value::Int32(2), Value::Int32(3)]).unwrap())
//!     .unwrap();
//! let text = call.serialize();
//! assert_eq!(Call::deserialize(&text, None).unwrap(), call);
//!
//! let response = Response::deserialize(
//!     "<methodResponse><params><param><value><i4>5</i4></value></param></params></methodResponse>",
//!     Some("server"),
//! )
//! .unwrap();
//! assert_eq!(response.into_result().unwrap().head(), &Value::Int32(5));
//! ```
//!
//! ## serde
//!
//! [`to_value`] and [`from_value`] convert between Rust types and [`Value`]:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use xmlrpc_codec::{from_value, to_value};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let value = to_value(&Point { x: 1, y: -2 }).unwrap();
//! assert_eq!(value.get("y").and_then(|v| v.as_i32()), Some(-2));
//! assert_eq!(from_value::<Point>(value).unwrap(), Point { x: 1, y: -2 });
//! ```

mod cursor;
pub mod de;
pub mod document;
pub mod error;
mod grammar;
pub mod ser;
pub mod text;
pub mod value;
mod writer;

pub use de::{from_str, from_value};
pub use document::ParseOptions;
pub use error::{Error, ErrorKind, ParseError, Result};
pub use ser::{to_string, to_value, to_writer};
pub use value::{Call, DateTime, Fault, Map, Params, Response, Value};

pub use serde::{Deserialize, Serialize};
