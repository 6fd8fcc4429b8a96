//! The XML-RPC value model.
//!
//! All types here are plain immutable data. Composite values own their
//! children (`Vec` / `BTreeMap`), so a `Value` is always a finite tree.

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Struct members, keyed by member name.
pub type Map = BTreeMap<String, Value>;

/// A single XML-RPC value.
///
/// `Nil` and the sized integers `Int8`, `Int16` and `Int64` are extensions to
/// the XML-RPC 1.0 base specification (`<nil/>`, `<i1>`, `<i2>`, `<i8>`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Bool(bool),
    String(String),
    /// Must be finite to survive a round trip through text.
    Double(f64),
    Date(DateTime),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Struct(Map),
}

impl Value {
    /// The wire tag name for this kind of value.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Int8(_) => "i1",
            Value::Int16(_) => "i2",
            Value::Int32(_) => "int",
            Value::Int64(_) => "i8",
            Value::Bool(_) => "boolean",
            Value::String(_) => "string",
            Value::Double(_) => "double",
            Value::Date(_) => "dateTime.iso8601",
            Value::Bytes(_) => "base64",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer width, widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Map> {
        match self {
            Value::Struct(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a struct member. `None` for missing members and non-structs.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_struct().and_then(|map| map.get(key))
    }
}

macro_rules! impl_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    bool => Bool,
    String => String,
    f64 => Double,
    DateTime => Date,
    Vec<u8> => Bytes,
    Vec<Value> => Array,
    Map => Struct,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Struct(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ── DateTime ───────────────────────────────────────────────────────────────

/// Marker name used to carry [`DateTime`] through serde as a newtype struct,
/// so [`crate::to_value`] can produce [`Value::Date`] instead of a string.
pub(crate) const DATETIME_TOKEN: &str = "$xmlrpc_codec::private::DateTime";

/// A calendar timestamp without timezone, to the second.
///
/// The wire form is the ISO 8601 basic format `YYYYMMDDTHH:MM:SS`, so years
/// are limited to `0..=9999` and sub-second precision is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(NaiveDateTime);

impl DateTime {
    /// Truncates to whole seconds; `None` for years outside `0..=9999`.
    pub fn new(datetime: NaiveDateTime) -> Option<Self> {
        if !(0..=9999).contains(&datetime.year()) {
            return None;
        }
        datetime.with_nanosecond(0).map(DateTime)
    }

    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<Self> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
        DateTime::new(naive)
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Parse exactly `YYYYMMDDTHH:MM:SS`, nothing more or less.
    pub(crate) fn parse_basic(text: &str) -> Option<Self> {
        let digit = |c: char| c.is_ascii_digit();
        let mut cur = Cursor::new(text);
        let date = cur.count(8, digit, "digit").ok()?;
        cur.char('T').ok()?;
        let hour = cur.count(2, digit, "digit").ok()?;
        cur.char(':').ok()?;
        let minute = cur.count(2, digit, "digit").ok()?;
        cur.char(':').ok()?;
        let second = cur.count(2, digit, "digit").ok()?;
        cur.eof().ok()?;

        DateTime::from_ymd_hms(
            date[..4].parse().ok()?,
            date[4..6].parse().ok()?,
            date[6..].parse().ok()?,
            hour.parse().ok()?,
            minute.parse().ok()?,
            second.parse().ok()?,
        )
    }
}

impl From<DateTime> for NaiveDateTime {
    fn from(dt: DateTime) -> Self {
        dt.0
    }
}

impl TryFrom<NaiveDateTime> for DateTime {
    type Error = Error;

    fn try_from(naive: NaiveDateTime) -> Result<Self> {
        DateTime::new(naive).ok_or_else(|| Error::InvalidDate(naive.to_string()))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = &self.0;
        write!(
            f,
            "{:04}{:02}{:02}T{:02}:{:02}:{:02}",
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second()
        )
    }
}

impl FromStr for DateTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DateTime::parse_basic(s).ok_or_else(|| Error::InvalidDate(s.to_string()))
    }
}

impl serde::Serialize for DateTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(DATETIME_TOKEN, &self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for DateTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_newtype_struct(DATETIME_TOKEN, DateTimeVisitor)
    }
}

struct DateTimeVisitor;

impl<'de> serde::de::Visitor<'de> for DateTimeVisitor {
    type Value = DateTime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a date in YYYYMMDDTHH:MM:SS form")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<DateTime, E> {
        DateTime::parse_basic(v).ok_or_else(|| E::invalid_value(serde::de::Unexpected::Str(v), &self))
    }

    fn visit_newtype_struct<D: serde::Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<DateTime, D::Error> {
        deserializer.deserialize_str(self)
    }
}

// ── Documents ──────────────────────────────────────────────────────────────

/// A non-empty, ordered list of parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Params(Vec<Value>);

impl Params {
    pub fn new(values: Vec<Value>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptyParams);
        }
        Ok(Params(values))
    }

    /// A params list holding exactly one value.
    pub fn one(value: impl Into<Value>) -> Self {
        Params(vec![value.into()])
    }

    /// The first parameter, which always exists.
    pub fn head(&self) -> &Value {
        &self.0[0]
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }

    /// Used by the grammar, which guarantees at least one element.
    pub(crate) fn from_parsed(values: Vec<Value>) -> Self {
        debug_assert!(!values.is_empty());
        Params(values)
    }
}

impl std::ops::Deref for Params {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl IntoIterator for Params {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub(crate) fn is_method_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '/')
}

/// An XML-RPC `<methodCall>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    method: String,
    params: Params,
}

impl Call {
    /// Fails with [`Error::InvalidMethodName`] unless `method` matches
    /// `[A-Za-z0-9_.:/]+`.
    pub fn new(method: impl Into<String>, params: Params) -> Result<Self> {
        let method = method.into();
        if method.is_empty() || !method.chars().all(is_method_name_char) {
            return Err(Error::InvalidMethodName(method));
        }
        Ok(Call { method, params })
    }

    pub(crate) fn from_parsed(method: String, params: Params) -> Self {
        Call { method, params }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_parts(self) -> (String, Params) {
        (self.method, self.params)
    }
}

/// An RPC-level failure reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fault {
    pub code: i32,
    pub description: String,
}

impl Fault {
    pub fn new(code: i32, description: impl Into<String>) -> Self {
        Fault {
            code,
            description: description.into(),
        }
    }

    /// The `{faultCode, faultString}` struct this fault travels as.
    pub fn to_value(&self) -> Value {
        let mut members = Map::new();
        members.insert("faultCode".to_string(), Value::Int32(self.code));
        members.insert(
            "faultString".to_string(),
            Value::String(self.description.clone()),
        );
        Value::Struct(members)
    }

    /// Accepts only a struct with exactly `faultCode` (int) and
    /// `faultString` (string).
    pub fn from_value(value: &Value) -> Option<Self> {
        let members = value.as_struct()?;
        if members.len() != 2 {
            return None;
        }
        match (members.get("faultCode")?, members.get("faultString")?) {
            (Value::Int32(code), Value::String(description)) => {
                Some(Fault::new(*code, description.clone()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fault {}: {}", self.code, self.description)
    }
}

impl std::error::Error for Fault {}

/// An XML-RPC `<methodResponse>`: either return values or a fault.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Params(Params),
    Fault(Fault),
}

impl Response {
    pub fn is_fault(&self) -> bool {
        matches!(self, Response::Fault(_))
    }

    pub fn into_result(self) -> std::result::Result<Params, Fault> {
        match self {
            Response::Params(params) => Ok(params),
            Response::Fault(fault) => Err(fault),
        }
    }
}

impl From<Params> for Response {
    fn from(params: Params) -> Self {
        Response::Params(params)
    }
}

impl From<Fault> for Response {
    fn from(fault: Fault) -> Self {
        Response::Fault(fault)
    }
}
