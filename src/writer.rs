//! Canonical XML text for values and documents.
//!
//! Serialization is total: every value has exactly one text form, and no
//! whitespace is emitted between tags.

use crate::text::escape;
use crate::value::{Call, Params, Response, Value};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

fn write_double(out: &mut String, v: f64) {
    let start = out.len();
    let _ = write!(out, "{}", v);
    // `Display` drops the fraction for integral values; the grammar requires one.
    if v.is_finite() && !out[start..].contains('.') {
        out.push_str(".0");
    }
}

fn write_scalar(out: &mut String, value: &Value) {
    match value {
        Value::Int8(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::Int16(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::Int32(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::Int64(v) => {
            let _ = write!(out, "{}", v);
        }
        Value::Bool(v) => out.push(if *v { '1' } else { '0' }),
        Value::String(s) => out.push_str(&escape(s)),
        Value::Double(v) => write_double(out, *v),
        Value::Date(d) => {
            let _ = write!(out, "{}", d);
        }
        Value::Bytes(b) => STANDARD.encode_string(b, out),
        Value::Nil | Value::Array(_) | Value::Struct(_) => {}
    }
}

pub(crate) fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Nil => out.push_str("<nil/>"),
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        scalar => {
            let tag = scalar.kind_name();
            let _ = write!(out, "<{}>", tag);
            write_scalar(out, scalar);
            let _ = write!(out, "</{}>", tag);
        }
    }
    out.push_str("</value>");
}

fn write_params(out: &mut String, params: &Params) {
    out.push_str("<params>");
    for value in params {
        out.push_str("<param>");
        write_value(out, value);
        out.push_str("</param>");
    }
    out.push_str("</params>");
}

impl Value {
    /// The canonical `<value>...</value>` text.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        write_value(&mut out, self);
        out
    }

    /// [`Value::serialize`] as UTF-8 bytes.
    pub fn serialize_bytes(&self) -> Vec<u8> {
        self.serialize().into_bytes()
    }
}

impl Call {
    /// A complete `<methodCall>` document, XML declaration included.
    pub fn serialize(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        out.push_str("<methodCall><methodName>");
        out.push_str(self.method());
        out.push_str("</methodName>");
        write_params(&mut out, self.params());
        out.push_str("</methodCall>");
        out
    }

    pub fn serialize_bytes(&self) -> Vec<u8> {
        self.serialize().into_bytes()
    }
}

impl Response {
    /// A complete `<methodResponse>` document, XML declaration included.
    pub fn serialize(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        out.push_str("<methodResponse>");
        match self {
            Response::Params(params) => write_params(&mut out, params),
            Response::Fault(fault) => {
                out.push_str("<fault>");
                write_value(&mut out, &fault.to_value());
                out.push_str("</fault>");
            }
        }
        out.push_str("</methodResponse>");
        out
    }

    pub fn serialize_bytes(&self) -> Vec<u8> {
        self.serialize().into_bytes()
    }
}
