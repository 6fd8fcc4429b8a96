//! Recursive grammar for a single `<value>` element.

use crate::cursor::{
    Alternative, Cursor, Failure, PResult, alt, attempt, choice, closing_tag, is_xml_space,
    many_till, tag, xml_tag,
};
use crate::error::ErrorKind;
use crate::text::decode_text;
use crate::value::{DateTime, Map, Value};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::num::IntErrorKind;
use std::str::FromStr;

/// `<value> ... </value>`: one typed value, recursing into arrays and structs.
pub(crate) fn value(cur: &mut Cursor<'_>) -> PResult<Value> {
    cur.nested(|cur| xml_tag(cur, tag("value"), value_kind))
}

// Order matters: `string` has no content discriminator and goes last.
const VALUE_KINDS: &[Alternative<Value>] = &[
    nil, boolean, int8, int16, int32, int64, double, bytes, date, array, structure, string,
];

fn value_kind(cur: &mut Cursor<'_>) -> PResult<Value> {
    choice(cur, VALUE_KINDS)
}

/// The raw body up to the next `<`, with surrounding whitespace trimmed.
/// Returns the body and the offset it started at.
fn scalar_body<'a>(cur: &mut Cursor<'a>) -> (&'a str, usize) {
    let start = cur.pos();
    let body = cur.take_while(|c| c != '<');
    (body.trim_matches(is_xml_space), start)
}

fn nil(cur: &mut Cursor<'_>) -> PResult<Value> {
    cur.skip_ws();
    cur.char('<')?;
    cur.skip_ws();
    cur.literal("nil")?;
    cur.skip_ws();
    cur.literal("/>")?;
    cur.skip_ws();
    Ok(Value::Nil)
}

fn boolean(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, tag("boolean"), |cur| {
        cur.skip_ws();
        let bit = cur.satisfy(|c| c == '0' || c == '1', "`0` or `1`")?;
        cur.skip_ws();
        Ok(Value::Bool(bit == '1'))
    })
}

fn integer<T: FromStr<Err = std::num::ParseIntError>>(
    cur: &mut Cursor<'_>,
    width: &'static str,
) -> PResult<T> {
    let (body, start) = scalar_body(cur);
    body.parse::<T>().map_err(|e| {
        let message = match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                format!("integer {} out of range for {}", body, width)
            }
            _ => format!("malformed integer {:?}", body),
        };
        Failure::new(ErrorKind::InvalidNumber, message, start)
    })
}

fn int8(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, tag("i1"), |cur| integer(cur, "i1").map(Value::Int8))
}

fn int16(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, tag("i2"), |cur| integer(cur, "i2").map(Value::Int16))
}

fn int32_name<'a>(cur: &mut Cursor<'a>) -> PResult<&'a str> {
    alt(cur, |cur| attempt(cur, |cur| cur.literal("i4")), |cur| cur.literal("int"))
}

fn int32(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, int32_name, |cur| integer(cur, "i4").map(Value::Int32))
}

fn int64(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, tag("i8"), |cur| integer(cur, "i8").map(Value::Int64))
}

/// Sign, digits, a mandatory point, digits. No exponent.
fn decimal(cur: &mut Cursor<'_>) -> PResult<()> {
    let digit = |c: char| c.is_ascii_digit();
    if matches!(cur.peek(), Some('+' | '-')) {
        cur.satisfy(|c| c == '+' || c == '-', "sign")?;
    }
    cur.take_while1(digit, "digit")?;
    cur.char('.')?;
    cur.take_while1(digit, "digit")?;
    cur.eof()
}

fn double(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, tag("double"), |cur| {
        let (body, start) = scalar_body(cur);
        let invalid = |message: String| Failure::new(ErrorKind::InvalidNumber, message, start);
        decimal(&mut Cursor::new(body))
            .map_err(|_| invalid(format!("malformed double {:?}", body)))?;
        match body.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Value::Double(v)),
            _ => Err(invalid(format!("double {} out of range", body))),
        }
    })
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '\r' | '\n')
}

fn bytes(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, tag("base64"), |cur| {
        let (body, start) = scalar_body(cur);
        let invalid = |message: String| Failure::new(ErrorKind::InvalidBase64, message, start);
        if let Some(c) = body.chars().find(|&c| !is_base64_char(c)) {
            return Err(invalid(format!("{:?} is not a base64 character", c)));
        }
        let mut encoded: String = body.chars().filter(|&c| c != '\r' && c != '\n').collect();
        while encoded.len() % 4 != 0 {
            encoded.push('=');
        }
        STANDARD
            .decode(&encoded)
            .map(Value::Bytes)
            .map_err(|e| invalid(format!("cannot decode base64: {}", e)))
    })
}

fn date(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, tag("dateTime.iso8601"), |cur| {
        let (body, start) = scalar_body(cur);
        DateTime::parse_basic(body).map(Value::Date).ok_or_else(|| {
            Failure::new(
                ErrorKind::InvalidDate,
                format!("expected YYYYMMDDTHH:MM:SS, found {:?}", body),
                start,
            )
        })
    })
}

fn array(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, tag("array"), |cur| {
        xml_tag(cur, tag("data"), |cur| {
            let items = many_till(cur, value, closing_tag("data"))?;
            cur.skip_ws();
            Ok(Value::Array(items))
        })
    })
}

fn member(cur: &mut Cursor<'_>) -> PResult<(String, Value)> {
    xml_tag(cur, tag("member"), |cur| {
        let name = xml_tag(cur, tag("name"), decode_text)?;
        let item = value(cur)?;
        Ok((name, item))
    })
}

fn structure(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, tag("struct"), |cur| {
        let members = many_till(cur, member, closing_tag("struct"))?;
        cur.skip_ws();
        // Later duplicates overwrite earlier ones.
        Ok(Value::Struct(members.into_iter().collect::<Map>()))
    })
}

fn string(cur: &mut Cursor<'_>) -> PResult<Value> {
    xml_tag(cur, tag("string"), |cur| decode_text(cur).map(Value::String))
}
