//! serde bridge: any `T: Serialize` into a [`Value`].
//!
//! ## Type mapping
//! - `bool` → `Bool`; `i8`/`i16`/`i32`/`i64` → the integer of the same width
//! - `u8` → `Int16`, `u16` → `Int32`, `u32` → `Int64`; `u64` and the 128-bit
//!   integers → `Int64` when they fit
//! - `f32`/`f64` → `Double` (NaN and infinities are rejected)
//! - `char`, `&str`, `String` → `String`; `&[u8]` via `serde_bytes` → `Bytes`
//! - `None`, `()`, unit structs → `Nil`; `Some(x)` → `x`
//! - sequences and tuples → `Array`; maps and structs → `Struct`
//! - unit variants → their name as a `String`; other variants → a one-member
//!   `Struct` keyed by the variant name
//! - [`DateTime`](crate::DateTime) → `Date`

use crate::error::{Error, Result};
use crate::value::{DATETIME_TOKEN, DateTime, Map, Value};
use serde::ser::{self, Serialize};
use std::io::Write;

// ── Public entry points ────────────────────────────────────────────────────

/// Convert `value` into its XML-RPC [`Value`] tree.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(Serializer)
}

/// Convert `value` and render it as a `<value>` element.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(to_value(value)?.serialize())
}

/// Convert `value` and write its `<value>` element into `writer`.
pub fn to_writer<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    let text = to_string(value)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::Io(e.to_string()))
}

// ── Serializer ─────────────────────────────────────────────────────────────

/// Builds a [`Value`] from the serde data model.
pub struct Serializer;

impl ser::Serializer for Serializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = VariantSeqSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = VariantMapSerializer;

    // ── Primitives ─────────────────────────────────────────────────────────

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Int8(v))
    }
    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Int16(v))
    }
    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Int32(v))
    }
    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Int64(v))
    }

    /// Unsigned integers widen to the next signed width that holds them.
    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Int16(i16::from(v)))
    }
    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Int32(i32::from(v)))
    }
    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Int64(i64::from(v)))
    }
    fn serialize_u64(self, v: u64) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Int64)
            .map_err(|_| Error::IntegerOutOfRange(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Int64)
            .map_err(|_| Error::Unsupported("i128 outside the i64 range"))
    }
    fn serialize_u128(self, v: u128) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Int64)
            .map_err(|_| Error::Unsupported("u128 outside the i64 range"))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        ser::Serializer::serialize_f64(self, f64::from(v))
    }
    fn serialize_f64(self, v: f64) -> Result<Value> {
        if v.is_finite() {
            Ok(Value::Double(v))
        } else {
            Err(Error::NonFiniteDouble(v))
        }
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Nil)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Nil)
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Nil)
    }

    /// Unit enum variant → the variant name as a string
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Value> {
        if name == DATETIME_TOKEN {
            // `DateTime` hands us its text form; turn it back into a date.
            match value.serialize(self)? {
                Value::String(text) => text.parse::<DateTime>().map(Value::Date),
                other => Err(Error::InvalidDate(format!("{:?}", other))),
            }
        } else {
            value.serialize(self)
        }
    }

    /// Enum newtype variant → `{variant: value}`
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        Ok(single_member(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SeqSerializer {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        ser::Serializer::serialize_seq(self, Some(len))
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        ser::Serializer::serialize_seq(self, Some(len))
    }

    /// Enum tuple variant → `{variant: [fields...]}`
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(VariantSeqSerializer {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapSerializer {
            map: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        ser::Serializer::serialize_map(self, None)
    }

    /// Enum struct variant → `{variant: {fields...}}`
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(VariantMapSerializer {
            variant,
            map: Map::new(),
        })
    }
}

// ── Compound serializers ───────────────────────────────────────────────────

pub struct SeqSerializer {
    items: Vec<Value>,
}

pub struct VariantSeqSerializer {
    variant: &'static str,
    items: Vec<Value>,
}

pub struct MapSerializer {
    map: Map,
    next_key: Option<String>,
}

pub struct VariantMapSerializer {
    variant: &'static str,
    map: Map,
}

fn single_member(name: &'static str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(name.to_string(), value);
    Value::Struct(map)
}

macro_rules! collect_elements {
    ($t:path, $method:ident) => {
        impl $t for SeqSerializer {
            type Ok = Value;
            type Error = Error;
            fn $method<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
                self.items.push(value.serialize(Serializer)?);
                Ok(())
            }
            fn end(self) -> Result<Value> {
                Ok(Value::Array(self.items))
            }
        }
    };
}

collect_elements!(ser::SerializeSeq, serialize_element);
collect_elements!(ser::SerializeTuple, serialize_element);
collect_elements!(ser::SerializeTupleStruct, serialize_field);

impl ser::SerializeTupleVariant for VariantSeqSerializer {
    type Ok = Value;
    type Error = Error;
    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(Serializer)?);
        Ok(())
    }
    fn end(self) -> Result<Value> {
        Ok(single_member(self.variant, Value::Array(self.items)))
    }
}

impl ser::SerializeMap for MapSerializer {
    type Ok = Value;
    type Error = Error;
    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        match key.serialize(Serializer)? {
            Value::String(name) => {
                self.next_key = Some(name);
                Ok(())
            }
            _ => Err(Error::KeyMustBeString),
        }
    }
    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::Message("serialize_value called before serialize_key".into()))?;
        self.map.insert(key, value.serialize(Serializer)?);
        Ok(())
    }
    fn end(self) -> Result<Value> {
        Ok(Value::Struct(self.map))
    }
}

impl ser::SerializeStruct for MapSerializer {
    type Ok = Value;
    type Error = Error;
    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.map.insert(key.to_string(), value.serialize(Serializer)?);
        Ok(())
    }
    fn end(self) -> Result<Value> {
        Ok(Value::Struct(self.map))
    }
}

impl ser::SerializeStructVariant for VariantMapSerializer {
    type Ok = Value;
    type Error = Error;
    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.map.insert(key.to_string(), value.serialize(Serializer)?);
        Ok(())
    }
    fn end(self) -> Result<Value> {
        Ok(single_member(self.variant, Value::Struct(self.map)))
    }
}
