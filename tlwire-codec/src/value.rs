//! Field values and the scalar wire kinds they map onto.

use std::fmt;

use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::vector::Vector;
use crate::wire::{Cursor, Writer};

/// A single field value, either being written or produced by a decode.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// `int`, or the computed word of a `#` flags field.
    Int(u32),
    /// `long`, `int128` or `int256` as a `0x…` big-endian hex string.
    ///
    /// Decimal strings are accepted on write; decoding always yields hex.
    BigInt(String),
    /// `double`.
    Double(f64),
    /// `string`.
    String(String),
    /// `bytes`, and the raw blob of `X` or blob-encoded `Object` fields.
    Bytes(Vec<u8>),
    /// `Bool`, or a conditional `true` flag.
    Bool(bool),
    /// A nested constructor.
    Object(Box<Instance>),
    /// A `Vector<T>`.
    Vector(Vector),
}

impl Value {
    /// Shorthand for [`Value::BigInt`].
    pub fn big(value: impl Into<String>) -> Self {
        Self::BigInt(value.into())
    }

    /// Short name of the variant, as reported by [`Error::InvalidValue`].
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::BigInt(_) => "big integer",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Bool(_) => "bool",
            Self::Object(_) => "object",
            Self::Vector(_) => "vector",
        }
    }

    /// The nested instance, if this is an object.
    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Self::Object(inst) => Some(inst),
            _ => None,
        }
    }

    /// The vector, if this is one.
    pub fn as_vector(&self) -> Option<&Vector> {
        match self {
            Self::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// The raw bytes, if this is a byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The text, if this is a string or big integer.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::BigInt(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is an `int`.
    pub fn as_int(&self) -> Option<u32> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The flag, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self { Self::Int(v) }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self { Self::Int(v as u32) }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self { Self::Double(v) }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self { Self::Bool(v) }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self { Self::String(v.to_owned()) }
}

impl From<String> for Value {
    fn from(v: String) -> Self { Self::String(v) }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self { Self::Bytes(v) }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self { Self::Bytes(v.to_vec()) }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self { Self::Object(Box::new(v)) }
}

impl From<Vector> for Value {
    fn from(v: Vector) -> Self { Self::Vector(v) }
}

// ─── Primitive ────────────────────────────────────────────────────────────────

/// The scalar wire kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `int`: 4 bytes.
    Int,
    /// `long`: 8 bytes.
    Long,
    /// `int128`: 16 bytes.
    Int128,
    /// `int256`: 32 bytes.
    Int256,
    /// `double`: 8 bytes.
    Double,
    /// `string`: length-prefixed UTF-8.
    String,
    /// `bytes`: length-prefixed.
    Bytes,
    /// Boxed `Bool`: a `boolTrue`/`boolFalse` id.
    Bool,
    /// `true`: no wire bytes; only meaningful behind a flag.
    True,
}

impl Primitive {
    /// Map a schema type name to its primitive, if it is one.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "int" => Self::Int,
            "long" => Self::Long,
            "int128" => Self::Int128,
            "int256" => Self::Int256,
            "double" => Self::Double,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            "Bool" => Self::Bool,
            "true" => Self::True,
            _ => return None,
        })
    }

    /// The schema spelling.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Int128 => "int128",
            Self::Int256 => "int256",
            Self::Double => "double",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Bool => "Bool",
            Self::True => "true",
        }
    }

    fn width(self) -> Option<usize> {
        match self {
            Self::Long => Some(8),
            Self::Int128 => Some(16),
            Self::Int256 => Some(32),
            _ => None,
        }
    }

    /// Encode `value` as this primitive. `field` only labels errors.
    pub fn write(self, w: &mut Writer, value: &Value, field: &str) -> Result<()> {
        let invalid = || Error::InvalidValue {
            field: field.to_owned(),
            expected: self.name(),
            found: value.kind_name(),
        };
        match (self, value) {
            (Self::Int, Value::Int(n)) => w.write_int32(*n),
            (Self::Long | Self::Int128 | Self::Int256, Value::BigInt(s) | Value::String(s)) => {
                let width = self.width().ok_or_else(invalid)?;
                w.write_fixed_bigint(s, width)
            }
            (Self::Long | Self::Int128 | Self::Int256, Value::Int(n)) => {
                let width = self.width().ok_or_else(invalid)?;
                w.write_fixed_bigint(&n.to_string(), width)
            }
            (Self::Double, Value::Double(d)) => w.write_double(*d),
            (Self::String, Value::String(s)) => w.write_utf8_string(s),
            (Self::String | Self::Bytes, Value::Bytes(b)) => w.write_length_prefixed_bytes(b, false),
            (Self::Bytes, Value::String(s)) => w.write_length_prefixed_bytes(s.as_bytes(), false),
            (Self::Bool, Value::Bool(b)) => w.write_bool(*b),
            (Self::True, Value::Bool(_)) => Ok(()),
            _ => Err(invalid()),
        }
    }

    /// Decode one value of this primitive.
    pub fn read(self, c: &mut Cursor<'_>) -> Result<Value> {
        Ok(match self {
            Self::Int => Value::Int(c.read_int32()?),
            Self::Long | Self::Int128 | Self::Int256 => {
                let width = self.width().unwrap_or(8);
                Value::BigInt(c.read_fixed_bigint(width)?)
            }
            Self::Double => Value::Double(c.read_double()?),
            Self::String => Value::String(c.read_utf8_string()?),
            Self::Bytes => Value::Bytes(c.read_length_prefixed_bytes(false)?),
            Self::Bool => Value::Bool(c.read_bool()?),
            Self::True => Value::Bool(true),
        })
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(p: Primitive, v: Value) -> Vec<u8> {
        let mut w = Writer::new();
        p.write(&mut w, &v, "f").unwrap();
        w.finish().to_vec()
    }

    #[test]
    fn negative_int_keeps_bit_pattern() {
        assert_eq!(Value::from(-1i32), Value::Int(0xffff_ffff));
        assert_eq!(encode(Primitive::Int, (-2i32).into()), [0xfe, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn long_accepts_decimal_and_reads_hex() {
        let buf = encode(Primitive::Long, Value::big("1"));
        let mut c = Cursor::from_slice(&buf);
        assert_eq!(Primitive::Long.read(&mut c).unwrap(), Value::big("0x0000000000000001"));
    }

    #[test]
    fn bool_round_trips() {
        let buf = encode(Primitive::Bool, true.into());
        assert_eq!(buf, [0xb5, 0x75, 0x72, 0x99]);
        assert_eq!(Primitive::Bool.read(&mut Cursor::from_slice(&buf)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn mismatched_value_is_rejected() {
        let mut w = Writer::new();
        let err = Primitive::Int.write(&mut w, &Value::from("x"), "count").unwrap_err();
        assert_eq!(err, Error::InvalidValue { field: "count".into(), expected: "int", found: "string" });
    }
}
