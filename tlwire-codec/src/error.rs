//! The codec's error type.

use std::fmt;

use tlwire_schema::ParamParseError;

/// Errors produced while compiling schema entries or encoding/decoding values.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    // ── schema ────────────────────────────────────────────────────────────────
    /// A parameter's type expression could not be compiled.
    Schema {
        /// The entry being compiled.
        entry: String,
        /// The offending parameter.
        param: String,
        /// Why it was rejected.
        reason: SchemaReason,
    },

    // ── registry ──────────────────────────────────────────────────────────────
    /// No type is registered under this constructor id.
    TypeNotFoundById { id: u32 },
    /// No type is registered under this qualified name.
    TypeNotFoundByName { name: String },
    /// Registration was attempted after [`crate::Registry::seal`].
    RegistrySealed { name: String },

    // ── wire format ───────────────────────────────────────────────────────────
    /// The leading constructor id did not match the type being decoded.
    TypeMismatch { type_name: String, expected: u32, got: u32 },
    /// Decoding finished before the end of the buffer.
    TrailingBytes { type_name: String, consumed: usize, len: usize },
    /// Ran out of bytes before the value was fully read.
    UnexpectedEof { needed: usize, remaining: usize },
    /// A length prefix or count was impossible for the surrounding buffer.
    MalformedLength { len: usize },
    /// A `string` field did not hold valid UTF-8.
    InvalidUtf8,
    /// A boxed `Bool` carried an id other than `boolTrue`/`boolFalse`.
    InvalidBool { id: u32 },
    /// A boxed vector was found where no element type is known.
    UntypedVector,
    /// Nested objects or vectors went deeper than the decoder allows.
    NestingTooDeep { limit: usize },

    // ── state ─────────────────────────────────────────────────────────────────
    /// Write attempted on a finalized or buffer-bound value.
    ReadOnly { type_name: String },
    /// Read attempted on a value that is still being built.
    NotReadable { type_name: String },

    // ── values ────────────────────────────────────────────────────────────────
    /// A field that must be on the wire has no value.
    MissingField { type_name: String, field: String },
    /// The supplied value does not fit the field's wire kind.
    InvalidValue { field: String, expected: &'static str, found: &'static str },
    /// A big-integer string was neither `0x…` hex nor decimal.
    InvalidBigInt { value: String },
    /// A fixed-width integer was asked for a width that isn't a multiple of 4.
    InvalidWidth { width: usize },
}

/// What made a schema entry uncompilable.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaReason {
    /// The type expression itself was malformed.
    Syntax(ParamParseError),
    /// `!` was used outside a method entry.
    PreserializedOutsideMethod,
    /// A conditional field names a flags field that doesn't precede it.
    UnknownFlagsField(String),
    /// A generic argument was given to something other than a vector.
    UnexpectedGeneric,
    /// A vector was declared without an element type.
    MissingElementType,
    /// `%Object` has no static type to decode against.
    BareObject,
    /// `true` occupies no bytes, so a vector of it cannot be read back.
    ZeroWidthElement,
    /// The entry has no usable name.
    EmptyName,
}

impl fmt::Display for SchemaReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(e) => write!(f, "{e}"),
            Self::PreserializedOutsideMethod => write!(f, "`!` is only allowed on method parameters"),
            Self::UnknownFlagsField(n) => write!(f, "no preceding flags field `{n}`"),
            Self::UnexpectedGeneric => write!(f, "only vectors take a generic argument"),
            Self::MissingElementType => write!(f, "vector without an element type"),
            Self::BareObject => write!(f, "`Object` cannot be bare"),
            Self::ZeroWidthElement => write!(f, "`true` cannot be a vector element"),
            Self::EmptyName => write!(f, "empty entry name"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema { entry, param, reason } => {
                write!(f, "cannot compile `{entry}` parameter `{param}`: {reason}")
            }
            Self::TypeNotFoundById { id } => {
                write!(f, "type not found for id {id:#010x} (wire {})", crate::wire::id_hex(*id))
            }
            Self::TypeNotFoundByName { name } => write!(f, "type not found for name `{name}`"),
            Self::RegistrySealed { name } => {
                write!(f, "cannot register `{name}`: registry is sealed")
            }
            Self::TypeMismatch { type_name, expected, got } => write!(
                f,
                "cannot decode `{type_name}`: read id {} != expected {}",
                crate::wire::id_hex(*got),
                crate::wire::id_hex(*expected),
            ),
            Self::TrailingBytes { type_name, consumed, len } => write!(
                f,
                "cannot decode `{type_name}`: read offset {consumed} != buffer length {len}"
            ),
            Self::UnexpectedEof { needed, remaining } => {
                write!(f, "unexpected end of buffer: need {needed} bytes, {remaining} left")
            }
            Self::MalformedLength { len } => write!(f, "malformed length {len}"),
            Self::InvalidUtf8 => write!(f, "string is not valid UTF-8"),
            Self::InvalidBool { id } => write!(f, "invalid Bool constructor {id:#010x}"),
            Self::UntypedVector => write!(f, "vector found where no element type is known"),
            Self::NestingTooDeep { limit } => write!(f, "values nested deeper than {limit} levels"),
            Self::ReadOnly { type_name } => {
                write!(f, "`{type_name}` is finalized or bound to a buffer; it cannot be written")
            }
            Self::NotReadable { type_name } => {
                write!(f, "`{type_name}` is not bound to a buffer; it cannot be read")
            }
            Self::MissingField { type_name, field } => {
                write!(f, "`{type_name}` has no value for field `{field}`")
            }
            Self::InvalidValue { field, expected, found } => {
                write!(f, "field `{field}` expects {expected}, found {found}")
            }
            Self::InvalidBigInt { value } => write!(f, "`{value}` is not a hex or decimal integer"),
            Self::InvalidWidth { width } => write!(f, "integer width {width} is not a multiple of 4"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema { reason: SchemaReason::Syntax(e), .. } => Some(e),
            _ => None,
        }
    }
}

/// Specialized `Result` for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
