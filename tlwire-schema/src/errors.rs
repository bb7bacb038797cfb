use std::fmt;
use std::num::ParseIntError;

/// Errors produced while parsing a single type expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamParseError {
    /// An empty string was encountered where a name/type was expected.
    Empty,
    /// A `{…}` block that isn't a valid type declaration.
    MissingDef,
    /// A flag expression (`name.N?Type`) was malformed.
    InvalidFlag,
    /// A generic `<…>` argument was malformed.
    InvalidGeneric,
    /// A name contained characters outside `[A-Za-z0-9_]`.
    InvalidName {
        /// The offending name.
        name: String,
    },
}

impl fmt::Display for ParamParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty token"),
            Self::MissingDef => write!(f, "unknown generic or flag declaration"),
            Self::InvalidFlag => write!(f, "invalid flag expression"),
            Self::InvalidGeneric => write!(f, "invalid generic argument (unbalanced `<`/`>`)"),
            Self::InvalidName { name } => write!(f, "invalid type name `{name}`"),
        }
    }
}

impl std::error::Error for ParamParseError {}

/// Errors produced while parsing a complete `.tl` definition line.
#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// The input was blank.
    Empty,
    /// No `= Type` was found.
    MissingType,
    /// The name (before `=`) was missing or had empty namespace components.
    MissingName,
    /// The `#id` hex literal was unparseable.
    InvalidId(ParseIntError),
    /// A parameter was invalid.
    InvalidParam(ParamParseError),
    /// The definition uses a syntax we don't support.
    NotImplemented,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty definition"),
            Self::MissingType => write!(f, "missing `= Type`"),
            Self::MissingName => write!(f, "missing or malformed name"),
            Self::InvalidId(e) => write!(f, "invalid constructor ID: {e}"),
            Self::InvalidParam(e) => write!(f, "invalid parameter: {e}"),
            Self::NotImplemented => write!(f, "unsupported TL syntax"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidId(e) => Some(e),
            Self::InvalidParam(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors produced while loading schema entries from JSON.
#[derive(Debug)]
pub enum SchemaError {
    /// The document was not valid JSON or did not have the expected shape.
    #[cfg(feature = "json")]
    Json(serde_json::Error),
    /// An entry named neither a `predicate` nor a `method`, or named both.
    AmbiguousEntry {
        /// Whatever name could be recovered, for diagnostics.
        name: Option<String>,
    },
    /// The `id` field was neither a number nor a decimal string.
    InvalidId {
        /// The raw value as found in the document.
        raw: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "json")]
            Self::Json(e) => write!(f, "malformed schema document: {e}"),
            Self::AmbiguousEntry { name: Some(n) } => {
                write!(f, "entry `{n}` must have exactly one of `predicate` or `method`")
            }
            Self::AmbiguousEntry { name: None } => {
                write!(f, "entry must have exactly one of `predicate` or `method`")
            }
            Self::InvalidId { raw } => write!(f, "invalid entry id `{raw}`"),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "json")]
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e) }
}
