//! Schema entries for Telegram's [Type Language] (TL).
//!
//! A [`SchemaEntry`] is the declarative description of one constructor or
//! method: its name, optional 32-bit id and ordered `name:type` parameters.
//! The codec crate compiles entries into runtime type definitions; this
//! crate only models and loads them.
//!
//! Entries can come from two sources:
//!
//! * Telegram's JSON schema (`feature = "json"`, on by default), see
//!   [`Schema::from_json`] and [`SchemaEntry::from_json`].
//! * Raw `.tl` text, see [`parse_tl_file`].
//!
//! # Quick start
//!
//! ```rust
//! use tlwire_schema::{parse_tl_file, EntryKind};
//!
//! let src = "resPQ#05162463 nonce:int128 server_nonce:int128 pq:bytes \
//!            server_public_key_fingerprints:Vector<long> = ResPQ;";
//! let entry = parse_tl_file(src).next().unwrap().unwrap();
//! assert_eq!(entry.kind, EntryKind::Constructor);
//! assert_eq!(entry.qualified_name(), "ResPQ");
//! ```
//!
//! [Type Language]: https://core.telegram.org/mtproto/TL

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Error types for schema parsing and loading.
pub mod errors;
pub mod tl;
mod entry;
mod iterator;
#[cfg(feature = "json")]
mod json;
mod text;
mod utils;

pub use entry::{EntryKind, Param, Schema, SchemaEntry};
pub use errors::{ParamParseError, ParseError, SchemaError};

/// Parses a complete `.tl` schema file, yielding [`SchemaEntry`]s one by one.
///
/// Lines starting with `//` are treated as comments and skipped.
/// The special `---functions---` and `---types---` section markers switch
/// the [`EntryKind`] applied to the following definitions.
///
/// Returns an iterator of `Result<SchemaEntry, ParseError>` so callers can
/// decide whether to skip or hard-fail on bad lines.
pub fn parse_tl_file(contents: &str) -> impl Iterator<Item = Result<SchemaEntry, ParseError>> + '_ {
    iterator::TlIterator::new(contents)
}
