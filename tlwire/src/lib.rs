//! # tlwire: Telegram TL binary wire format
//!
//! `tlwire` encodes and decodes Telegram's [Type Language] binary format from
//! a schema loaded at runtime. It consists of three focused sub-crates wired
//! together here for convenience:
//!
//! | Sub-crate       | Role                                                       |
//! |-----------------|------------------------------------------------------------|
//! | `tlwire-schema` | Schema entries from JSON or `.tl` text                     |
//! | `tlwire-codec`  | Registry, compiler, instances, vectors, wire primitives    |
//! | `tlwire-rpc`    | Transport trait and method invocation                      |
//!
//! ## Quick start
//!
//! ```rust
//! # #[cfg(feature = "json")] {
//! let (registry, compiled) = tlwire::load_json_schema("mtproto", r#"{
//!     "constructors": [
//!         {"id": "-1720552011", "predicate": "boolTrue", "params": [], "type": "Bool"},
//!         {"id": "-1132882121", "predicate": "boolFalse", "params": [], "type": "Bool"}
//!     ],
//!     "methods": []
//! }"#).unwrap();
//! assert!(registry.is_sealed());
//! assert_eq!(compiled.types.len(), 2);
//! # }
//! ```
//!
//! [Type Language]: https://core.telegram.org/mtproto/TL

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::fmt;

/// Re-export of [`tlwire_schema`]: schema entries and their loaders.
pub use tlwire_schema as schema;

/// Re-export of [`tlwire_codec`]: the runtime codec.
pub use tlwire_codec as codec;

/// Re-export of [`tlwire_rpc`] (requires `feature = "rpc"`).
#[cfg(feature = "rpc")]
pub use tlwire_rpc as rpc;

// ─── Convenience re-exports ───────────────────────────────────────────────────

pub use tlwire_codec::{
    CompiledSchema,
    Compiler,
    ElementType,
    Instance,
    MethodDef,
    Registry,
    TypeDef,
    Value,
    Vector,
};
pub use tlwire_schema::{ParseError, Schema, SchemaEntry, parse_tl_file};

#[cfg(feature = "rpc")]
pub use tlwire_rpc::{MethodCall, Transport};

// ─── Loading ──────────────────────────────────────────────────────────────────

/// Why a schema could not be turned into a registry.
#[derive(Debug)]
pub enum LoadError {
    /// The schema text itself was rejected.
    #[cfg(feature = "json")]
    Schema(tlwire_schema::SchemaError),
    /// A `.tl` line could not be parsed.
    Parse(ParseError),
    /// An entry could not be compiled.
    Compile(tlwire_codec::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "json")]
            Self::Schema(e)  => write!(f, "schema error: {e}"),
            Self::Parse(e)   => write!(f, "parse error: {e}"),
            Self::Compile(e) => write!(f, "compile error: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "json")]
            Self::Schema(e)  => Some(e),
            Self::Parse(e)   => Some(e),
            Self::Compile(e) => Some(e),
        }
    }
}

/// Compile `schema` under `module` into a fresh, sealed registry.
pub fn load_schema(module: &str, schema: &Schema) -> Result<(Registry, CompiledSchema), LoadError> {
    let mut registry = Registry::new();
    let compiled = Compiler::new(&mut registry)
        .compile_schema(module, schema)
        .map_err(LoadError::Compile)?;
    registry.seal();
    Ok((registry, compiled))
}

/// Parse Telegram's JSON schema and compile it into a sealed registry.
#[cfg(feature = "json")]
pub fn load_json_schema(module: &str, json: &str) -> Result<(Registry, CompiledSchema), LoadError> {
    let schema = Schema::from_json(json).map_err(LoadError::Schema)?;
    load_schema(module, &schema)
}

/// Parse `.tl` text and compile it into a sealed registry.
///
/// Built-in declarations the codec already knows (`int ? = Int;`,
/// `vector#1cb5c415 {t:Type} # [ t ] = Vector t;`) use syntax the entry
/// parser does not support; they are skipped with a warning. Any other bad
/// line aborts the load.
pub fn load_tl_schema(module: &str, contents: &str) -> Result<(Registry, CompiledSchema), LoadError> {
    let mut entries = Vec::new();
    for result in parse_tl_file(contents) {
        match result {
            Ok(entry) => entries.push(entry),
            Err(ParseError::NotImplemented) => {
                log::warn!("[tlwire] skipping built-in `.tl` declaration in `{module}`");
            }
            Err(e) => return Err(LoadError::Parse(e)),
        }
    }
    load_schema(module, &Schema::from_entries(entries))
}
