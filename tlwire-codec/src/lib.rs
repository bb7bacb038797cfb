//! Schema-driven encoding and decoding of Telegram's [TL binary format].
//!
//! Schema entries are compiled once into [`TypeDef`]s (a flat list of
//! fields, each with a resolved [`WireKind`]) and registered in a
//! [`Registry`]. One engine then encodes and decodes every definition from
//! that list; no code is generated per type.
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`wire`]      | TL scalars over a linear buffer: [`Writer`], [`Cursor`]    |
//! | [`bigint`]    | `long`/`int128`/`int256` ⇄ hex or decimal strings          |
//! | [`registry`]  | Lookup by constructor id and qualified name                |
//! | [`compiler`]  | [`SchemaEntry`](tlwire_schema::SchemaEntry) → [`TypeDef`]  |
//! | [`instance`]  | [`Instance`]: write / finalized / read states              |
//! | [`vector`]    | The built-in `Vector<T>`                                   |
//! | [`method`]    | [`MethodDef`] and [`decode_response`]                      |
//!
//! # Example
//!
//! ```rust
//! use tlwire_codec::{Compiler, ElementType, Primitive, Registry, Value, Vector};
//! use tlwire_schema::SchemaEntry;
//!
//! let mut registry = Registry::new();
//! let res_pq = SchemaEntry::constructor("resPQ", Some(0x05162463), "ResPQ")
//!     .param("nonce", "int128")
//!     .param("server_nonce", "int128")
//!     .param("pq", "bytes")
//!     .param("server_public_key_fingerprints", "Vector<long>");
//! let def = Compiler::new(&mut registry).compile("", &res_pq).unwrap();
//! registry.seal();
//!
//! let fingerprints = Vector::with_items(
//!     ElementType::Primitive(Primitive::Long),
//!     [Value::big("0xc3b42b026ce86b21")],
//! );
//! let mut msg = def.instance()
//!     .with("nonce", Value::big("0x1")).unwrap()
//!     .with("server_nonce", Value::big("0x2")).unwrap()
//!     .with("pq", vec![0x17u8, 0xed]).unwrap()
//!     .with("server_public_key_fingerprints", fingerprints).unwrap();
//! let bytes = msg.serialize(false).unwrap();
//!
//! let decoded = registry.decode(bytes).unwrap();
//! assert_eq!(decoded.get("pq"), Some(&Value::Bytes(vec![0x17, 0xed])));
//! ```
//!
//! [TL binary format]: https://core.telegram.org/mtproto/serialize

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod bigint;
pub mod compiler;
pub mod error;
pub mod instance;
pub mod method;
pub mod registry;
pub mod value;
pub mod vector;
pub mod wire;

pub use compiler::{CompileOptions, CompiledSchema, Compiler, Field, FieldFlag, TypeDef, WireKind};
pub use error::{Error, Result, SchemaReason};
pub use instance::{DecodeOptions, Instance, MAX_DEPTH};
pub use method::{MethodDef, decode_response};
pub use registry::Registry;
pub use value::{Primitive, Value};
pub use vector::{ElementType, Vector};
pub use wire::{Cursor, VECTOR_ID, Writer};
