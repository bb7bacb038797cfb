//! Compiled RPC methods and decoding of their responses.

use std::sync::Arc;

use log::debug;

use crate::compiler::TypeDef;
use crate::error::Result;
use crate::instance::Instance;
use crate::registry::Registry;
use crate::value::Value;
use crate::vector::{ElementType, Vector};
use crate::wire::{self, Cursor};

/// A compiled method: its payload definition and what it returns.
#[derive(Clone, Debug)]
pub struct MethodDef {
    /// Qualified method name, e.g. `mtproto.req_pq`.
    pub name: String,
    /// The request record; serialize an instance of it to call the method.
    pub payload: Arc<TypeDef>,
    /// The declared result type as written in the schema.
    pub returns: String,
    /// Element type when the result is a `Vector<T>`.
    pub returns_vector: Option<ElementType>,
}

impl MethodDef {
    /// A fresh request to fill in.
    pub fn request(&self) -> Instance {
        Instance::new(Arc::clone(&self.payload))
    }

    /// The method's constructor id.
    pub fn id(&self) -> Option<u32> {
        self.payload.id()
    }

    /// See [`decode_response`].
    pub fn decode_response(&self, registry: &Registry, bytes: impl Into<Arc<[u8]>>) -> Result<Value> {
        decode_response(registry, self, bytes)
    }
}

/// Decode the server's answer to `method`.
///
/// A `Vector<T>` result is decoded with its element type; a `Bool` result
/// becomes [`Value::Bool`]. Anything else is resolved from its leading id.
pub fn decode_response(registry: &Registry, method: &MethodDef, bytes: impl Into<Arc<[u8]>>) -> Result<Value> {
    let bytes: Arc<[u8]> = bytes.into();
    let id = Cursor::from_slice(&bytes).peek_id()?;
    debug!("[tlwire] {} answered with {}", method.name, wire::id_hex(id));

    match (&method.returns_vector, id) {
        (Some(element), wire::VECTOR_ID) => {
            Ok(Value::Vector(Vector::deserialize(registry, element.clone(), bytes, true)?))
        }
        (_, wire::BOOL_TRUE_ID | wire::BOOL_FALSE_ID) if method.returns == "Bool" => {
            Ok(Value::Bool(Cursor::from_slice(&bytes).read_bool()?))
        }
        _ => Ok(Value::Object(Box::new(registry.decode(bytes)?))),
    }
}
