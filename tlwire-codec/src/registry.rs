//! Lookup of compiled definitions by constructor id and by qualified name.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::compiler::TypeDef;
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::wire::{self, Cursor};

/// The two lookup tables consulted while decoding nested and polymorphic values.
///
/// A registry is filled while compiling a schema, then optionally
/// [sealed](Registry::seal) and shared (e.g. behind an `Arc`) with every
/// thread that decodes. Lookups only ever take `&self`.
///
/// ```
/// use tlwire_codec::{Registry, VECTOR_ID};
///
/// let registry = Registry::new();
/// assert_eq!(registry.require_by_id(VECTOR_ID).unwrap().name(), "Vector");
/// ```
#[derive(Debug)]
pub struct Registry {
    by_id: HashMap<u32, Arc<TypeDef>>,
    by_name: HashMap<String, Arc<TypeDef>>,
    sealed: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry holding only the built-in `Vector` definition.
    pub fn new() -> Self {
        let vector = Arc::new(TypeDef::vector());
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();
        by_id.insert(wire::VECTOR_ID, Arc::clone(&vector));
        by_name.insert(vector.name().to_owned(), vector);
        Self { by_id, by_name, sealed: false }
    }

    /// Insert `def` under its constructor id.
    ///
    /// Definitions without an id are only reachable by name; for those this
    /// is a no-op. A later definition with the same id replaces the earlier one.
    pub fn register_by_id(&mut self, def: Arc<TypeDef>) -> Result<()> {
        self.check_open(&def)?;
        match def.id() {
            Some(id) => {
                debug!("[tlwire] register {} as {}", def.name(), wire::id_hex(id));
                self.by_id.insert(id, def);
            }
            None => debug!("[tlwire] {} has no id; registered by name only", def.name()),
        }
        Ok(())
    }

    /// Insert `def` under its qualified name, replacing any earlier one.
    pub fn register_by_name(&mut self, def: Arc<TypeDef>) -> Result<()> {
        self.check_open(&def)?;
        self.by_name.insert(def.name().to_owned(), def);
        Ok(())
    }

    fn check_open(&self, def: &TypeDef) -> Result<()> {
        if self.sealed {
            return Err(Error::RegistrySealed { name: def.name().to_owned() });
        }
        Ok(())
    }

    /// Freeze the registry. Every later `register_*` call fails.
    pub fn seal(&mut self) {
        debug!("[tlwire] registry sealed with {} ids, {} names", self.by_id.len(), self.by_name.len());
        self.sealed = true;
    }

    /// `true` once [`Registry::seal`] has been called.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Number of definitions reachable by id.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Always `false`: the built-in vector is present from the start.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Non-failing lookup by id.
    pub fn get_by_id(&self, id: u32) -> Option<&Arc<TypeDef>> {
        self.by_id.get(&id)
    }

    /// Non-failing lookup by qualified name.
    pub fn get_by_name(&self, name: &str) -> Option<&Arc<TypeDef>> {
        self.by_name.get(name)
    }

    /// Lookup by id; absence is an error.
    pub fn require_by_id(&self, id: u32) -> Result<Arc<TypeDef>> {
        self.by_id.get(&id).cloned().ok_or(Error::TypeNotFoundById { id })
    }

    /// Lookup by qualified name; absence is an error.
    pub fn require_by_name(&self, name: &str) -> Result<Arc<TypeDef>> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TypeNotFoundByName { name: name.to_owned() })
    }

    /// Resolve the definition whose id is in the first 4 bytes of `bytes`.
    pub fn require_from_buffer(&self, bytes: &[u8]) -> Result<Arc<TypeDef>> {
        let id = Cursor::from_slice(bytes).peek_id()?;
        let def = self.require_by_id(id)?;
        debug!("[tlwire] resolved {} to {}", wire::id_hex(id), def.name());
        Ok(def)
    }

    /// Decode a complete boxed value, resolving its type from the leading id.
    ///
    /// The whole buffer must be consumed.
    pub fn decode(&self, bytes: impl Into<Arc<[u8]>>) -> Result<Instance> {
        let bytes = bytes.into();
        let def = self.require_from_buffer(&bytes)?;
        let mut inst = Instance::from_buffer(def, bytes);
        inst.deserialize(self)?;
        Ok(inst)
    }
}
