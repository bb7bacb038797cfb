//! Type instances and the encode/decode engine that interprets a
//! [`TypeDef`]'s field list.
//!
//! An [`Instance`] is in exactly one state at a time:
//!
//! * **write**: fields can be set; [`Instance::serialize`] encodes them once
//!   and moves to the finalized state;
//! * **finalized**: holds the encoded buffer; serializing again returns it
//!   unchanged and every setter fails;
//! * **read**: bound to an immutable source buffer at an offset; only
//!   [`Instance::deserialize`] populates the fields.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{trace, warn};

use crate::compiler::{Field, TypeDef, WireKind};
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::value::{Primitive, Value};
use crate::vector::Vector;
use crate::wire::{self, Cursor, Writer};

/// Decoder settings.
#[derive(Clone, Copy, Debug)]
pub struct DecodeOptions {
    /// The buffer starts directly with the fields; no id is read.
    pub bare: bool,
    /// Fail unless the decode ends exactly at the end of the buffer.
    pub check_length: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { bare: false, check_length: true }
    }
}

#[derive(Clone)]
enum State {
    Write,
    Finalized(Arc<[u8]>),
    Read { source: Arc<[u8]>, start: usize, pos: usize },
}

/// A value of a compiled [`TypeDef`].
#[derive(Clone)]
pub struct Instance {
    def: Arc<TypeDef>,
    fields: HashMap<String, Value>,
    state: State,
}

impl Instance {
    /// An empty instance in write state.
    pub fn new(def: Arc<TypeDef>) -> Self {
        Self { def, fields: HashMap::new(), state: State::Write }
    }

    /// An instance bound to `bytes`, ready for [`Instance::deserialize`].
    pub fn from_buffer(def: Arc<TypeDef>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::bound(def, bytes.into(), 0)
    }

    fn bound(def: Arc<TypeDef>, source: Arc<[u8]>, start: usize) -> Self {
        Self { def, fields: HashMap::new(), state: State::Read { source, start, pos: 0 } }
    }

    /// The definition this is an instance of.
    pub fn def(&self) -> &Arc<TypeDef> {
        &self.def
    }

    /// Shorthand for `self.def().name()`.
    pub fn type_name(&self) -> &str {
        self.def.name()
    }

    /// Set a field. Only allowed in write state.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if !matches!(self.state, State::Write) {
            return Err(Error::ReadOnly { type_name: self.def.name().to_owned() });
        }
        let value = value.into();
        if self.def.field(name).is_none() {
            return Err(Error::InvalidValue {
                field: name.to_owned(),
                expected: "a declared field",
                found: value.kind_name(),
            });
        }
        self.fields.insert(name.to_owned(), value);
        Ok(())
    }

    /// Builder-style [`Instance::set`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// A field's value, if set or decoded.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Every populated field, in no particular order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `true` while fields can still be set.
    pub fn is_writable(&self) -> bool {
        matches!(self.state, State::Write)
    }

    /// `true` once [`Instance::serialize`] has produced a buffer.
    pub fn is_finalized(&self) -> bool {
        matches!(self.state, State::Finalized(_))
    }

    /// `true` when bound to a source buffer.
    pub fn is_bound(&self) -> bool {
        matches!(self.state, State::Read { .. })
    }

    /// Bytes produced by serialize, or consumed by the last deserialize.
    pub fn consumed(&self) -> usize {
        match &self.state {
            State::Write => 0,
            State::Finalized(buf) => buf.len(),
            State::Read { pos, .. } => *pos,
        }
    }

    /// The wire image: the finalized buffer, or the span read from the source.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.state {
            State::Write => None,
            State::Finalized(buf) => Some(&buf[..]),
            State::Read { source, start, pos } => source.get(*start..*start + *pos),
        }
    }

    /// Encode and finalize.
    ///
    /// The first call fixes the buffer; later calls return that same buffer
    /// whatever `bare` says. Instances bound to a source cannot be serialized;
    /// use [`Instance::encode`] to re-encode their fields.
    pub fn serialize(&mut self, bare: bool) -> Result<Arc<[u8]>> {
        match &self.state {
            State::Finalized(buf) => Ok(Arc::clone(buf)),
            State::Read { .. } => Err(Error::ReadOnly { type_name: self.def.name().to_owned() }),
            State::Write => {
                let mut w = Writer::new();
                self.encode_into(bare, &mut w)?;
                let buf = w.finish();
                self.state = State::Finalized(Arc::clone(&buf));
                Ok(buf)
            }
        }
    }

    /// Encode the current fields without changing state.
    pub fn encode(&self, bare: bool) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        self.encode_into(bare, &mut w)?;
        Ok(w.finish().to_vec())
    }

    /// Decode the bound buffer as a boxed value that must fill it exactly.
    pub fn deserialize(&mut self, registry: &Registry) -> Result<()> {
        self.deserialize_with(registry, DecodeOptions::default())
    }

    /// Decode the bound buffer.
    ///
    /// On failure every field decoded so far is dropped.
    pub fn deserialize_with(&mut self, registry: &Registry, options: DecodeOptions) -> Result<()> {
        self.decode_at(registry, options, 0)
    }

    fn decode_at(&mut self, registry: &Registry, options: DecodeOptions, depth: usize) -> Result<()> {
        let State::Read { source, start, .. } = &self.state else {
            return Err(Error::NotReadable { type_name: self.def.name().to_owned() });
        };
        let source = Arc::clone(source);
        let start = *start;

        let Some(window) = source.get(start..) else {
            return Err(Error::UnexpectedEof { needed: start, remaining: source.len() });
        };
        let mut cursor = Cursor::from_slice(window);
        self.fields.clear();

        let result = self
            .decode_body(&ReadCtx { registry, source: &source, base: start, depth }, &mut cursor, options.bare)
            .and_then(|()| {
                if options.check_length && cursor.remaining() != 0 {
                    warn!(
                        "[tlwire] {} stopped at {} of {} bytes",
                        self.def.name(),
                        cursor.pos(),
                        cursor.len()
                    );
                    return Err(Error::TrailingBytes {
                        type_name: self.def.name().to_owned(),
                        consumed: cursor.pos(),
                        len: cursor.len(),
                    });
                }
                Ok(())
            });

        match result {
            Ok(()) => {
                let pos = cursor.pos();
                self.state = State::Read { source, start, pos };
                Ok(())
            }
            Err(e) => {
                self.fields.clear();
                Err(e)
            }
        }
    }

    // ─── Encoding ─────────────────────────────────────────────────────────────

    pub(crate) fn encode_into(&self, bare: bool, w: &mut Writer) -> Result<()> {
        if self.def.is_vector() {
            return Err(Error::UntypedVector);
        }
        if let (Some(id), false) = (self.def.id(), bare) {
            w.write_int32(id)?;
        }
        for field in self.def.fields() {
            if field.flag.is_some() && !self.is_present(field) {
                continue;
            }
            trace!("[tlwire] write {}.{} at {}", self.def.name(), field.name, w.len());
            self.encode_field(field, w)?;
        }
        Ok(())
    }

    fn encode_field(&self, field: &Field, w: &mut Writer) -> Result<()> {
        match &field.kind {
            WireKind::BlobLength => Ok(()),
            WireKind::Flags => w.write_int32(self.flags_word(&field.name)),
            WireKind::Primitive(Primitive::True) => Ok(()),
            WireKind::Primitive(p) => p.write(w, self.require(field)?, &field.name),
            WireKind::Object { bare, .. } => match self.require(field)? {
                Value::Object(inst) => inst.encode_into(*bare, w),
                other => Err(Error::InvalidValue {
                    field: field.name.clone(),
                    expected: "object",
                    found: other.kind_name(),
                }),
            },
            WireKind::ObjectAsBlob | WireKind::OpaqueTail { sized: true } => {
                let blob = self.blob(field)?;
                let len = u32::try_from(blob.len()).map_err(|_| Error::MalformedLength { len: blob.len() })?;
                w.write_int32(len)?;
                w.write_raw(&blob)
            }
            WireKind::OpaqueTail { sized: false } => w.write_raw(&self.blob(field)?),
            WireKind::Vector { bare, .. } => match self.require(field)? {
                Value::Vector(v) => v.write_to(w, !*bare),
                other => Err(Error::InvalidValue {
                    field: field.name.clone(),
                    expected: "vector",
                    found: other.kind_name(),
                }),
            },
        }
    }

    fn require(&self, field: &Field) -> Result<&Value> {
        self.fields.get(&field.name).ok_or_else(|| Error::MissingField {
            type_name: self.def.name().to_owned(),
            field: field.name.clone(),
        })
    }

    fn is_present(&self, field: &Field) -> bool {
        match self.fields.get(&field.name) {
            Some(Value::Bool(set)) if field.is_flag_only() => *set,
            Some(_) => true,
            None => false,
        }
    }

    fn flags_word(&self, flags_field: &str) -> u32 {
        self.def
            .fields()
            .iter()
            .filter(|f| f.flag.as_ref().is_some_and(|flag| flag.field == flags_field))
            .filter(|f| self.is_present(f))
            .fold(0, |word, f| word | f.flag.as_ref().map_or(0, |flag| 1 << flag.index))
    }

    fn blob(&self, field: &Field) -> Result<Vec<u8>> {
        match self.require(field)? {
            Value::Bytes(b) => Ok(b.clone()),
            Value::Object(inst) => inst.encode(false),
            other => Err(Error::InvalidValue {
                field: field.name.clone(),
                expected: "bytes or object",
                found: other.kind_name(),
            }),
        }
    }

    // ─── Decoding ─────────────────────────────────────────────────────────────

    fn decode_body(&mut self, ctx: &ReadCtx<'_>, c: &mut Cursor<'_>, bare: bool) -> Result<()> {
        let def = Arc::clone(&self.def);
        if def.is_vector() {
            return Err(Error::UntypedVector);
        }
        if let (Some(expected), false) = (def.id(), bare) {
            let got = c.read_int32()?;
            if got != expected {
                warn!(
                    "[tlwire] {} expected {} but read {}",
                    def.name(),
                    wire::id_hex(expected),
                    wire::id_hex(got)
                );
                return Err(Error::TypeMismatch { type_name: def.name().to_owned(), expected, got });
            }
        }

        for field in def.fields() {
            if let Some(flag) = &field.flag {
                let word = self.fields.get(&flag.field).and_then(Value::as_int).unwrap_or(0);
                if word & (1 << flag.index) == 0 {
                    if field.is_flag_only() {
                        self.fields.insert(field.name.clone(), Value::Bool(false));
                    }
                    continue;
                }
            }
            trace!("[tlwire] read {}.{} at {}", def.name(), field.name, ctx.base + c.pos());

            let value = match &field.kind {
                WireKind::BlobLength => continue,
                WireKind::Flags => Value::Int(c.read_int32()?),
                WireKind::Primitive(p) => p.read(c)?,
                WireKind::Object { name, bare } => {
                    let nested = ctx.resolve(name.as_deref(), *bare, c)?;
                    Value::Object(Box::new(ctx.read_nested(nested, c, *bare)?))
                }
                WireKind::ObjectAsBlob | WireKind::OpaqueTail { sized: true } => {
                    let len = c.read_int32()?;
                    self.fields.insert("bytes".to_owned(), Value::Int(len));
                    Value::Bytes(c.read_exact(len as usize)?.to_vec())
                }
                WireKind::OpaqueTail { sized: false } => Value::Bytes(c.read_to_end().to_vec()),
                WireKind::Vector { element, bare } => {
                    Value::Vector(Vector::read_from(ctx, element.clone(), c, !*bare)?)
                }
            };
            self.fields.insert(field.name.clone(), value);
        }
        Ok(())
    }
}

impl PartialEq for Instance {
    /// Same definition name and same field values; state is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.def.name() == other.def.name() && self.fields == other.fields
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.def.name());
        for field in self.def.fields() {
            if let Some(v) = self.fields.get(&field.name) {
                s.field(&field.name, v);
            }
        }
        s.finish()
    }
}

// ─── Nested reads ─────────────────────────────────────────────────────────────

/// How many objects or vectors may be nested inside the outermost value.
pub const MAX_DEPTH: usize = 64;

/// What a nested decode needs: the registry and the shared source buffer.
///
/// `base` is the absolute offset of the cursor's slice within `source`, so
/// children can be bound to the same buffer at the right place. `depth`
/// counts the enclosing objects and vectors.
pub(crate) struct ReadCtx<'a> {
    registry: &'a Registry,
    source: &'a Arc<[u8]>,
    base: usize,
    depth: usize,
}

impl<'a> ReadCtx<'a> {
    pub(crate) fn new(registry: &'a Registry, source: &'a Arc<[u8]>, base: usize) -> Self {
        Self { registry, source, base, depth: 0 }
    }

    /// The context one level further in, or [`Error::NestingTooDeep`].
    pub(crate) fn descend(&self) -> Result<Self> {
        if self.depth >= MAX_DEPTH {
            warn!("[tlwire] nesting limit of {MAX_DEPTH} reached at {}", self.base);
            return Err(Error::NestingTooDeep { limit: MAX_DEPTH });
        }
        Ok(Self { registry: self.registry, source: self.source, base: self.base, depth: self.depth + 1 })
    }

    /// Pick the definition for the value at the cursor.
    ///
    /// Bare values are resolved by name. Boxed values peek their id: the
    /// named definition wins when its id matches, any other registered id
    /// is taken as a concrete subtype, and an unknown id falls back to the
    /// named definition so the mismatch surfaces as a type error.
    pub(crate) fn resolve(&self, name: Option<&str>, bare: bool, c: &Cursor<'_>) -> Result<Arc<TypeDef>> {
        let Some(name) = name else {
            return self.registry.require_by_id(c.peek_id()?);
        };
        if bare {
            return self.registry.require_by_name(name);
        }
        let id = c.peek_id()?;
        match self.registry.get_by_name(name) {
            Some(def) if def.id() == Some(id) => Ok(Arc::clone(def)),
            Some(def) => match self.registry.get_by_id(id) {
                Some(other) => Ok(Arc::clone(other)),
                None => Ok(Arc::clone(def)),
            },
            None => self.registry.require_by_id(id),
        }
    }

    /// Decode a child bound to the same source at the cursor, then skip the
    /// cursor past it.
    pub(crate) fn read_nested(&self, def: Arc<TypeDef>, c: &mut Cursor<'_>, bare: bool) -> Result<Instance> {
        let inner = self.descend()?;
        let mut child = Instance::bound(def, Arc::clone(self.source), self.base + c.pos());
        child.decode_at(self.registry, DecodeOptions { bare, check_length: false }, inner.depth)?;
        c.skip(child.consumed())?;
        Ok(child)
    }
}
