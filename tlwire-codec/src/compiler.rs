//! Turns [`SchemaEntry`]s into [`TypeDef`]s: flat field lists with a resolved
//! [`WireKind`] per field.
//!
//! Nothing is generated per type. Every definition is interpreted by the same
//! encode/decode engine in [`crate::instance`], driven by the field list
//! built here.

use std::fmt;
use std::sync::Arc;

use log::debug;
use tlwire_schema::tl::{ParamType, TypeExpr};
use tlwire_schema::{EntryKind, Schema, SchemaEntry};

use crate::error::{Error, Result, SchemaReason};
use crate::instance::Instance;
use crate::method::MethodDef;
use crate::registry::Registry;
use crate::value::Primitive;
use crate::vector::ElementType;
use crate::wire;

// ─── Field model ──────────────────────────────────────────────────────────────

/// How one field is laid out on the wire.
#[derive(Clone, Debug, PartialEq)]
pub enum WireKind {
    /// A scalar.
    Primitive(Primitive),
    /// A `#` word whose bits say which conditional fields follow.
    Flags,
    /// A nested constructor.
    ///
    /// `name: None` is the polymorphic `Object`, always resolved from the id
    /// on the wire. A bare object is resolved by `name` alone.
    Object { name: Option<String>, bare: bool },
    /// `Object` paired with a `bytes:int` sibling: `[len:int][len raw bytes]`.
    ObjectAsBlob,
    /// `X` or a `!`-prefixed method parameter: raw bytes.
    ///
    /// When `sized`, the length travels in front as with [`WireKind::ObjectAsBlob`];
    /// otherwise the tail runs to the end of the buffer.
    OpaqueTail { sized: bool },
    /// The `bytes:int` sibling of a blob. Written and read by the blob field.
    BlobLength,
    /// A `Vector<T>`; the `0x1cb5c415` tag is omitted only when `bare`.
    Vector { element: ElementType, bare: bool },
}

/// The flags bit guarding a conditional field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldFlag {
    /// Name of the `#` field holding the bit.
    pub field: String,
    /// Bit index, `0..32`.
    pub index: u32,
}

/// One compiled field.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Parameter name.
    pub name: String,
    /// Wire layout.
    pub kind: WireKind,
    /// Set for `flags.N?T` fields.
    pub flag: Option<FieldFlag>,
}

impl Field {
    /// `true` for a conditional `true` field, which has no wire bytes.
    pub fn is_flag_only(&self) -> bool {
        self.flag.is_some() && self.kind == WireKind::Primitive(Primitive::True)
    }
}

/// A compiled constructor or method payload.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDef {
    name: String,
    id: Option<u32>,
    kind: EntryKind,
    result_type: String,
    fields: Vec<Field>,
}

impl TypeDef {
    /// The built-in generic vector. It has no fields; element handling lives
    /// in [`crate::Vector`].
    pub(crate) fn vector() -> Self {
        Self {
            name: "Vector".into(),
            id: Some(wire::VECTOR_ID),
            kind: EntryKind::Constructor,
            result_type: "Vector t".into(),
            fields: Vec::new(),
        }
    }

    /// Compile `entry` under `module` without touching any registry.
    pub fn build(module: &str, entry: &SchemaEntry) -> Result<Self> {
        Self::build_after(module, entry, &[])
    }

    fn build_after(module: &str, entry: &SchemaEntry, inherited: &[Field]) -> Result<Self> {
        let qualified = entry.qualified_name();
        if qualified.is_empty() {
            return Err(Error::Schema {
                entry: entry.name.clone(),
                param: String::new(),
                reason: SchemaReason::EmptyName,
            });
        }
        let name = qualify(module, &qualified);

        let fail = |param: &str, reason: SchemaReason| Error::Schema {
            entry: name.clone(),
            param: param.to_owned(),
            reason,
        };

        let mut parsed = Vec::with_capacity(entry.params.len());
        for param in &entry.params {
            let ty = param.parse_type().map_err(|e| fail(&param.name, SchemaReason::Syntax(e)))?;
            parsed.push((param.name.as_str(), ty));
        }

        let has_length = parsed
            .iter()
            .any(|(n, t)| *n == "bytes" && matches!(t, ParamType::Normal { ty, flag: None } if is_plain_int(ty)));
        let has_blob = parsed.iter().any(|(_, t)| match t {
            ParamType::Normal { ty, .. } => ty.namespace.is_empty() && (ty.name == "Object" || ty.name == "X"),
            ParamType::Flags => false,
        });
        let blob_paired = has_length && has_blob;

        let mut flag_fields: Vec<&str> = inherited
            .iter()
            .filter(|f| f.kind == WireKind::Flags)
            .map(|f| f.name.as_str())
            .collect();
        let mut fields = inherited.to_vec();

        for (param, ty) in &parsed {
            let param: &str = param;
            let field = match ty {
                ParamType::Flags => {
                    flag_fields.push(param);
                    Field { name: param.to_owned(), kind: WireKind::Flags, flag: None }
                }
                ParamType::Normal { ty, flag } => {
                    let flag = match flag {
                        Some(f) if flag_fields.contains(&f.name.as_str()) => {
                            Some(FieldFlag { field: f.name.clone(), index: f.index })
                        }
                        Some(f) => return Err(fail(param, SchemaReason::UnknownFlagsField(f.name.clone()))),
                        None => None,
                    };
                    let kind = if blob_paired && param == "bytes" && flag.is_none() && is_plain_int(ty) {
                        WireKind::BlobLength
                    } else {
                        field_kind(module, entry.kind, ty, blob_paired).map_err(|r| fail(param, r))?
                    };
                    Field { name: param.to_owned(), kind, flag }
                }
            };
            fields.push(field);
        }

        Ok(Self { name, id: entry.id, kind: entry.kind, result_type: entry.ty.clone(), fields })
    }

    /// Fully qualified name, e.g. `mtproto.ResPQ`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constructor id, absent for bare-only definitions.
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// Record or method payload.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// The schema result type (`ResPQ`, `Vector<long>`, …).
    pub fn result_type(&self) -> &str {
        &self.result_type
    }

    /// Fields in wire order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// `true` for the built-in vector definition.
    pub fn is_vector(&self) -> bool {
        self.id == Some(wire::VECTOR_ID) && self.fields.is_empty()
    }

    /// An empty instance in write state.
    pub fn instance(self: &Arc<Self>) -> Instance {
        Instance::new(Arc::clone(self))
    }

    /// Decode a whole boxed buffer as this type.
    pub fn decode(self: &Arc<Self>, registry: &Registry, bytes: impl Into<Arc<[u8]>>) -> Result<Instance> {
        let mut inst = Instance::from_buffer(Arc::clone(self), bytes);
        inst.deserialize(registry)?;
        Ok(inst)
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(id) = self.id {
            write!(f, "#{id:08x}")?;
        }
        Ok(())
    }
}

fn is_plain_int(ty: &TypeExpr) -> bool {
    ty.namespace.is_empty() && ty.name == "int" && !ty.bare && !ty.preserialized
}

fn qualify(module: &str, path: &str) -> String {
    if module.is_empty() {
        path.to_owned()
    } else {
        format!("{module}.{path}")
    }
}

fn field_kind(
    module: &str,
    entry_kind: EntryKind,
    ty: &TypeExpr,
    blob_paired: bool,
) -> std::result::Result<WireKind, SchemaReason> {
    if ty.preserialized {
        if entry_kind != EntryKind::Method {
            return Err(SchemaReason::PreserializedOutsideMethod);
        }
        return Ok(WireKind::OpaqueTail { sized: blob_paired });
    }
    if ty.is_vector() {
        let arg = ty.generic_arg.as_deref().ok_or(SchemaReason::MissingElementType)?;
        return Ok(WireKind::Vector { element: element_type(module, arg)?, bare: ty.bare });
    }
    if ty.generic_arg.is_some() {
        return Err(SchemaReason::UnexpectedGeneric);
    }
    if ty.namespace.is_empty() {
        if let Some(p) = Primitive::from_name(&ty.name) {
            return Ok(WireKind::Primitive(p));
        }
        match ty.name.as_str() {
            "Object" if blob_paired => return Ok(WireKind::ObjectAsBlob),
            "Object" if ty.bare => return Err(SchemaReason::BareObject),
            "Object" => return Ok(WireKind::Object { name: None, bare: false }),
            "X" => return Ok(WireKind::OpaqueTail { sized: blob_paired }),
            _ => {}
        }
    }
    Ok(WireKind::Object { name: Some(qualify(module, &ty.path())), bare: ty.bare })
}

/// Resolve the element type of a `Vector<T>`.
pub(crate) fn element_type(module: &str, arg: &TypeExpr) -> std::result::Result<ElementType, SchemaReason> {
    if arg.is_vector() {
        let inner = arg.generic_arg.as_deref().ok_or(SchemaReason::MissingElementType)?;
        return Ok(ElementType::vector(element_type(module, inner)?, arg.bare));
    }
    if arg.generic_arg.is_some() {
        return Err(SchemaReason::UnexpectedGeneric);
    }
    if arg.namespace.is_empty() {
        match Primitive::from_name(&arg.name) {
            Some(Primitive::True) => return Err(SchemaReason::ZeroWidthElement),
            Some(p) => return Ok(ElementType::Primitive(p)),
            None => {}
        }
        if arg.name == "Object" {
            if arg.bare {
                return Err(SchemaReason::BareObject);
            }
            return Ok(ElementType::Object { name: None, bare: false });
        }
    }
    Ok(ElementType::Object { name: Some(qualify(module, &arg.path())), bare: arg.bare })
}

// ─── Compiler ─────────────────────────────────────────────────────────────────

/// Compiler settings.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Also register each definition under its qualified name (default `true`).
    ///
    /// Turn off for anonymous definitions that must only be reachable by id.
    pub register_by_name: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { register_by_name: true }
    }
}

/// Everything produced by [`Compiler::compile_schema`].
#[derive(Clone, Debug, Default)]
pub struct CompiledSchema {
    /// Constructor definitions, in schema order.
    pub types: Vec<Arc<TypeDef>>,
    /// Method definitions, in schema order.
    pub methods: Vec<MethodDef>,
}

/// Compiles schema entries into a [`Registry`].
///
/// ```
/// use tlwire_codec::{Compiler, Registry};
/// use tlwire_schema::SchemaEntry;
///
/// let mut registry = Registry::new();
/// let entry = SchemaEntry::constructor("auth.resPQ", Some(0x05162463), "auth.ResPQ")
///     .param("nonce", "int128");
/// let def = Compiler::new(&mut registry).compile("mtproto", &entry).unwrap();
/// assert_eq!(def.name(), "mtproto.auth.ResPQ");
/// assert!(registry.get_by_id(0x05162463).is_some());
/// ```
pub struct Compiler<'r> {
    registry: &'r mut Registry,
    options: CompileOptions,
}

impl<'r> Compiler<'r> {
    /// A compiler registering into `registry` with default options.
    pub fn new(registry: &'r mut Registry) -> Self {
        Self { registry, options: CompileOptions::default() }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Compile one entry and register the result.
    pub fn compile(&mut self, module: &str, entry: &SchemaEntry) -> Result<Arc<TypeDef>> {
        let def = TypeDef::build(module, entry)?;
        self.register(def)
    }

    /// Compile `entry` as an extension of `base`: `base`'s fields come first,
    /// followed by the entry's own.
    pub fn compile_extending(&mut self, module: &str, base: &TypeDef, entry: &SchemaEntry) -> Result<Arc<TypeDef>> {
        let def = TypeDef::build_after(module, entry, base.fields())?;
        self.register(def)
    }

    /// Compile a method entry: its payload definition plus the return type.
    pub fn compile_method(&mut self, module: &str, entry: &SchemaEntry) -> Result<MethodDef> {
        let payload = self.compile(module, entry)?;
        let returns_vector = entry
            .ty
            .parse::<TypeExpr>()
            .ok()
            .filter(TypeExpr::is_vector)
            .and_then(|ty| ty.generic_arg)
            .map(|arg| element_type(module, &arg))
            .transpose()
            .map_err(|reason| Error::Schema {
                entry: payload.name().to_owned(),
                param: String::new(),
                reason,
            })?;

        Ok(MethodDef {
            name: payload.name().to_owned(),
            payload,
            returns: entry.ty.clone(),
            returns_vector,
        })
    }

    /// Compile every constructor, then every method.
    pub fn compile_schema(&mut self, module: &str, schema: &Schema) -> Result<CompiledSchema> {
        let mut out = CompiledSchema::default();
        for entry in &schema.constructors {
            out.types.push(self.compile(module, entry)?);
        }
        for entry in &schema.methods {
            out.methods.push(self.compile_method(module, entry)?);
        }
        debug!(
            "[tlwire] compiled module `{module}`: {} types, {} methods",
            out.types.len(),
            out.methods.len()
        );
        Ok(out)
    }

    fn register(&mut self, def: TypeDef) -> Result<Arc<TypeDef>> {
        let def = Arc::new(def);
        self.registry.register_by_id(Arc::clone(&def))?;
        if self.options.register_by_name {
            self.registry.register_by_name(Arc::clone(&def))?;
        }
        debug!("[tlwire] compiled {def} ({} fields)", def.fields().len());
        Ok(def)
    }
}
