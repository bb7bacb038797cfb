//! The schema entry model consumed by the codec's compiler.

use std::fmt;

use crate::errors::ParamParseError;
use crate::tl::ParamType;

/// Whether a [`SchemaEntry`] describes a record or an RPC call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A data constructor (`predicate` in JSON, the section before `---functions---`).
    Constructor,
    /// An RPC method (`method` in JSON, the section after `---functions---`).
    Method,
}

/// A single `name:type` parameter, with its type kept as written.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
pub struct Param {
    /// The parameter name as it appears in the schema.
    pub name: String,
    /// The raw type expression, e.g. `"Vector<long>"` or `"flags.0?string"`.
    #[cfg_attr(feature = "json", serde(rename = "type"))]
    pub ty: String,
}

impl Param {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { name: name.into(), ty: ty.into() }
    }

    /// Parse the declared type expression.
    pub fn parse_type(&self) -> Result<ParamType, ParamParseError> {
        self.ty.parse()
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.ty)
    }
}

/// One constructor or method definition.
///
/// ```text
/// resPQ#05162463 nonce:int128 server_nonce:int128 pq:bytes
///     server_public_key_fingerprints:Vector<long> = ResPQ;
/// ```
///
/// becomes an entry with `name = "resPQ"`, `id = Some(0x05162463)`, four
/// params and `ty = "ResPQ"`.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaEntry {
    /// 32-bit constructor id. `None` for embedded-only (bare) definitions.
    pub id: Option<u32>,

    /// The symbolic name, possibly `.`-namespaced (e.g. `"auth.resPQ"`).
    pub name: String,

    /// Record or RPC call.
    pub kind: EntryKind,

    /// Ordered parameter list.
    pub params: Vec<Param>,

    /// The result type this entry belongs to (e.g. `"ResPQ"`).
    pub ty: String,
}

impl SchemaEntry {
    /// Start a constructor entry.
    pub fn constructor(name: impl Into<String>, id: Option<u32>, ty: impl Into<String>) -> Self {
        Self { id, name: name.into(), kind: EntryKind::Constructor, params: Vec::new(), ty: ty.into() }
    }

    /// Start a method entry.
    pub fn method(name: impl Into<String>, id: Option<u32>, ty: impl Into<String>) -> Self {
        Self { id, name: name.into(), kind: EntryKind::Method, params: Vec::new(), ty: ty.into() }
    }

    /// Builder-style parameter append.
    pub fn param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    /// `true` for [`EntryKind::Method`].
    pub fn is_method(&self) -> bool {
        self.kind == EntryKind::Method
    }

    /// The name a compiled definition is registered under, relative to its module.
    ///
    /// Constructors get their final path segment capitalized
    /// (`auth.resPQ` → `auth.ResPQ`); method names are kept as written.
    /// Empty segments (`auth.other.`) are dropped in both cases.
    pub fn qualified_name(&self) -> String {
        let segments: Vec<&str> = self.name.split('.').filter(|s| !s.is_empty()).collect();
        let Some((last, ns)) = segments.split_last() else {
            return String::new();
        };

        let mut out = String::with_capacity(self.name.len());
        for part in ns {
            out.push_str(part);
            out.push('.');
        }
        match self.kind {
            EntryKind::Constructor => out.push_str(&capitalize(last)),
            EntryKind::Method => out.push_str(last),
        }
        out
    }
}

impl fmt::Display for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(id) = self.id {
            write!(f, "#{id:08x}")?;
        }
        for p in &self.params {
            write!(f, " {p}")?;
        }
        write!(f, " = {}", self.ty)
    }
}

/// A full schema: constructors and methods, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    /// Record definitions.
    pub constructors: Vec<SchemaEntry>,
    /// RPC definitions.
    pub methods: Vec<SchemaEntry>,
}

impl Schema {
    /// Split a flat list of entries by kind, keeping relative order.
    pub fn from_entries(entries: impl IntoIterator<Item = SchemaEntry>) -> Self {
        let mut schema = Self::default();
        for entry in entries {
            match entry.kind {
                EntryKind::Constructor => schema.constructors.push(entry),
                EntryKind::Method => schema.methods.push(entry),
            }
        }
        schema
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.constructors.len() + self.methods.len()
    }

    /// `true` when the schema has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Upper-case the first character, leaving the rest untouched.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_names_capitalize_last_segment() {
        let e = SchemaEntry::constructor("auth.resPQ", Some(1), "auth.ResPQ");
        assert_eq!(e.qualified_name(), "auth.ResPQ");
        let e = SchemaEntry::constructor("p_q_inner_data", None, "P_Q_inner_data");
        assert_eq!(e.qualified_name(), "P_q_inner_data");
    }

    #[test]
    fn empty_segments_are_dropped() {
        assert_eq!(SchemaEntry::constructor("auth.other.", None, "X").qualified_name(), "auth.Other");
        assert_eq!(SchemaEntry::constructor(".auth.other2", None, "X").qualified_name(), "auth.Other2");
    }

    #[test]
    fn method_names_are_verbatim() {
        let e = SchemaEntry::method("auth.req_pq", Some(1), "auth.ResPQ");
        assert_eq!(e.qualified_name(), "auth.req_pq");
    }
}
