//! Loading entries from Telegram's JSON schema format.
//!
//! ```json
//! { "constructors": [ { "id": "85337187", "predicate": "resPQ", "params": [...], "type": "ResPQ" } ],
//!   "methods":      [ { "id": "1615239032", "method": "req_pq", "params": [...], "type": "ResPQ" } ] }
//! ```

use serde::Deserialize;

use crate::entry::{EntryKind, Param, Schema, SchemaEntry};
use crate::errors::SchemaError;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    predicate: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Vec<Param>,
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Deserialize)]
struct RawSchema {
    #[serde(default)]
    constructors: Vec<RawEntry>,
    #[serde(default)]
    methods: Vec<RawEntry>,
}

/// Ids are signed 32-bit in the published JSON; keep the bit pattern.
fn parse_id(raw: RawId) -> Result<u32, SchemaError> {
    let value = match raw {
        RawId::Number(n) => n,
        RawId::Text(s) => s.trim().parse::<i64>().map_err(|_| SchemaError::InvalidId { raw: s })?,
    };
    if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
        return Err(SchemaError::InvalidId { raw: value.to_string() });
    }
    Ok(value as u32)
}

impl TryFrom<RawEntry> for SchemaEntry {
    type Error = SchemaError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let (name, kind) = match (raw.predicate, raw.method) {
            (Some(p), None) => (p, EntryKind::Constructor),
            (None, Some(m)) => (m, EntryKind::Method),
            (p, m) => return Err(SchemaError::AmbiguousEntry { name: p.or(m) }),
        };
        let id = raw.id.map(parse_id).transpose()?;
        Ok(SchemaEntry { id, name, kind, params: raw.params, ty: raw.ty })
    }
}

impl SchemaEntry {
    /// Parse a single `{ id?, predicate|method, params, type }` object.
    pub fn from_json(src: &str) -> Result<Self, SchemaError> {
        let raw: RawEntry = serde_json::from_str(src)?;
        raw.try_into()
    }
}

impl Schema {
    /// Parse a `{ constructors: [...], methods: [...] }` document.
    ///
    /// Each entry's [`EntryKind`] comes from its `predicate`/`method` key,
    /// not from the list it appears in.
    pub fn from_json(src: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema = serde_json::from_str(src)?;
        let entries = raw.constructors.into_iter()
            .chain(raw.methods)
            .map(SchemaEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let Schema { constructors, methods } = Schema::from_entries(entries);
        log::debug!(
            "[tlwire] loaded JSON schema: {} constructors, {} methods",
            constructors.len(),
            methods.len()
        );
        Ok(Schema { constructors, methods })
    }
}
