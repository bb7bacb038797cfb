//! Parsing of a single `.tl` definition line into a [`SchemaEntry`].

use std::str::FromStr;

use crate::entry::{EntryKind, Param, SchemaEntry};
use crate::errors::{ParamParseError, ParseError};
use crate::tl::{ParamType, TypeExpr};
use crate::utils::tl_id;

/// Parse `name#id p1:T1 p2:T2 = Result` (without the trailing `;`).
///
/// `{X:Type}` declarations are dropped; every other parameter is kept with
/// its type expression as written so the compiler sees exactly what the
/// JSON loader would have produced. A missing `#id` is derived with CRC-32.
pub(crate) fn parse_definition(raw: &str, kind: EntryKind) -> Result<SchemaEntry, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let (lhs, ty_str) = raw.split_once('=').ok_or(ParseError::MissingType)?;
    let lhs = lhs.trim();
    let ty_str = ty_str.trim().trim_end_matches(';').trim();
    if ty_str.is_empty() {
        return Err(ParseError::MissingType);
    }
    // `= Vector t` style result types are not expressible as a schema entry.
    if ty_str.contains(char::is_whitespace) {
        return Err(ParseError::NotImplemented);
    }
    TypeExpr::from_str(ty_str).map_err(|_| ParseError::MissingType)?;

    let (head, rest) = match lhs.split_once(|c: char| c.is_whitespace()) {
        Some((h, r)) => (h.trim_end(), r.trim_start()),
        None => (lhs, ""),
    };

    let (name, explicit_id) = match head.split_once('#') {
        Some((n, id)) => (n, Some(id)),
        None => (head, None),
    };
    if name.is_empty() || name.split('.').any(str::is_empty) {
        return Err(ParseError::MissingName);
    }

    let id = match explicit_id {
        Some(hex) => u32::from_str_radix(hex.trim(), 16).map_err(ParseError::InvalidId)?,
        None => tl_id(raw),
    };

    let mut generics: Vec<String> = Vec::new();
    let mut flag_fields: Vec<String> = Vec::new();
    let mut params = Vec::new();

    for token in rest.split_whitespace() {
        if let Some(inner) = token.strip_prefix('{') {
            match inner.strip_suffix(":Type}") {
                Some(g) => generics.push(g.to_owned()),
                None => return Err(ParseError::InvalidParam(ParamParseError::MissingDef)),
            }
            continue;
        }

        let (pname, pty) = token.split_once(':').ok_or(ParseError::NotImplemented)?;
        if pname.is_empty() || pty.is_empty() {
            return Err(ParseError::InvalidParam(ParamParseError::Empty));
        }

        match ParamType::from_str(pty).map_err(ParseError::InvalidParam)? {
            ParamType::Flags => flag_fields.push(pname.to_owned()),
            ParamType::Normal { flag: Some(fl), .. } if !flag_fields.contains(&fl.name) => {
                return Err(ParseError::InvalidParam(ParamParseError::MissingDef));
            }
            ParamType::Normal { ty, .. } if ty.preserialized && !generics.contains(&ty.name) => {
                return Err(ParseError::InvalidParam(ParamParseError::MissingDef));
            }
            ParamType::Normal { .. } => {}
        }
        params.push(Param::new(pname, pty));
    }

    Ok(SchemaEntry {
        id: Some(id),
        name: name.to_owned(),
        kind,
        params,
        ty: ty_str.to_owned(),
    })
}
