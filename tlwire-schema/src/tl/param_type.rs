use std::fmt;
use std::str::FromStr;

use crate::errors::ParamParseError;
use crate::tl::{Flag, TypeExpr};

/// The parsed form of a parameter's declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// A flags word (`name:#`). Its value is derived from the conditional
    /// parameters at serialization time, not supplied by the caller.
    Flags,

    /// A regular typed parameter, optionally guarded by a flag bit.
    Normal {
        /// The declared type.
        ty: TypeExpr,
        /// If `Some`, the parameter is only on the wire when the bit is set.
        flag: Option<Flag>,
    },
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flags => write!(f, "#"),
            Self::Normal { ty, flag } => {
                if let Some(fl) = flag {
                    write!(f, "{}.{}?", fl.name, fl.index)?;
                }
                write!(f, "{ty}")
            }
        }
    }
}

impl FromStr for ParamType {
    type Err = ParamParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "#" {
            return Ok(Self::Flags);
        }

        if let Some((flag_part, ty_part)) = s.split_once('?') {
            let (flag_name, flag_idx) = flag_part
                .split_once('.')
                .ok_or(ParamParseError::InvalidFlag)?;

            if flag_name.is_empty() || flag_idx.is_empty() {
                return Err(ParamParseError::InvalidFlag);
            }

            let index = flag_idx
                .parse::<u32>()
                .ok()
                .filter(|i| *i < 32)
                .ok_or(ParamParseError::InvalidFlag)?;

            return Ok(Self::Normal {
                ty: TypeExpr::from_str(ty_part)?,
                flag: Some(Flag { name: flag_name.to_owned(), index }),
            });
        }

        Ok(Self::Normal {
            ty: TypeExpr::from_str(s)?,
            flag: None,
        })
    }
}
