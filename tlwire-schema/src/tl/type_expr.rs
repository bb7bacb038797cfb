use std::fmt;
use std::str::FromStr;

use crate::errors::ParamParseError;

/// A parameter's declared type, e.g. `%Message`, `!X` or `Vector<long>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeExpr {
    /// Leading `!`: the value is handed over already serialized (methods only).
    pub preserialized: bool,

    /// Leading `%`: encoded without its 4-byte constructor id.
    pub bare: bool,

    /// Namespace components, e.g. `["auth"]` for `auth.ResPQ`.
    pub namespace: Vec<String>,

    /// The final name component, e.g. `"ResPQ"`, `"long"` or `"Vector"`.
    pub name: String,

    /// The generic argument, e.g. `long` in `Vector<long>`.
    pub generic_arg: Option<Box<TypeExpr>>,
}

impl TypeExpr {
    /// `true` for `Vector<T>` and its lowercase alias `vector<T>`.
    pub fn is_vector(&self) -> bool {
        self.namespace.is_empty() && (self.name == "Vector" || self.name == "vector")
    }

    /// Namespace and name joined with dots, without any prefix or generic argument.
    pub fn path(&self) -> String {
        let mut s = String::new();
        for ns in &self.namespace {
            s.push_str(ns);
            s.push('.');
        }
        s.push_str(&self.name);
        s
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.preserialized {
            write!(f, "!")?;
        }
        if self.bare {
            write!(f, "%")?;
        }
        write!(f, "{}", self.path())?;
        if let Some(arg) = &self.generic_arg {
            write!(f, "<{arg}>")?;
        }
        Ok(())
    }
}

impl FromStr for TypeExpr {
    type Err = ParamParseError;

    /// Parses a type expression such as `%auth.Message` or `Vector<%Message>`.
    ///
    /// # Examples
    /// ```
    /// use tlwire_schema::tl::TypeExpr;
    /// let ty: TypeExpr = "Vector<%Message>".parse().unwrap();
    /// assert!(ty.is_vector());
    /// assert!(ty.generic_arg.unwrap().bare);
    /// ```
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();

        let (raw, preserialized) = match raw.strip_prefix('!') {
            Some(r) => (r, true),
            None => (raw, false),
        };
        let (raw, bare) = match raw.strip_prefix('%') {
            Some(r) => (r, true),
            None => (raw, false),
        };

        let (name_part, generic_arg) = match raw.split_once('<') {
            Some((name, rest)) => match rest.strip_suffix('>') {
                Some(arg) => (name, Some(Box::new(TypeExpr::from_str(arg)?))),
                None => return Err(ParamParseError::InvalidGeneric),
            },
            None => (raw, None),
        };

        if name_part.contains('>') {
            return Err(ParamParseError::InvalidGeneric);
        }

        let (namespace, name) = match name_part.rsplit_once('.') {
            Some((ns_part, n)) => (
                ns_part.split('.').map(String::from).collect::<Vec<_>>(),
                n,
            ),
            None => (Vec::new(), name_part),
        };

        if namespace.iter().any(|p| p.is_empty()) || name.is_empty() {
            return Err(ParamParseError::Empty);
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ParamParseError::InvalidName { name: name.to_owned() });
        }

        Ok(Self {
            preserialized,
            bare,
            namespace,
            name: name.to_owned(),
            generic_arg,
        })
    }
}
