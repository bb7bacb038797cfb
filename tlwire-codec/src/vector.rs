//! The built-in generic `Vector<T>` container.
//!
//! Wire layout: `[0x1cb5c415][count:int][element]*`, the id being dropped
//! only for an explicitly bare vector. Elements carry no length prefix; each
//! is either fixed-size or self-describing through its own id.

use std::fmt;
use std::sync::Arc;

use log::trace;

use crate::error::{Error, Result};
use crate::instance::ReadCtx;
use crate::registry::Registry;
use crate::value::{Primitive, Value};
use crate::wire::{self, Cursor, Writer};

/// What a vector holds.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementType {
    /// Scalars of one kind.
    Primitive(Primitive),
    /// Constructors.
    ///
    /// With `name` set and registered, and the element's id matching, that
    /// definition is used. Otherwise (abstract types, `Object`) each element
    /// is resolved from its own id. Bare elements are always resolved by name.
    Object {
        /// Qualified type name, `None` for `Object`.
        name: Option<String>,
        /// Elements are written without their id.
        bare: bool,
    },
    /// Nested vectors.
    Vector {
        /// What the inner vectors hold.
        element: Box<ElementType>,
        /// Inner vectors are written without the vector id.
        bare: bool,
    },
}

impl ElementType {
    /// Elements of the named type, boxed or bare.
    pub fn named(name: impl Into<String>, bare: bool) -> Self {
        Self::Object { name: Some(name.into()), bare }
    }

    /// Boxed elements resolved one by one from their ids.
    pub fn polymorphic() -> Self {
        Self::Object { name: None, bare: false }
    }

    /// Nested vectors of `element`, boxed or bare.
    pub fn vector(element: ElementType, bare: bool) -> Self {
        Self::Vector { element: Box::new(element), bare }
    }

    /// The fewest bytes one element can occupy on the wire.
    fn min_width(&self) -> usize {
        match self {
            Self::Primitive(Primitive::True) => 0,
            Self::Primitive(_) => 4,
            Self::Object { bare: true, .. } => 0,
            Self::Object { bare: false, .. } => 4,
            Self::Vector { bare, .. } => if *bare { 4 } else { 8 },
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Object { name: None, .. } => f.write_str("Object"),
            Self::Object { name: Some(n), bare } => write!(f, "{}{n}", if *bare { "%" } else { "" }),
            Self::Vector { element, bare } => write!(f, "{}Vector<{element}>", if *bare { "%" } else { "" }),
        }
    }
}

/// A homogeneous list plus the element type that drives its encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct Vector {
    element: ElementType,
    items: Vec<Value>,
}

impl Vector {
    /// An empty vector.
    pub fn new(element: ElementType) -> Self {
        Self { element, items: Vec::new() }
    }

    /// A vector holding `items`.
    pub fn with_items<V: Into<Value>>(element: ElementType, items: impl IntoIterator<Item = V>) -> Self {
        Self { element, items: items.into_iter().map(Into::into).collect() }
    }

    /// Append one element.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.items.push(value.into());
    }

    /// The element type.
    pub fn element(&self) -> &ElementType {
        &self.element
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrowing iterator over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// A copy of the elements; changing it leaves the vector untouched.
    pub fn get_list(&self) -> Vec<Value> {
        self.items.clone()
    }

    /// Consume the vector, returning its elements.
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// Encode, with the vector id unless `boxed` is `false`.
    pub fn serialize(&self, boxed: bool) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        self.write_to(&mut w, boxed)?;
        Ok(w.finish().to_vec())
    }

    /// Decode a complete buffer holding one vector of `element`.
    pub fn deserialize(
        registry: &Registry,
        element: ElementType,
        bytes: impl Into<Arc<[u8]>>,
        boxed: bool,
    ) -> Result<Self> {
        let source: Arc<[u8]> = bytes.into();
        let ctx = ReadCtx::new(registry, &source, 0);
        let mut cursor = Cursor::from_slice(&source);
        let vector = Self::read_from(&ctx, element, &mut cursor, boxed)?;
        if cursor.remaining() != 0 {
            return Err(Error::TrailingBytes {
                type_name: "Vector".into(),
                consumed: cursor.pos(),
                len: cursor.len(),
            });
        }
        Ok(vector)
    }

    pub(crate) fn write_to(&self, w: &mut Writer, boxed: bool) -> Result<()> {
        if boxed {
            w.write_int32(wire::VECTOR_ID)?;
        }
        let count = u32::try_from(self.items.len()).map_err(|_| Error::MalformedLength { len: self.items.len() })?;
        w.write_int32(count)?;
        for item in &self.items {
            write_element(&self.element, item, w)?;
        }
        Ok(())
    }

    pub(crate) fn read_from(ctx: &ReadCtx<'_>, element: ElementType, c: &mut Cursor<'_>, boxed: bool) -> Result<Self> {
        if boxed {
            let got = c.read_int32()?;
            if got != wire::VECTOR_ID {
                return Err(Error::TypeMismatch { type_name: "Vector".into(), expected: wire::VECTOR_ID, got });
            }
        }
        let count = c.read_int32()? as usize;
        trace!("[tlwire] Vector<{element}> of {count} at {}", c.pos());
        // Zero-width elements still count one byte each so the loop stays bounded.
        if count.saturating_mul(element.min_width().max(1)) > c.remaining() {
            return Err(Error::MalformedLength { len: count });
        }

        let mut items = Vec::with_capacity(count.min(c.remaining()));
        for _ in 0..count {
            items.push(read_element(ctx, &element, c)?);
        }
        Ok(Self { element, items })
    }
}

fn write_element(element: &ElementType, value: &Value, w: &mut Writer) -> Result<()> {
    const FIELD: &str = "vector element";
    match (element, value) {
        (ElementType::Primitive(p), v) => p.write(w, v, FIELD),
        (ElementType::Object { bare, .. }, Value::Object(inst)) => inst.encode_into(*bare, w),
        (ElementType::Vector { bare, .. }, Value::Vector(inner)) => inner.write_to(w, !*bare),
        (ElementType::Object { .. }, v) => {
            Err(Error::InvalidValue { field: FIELD.into(), expected: "object", found: v.kind_name() })
        }
        (ElementType::Vector { .. }, v) => {
            Err(Error::InvalidValue { field: FIELD.into(), expected: "vector", found: v.kind_name() })
        }
    }
}

fn read_element(ctx: &ReadCtx<'_>, element: &ElementType, c: &mut Cursor<'_>) -> Result<Value> {
    match element {
        ElementType::Primitive(p) => p.read(c),
        ElementType::Object { name, bare } => {
            let def = ctx.resolve(name.as_deref(), *bare, c)?;
            Ok(Value::Object(Box::new(ctx.read_nested(def, c, *bare)?)))
        }
        ElementType::Vector { element, bare } => {
            Ok(Value::Vector(Vector::read_from(&ctx.descend()?, (**element).clone(), c, !*bare)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_vector_matches_known_bytes() {
        let v = Vector::with_items(ElementType::Primitive(Primitive::Long), [Value::big("0xc3b42b026ce86b21")]);
        let bytes = v.serialize(true).unwrap();
        assert_eq!(
            bytes,
            [0x15, 0xc4, 0xb5, 0x1c, 0x01, 0, 0, 0, 0x21, 0x6b, 0xe8, 0x6c, 0x02, 0x2b, 0xb4, 0xc3]
        );
        let back = Vector::deserialize(&Registry::new(), ElementType::Primitive(Primitive::Long), bytes, true).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn bare_vector_has_no_tag() {
        let v = Vector::with_items(ElementType::Primitive(Primitive::Int), [1u32, 2]);
        assert_eq!(v.serialize(false).unwrap(), [2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn get_list_is_a_copy() {
        let v = Vector::with_items(ElementType::Primitive(Primitive::Int), [7u32]);
        let mut list = v.get_list();
        list.push(Value::Int(8));
        list[0] = Value::Int(0);
        assert_eq!(v.len(), 1);
        assert_eq!(v.iter().next(), Some(&Value::Int(7)));
    }

    #[test]
    fn nested_vectors() {
        let element = ElementType::vector(ElementType::Primitive(Primitive::Int), false);
        let inner = Vector::with_items(ElementType::Primitive(Primitive::Int), [5u32]);
        let outer = Vector::with_items(element.clone(), [inner]);
        let bytes = outer.serialize(true).unwrap();
        assert_eq!(bytes.len(), 4 + 4 + 4 + 4 + 4);
        assert_eq!(Vector::deserialize(&Registry::new(), element, bytes, true).unwrap(), outer);
    }

    #[test]
    fn wrong_tag_and_trailing_bytes() {
        let reg = Registry::new();
        let int = ElementType::Primitive(Primitive::Int);
        let err = Vector::deserialize(&reg, int.clone(), vec![1, 2, 3, 4, 0, 0, 0, 0], true).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));

        let err = Vector::deserialize(&reg, int, vec![0, 0, 0, 0, 9], false).unwrap_err();
        assert!(matches!(err, Error::TrailingBytes { consumed: 4, len: 5, .. }));
    }

    #[test]
    fn bare_inner_vectors_drop_their_tag() {
        let element = ElementType::vector(ElementType::Primitive(Primitive::Int), true);
        let inner = Vector::with_items(ElementType::Primitive(Primitive::Int), [5u32]);
        let outer = Vector::with_items(element.clone(), [inner]);
        let bytes = outer.serialize(false).unwrap();
        assert_eq!(bytes, [1, 0, 0, 0, 1, 0, 0, 0, 5, 0, 0, 0]);
        assert_eq!(Vector::deserialize(&Registry::new(), element, bytes, false).unwrap(), outer);
    }

    #[test]
    fn counts_beyond_the_buffer_are_rejected() {
        let reg = Registry::new();
        let int = ElementType::Primitive(Primitive::Int);
        let err = Vector::deserialize(&reg, int, vec![3, 0, 0, 0, 1, 0, 0, 0], false).unwrap_err();
        assert_eq!(err, Error::MalformedLength { len: 3 });

        let flag = ElementType::Primitive(Primitive::True);
        let err = Vector::deserialize(&reg, flag, vec![0xff, 0xff, 0xff, 0xff], false).unwrap_err();
        assert_eq!(err, Error::MalformedLength { len: 0xffff_ffff });
    }

    #[test]
    fn element_type_display() {
        assert_eq!(ElementType::named("mt.Message", true).to_string(), "%mt.Message");
        assert_eq!(ElementType::polymorphic().to_string(), "Object");
        let nested = ElementType::vector(ElementType::Primitive(Primitive::Long), true);
        assert_eq!(nested.to_string(), "%Vector<long>");
    }
}
