//! Tagged type identifiers
//!
//! A `TypeId` packs kind, array depth, value-type index and carrier width into
//! a single `u32` (see `consts` for the layout), so equality of two ids is
//! plain integer equality.

use std::fmt;

use crate::consts::{
    DEPTH_MASK, DEPTH_SHIFT, INDEX_SHIFT, KIND_MASK, MAX_ARRAY_DEPTH, MAX_VALUE_TYPE_INDEX,
    WIDE_CARRIER_BIT,
};
use super::error::{TypeIdError, TypeIdResult};

/// Logical kind of a slot value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Kind {
    Void = 0,
    I32 = 1,
    I64 = 2,
    F32 = 3,
    F64 = 4,
    ObjectRef = 5,
    ValueType = 6,
}

impl Kind {
    fn from_tag(tag: u32) -> Kind {
        match tag {
            0 => Kind::Void,
            1 => Kind::I32,
            2 => Kind::I64,
            3 => Kind::F32,
            4 => Kind::F64,
            5 => Kind::ObjectRef,
            6 => Kind::ValueType,
            _ => unreachable!("kind tag {} is never encoded", tag),
        }
    }
}

/// Destination representation of a value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Carrier {
    /// One 32-bit word (`I`)
    Narrow,
    /// One 64-bit value, two words (`J`)
    Wide,
}

impl Carrier {
    pub fn words(self) -> u32 {
        match self {
            Carrier::Narrow => 1,
            Carrier::Wide => 2,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub const VOID: TypeId = TypeId(Kind::Void as u32);
    pub const I32: TypeId = TypeId(Kind::I32 as u32);
    pub const I64: TypeId = TypeId(Kind::I64 as u32);
    pub const F32: TypeId = TypeId(Kind::F32 as u32);
    pub const F64: TypeId = TypeId(Kind::F64 as u32);
    pub const OBJECT: TypeId = TypeId(Kind::ObjectRef as u32);

    /// Build a non-value type id of the given array depth
    pub fn new(kind: Kind, depth: u32) -> TypeIdResult<TypeId> {
        if kind == Kind::ValueType {
            return Err(TypeIdError::UnregisteredValueType { index: 0 });
        }
        if kind == Kind::Void && depth > 0 {
            return Err(TypeIdError::VoidNotAllowed { role: "array element" });
        }
        if depth > MAX_ARRAY_DEPTH {
            return Err(TypeIdError::DepthOverflow { depth, max: MAX_ARRAY_DEPTH });
        }
        Ok(TypeId(kind as u32 | (depth << DEPTH_SHIFT)))
    }

    /// Build the id of value-type variant `index`
    ///
    /// Only checks that the index fits the encoding; whether the index is
    /// registered is the registry's business (`ValueTypeRegistry::type_id`).
    pub fn value_type(index: u32, carrier: Carrier) -> TypeIdResult<TypeId> {
        if index > MAX_VALUE_TYPE_INDEX {
            return Err(TypeIdError::IndexOverflow { index });
        }
        let wide = match carrier {
            Carrier::Wide => WIDE_CARRIER_BIT,
            Carrier::Narrow => 0,
        };
        Ok(TypeId(Kind::ValueType as u32 | wide | (index << INDEX_SHIFT)))
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn kind(self) -> Kind {
        Kind::from_tag(self.0 & KIND_MASK)
    }

    pub fn array_depth(self) -> u32 {
        (self.0 & DEPTH_MASK) >> DEPTH_SHIFT
    }

    pub fn is_array(self) -> bool {
        self.array_depth() > 0
    }

    pub fn is_void(self) -> bool {
        self == TypeId::VOID
    }

    /// True for value types and arrays of value types
    pub fn is_value_type(self) -> bool {
        self.kind() == Kind::ValueType
    }

    pub fn value_type_index(self) -> Option<u32> {
        if self.is_value_type() {
            Some(self.0 >> INDEX_SHIFT)
        } else {
            None
        }
    }

    pub fn carrier(self) -> Option<Carrier> {
        if !self.is_value_type() {
            None
        } else if self.0 & WIDE_CARRIER_BIT != 0 {
            Some(Carrier::Wide)
        } else {
            Some(Carrier::Narrow)
        }
    }

    /// Words taken in the original (pre-transform) layout
    pub fn src_width(self) -> u32 {
        if self.is_array() {
            return 1;
        }
        match self.kind() {
            Kind::Void => 0,
            Kind::I64 | Kind::F64 => 2,
            _ => 1,
        }
    }

    /// Words taken after value-type decomposition
    pub fn dst_width(self) -> u32 {
        if self.is_array() {
            return 1;
        }
        match self.kind() {
            Kind::Void => 0,
            Kind::I64 | Kind::F64 => 2,
            Kind::ValueType => self.carrier().map_or(1, Carrier::words),
            _ => 1,
        }
    }

    pub fn is_src64(self) -> bool {
        self.src_width() == 2
    }

    pub fn is_dst64(self) -> bool {
        self.dst_width() == 2
    }

    /// The array type one dimension deeper
    pub fn array_from(self) -> TypeIdResult<TypeId> {
        if self.is_void() {
            return Err(TypeIdError::VoidNotAllowed { role: "array element" });
        }
        let depth = self.array_depth() + 1;
        if depth > MAX_ARRAY_DEPTH {
            return Err(TypeIdError::DepthOverflow { depth, max: MAX_ARRAY_DEPTH });
        }
        Ok(TypeId((self.0 & !DEPTH_MASK) | (depth << DEPTH_SHIFT)))
    }

    /// Same type with the array dimensions stripped
    pub fn element(self) -> TypeId {
        TypeId(self.0 & !DEPTH_MASK)
    }

    /// Same element type at an explicit depth
    pub fn with_depth(self, depth: u32) -> TypeIdResult<TypeId> {
        if depth > MAX_ARRAY_DEPTH {
            return Err(TypeIdError::DepthOverflow { depth, max: MAX_ARRAY_DEPTH });
        }
        if self.is_void() && depth > 0 {
            return Err(TypeIdError::VoidNotAllowed { role: "array element" });
        }
        Ok(TypeId((self.0 & !DEPTH_MASK) | (depth << DEPTH_SHIFT)))
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.array_depth() {
            f.write_str("[")?;
        }
        match self.kind() {
            Kind::Void => f.write_str("void"),
            Kind::I32 => f.write_str("i32"),
            Kind::I64 => f.write_str("i64"),
            Kind::F32 => f.write_str("f32"),
            Kind::F64 => f.write_str("f64"),
            Kind::ObjectRef => f.write_str("ref"),
            Kind::ValueType => {
                let index = self.value_type_index().unwrap_or_default();
                match self.carrier() {
                    Some(Carrier::Narrow) => write!(f, "vt{}/i", index),
                    _ => write!(f, "vt{}/j", index),
                }
            }
        }
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self)
    }
}

/// Immutable snapshot of a sequence of type ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TypeArray(Box<[TypeId]>);

impl TypeArray {
    pub fn new(ids: Vec<TypeId>) -> Self {
        Self(ids.into_boxed_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TypeId> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[TypeId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.0.iter().copied()
    }

    pub fn src_words(&self) -> u32 {
        self.iter().map(|t| t.src_width()).sum()
    }

    pub fn dst_words(&self) -> u32 {
        self.iter().map(|t| t.dst_width()).sum()
    }
}

impl From<Vec<TypeId>> for TypeArray {
    fn from(ids: Vec<TypeId>) -> Self {
        Self::new(ids)
    }
}

impl FromIterator<TypeId> for TypeArray {
    fn from_iter<I: IntoIterator<Item = TypeId>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_widths() {
        assert_eq!(TypeId::I32.src_width(), 1);
        assert_eq!(TypeId::I64.src_width(), 2);
        assert_eq!(TypeId::F64.dst_width(), 2);
        assert_eq!(TypeId::OBJECT.dst_width(), 1);
        assert_eq!(TypeId::VOID.src_width(), 0);
        assert!(TypeId::I64.is_src64());
        assert!(!TypeId::F32.is_dst64());
    }

    #[test]
    fn value_type_expands_only_on_destination() {
        let wide = TypeId::value_type(3, Carrier::Wide).unwrap();
        assert_eq!(wide.kind(), Kind::ValueType);
        assert_eq!(wide.value_type_index(), Some(3));
        assert_eq!(wide.src_width(), 1);
        assert_eq!(wide.dst_width(), 2);
        assert!(!wide.is_src64());
        assert!(wide.is_dst64());

        let narrow = TypeId::value_type(3, Carrier::Narrow).unwrap();
        assert_ne!(wide, narrow);
        assert_eq!(narrow.dst_width(), 1);
    }

    #[test]
    fn arrays_are_single_word_references() {
        let longs = TypeId::I64.array_from().unwrap();
        assert_eq!(longs.array_depth(), 1);
        assert_eq!(longs.kind(), Kind::I64);
        assert_eq!(longs.src_width(), 1);
        assert_eq!(longs.dst_width(), 1);
        assert_eq!(longs.element(), TypeId::I64);

        let vt = TypeId::value_type(1, Carrier::Wide).unwrap();
        let vt2 = vt.array_from().unwrap().array_from().unwrap();
        assert_eq!(vt2.array_depth(), 2);
        assert_eq!(vt2.value_type_index(), Some(1));
        assert_eq!(vt2.dst_width(), 1);
    }

    #[test]
    fn construction_contract_violations() {
        assert_eq!(
            TypeId::new(Kind::I32, MAX_ARRAY_DEPTH + 1),
            Err(TypeIdError::DepthOverflow { depth: MAX_ARRAY_DEPTH + 1, max: MAX_ARRAY_DEPTH })
        );
        assert!(matches!(TypeId::new(Kind::Void, 1), Err(TypeIdError::VoidNotAllowed { .. })));
        assert!(TypeId::VOID.array_from().is_err());
        assert!(matches!(
            TypeId::value_type(MAX_VALUE_TYPE_INDEX + 1, Carrier::Wide),
            Err(TypeIdError::IndexOverflow { .. })
        ));
        let deepest = TypeId::new(Kind::F32, MAX_ARRAY_DEPTH).unwrap();
        assert!(deepest.array_from().is_err());
    }

    #[test]
    fn display_form() {
        let vt = TypeId::value_type(2, Carrier::Narrow).unwrap();
        assert_eq!(vt.array_from().unwrap().to_string(), "[vt2/i");
        assert_eq!(TypeId::new(Kind::I64, 2).unwrap().to_string(), "[[i64");
    }
}
