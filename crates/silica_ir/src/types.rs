//! The IR type system: interned hardware types and the central database.
//!
//! Value types ([`Type::Bit`], [`Type::BitVec`], [`Type::Array`], ...)
//! describe plain SSA values. [`Type::Signal`] is the handle type
//! produced by a signal declaration; probing a `signal<T>` yields a `T`.

use crate::ids::TypeId;
use serde::{Deserialize, Serialize};

/// A hardware type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    /// A single bit.
    Bit,
    /// A bit vector of known width.
    BitVec {
        /// The number of bits.
        width: u32,
    },
    /// An unbounded integer (indices, parameters).
    Int,
    /// A time quantity (the type of constant-time operations).
    Time,
    /// A fixed-size array.
    Array {
        /// The type of each element.
        element: TypeId,
        /// The number of elements.
        size: u32,
    },
    /// A signal handle referring to storage of the element type.
    Signal {
        /// The type of the stored contents.
        element: TypeId,
    },
    /// A placeholder for types that failed resolution.
    Error,
}

/// Central type database — interned types for cheap comparison.
///
/// Each unique [`Type`] is stored once and referenced by [`TypeId`],
/// making type equality an ID comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDb {
    types: Vec<Type>,
}

impl TypeDb {
    /// Creates a new, empty type database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a type, returning its [`TypeId`].
    ///
    /// An identical already-interned type returns the existing ID.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        for (i, existing) in self.types.iter().enumerate() {
            if existing == &ty {
                return TypeId::from_raw(i as u32);
            }
        }
        let id = TypeId::from_raw(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Returns a reference to the type with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID is out of bounds.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.as_raw() as usize]
    }

    /// Returns `true` if the type is a signal handle.
    pub fn is_signal(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Signal { .. })
    }

    /// Returns the element type of an array, or `None` for non-arrays.
    pub fn element_type(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Array { element, .. } => Some(*element),
            _ => None,
        }
    }

    /// Returns the contents type behind a signal handle, or `None` for
    /// non-signal types.
    pub fn signal_element(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Signal { element } => Some(*element),
            _ => None,
        }
    }

    /// Returns the bit width of a type, if it has a fixed one.
    pub fn bit_width(&self, id: TypeId) -> Option<u32> {
        match self.get(id) {
            Type::Bit => Some(1),
            Type::BitVec { width } => Some(*width),
            Type::Array { element, size } => self.bit_width(*element).map(|w| w * size),
            _ => None,
        }
    }

    /// Returns the number of interned types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types have been interned.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
