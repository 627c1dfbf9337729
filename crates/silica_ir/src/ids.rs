//! Opaque ID newtypes for IR entities.
//!
//! Each ID wraps a `u32` arena index and is `Copy`, `Hash`, and
//! serde-serializable. IDs stay valid for the lifetime of their arena;
//! erased operations keep their ID but are tombstoned by the module.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a module in the design.
    ModuleId
);

define_id!(
    /// Opaque, copyable ID for a block within a module.
    BlockId
);

define_id!(
    /// Opaque, copyable ID for an operation within a module.
    OpId
);

define_id!(
    /// Opaque, copyable ID for an SSA value within a module.
    ValueId
);

define_id!(
    /// Opaque, copyable ID for an interned type in the [`TypeDb`](crate::types::TypeDb).
    TypeId
);
