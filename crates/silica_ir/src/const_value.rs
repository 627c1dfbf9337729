//! Compile-time constant payloads for constant operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A compile-time constant carried by a constant operation.
///
/// The promotion passes never evaluate constants; they only move them
/// around, so the representation stays structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    /// An integer constant (indices, parameters).
    Int(i64),
    /// A bit-pattern constant of known width.
    Bits {
        /// The number of bits.
        width: u32,
        /// The bit pattern, LSB-first in the low bits.
        value: u64,
    },
    /// An array constant, one entry per element.
    Array(Vec<ConstValue>),
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Bits { width, value } => write!(f, "{width}'h{value:x}"),
            ConstValue::Array(elements) => {
                write!(f, "[")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, "]")
            }
        }
    }
}
