//! SSA values and their provenance.

use crate::ids::{OpId, TypeId, ValueId};
use serde::{Deserialize, Serialize};

/// Where a value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueDef {
    /// The result of an operation.
    Result(OpId),
    /// A module input port, by position.
    Input(u32),
}

/// A typed SSA value within a module.
///
/// Values are immutable once created; "deleting" a value means erasing
/// its defining operation after all uses have been redirected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueData {
    /// The unique ID of this value within its module.
    pub id: ValueId,
    /// The value's type.
    pub ty: TypeId,
    /// The defining operation or input port.
    pub def: ValueDef,
}
