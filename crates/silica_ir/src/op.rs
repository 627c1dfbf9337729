//! Operations — the nodes of the IR.
//!
//! Every op lives in exactly one block and produces at most one result
//! value. Signal declarations, probes, drives, and indexed sub-accesses
//! carry the event-driven semantics; the remaining kinds are ordinary
//! combinational SSA.

use crate::const_value::ConstValue;
use crate::ids::{BlockId, OpId, ValueId};
use crate::time::TimeValue;
use serde::{Deserialize, Serialize};
use silica_common::Ident;
use std::fmt;

/// A binary combinational operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Addition.
    Add,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Add => "add",
        };
        write!(f, "{name}")
    }
}

/// The kind of an operation, with its operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpKind {
    /// A compile-time constant.
    Const {
        /// The constant payload.
        value: ConstValue,
    },
    /// A compile-time-known time quantity.
    ConstTime {
        /// The delay components.
        value: TimeValue,
    },
    /// Array construction from element values.
    ArrayCreate {
        /// The elements, in index order.
        elements: Vec<ValueId>,
    },
    /// Element extraction from an array value. The index may be dynamic.
    ArrayGet {
        /// The array value.
        array: ValueId,
        /// The element index.
        index: ValueId,
    },
    /// A binary combinational operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left operand.
        lhs: ValueId,
        /// The right operand.
        rhs: ValueId,
    },
    /// A signal declaration: a mutable storage cell. Produces the
    /// signal's handle value.
    Signal {
        /// The declared name.
        name: Ident,
        /// The initial contents.
        init: ValueId,
    },
    /// A read of a signal's current contents.
    Probe {
        /// The signal handle being read.
        signal: ValueId,
    },
    /// A write assigning a value to a signal after a delay, optionally
    /// guarded by an enable condition.
    Drive {
        /// The target signal handle.
        signal: ValueId,
        /// The value to assign.
        value: ValueId,
        /// The delay before the assignment takes effect (a time value).
        delay: ValueId,
        /// An optional enable guard; the drive only fires when it is set.
        enable: Option<ValueId>,
    },
    /// Derives a handle to one element of an array-typed signal. The
    /// index may be dynamic.
    SignalElement {
        /// The array-typed signal handle.
        signal: ValueId,
        /// The element index.
        index: ValueId,
    },
    /// A value as observed after a non-zero constant delay.
    Delay {
        /// The wrapped value.
        value: ValueId,
        /// The delay components.
        delay: TimeValue,
    },
    /// The module's output terminator.
    Output {
        /// The values exposed at the module boundary.
        values: Vec<ValueId>,
    },
}

impl OpKind {
    /// Returns `true` if this kind produces a result value.
    pub fn has_result(&self) -> bool {
        !matches!(self, OpKind::Drive { .. } | OpKind::Output { .. })
    }

    /// Returns the operand values, one entry per occurrence.
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            OpKind::Const { .. } | OpKind::ConstTime { .. } => Vec::new(),
            OpKind::ArrayCreate { elements } => elements.clone(),
            OpKind::ArrayGet { array, index } => vec![*array, *index],
            OpKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            OpKind::Signal { init, .. } => vec![*init],
            OpKind::Probe { signal } => vec![*signal],
            OpKind::Drive {
                signal,
                value,
                delay,
                enable,
            } => {
                let mut ops = vec![*signal, *value, *delay];
                ops.extend(enable.iter().copied());
                ops
            }
            OpKind::SignalElement { signal, index } => vec![*signal, *index],
            OpKind::Delay { value, .. } => vec![*value],
            OpKind::Output { values } => values.clone(),
        }
    }

    /// Applies `f` to every operand slot, once per occurrence.
    pub(crate) fn for_each_operand_mut(&mut self, mut f: impl FnMut(&mut ValueId)) {
        match self {
            OpKind::Const { .. } | OpKind::ConstTime { .. } => {}
            OpKind::ArrayCreate { elements } => elements.iter_mut().for_each(&mut f),
            OpKind::ArrayGet { array, index } => {
                f(array);
                f(index);
            }
            OpKind::Binary { lhs, rhs, .. } => {
                f(lhs);
                f(rhs);
            }
            OpKind::Signal { init, .. } => f(init),
            OpKind::Probe { signal } => f(signal),
            OpKind::Drive {
                signal,
                value,
                delay,
                enable,
            } => {
                f(signal);
                f(value);
                f(delay);
                if let Some(en) = enable {
                    f(en);
                }
            }
            OpKind::SignalElement { signal, index } => {
                f(signal);
                f(index);
            }
            OpKind::Delay { value, .. } => f(value),
            OpKind::Output { values } => values.iter_mut().for_each(&mut f),
        }
    }
}

/// An operation within a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Op {
    /// The unique ID of this op within its module.
    pub id: OpId,
    /// The block this op is located in.
    pub block: BlockId,
    /// The result value, for kinds that produce one.
    pub result: Option<ValueId>,
    /// The kind and operands.
    pub kind: OpKind,
}
