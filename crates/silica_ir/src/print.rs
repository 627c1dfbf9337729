//! Compact human-readable rendering of ops and values.
//!
//! Used by diagnostic trace channels; the output is informational and is
//! not a parseable serialization of the IR.

use crate::ids::{OpId, ValueId};
use crate::module::Module;
use crate::op::OpKind;
use crate::value::ValueDef;
use silica_common::Interner;

/// Renders ops and values of one module.
pub struct Printer<'a> {
    module: &'a Module,
    interner: &'a Interner,
}

impl<'a> Printer<'a> {
    /// Creates a printer over the given module.
    pub fn new(module: &'a Module, interner: &'a Interner) -> Self {
        Self { module, interner }
    }

    /// Renders a value: input ports by name, op results as the defining
    /// operation (`%4 = delay %2, 1 ns`).
    pub fn value(&self, value: ValueId) -> String {
        match self.module.value(value).def {
            ValueDef::Input(_) => self.value_ref(value),
            ValueDef::Result(op) => self.op(op),
        }
    }

    /// Renders one operation with its result and operands.
    pub fn op(&self, op: OpId) -> String {
        let op = self.module.op(op);
        let body = match &op.kind {
            OpKind::Const { value } => format!("const {value}"),
            OpKind::ConstTime { value } => format!("time {value}"),
            OpKind::ArrayCreate { elements } => {
                format!("array [{}]", self.refs(elements))
            }
            OpKind::ArrayGet { array, index } => {
                format!("array_get {}, {}", self.value_ref(*array), self.value_ref(*index))
            }
            OpKind::Binary { op, lhs, rhs } => {
                format!("{op} {}, {}", self.value_ref(*lhs), self.value_ref(*rhs))
            }
            OpKind::Signal { name, init } => {
                format!(
                    "signal \"{}\", {}",
                    self.interner.resolve(*name),
                    self.value_ref(*init)
                )
            }
            OpKind::Probe { signal } => format!("probe {}", self.value_ref(*signal)),
            OpKind::Drive {
                signal,
                value,
                delay,
                enable,
            } => {
                let mut s = format!(
                    "drive {}, {} after {}",
                    self.value_ref(*signal),
                    self.value_ref(*value),
                    self.value_ref(*delay)
                );
                if let Some(enable) = enable {
                    s.push_str(&format!(" if {}", self.value_ref(*enable)));
                }
                s
            }
            OpKind::SignalElement { signal, index } => {
                format!(
                    "signal_element {}, {}",
                    self.value_ref(*signal),
                    self.value_ref(*index)
                )
            }
            OpKind::Delay { value, delay } => {
                format!("delay {}, {delay}", self.value_ref(*value))
            }
            OpKind::Output { values } => format!("output {}", self.refs(values)),
        };
        match op.result {
            Some(result) => format!("{} = {body}", self.value_ref(result)),
            None => body,
        }
    }

    /// Renders a short reference to a value (`%3`, or `%clk` for inputs).
    pub fn value_ref(&self, value: ValueId) -> String {
        match self.module.value(value).def {
            ValueDef::Input(index) => {
                let name = self.module.inputs()[index as usize].name;
                format!("%{}", self.interner.resolve(name))
            }
            ValueDef::Result(_) => format!("%{}", value.as_raw()),
        }
    }

    fn refs(&self, values: &[ValueId]) -> String {
        values
            .iter()
            .map(|&v| self.value_ref(v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
