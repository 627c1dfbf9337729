//! SilicaIR — the operation-based intermediate representation of the
//! Silica HDL midend.
//!
//! A [`Design`] holds hardware [`Module`]s and a shared [`TypeDb`]. Each
//! module contains blocks of ordered operations ([`Op`]) producing typed
//! values ([`ValueData`]), with use tracking maintained by the module on
//! every mutation. Signals, probes, drives, and delay wrappers model
//! event-driven hardware semantics; everything else is plain SSA.

#![warn(missing_docs)]

pub mod arena;
pub mod const_value;
pub mod design;
pub mod ids;
pub mod module;
pub mod op;
pub mod print;
pub mod time;
pub mod types;
pub mod uses;
pub mod value;

pub use arena::{Arena, ArenaId};
pub use const_value::ConstValue;
pub use design::Design;
pub use ids::{BlockId, ModuleId, OpId, TypeId, ValueId};
pub use module::{Block, Input, Module};
pub use op::{BinaryOp, Op, OpKind};
pub use print::Printer;
pub use time::TimeValue;
pub use types::{Type, TypeDb};
pub use uses::UseTable;
pub use value::{ValueData, ValueDef};
