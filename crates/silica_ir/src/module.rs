//! Hardware modules: blocks of ordered operations with typed values.
//!
//! The [`Module`] is both the IR container and the working structure for
//! passes. All mutation goes through its methods so the use table stays
//! consistent: inserting an op records its operand uses, erasing an op
//! forgets them, and [`Module::replace_all_uses`] rewrites operand slots
//! and moves the table entries in one step.
//!
//! Op storage is append-only; erased ops are removed from their block's
//! ordered list and tombstoned, keeping all IDs stable.

use crate::arena::Arena;
use crate::const_value::ConstValue;
use crate::ids::{BlockId, ModuleId, OpId, TypeId, ValueId};
use crate::op::{BinaryOp, Op, OpKind};
use crate::time::TimeValue;
use crate::types::{Type, TypeDb};
use crate::uses::UseTable;
use crate::value::{ValueData, ValueDef};
use serde::{Deserialize, Serialize};
use silica_common::{Ident, InternalError, Interner, SilicaResult};
use std::collections::{HashMap, HashSet};

/// A module input port. Each input defines one value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
    /// The port name.
    pub name: Ident,
    /// The port type.
    pub ty: TypeId,
    /// The value the port defines.
    pub value: ValueId,
}

/// A block: an ordered list of live operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// The unique ID of this block within its module.
    pub id: BlockId,
    ops: Vec<OpId>,
}

impl Block {
    /// The live operations in program order.
    pub fn ops(&self) -> &[OpId] {
        &self.ops
    }
}

/// A single hardware module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The unique ID of this module in the design.
    pub id: ModuleId,
    /// The module name.
    pub name: Ident,
    inputs: Vec<Input>,
    blocks: Arena<BlockId, Block>,
    body: BlockId,
    ops: Arena<OpId, Op>,
    values: Arena<ValueId, ValueData>,
    dead_ops: HashSet<OpId>,
    uses: UseTable,
    next_tmp: u32,
}

/// Insertion position for a new op.
#[derive(Clone, Copy)]
enum At {
    End(BlockId),
    Before(OpId),
}

impl Module {
    /// Creates an empty module with a body block.
    pub fn new(id: ModuleId, name: Ident) -> Self {
        let mut blocks = Arena::new();
        let body = blocks.alloc_with(|id| Block {
            id,
            ops: Vec::new(),
        });
        Self {
            id,
            name,
            inputs: Vec::new(),
            blocks,
            body,
            ops: Arena::new(),
            values: Arena::new(),
            dead_ops: HashSet::new(),
            uses: UseTable::new(),
            next_tmp: 0,
        }
    }

    /// The body block — the module's hardware region.
    pub fn body(&self) -> BlockId {
        self.body
    }

    /// The body block's live ops in program order.
    pub fn body_ops(&self) -> &[OpId] {
        self.blocks[self.body].ops()
    }

    /// The module's input ports.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Returns a reference to an op.
    pub fn op(&self, id: OpId) -> &Op {
        &self.ops[id]
    }

    /// Returns a reference to a value.
    pub fn value(&self, id: ValueId) -> &ValueData {
        &self.values[id]
    }

    /// Returns a reference to a block.
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id]
    }

    /// Returns an op's result value, for kinds that produce one.
    pub fn op_result(&self, id: OpId) -> Option<ValueId> {
        self.ops[id].result
    }

    /// The ops consuming `value`, one entry per operand occurrence.
    pub fn users(&self, value: ValueId) -> &[OpId] {
        self.uses.users(value)
    }

    /// Returns `true` if the op has been erased.
    pub fn is_dead(&self, id: OpId) -> bool {
        self.dead_ops.contains(&id)
    }

    /// The number of live (non-erased) ops.
    pub fn live_op_count(&self) -> usize {
        self.ops.len() - self.dead_ops.len()
    }

    /// The live signal declarations in the body block, in program order.
    pub fn signal_ops(&self) -> Vec<OpId> {
        self.body_ops()
            .iter()
            .copied()
            .filter(|&id| matches!(self.ops[id].kind, OpKind::Signal { .. }))
            .collect()
    }

    /// Declares an input port and returns its value.
    pub fn add_input(&mut self, name: Ident, ty: TypeId) -> ValueId {
        let index = self.inputs.len() as u32;
        let value = self.values.alloc_with(|id| ValueData {
            id,
            ty,
            def: ValueDef::Input(index),
        });
        self.inputs.push(Input { name, ty, value });
        value
    }

    /// Adds a new, empty block.
    pub fn add_block(&mut self) -> BlockId {
        self.blocks.alloc_with(|id| Block {
            id,
            ops: Vec::new(),
        })
    }

    /// Generates a fresh name for a pass-synthesized entity.
    pub fn fresh_name(&mut self, interner: &Interner, base: &str) -> Ident {
        let name = format!("_promote_{base}_{}", self.next_tmp);
        self.next_tmp += 1;
        interner.intern(&name)
    }

    /// Appends an op of arbitrary kind to the given block.
    ///
    /// The typed builders below are preferred; this is the escape hatch
    /// for placing ops in blocks other than the body.
    pub fn append_in(&mut self, block: BlockId, kind: OpKind, types: &mut TypeDb) -> OpId {
        self.insert_op(At::End(block), kind, types)
    }

    /// Appends a constant to the body and returns its value.
    pub fn add_const(&mut self, value: ConstValue, types: &mut TypeDb) -> ValueId {
        self.insert_value_op(At::End(self.body), OpKind::Const { value }, types)
    }

    /// Appends a constant time to the body and returns its value.
    pub fn add_const_time(&mut self, value: TimeValue, types: &mut TypeDb) -> ValueId {
        self.insert_value_op(At::End(self.body), OpKind::ConstTime { value }, types)
    }

    /// Appends an array construction to the body and returns its value.
    pub fn add_array(&mut self, elements: Vec<ValueId>, types: &mut TypeDb) -> ValueId {
        self.insert_value_op(At::End(self.body), OpKind::ArrayCreate { elements }, types)
    }

    /// Appends an element extraction to the body and returns its value.
    pub fn add_array_get(&mut self, array: ValueId, index: ValueId, types: &mut TypeDb) -> ValueId {
        self.insert_value_op(At::End(self.body), OpKind::ArrayGet { array, index }, types)
    }

    /// Appends a binary op to the body and returns its value.
    pub fn add_binary(
        &mut self,
        op: BinaryOp,
        lhs: ValueId,
        rhs: ValueId,
        types: &mut TypeDb,
    ) -> ValueId {
        self.insert_value_op(At::End(self.body), OpKind::Binary { op, lhs, rhs }, types)
    }

    /// Appends a signal declaration to the body. Returns the declaration
    /// op and the signal's handle value.
    pub fn add_signal(
        &mut self,
        name: Ident,
        init: ValueId,
        types: &mut TypeDb,
    ) -> (OpId, ValueId) {
        let op = self.insert_op(At::End(self.body), OpKind::Signal { name, init }, types);
        let handle = self.expect_result(op);
        (op, handle)
    }

    /// Appends a probe of `signal` to the body and returns the read value.
    pub fn add_probe(&mut self, signal: ValueId, types: &mut TypeDb) -> ValueId {
        self.insert_value_op(At::End(self.body), OpKind::Probe { signal }, types)
    }

    /// Appends a drive of `signal` to the body.
    pub fn add_drive(
        &mut self,
        signal: ValueId,
        value: ValueId,
        delay: ValueId,
        enable: Option<ValueId>,
        types: &mut TypeDb,
    ) -> OpId {
        self.insert_op(
            At::End(self.body),
            OpKind::Drive {
                signal,
                value,
                delay,
                enable,
            },
            types,
        )
    }

    /// Appends an indexed sub-access of an array-typed signal to the body
    /// and returns the derived element handle.
    pub fn add_element_access(
        &mut self,
        signal: ValueId,
        index: ValueId,
        types: &mut TypeDb,
    ) -> ValueId {
        self.insert_value_op(
            At::End(self.body),
            OpKind::SignalElement { signal, index },
            types,
        )
    }

    /// Appends the output terminator to the body.
    pub fn add_output(&mut self, values: Vec<ValueId>, types: &mut TypeDb) -> OpId {
        self.insert_op(At::End(self.body), OpKind::Output { values }, types)
    }

    /// Inserts a delay wrapper immediately before `before` and returns
    /// the wrapped value.
    pub fn insert_delay_before(
        &mut self,
        before: OpId,
        value: ValueId,
        delay: TimeValue,
        types: &mut TypeDb,
    ) -> ValueId {
        self.insert_value_op(At::Before(before), OpKind::Delay { value, delay }, types)
    }

    /// Inserts an element extraction immediately before `before` and
    /// returns the extracted value.
    pub fn insert_array_get_before(
        &mut self,
        before: OpId,
        array: ValueId,
        index: ValueId,
        types: &mut TypeDb,
    ) -> ValueId {
        self.insert_value_op(At::Before(before), OpKind::ArrayGet { array, index }, types)
    }

    /// Inserts a signal declaration immediately before `before`. Returns
    /// the declaration op and the signal's handle value.
    pub fn insert_signal_before(
        &mut self,
        before: OpId,
        name: Ident,
        init: ValueId,
        types: &mut TypeDb,
    ) -> (OpId, ValueId) {
        let op = self.insert_op(At::Before(before), OpKind::Signal { name, init }, types);
        let handle = self.expect_result(op);
        (op, handle)
    }

    /// Redirects every use of `old` to `new`, rewriting operand slots and
    /// moving the use-table entries.
    pub fn replace_all_uses(&mut self, old: ValueId, new: ValueId) {
        let users = self.uses.take_users(old);
        for &user in &users {
            self.ops.get_mut(user).kind.for_each_operand_mut(|slot| {
                if *slot == old {
                    *slot = new;
                }
            });
        }
        self.uses.extend(new, users);
    }

    /// Erases an op: forgets its operand uses, removes it from its
    /// block's ordered list, and tombstones it.
    ///
    /// The op's result (if any) must have no remaining users; redirect
    /// them with [`Module::replace_all_uses`] first.
    pub fn erase_op(&mut self, id: OpId) {
        debug_assert!(!self.is_dead(id), "op erased twice");
        if let Some(result) = self.ops[id].result {
            debug_assert!(
                self.uses.is_unused(result),
                "erasing an op whose result still has users"
            );
        }
        for value in self.ops[id].kind.operands() {
            self.uses.forget(value, id);
        }
        let block = self.ops[id].block;
        self.blocks.get_mut(block).ops.retain(|&o| o != id);
        self.dead_ops.insert(id);
    }

    /// Checks structural consistency: block lists contain exactly the
    /// live ops, operands refer to live definitions, and the use table
    /// matches the live operand occurrences.
    pub fn verify(&self) -> SilicaResult<()> {
        let mut listed: HashSet<OpId> = HashSet::new();
        for (block_id, block) in self.blocks.iter() {
            for &op_id in block.ops() {
                if self.dead_ops.contains(&op_id) {
                    return Err(InternalError::new(format!(
                        "erased op {} still listed in its block",
                        op_id.as_raw()
                    )));
                }
                if !listed.insert(op_id) {
                    return Err(InternalError::new(format!(
                        "op {} listed more than once",
                        op_id.as_raw()
                    )));
                }
                if self.ops[op_id].block != block_id {
                    return Err(InternalError::new(format!(
                        "op {} listed in a block it does not name",
                        op_id.as_raw()
                    )));
                }
            }
        }

        let mut rebuilt: HashMap<ValueId, Vec<OpId>> = HashMap::new();
        for (op_id, op) in self.ops.iter() {
            if self.dead_ops.contains(&op_id) {
                continue;
            }
            if !listed.contains(&op_id) {
                return Err(InternalError::new(format!(
                    "live op {} not listed in any block",
                    op_id.as_raw()
                )));
            }
            for value in op.kind.operands() {
                if let ValueDef::Result(def_op) = self.values[value].def {
                    if self.dead_ops.contains(&def_op) {
                        return Err(InternalError::new(format!(
                            "op {} uses a value defined by erased op {}",
                            op_id.as_raw(),
                            def_op.as_raw()
                        )));
                    }
                }
                rebuilt.entry(value).or_default().push(op_id);
            }
            if let Some(result) = op.result {
                if self.values[result].def != ValueDef::Result(op_id) {
                    return Err(InternalError::new(format!(
                        "result of op {} does not point back to it",
                        op_id.as_raw()
                    )));
                }
            }
        }

        let rebuilt_total: usize = rebuilt.values().map(Vec::len).sum();
        if rebuilt_total != self.uses.entry_count() {
            return Err(InternalError::new("use table entry count out of sync"));
        }
        for (value, mut expected) in rebuilt {
            let mut stored = self.uses.users(value).to_vec();
            expected.sort_by_key(|op| op.as_raw());
            stored.sort_by_key(|op| op.as_raw());
            if expected != stored {
                return Err(InternalError::new(format!(
                    "use table out of sync for value {}",
                    value.as_raw()
                )));
            }
        }
        Ok(())
    }

    fn expect_result(&self, op: OpId) -> ValueId {
        match self.ops[op].result {
            Some(value) => value,
            None => unreachable!("value-producing op allocated without a result"),
        }
    }

    fn insert_value_op(&mut self, at: At, kind: OpKind, types: &mut TypeDb) -> ValueId {
        let op = self.insert_op(at, kind, types);
        self.expect_result(op)
    }

    fn insert_op(&mut self, at: At, kind: OpKind, types: &mut TypeDb) -> OpId {
        let block = match at {
            At::End(block) => block,
            At::Before(op) => self.ops[op].block,
        };
        let ty = result_type(&self.values, &kind, types);
        let operands = kind.operands();
        let op_id = self.ops.alloc_with(|id| Op {
            id,
            block,
            result: None,
            kind,
        });
        if let Some(ty) = ty {
            let value = self.values.alloc_with(|id| ValueData {
                id,
                ty,
                def: ValueDef::Result(op_id),
            });
            self.ops.get_mut(op_id).result = Some(value);
        }
        for value in operands {
            self.uses.record(value, op_id);
        }
        let list = &mut self.blocks.get_mut(block).ops;
        match at {
            At::End(_) => list.push(op_id),
            At::Before(before) => {
                let pos = list.iter().position(|&o| o == before);
                debug_assert!(pos.is_some(), "insertion point not in its block");
                let pos = pos.unwrap_or(list.len());
                list.insert(pos, op_id);
            }
        }
        op_id
    }
}

/// Computes the result type of an op kind, or `None` for kinds without a
/// result. Ill-typed operands resolve to [`Type::Error`].
fn result_type(
    values: &Arena<ValueId, ValueData>,
    kind: &OpKind,
    types: &mut TypeDb,
) -> Option<TypeId> {
    match kind {
        OpKind::Const { value } => Some(const_type(value, types)),
        OpKind::ConstTime { .. } => Some(types.intern(Type::Time)),
        OpKind::ArrayCreate { elements } => Some(match elements.first() {
            Some(&first) => {
                let element = values[first].ty;
                types.intern(Type::Array {
                    element,
                    size: elements.len() as u32,
                })
            }
            None => types.intern(Type::Error),
        }),
        OpKind::ArrayGet { array, .. } => {
            let element = types.element_type(values[*array].ty);
            Some(element.unwrap_or_else(|| types.intern(Type::Error)))
        }
        OpKind::Binary { lhs, .. } => Some(values[*lhs].ty),
        OpKind::Signal { init, .. } => {
            let element = values[*init].ty;
            Some(types.intern(Type::Signal { element }))
        }
        OpKind::Probe { signal } => {
            let element = types.signal_element(values[*signal].ty);
            Some(element.unwrap_or_else(|| types.intern(Type::Error)))
        }
        OpKind::SignalElement { signal, .. } => {
            let element = types
                .signal_element(values[*signal].ty)
                .and_then(|contents| types.element_type(contents));
            Some(match element {
                Some(element) => types.intern(Type::Signal { element }),
                None => types.intern(Type::Error),
            })
        }
        OpKind::Delay { value, .. } => Some(values[*value].ty),
        OpKind::Drive { .. } | OpKind::Output { .. } => None,
    }
}

/// Computes the type of a constant payload.
fn const_type(value: &ConstValue, types: &mut TypeDb) -> TypeId {
    match value {
        ConstValue::Int(_) => types.intern(Type::Int),
        ConstValue::Bits { width: 1, .. } => types.intern(Type::Bit),
        ConstValue::Bits { width, .. } => types.intern(Type::BitVec { width: *width }),
        ConstValue::Array(elements) => match elements.first() {
            Some(first) => {
                let element = const_type(first, types);
                types.intern(Type::Array {
                    element,
                    size: elements.len() as u32,
                })
            }
            None => types.intern(Type::Error),
        },
    }
}
