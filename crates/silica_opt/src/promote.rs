//! Promotion of simple signals to SSA values.
//!
//! A signal qualifies when every user of its handle sits in the declaring
//! block and is one of: a probe, a single unconditional drive, or a
//! single indexed sub-access. The signal's contents are then a single
//! value — the driven value (delay-wrapped when the drive is not
//! immediate) or, for undriven signals, the initializer — and every
//! probe is rewired to it before the storage cell is erased.
//!
//! An indexed sub-access is not promoted through directly. It is split:
//! the indexed element is extracted from the resolved value and stored
//! into a fresh, narrower signal, which a later sweep can promote with
//! the same uniform rules.

use crate::pass::OptPass;
use crate::trace::TraceSink;
use silica_common::{Ident, Interner};
use silica_ir::{Module, OpId, OpKind, Printer, TypeDb, ValueDef, ValueId};

/// The signal-to-SSA promotion pass.
pub struct PromotePass;

/// Why a signal was left untouched.
///
/// Every variant is handled identically: the driver skips the signal and
/// moves on. Nothing here ever escalates to a pipeline failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    /// A user of the handle sits outside the declaring block.
    #[error("a user is located outside the declaring block")]
    UserOutsideBlock,
    /// More than one drive targets the signal.
    #[error("multiple drives target the signal")]
    MultipleDrives,
    /// The sole drive carries an enable guard.
    #[error("the drive is guarded by an enable condition")]
    ConditionalDrive,
    /// The handle is consumed by an op this pass cannot reason about.
    #[error("a user kind is not supported")]
    UnsupportedUser,
    /// The drive's delay operand is not a constant-time op.
    #[error("the drive delay is not a compile-time constant")]
    NonConstantDelay,
    /// More than one indexed sub-access derives from the signal.
    #[error("the signal has multiple indexed sub-accesses")]
    MultipleElementAccesses,
}

/// The sole drive of a signal, with its payload operands.
#[derive(Clone, Copy)]
struct DriveInfo {
    op: OpId,
    value: ValueId,
    delay: ValueId,
}

/// The sole indexed sub-access of a signal.
#[derive(Clone, Copy)]
struct ElementAccess {
    op: OpId,
    index: ValueId,
    result: ValueId,
}

/// Classification of all users of one signal handle.
#[derive(Default)]
struct SignalUses {
    probes: Vec<OpId>,
    drive: Option<DriveInfo>,
    element_access: Option<ElementAccess>,
}

/// Sorts every user of `handle` into the supported categories, or
/// reports why the signal cannot be promoted. Pure inspection.
fn classify(module: &Module, sig_op: OpId, handle: ValueId) -> Result<SignalUses, SkipReason> {
    let decl_block = module.op(sig_op).block;
    let mut uses = SignalUses::default();

    for &user in module.users(handle) {
        let op = module.op(user);
        if op.block != decl_block {
            return Err(SkipReason::UserOutsideBlock);
        }
        match &op.kind {
            OpKind::Probe { .. } => uses.probes.push(user),
            OpKind::Drive {
                signal,
                value,
                delay,
                enable,
            } if *signal == handle => {
                if uses.drive.is_some() {
                    return Err(SkipReason::MultipleDrives);
                }
                if enable.is_some() {
                    return Err(SkipReason::ConditionalDrive);
                }
                uses.drive = Some(DriveInfo {
                    op: user,
                    value: *value,
                    delay: *delay,
                });
            }
            OpKind::SignalElement { signal, index } if *signal == handle => {
                if uses.element_access.is_some() {
                    return Err(SkipReason::MultipleElementAccesses);
                }
                let result = match module.op_result(user) {
                    Some(result) => result,
                    None => return Err(SkipReason::UnsupportedUser),
                };
                uses.element_access = Some(ElementAccess {
                    op: user,
                    index: *index,
                    result,
                });
            }
            _ => return Err(SkipReason::UnsupportedUser),
        }
    }
    Ok(uses)
}

/// Produces the single value that replaces the signal's contents.
///
/// A driven signal resolves to the driven value, wrapped in a delay op
/// when the drive is not immediate; the wrapper is inserted right before
/// the drive so dependency order in the block stays valid. An undriven
/// signal resolves to its initializer. Fails before any insertion, so a
/// rejected signal is never partially transformed.
fn build_replacement(
    module: &mut Module,
    types: &mut TypeDb,
    init: ValueId,
    uses: &SignalUses,
) -> Result<ValueId, SkipReason> {
    let Some(drive) = uses.drive else {
        return Ok(init);
    };

    let time = match module.value(drive.delay).def {
        ValueDef::Result(op) => match &module.op(op).kind {
            OpKind::ConstTime { value } => *value,
            _ => return Err(SkipReason::NonConstantDelay),
        },
        ValueDef::Input(_) => return Err(SkipReason::NonConstantDelay),
    };

    if time.is_zero() {
        Ok(drive.value)
    } else {
        Ok(module.insert_delay_before(drive.op, drive.value, time, types))
    }
}

/// Splits an indexed sub-access off into its own signal.
///
/// The indexed element is extracted from the resolved value — the index
/// is kept verbatim, dynamic or not — and stored in a fresh narrower
/// signal. Users of the old sub-access handle are redirected to the new
/// signal, which a later sweep can promote on its own.
fn split_element_access(
    module: &mut Module,
    types: &mut TypeDb,
    interner: &Interner,
    sig_name: Ident,
    access: ElementAccess,
    replacement: ValueId,
) {
    let element = module.insert_array_get_before(access.op, replacement, access.index, types);
    let name = module.fresh_name(interner, interner.resolve(sig_name));
    let (_, sub_handle) = module.insert_signal_before(access.op, name, element, types);
    module.replace_all_uses(access.result, sub_handle);
    module.erase_op(access.op);
}

/// Rewires all probes to the replacement value, then erases them and the
/// drive. Reads are always rewired before the drive goes away.
fn rewire_and_erase(module: &mut Module, uses: &SignalUses, replacement: ValueId) {
    for &probe in &uses.probes {
        if let Some(result) = module.op_result(probe) {
            module.replace_all_uses(result, replacement);
        }
        module.erase_op(probe);
    }
    if let Some(drive) = uses.drive {
        module.erase_op(drive.op);
    }
}

/// Attempts to promote one signal. On success every probe, the drive,
/// and any sub-access are gone and the returned value stands in for the
/// signal's contents; erasing the declaration itself is the caller's
/// job. On failure the module is untouched.
fn promote(
    module: &mut Module,
    types: &mut TypeDb,
    interner: &Interner,
    sig_op: OpId,
    sig_name: Ident,
    handle: ValueId,
    init: ValueId,
) -> Result<ValueId, SkipReason> {
    let uses = classify(module, sig_op, handle)?;
    let replacement = build_replacement(module, types, init, &uses)?;
    if let Some(access) = uses.element_access {
        split_element_access(module, types, interner, sig_name, access, replacement);
    }
    rewire_and_erase(module, &uses, replacement);
    Ok(replacement)
}

impl OptPass for PromotePass {
    fn run(
        &self,
        module: &mut Module,
        types: &mut TypeDb,
        interner: &Interner,
        trace: &TraceSink,
    ) -> bool {
        let mut changed = false;

        // Snapshot the declarations up front: erasing the current one
        // must not disturb the not-yet-visited entries, and sub-signals
        // created by splitting are left for the next sweep.
        for sig_op in module.signal_ops() {
            let (name, init) = match &module.op(sig_op).kind {
                OpKind::Signal { name, init } => (*name, *init),
                _ => continue,
            };
            let Some(handle) = module.op_result(sig_op) else {
                continue;
            };

            match promote(module, types, interner, sig_op, name, handle, init) {
                Ok(replacement) => {
                    module.erase_op(sig_op);
                    changed = true;
                    if trace.is_enabled() {
                        let printer = Printer::new(module, interner);
                        trace.emit(format!(
                            "promoted signal '{}' to {}",
                            interner.resolve(name),
                            printer.value(replacement)
                        ));
                    }
                }
                Err(reason) => {
                    trace.emit(format!(
                        "skipped signal '{}': {reason}",
                        interner.resolve(name)
                    ));
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_ir::{ConstValue, ModuleId, TimeValue, Type};

    fn setup() -> (Interner, TypeDb, Module) {
        let interner = Interner::new();
        let name = interner.intern("dut");
        let module = Module::new(ModuleId::from_raw(0), name);
        (interner, TypeDb::new(), module)
    }

    fn run_pass(module: &mut Module, types: &mut TypeDb, interner: &Interner) -> (bool, TraceSink) {
        let trace = TraceSink::new();
        let changed = PromotePass.run(module, types, interner, &trace);
        (changed, trace)
    }

    fn def_op(module: &Module, value: ValueId) -> OpId {
        match module.value(value).def {
            ValueDef::Result(op) => op,
            ValueDef::Input(_) => panic!("expected an op result"),
        }
    }

    /// Builds `q = signal(0); drive q, d after t; r_i = probe q` with the
    /// given number of probes, all feeding one output.
    fn driven_signal(
        module: &mut Module,
        types: &mut TypeDb,
        interner: &Interner,
        delay: TimeValue,
        probes: usize,
    ) -> (ValueId, OpId) {
        let bit = types.intern(Type::Bit);
        let d = module.add_input(interner.intern("d"), bit);
        let init = module.add_const(ConstValue::Bits { width: 1, value: 0 }, types);
        let (_, handle) = module.add_signal(interner.intern("q"), init, types);
        let t = module.add_const_time(delay, types);
        module.add_drive(handle, d, t, None, types);
        let reads: Vec<ValueId> = (0..probes).map(|_| module.add_probe(handle, types)).collect();
        let out = module.add_output(reads, types);
        (d, out)
    }

    #[test]
    fn immediate_drive_single_read() {
        let (interner, mut types, mut module) = setup();
        let (d, out) = driven_signal(&mut module, &mut types, &interner, TimeValue::ZERO, 1);

        let (changed, _) = run_pass(&mut module, &mut types, &interner);
        assert!(changed);
        assert_eq!(module.op(out).kind.operands(), vec![d]);
        assert!(module.signal_ops().is_empty());
        // Remaining: init const, const time, output.
        assert_eq!(module.live_op_count(), 3);
        assert!(module.verify().is_ok());
    }

    #[test]
    fn immediate_drive_many_reads() {
        let (interner, mut types, mut module) = setup();
        let (d, out) = driven_signal(&mut module, &mut types, &interner, TimeValue::ZERO, 5);

        let (changed, _) = run_pass(&mut module, &mut types, &interner);
        assert!(changed);
        assert_eq!(module.op(out).kind.operands(), vec![d; 5]);
        assert!(module.verify().is_ok());
    }

    #[test]
    fn immediate_drive_no_reads() {
        let (interner, mut types, mut module) = setup();
        driven_signal(&mut module, &mut types, &interner, TimeValue::ZERO, 0);

        let (changed, _) = run_pass(&mut module, &mut types, &interner);
        assert!(changed);
        assert!(module.signal_ops().is_empty());
        // Remaining: init const, const time, empty output.
        assert_eq!(module.live_op_count(), 3);
        assert!(module.verify().is_ok());
    }

    #[test]
    fn nonzero_delay_is_wrapped_not_dropped() {
        let (interner, mut types, mut module) = setup();
        let delay = TimeValue::from_ns(1);
        let (d, out) = driven_signal(&mut module, &mut types, &interner, delay, 2);

        let (changed, _) = run_pass(&mut module, &mut types, &interner);
        assert!(changed);

        let operands = module.op(out).kind.operands();
        assert_eq!(operands.len(), 2);
        assert_eq!(operands[0], operands[1]);
        let wrapper = def_op(&module, operands[0]);
        match &module.op(wrapper).kind {
            OpKind::Delay { value, delay: wrapped } => {
                assert_eq!(*value, d);
                assert_eq!(*wrapped, delay);
            }
            other => panic!("expected a delay wrapper, got {other:?}"),
        }
        assert!(module.verify().is_ok());
    }

    #[test]
    fn delta_delay_is_preserved_exactly() {
        let (interner, mut types, mut module) = setup();
        let delay = TimeValue::delta_step(1);
        let (_, out) = driven_signal(&mut module, &mut types, &interner, delay, 1);

        let (changed, _) = run_pass(&mut module, &mut types, &interner);
        assert!(changed);

        let wrapper = def_op(&module, module.op(out).kind.operands()[0]);
        match &module.op(wrapper).kind {
            OpKind::Delay { delay: wrapped, .. } => assert_eq!(*wrapped, delay),
            other => panic!("expected a delay wrapper, got {other:?}"),
        }
    }

    #[test]
    fn undriven_signal_reads_become_init() {
        let (interner, mut types, mut module) = setup();
        let init = module.add_const(ConstValue::Bits { width: 8, value: 0xff }, &mut types);
        let (_, handle) = module.add_signal(interner.intern("q"), init, &mut types);
        let read = module.add_probe(handle, &mut types);
        let out = module.add_output(vec![read], &mut types);

        let (changed, _) = run_pass(&mut module, &mut types, &interner);
        assert!(changed);
        assert_eq!(module.op(out).kind.operands(), vec![init]);
        assert!(module.signal_ops().is_empty());
        assert!(module.verify().is_ok());
    }

    #[test]
    fn conditional_drive_rejected() {
        let (interner, mut types, mut module) = setup();
        let bit = types.intern(Type::Bit);
        let en = module.add_input(interner.intern("en"), bit);
        let init = module.add_const(ConstValue::Bits { width: 1, value: 0 }, &mut types);
        let (_, handle) = module.add_signal(interner.intern("q"), init, &mut types);
        let t = module.add_const_time(TimeValue::ZERO, &mut types);
        module.add_drive(handle, init, t, Some(en), &mut types);

        let before = serde_json::to_string(&module).unwrap();
        let (changed, trace) = run_pass(&mut module, &mut types, &interner);
        assert!(!changed);
        assert_eq!(serde_json::to_string(&module).unwrap(), before);
        assert!(trace.lines()[0].contains("enable"));
    }

    #[test]
    fn multiple_drives_rejected() {
        let (interner, mut types, mut module) = setup();
        let init = module.add_const(ConstValue::Bits { width: 1, value: 0 }, &mut types);
        let one = module.add_const(ConstValue::Bits { width: 1, value: 1 }, &mut types);
        let (_, handle) = module.add_signal(interner.intern("q"), init, &mut types);
        let t = module.add_const_time(TimeValue::ZERO, &mut types);
        module.add_drive(handle, init, t, None, &mut types);
        module.add_drive(handle, one, t, None, &mut types);

        let before = serde_json::to_string(&module).unwrap();
        let (changed, trace) = run_pass(&mut module, &mut types, &interner);
        assert!(!changed);
        assert_eq!(serde_json::to_string(&module).unwrap(), before);
        assert!(trace.lines()[0].contains("multiple drives"));
    }

    #[test]
    fn cross_block_reader_rejected() {
        let (interner, mut types, mut module) = setup();
        let init = module.add_const(ConstValue::Bits { width: 1, value: 0 }, &mut types);
        let (_, handle) = module.add_signal(interner.intern("q"), init, &mut types);
        let elsewhere = module.add_block();
        module.append_in(elsewhere, OpKind::Probe { signal: handle }, &mut types);

        let before = serde_json::to_string(&module).unwrap();
        let (changed, _) = run_pass(&mut module, &mut types, &interner);
        assert!(!changed);
        assert_eq!(serde_json::to_string(&module).unwrap(), before);
    }

    #[test]
    fn unsupported_user_rejected() {
        let (interner, mut types, mut module) = setup();
        let init = module.add_const(ConstValue::Bits { width: 1, value: 0 }, &mut types);
        let (_, handle) = module.add_signal(interner.intern("q"), init, &mut types);
        // The handle escapes through the output: not a probe/drive/sub-access.
        module.add_output(vec![handle], &mut types);

        let (changed, trace) = run_pass(&mut module, &mut types, &interner);
        assert!(!changed);
        assert!(trace.lines()[0].contains("not supported"));
    }

    #[test]
    fn non_constant_delay_rejected() {
        let (interner, mut types, mut module) = setup();
        let time_ty = types.intern(Type::Time);
        let t = module.add_input(interner.intern("t"), time_ty);
        let init = module.add_const(ConstValue::Bits { width: 1, value: 0 }, &mut types);
        let (_, handle) = module.add_signal(interner.intern("q"), init, &mut types);
        module.add_drive(handle, init, t, None, &mut types);
        module.add_probe(handle, &mut types);

        let before = serde_json::to_string(&module).unwrap();
        let (changed, trace) = run_pass(&mut module, &mut types, &interner);
        assert!(!changed);
        assert_eq!(serde_json::to_string(&module).unwrap(), before);
        assert!(trace.lines()[0].contains("compile-time constant"));
    }

    #[test]
    fn multiple_element_accesses_rejected() {
        let (interner, mut types, mut module) = setup();
        let e0 = module.add_const(ConstValue::Bits { width: 8, value: 1 }, &mut types);
        let e1 = module.add_const(ConstValue::Bits { width: 8, value: 2 }, &mut types);
        let arr = module.add_array(vec![e0, e1], &mut types);
        let (_, handle) = module.add_signal(interner.intern("mem"), arr, &mut types);
        let i0 = module.add_const(ConstValue::Int(0), &mut types);
        let i1 = module.add_const(ConstValue::Int(1), &mut types);
        module.add_element_access(handle, i0, &mut types);
        module.add_element_access(handle, i1, &mut types);

        let before = serde_json::to_string(&module).unwrap();
        let (changed, trace) = run_pass(&mut module, &mut types, &interner);
        assert!(!changed);
        assert_eq!(serde_json::to_string(&module).unwrap(), before);
        assert!(trace.lines()[0].contains("sub-accesses"));
    }

    #[test]
    fn array_access_splits_into_sub_signal() {
        let (interner, mut types, mut module) = setup();
        let e0 = module.add_const(ConstValue::Bits { width: 8, value: 1 }, &mut types);
        let e1 = module.add_const(ConstValue::Bits { width: 8, value: 2 }, &mut types);
        let arr = module.add_array(vec![e0, e1], &mut types);
        let (_, handle) = module.add_signal(interner.intern("mem"), arr, &mut types);
        let int_ty = types.intern(Type::Int);
        let idx = module.add_input(interner.intern("idx"), int_ty);
        let sub = module.add_element_access(handle, idx, &mut types);
        let read = module.add_probe(sub, &mut types);
        module.add_output(vec![read], &mut types);

        let (changed, _) = run_pass(&mut module, &mut types, &interner);
        assert!(changed);

        // Exactly one signal remains: the freshly split element cell.
        let remaining = module.signal_ops();
        assert_eq!(remaining.len(), 1);
        let (sub_name, sub_init) = match &module.op(remaining[0]).kind {
            OpKind::Signal { name, init } => (*name, *init),
            other => panic!("expected a signal declaration, got {other:?}"),
        };
        assert!(interner.resolve(sub_name).contains("mem"));

        // Its initializer extracts the dynamic index from the old
        // initializer, with the index preserved verbatim.
        match &module.op(def_op(&module, sub_init)).kind {
            OpKind::ArrayGet { array, index } => {
                assert_eq!(*array, arr);
                assert_eq!(*index, idx);
            }
            other => panic!("expected an element extraction, got {other:?}"),
        }

        // The probe now reads the new signal.
        let new_handle = module.op_result(remaining[0]);
        match &module.op(def_op(&module, read)).kind {
            OpKind::Probe { signal } => assert_eq!(Some(*signal), new_handle),
            other => panic!("expected a probe, got {other:?}"),
        }
        assert!(module.verify().is_ok());
    }

    #[test]
    fn second_sweep_promotes_split_signal() {
        let (interner, mut types, mut module) = setup();
        let e0 = module.add_const(ConstValue::Bits { width: 8, value: 1 }, &mut types);
        let e1 = module.add_const(ConstValue::Bits { width: 8, value: 2 }, &mut types);
        let arr = module.add_array(vec![e0, e1], &mut types);
        let (_, handle) = module.add_signal(interner.intern("mem"), arr, &mut types);
        let int_ty = types.intern(Type::Int);
        let idx = module.add_input(interner.intern("idx"), int_ty);
        let sub = module.add_element_access(handle, idx, &mut types);
        let read = module.add_probe(sub, &mut types);
        let out = module.add_output(vec![read], &mut types);

        assert!(run_pass(&mut module, &mut types, &interner).0);
        assert!(run_pass(&mut module, &mut types, &interner).0);

        // After two sweeps everything reads straight from the extraction.
        assert!(module.signal_ops().is_empty());
        let operand = module.op(out).kind.operands()[0];
        match &module.op(def_op(&module, operand)).kind {
            OpKind::ArrayGet { array, index } => {
                assert_eq!(*array, arr);
                assert_eq!(*index, idx);
            }
            other => panic!("expected an element extraction, got {other:?}"),
        }
        assert!(module.verify().is_ok());
        assert!(!run_pass(&mut module, &mut types, &interner).0);
    }

    #[test]
    fn rejection_is_idempotent() {
        let (interner, mut types, mut module) = setup();
        let bit = types.intern(Type::Bit);
        let en = module.add_input(interner.intern("en"), bit);
        let init = module.add_const(ConstValue::Bits { width: 1, value: 0 }, &mut types);
        let (_, handle) = module.add_signal(interner.intern("a"), init, &mut types);
        let t = module.add_const_time(TimeValue::ZERO, &mut types);
        module.add_drive(handle, init, t, Some(en), &mut types);
        let (_, other) = module.add_signal(interner.intern("b"), init, &mut types);
        module.add_drive(other, init, t, None, &mut types);
        module.add_drive(other, init, t, None, &mut types);

        assert!(!run_pass(&mut module, &mut types, &interner).0);
        let after_first = serde_json::to_string(&module).unwrap();
        assert!(!run_pass(&mut module, &mut types, &interner).0);
        assert_eq!(serde_json::to_string(&module).unwrap(), after_first);
    }

    #[test]
    fn mixed_module_promotes_only_eligible() {
        let (interner, mut types, mut module) = setup();
        let bit = types.intern(Type::Bit);
        let en = module.add_input(interner.intern("en"), bit);
        let init = module.add_const(ConstValue::Bits { width: 1, value: 0 }, &mut types);
        let t = module.add_const_time(TimeValue::ZERO, &mut types);

        let (_, good) = module.add_signal(interner.intern("good"), init, &mut types);
        module.add_drive(good, init, t, None, &mut types);
        let good_read = module.add_probe(good, &mut types);

        let (bad_op, bad) = module.add_signal(interner.intern("bad"), init, &mut types);
        module.add_drive(bad, init, t, Some(en), &mut types);
        let bad_read = module.add_probe(bad, &mut types);

        module.add_output(vec![good_read, bad_read], &mut types);

        let (changed, trace) = run_pass(&mut module, &mut types, &interner);
        assert!(changed);

        // The guarded signal still stands, probe intact.
        assert_eq!(module.signal_ops(), vec![bad_op]);
        match &module.op(def_op(&module, bad_read)).kind {
            OpKind::Probe { signal } => assert_eq!(*signal, bad),
            other => panic!("expected a probe, got {other:?}"),
        }

        let lines = trace.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("promoted signal 'good'"));
        assert!(lines[1].starts_with("skipped signal 'bad'"));
        assert!(module.verify().is_ok());
    }

    #[test]
    fn disabled_trace_stays_silent() {
        let (interner, mut types, mut module) = setup();
        driven_signal(&mut module, &mut types, &interner, TimeValue::ZERO, 1);

        let trace = TraceSink::disabled();
        assert!(PromotePass.run(&mut module, &mut types, &interner, &trace));
        assert!(trace.lines().is_empty());
    }

    #[test]
    fn success_trace_names_replacement() {
        let (interner, mut types, mut module) = setup();
        driven_signal(&mut module, &mut types, &interner, TimeValue::from_ns(1), 1);

        let (_, trace) = run_pass(&mut module, &mut types, &interner);
        let lines = trace.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("promoted signal 'q'"));
        assert!(lines[0].contains("delay"));
        assert!(lines[0].contains("1 ns"));
    }

    #[test]
    fn empty_module_unchanged() {
        let (interner, mut types, mut module) = setup();
        let (changed, trace) = run_pass(&mut module, &mut types, &interner);
        assert!(!changed);
        assert!(trace.lines().is_empty());
    }
}
