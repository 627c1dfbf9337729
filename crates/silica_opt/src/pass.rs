//! Optimization pass trait and runner.

use crate::trace::TraceSink;
use silica_common::Interner;
use silica_ir::{Design, Module, TypeDb};

/// Trait for a single IR optimization pass.
///
/// Each pass inspects and mutates one module at a time, returning `true`
/// if it changed anything (which may expose further opportunities to a
/// later pass or a later sweep of the same pass).
pub trait OptPass {
    /// Runs the pass on one module, returning `true` if it made changes.
    fn run(
        &self,
        module: &mut Module,
        types: &mut TypeDb,
        interner: &Interner,
        trace: &TraceSink,
    ) -> bool;
}

/// Runs all midend passes over every module of the design, in the
/// standard order.
///
/// Signal promotion leaves split-off sub-signals behind for a later
/// sweep, so callers that want a fixpoint invoke this repeatedly until
/// it returns `false`.
pub fn run_passes(design: &mut Design, interner: &Interner, trace: &TraceSink) -> bool {
    let passes: Vec<Box<dyn OptPass>> = vec![Box::new(crate::promote::PromotePass)];

    let Design { modules, types, .. } = design;
    let mut changed = false;
    for pass in &passes {
        for (_id, module) in modules.iter_mut() {
            changed |= pass.run(module, types, interner, trace);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_ir::{ConstValue, Design, ModuleId, TimeValue};

    #[test]
    fn run_passes_on_empty_design() {
        let interner = Interner::new();
        let module = Module::new(ModuleId::from_raw(0), interner.intern("top"));
        let mut design = Design::with_top(module);
        let trace = TraceSink::new();
        assert!(!run_passes(&mut design, &interner, &trace));
        assert!(trace.lines().is_empty());
    }

    #[test]
    fn run_passes_reaches_fixpoint() {
        let interner = Interner::new();
        let mut module = Module::new(ModuleId::from_raw(0), interner.intern("top"));
        let mut types = TypeDb::new();

        let init = module.add_const(ConstValue::Bits { width: 1, value: 0 }, &mut types);
        let (_, handle) = module.add_signal(interner.intern("q"), init, &mut types);
        let t = module.add_const_time(TimeValue::ZERO, &mut types);
        module.add_drive(handle, init, t, None, &mut types);
        let read = module.add_probe(handle, &mut types);
        module.add_output(vec![read], &mut types);

        let mut design = Design::with_top(module);
        design.types = types;

        let trace = TraceSink::disabled();
        assert!(run_passes(&mut design, &interner, &trace));
        assert!(!run_passes(&mut design, &interner, &trace));
        assert!(design.top_module().signal_ops().is_empty());
        assert!(design.top_module().verify().is_ok());
    }

    #[test]
    fn run_passes_visits_all_modules() {
        let interner = Interner::new();
        let mut types = TypeDb::new();

        let mut top = Module::new(ModuleId::from_raw(0), interner.intern("top"));
        let init = top.add_const(ConstValue::Int(0), &mut types);
        top.add_signal(interner.intern("unused"), init, &mut types);

        let mut sub = Module::new(ModuleId::from_raw(1), interner.intern("sub"));
        let init = sub.add_const(ConstValue::Int(1), &mut types);
        sub.add_signal(interner.intern("also_unused"), init, &mut types);

        let mut design = Design::with_top(top);
        design.modules.alloc(sub);
        design.types = types;

        let trace = TraceSink::new();
        assert!(run_passes(&mut design, &interner, &trace));
        assert_eq!(trace.lines().len(), 2);
        for (_id, module) in design.modules.iter() {
            assert!(module.signal_ops().is_empty());
        }
    }
}
