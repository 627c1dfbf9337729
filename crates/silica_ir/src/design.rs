//! Top-level design container.

use crate::arena::Arena;
use crate::ids::ModuleId;
use crate::module::Module;
use crate::types::TypeDb;
use serde::{Deserialize, Serialize};

/// A complete hardware design.
///
/// Holds every module in the hierarchy plus the type database they
/// share. This is the unit the pass runner operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    /// All modules in the design, keyed by [`ModuleId`].
    pub modules: Arena<ModuleId, Module>,
    /// The top-level module.
    pub top: ModuleId,
    /// Type definitions shared across all modules.
    pub types: TypeDb,
}

impl Design {
    /// Creates a design containing a single top-level module.
    pub fn with_top(module: Module) -> Self {
        let mut modules = Arena::new();
        let top = modules.alloc(module);
        Self {
            modules,
            top,
            types: TypeDb::new(),
        }
    }

    /// Returns a reference to the top-level module.
    pub fn top_module(&self) -> &Module {
        &self.modules[self.top]
    }

    /// Returns the number of modules in the design.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_common::{Ident, Interner};

    fn module(id: u32, name: Ident) -> Module {
        Module::new(ModuleId::from_raw(id), name)
    }

    #[test]
    fn with_top_registers_module() {
        let interner = Interner::new();
        let design = Design::with_top(module(0, interner.intern("top")));
        assert_eq!(design.module_count(), 1);
        assert_eq!(design.top_module().id, design.top);
    }

    #[test]
    fn multiple_modules() {
        let interner = Interner::new();
        let mut design = Design::with_top(module(0, interner.intern("top")));
        design.modules.alloc(module(1, interner.intern("sub")));
        assert_eq!(design.module_count(), 2);
        assert_eq!(design.top_module().name, interner.intern("top"));
    }

    #[test]
    fn serde_roundtrip() {
        let interner = Interner::new();
        let design = Design::with_top(module(0, interner.intern("top")));
        let json = serde_json::to_string(&design).unwrap();
        let back: Design = serde_json::from_str(&json).unwrap();
        assert_eq!(back.module_count(), 1);
        assert_eq!(back.top, design.top);
    }
}
