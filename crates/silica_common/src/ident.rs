//! Interned names with O(1) equality and cloning.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name for a module, signal, port, or other named entity.
///
/// Internally a `u32` index into a shared [`Interner`], so comparing and
/// copying identifiers never touches string data.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw `u32` index.
    ///
    /// Intended for deserialization and tests; normal code obtains
    /// identifiers through [`Interner::intern`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32`, which always fits in a `usize` on the
// platforms Silica targets. `try_from_usize` rejects indices above u32::MAX.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner shared across a compilation session.
///
/// Every name in a design (modules, signals, generated temporaries) is
/// interned here exactly once.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a string, returning its [`Ident`]. Re-interning an already
    /// known string returns the existing identifier.
    pub fn intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Resolves an [`Ident`] back to its string value.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not produced by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_then_resolve() {
        let interner = Interner::new();
        let id = interner.intern("clk");
        assert_eq!(interner.resolve(id), "clk");
    }

    #[test]
    fn interning_deduplicates() {
        let interner = Interner::new();
        assert_eq!(interner.intern("rst_n"), interner.intern("rst_n"));
    }

    #[test]
    fn distinct_strings_distinct_idents() {
        let interner = Interner::new();
        assert_ne!(interner.intern("a"), interner.intern("b"));
    }

    #[test]
    fn raw_roundtrip() {
        let id = Ident::from_raw(17);
        assert_eq!(id.as_raw(), 17);
    }

    #[test]
    fn serde_roundtrip() {
        let id = Ident::from_raw(3);
        let json = serde_json::to_string(&id).unwrap();
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
