//! Duplicate-free operand sets.

use crate::intern::Sym;

/// An insertion-ordered set of interned names.
///
/// Backs the per-node DEF/USE/IN/OUT sets, which hold a handful of
/// variables each. Membership is a linear scan over a vector; iteration
/// follows insertion order, so renderings stay deterministic.
#[derive(Debug, Clone, Default)]
pub struct OperandSet {
    syms: Vec<Sym>,
}

impl OperandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name. Returns `false` when it was already present.
    pub fn insert(&mut self, sym: Sym) -> bool {
        if self.syms.contains(&sym) {
            return false;
        }
        self.syms.push(sym);
        true
    }

    pub fn contains(&self, sym: Sym) -> bool {
        self.syms.contains(&sym)
    }

    pub fn iter(&self) -> impl Iterator<Item = Sym> + '_ {
        self.syms.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.syms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.syms.is_empty()
    }
}
