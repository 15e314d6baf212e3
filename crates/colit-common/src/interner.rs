//! String interning.
//!
//! Identifiers (callable names, type parameter names, definition names) are
//! deduplicated into `Atom` handles so that equality and hashing are O(1)
//! integer operations. The `Interner` is sharded (DashMap) so the one-time
//! registration phase can run from multiple threads; after registration it is
//! read-only and shareable without synchronization.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Interned string handle.
///
/// Two `Atom`s compare equal iff the strings they intern are identical
/// within the same `Interner`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// Sentinel for "no name".
    pub const INVALID: Self = Self(u32::MAX);
}

/// String interner.
///
/// Writes happen during registration; resolution only reads. Both directions
/// of the mapping are kept so diagnostics can recover the original text.
pub struct Interner {
    by_text: DashMap<String, Atom>,
    by_atom: DashMap<u32, String>,
    next: AtomicU32,
}

impl Interner {
    pub fn new() -> Self {
        Self {
            by_text: DashMap::new(),
            by_atom: DashMap::new(),
            next: AtomicU32::new(0),
        }
    }

    /// Intern a string, returning its stable `Atom`.
    pub fn intern(&self, text: &str) -> Atom {
        if let Some(existing) = self.by_text.get(text) {
            return *existing;
        }
        let atom = Atom(self.next.fetch_add(1, Ordering::Relaxed));
        // Two threads can race to intern the same text; the entry API keeps
        // the first winner and the loser's id is simply never handed out.
        let winner = *self
            .by_text
            .entry(text.to_string())
            .or_insert(atom);
        if winner == atom {
            self.by_atom.insert(atom.0, text.to_string());
        }
        winner
    }

    /// Recover the text for an interned atom.
    pub fn resolve(&self, atom: Atom) -> Option<String> {
        self.by_atom.get(&atom.0).map(|s| s.clone())
    }

    /// Number of distinct strings interned.
    pub fn len(&self) -> usize {
        self.by_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
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
    fn intern_is_stable() {
        let interner = Interner::new();
        let a = interner.intern("List");
        let b = interner.intern("List");
        let c = interner.intern("Set");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a).as_deref(), Some("List"));
        assert_eq!(interner.len(), 2);
    }
}
