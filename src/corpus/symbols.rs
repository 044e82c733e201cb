// Symbol interning — one table per feature channel.
//
// Feature values are plain text on the way in, but the metric only ever
// compares them for equality, so each distinct value gets a dense integer
// id. Ids are assigned first-seen-wins and never reused, which makes
// re-encoding the same text deterministic for the table's whole lifetime.

use std::collections::HashMap;

use crate::corpus::Symbol;

/// String-to-dense-id interner for a single feature channel.
#[derive(Debug, Default)]
pub struct SymbolTable {
    ids: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `value`, assigning the next dense id on first sight.
    pub fn intern(&mut self, value: &str) -> Symbol {
        if let Some(&id) = self.ids.get(value) {
            return id;
        }
        let id = self.ids.len() as Symbol;
        self.ids.insert(value.to_string(), id);
        id
    }

    /// Look up a value without interning it.
    pub fn get(&self, value: &str) -> Option<Symbol> {
        self.ids.get(value).copied()
    }

    /// Number of distinct values seen so far.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense_in_first_seen_order() {
        let mut table = SymbolTable::new();
        assert_eq!(table.intern("a"), 0);
        assert_eq!(table.intern("b"), 1);
        assert_eq!(table.intern("c"), 2);
    }

    #[test]
    fn test_repeat_intern_is_stable() {
        let mut table = SymbolTable::new();
        let first = table.intern("a");
        table.intern("b");
        assert_eq!(table.intern("a"), first);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_unseen_value_grows_table_by_one() {
        let mut table = SymbolTable::new();
        table.intern("a");
        let before = table.len();
        table.intern("never-seen");
        assert_eq!(table.len(), before + 1);
    }

    #[test]
    fn test_get_does_not_intern() {
        let mut table = SymbolTable::new();
        assert_eq!(table.get("a"), None);
        assert!(table.is_empty());
        table.intern("a");
        assert_eq!(table.get("a"), Some(0));
        assert_eq!(table.len(), 1);
    }
}
