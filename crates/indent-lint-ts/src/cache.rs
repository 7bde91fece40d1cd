//! Pass-scoped memo of expected indents keyed by source row.

use std::collections::HashMap;

/// Expected indents already computed during one verification pass.
///
/// Sibling `case` clauses share the base of their `switch`, and declarators
/// share the base of their declaration statement. Both are keyed by the
/// 0-based row of the governing construct.
#[derive(Debug, Default)]
pub struct LineIndentCache {
    case: HashMap<usize, usize>,
    var: HashMap<usize, usize>,
}

impl LineIndentCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case indent for the switch on `row`, computing it on first use.
    pub fn case_indent(&mut self, row: usize, compute: impl FnOnce() -> usize) -> usize {
        *self.case.entry(row).or_insert_with(compute)
    }

    /// Declarator indent for the statement on `row`, computing it on first use.
    pub fn var_indent(&mut self, row: usize, compute: impl FnOnce() -> usize) -> usize {
        *self.var.entry(row).or_insert_with(compute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_once_per_row() {
        let mut cache = LineIndentCache::new();
        let mut calls = 0;
        let first = cache.case_indent(3, || {
            calls += 1;
            8
        });
        let second = cache.case_indent(3, || {
            calls += 1;
            99
        });
        assert_eq!((first, second), (8, 8));
        assert_eq!(calls, 1);
    }

    #[test]
    fn zero_is_a_cached_value() {
        let mut cache = LineIndentCache::new();
        assert_eq!(cache.var_indent(0, || 0), 0);
        assert_eq!(cache.var_indent(0, || 4), 0);
    }

    #[test]
    fn case_and_var_maps_are_separate() {
        let mut cache = LineIndentCache::new();
        cache.case_indent(1, || 4);
        assert_eq!(cache.var_indent(1, || 2), 2);
    }
}
