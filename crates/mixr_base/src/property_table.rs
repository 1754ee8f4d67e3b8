//! Slot name tables
//!
//! Each class owns one [`PropertyTable`] holding the slot names it declares
//! locally, chained to its base class's table. The global index space is
//! the concatenation of every table in the chain, ancestors first, numbered
//! from 1. Index 0 means "not found".

/// Ordered, immutable table of slot names chained to a base table.
#[derive(Debug)]
pub struct PropertyTable {
    names: Vec<String>,
    base: Option<&'static PropertyTable>,
}

impl PropertyTable {
    pub fn new(names: &[&str], base: Option<&'static PropertyTable>) -> Self {
        Self {
            names: names.iter().map(|name| name.to_string()).collect(),
            base,
        }
    }

    /// Number of slots declared by this class alone
    pub fn local_count(&self) -> usize {
        self.names.len()
    }

    /// Number of slots declared by every ancestor (this table's index offset)
    pub fn base_count(&self) -> usize {
        self.base.map_or(0, PropertyTable::total_count)
    }

    pub fn total_count(&self) -> usize {
        self.local_count() + self.base_count()
    }

    pub fn base(&self) -> Option<&'static PropertyTable> {
        self.base
    }

    /// Global 1-based index of `name`, or 0 when no table in the chain has it.
    ///
    /// Ancestor tables are consulted when the name is not declared locally,
    /// so an inherited name keeps the ancestor's index.
    pub fn index_of(&self, name: &str) -> usize {
        match self.names.iter().position(|local| local == name) {
            Some(pos) => self.base_count() + pos + 1,
            None => self.base.map_or(0, |base| base.index_of(name)),
        }
    }

    /// Slot name at global index `index`, if in range.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        let offset = self.base_count();
        if index == 0 || index > offset + self.local_count() {
            return None;
        }
        if index <= offset {
            return self.base.and_then(|base| base.name_of(index));
        }
        self.names.get(index - offset - 1).map(String::as_str)
    }

    /// Convert a global index into this table's local 1-based index.
    ///
    /// Returns `None` for indexes owned by an ancestor or out of range.
    pub fn local_index(&self, index: usize) -> Option<usize> {
        let offset = self.base_count();
        (index > offset && index <= offset + self.local_count()).then(|| index - offset)
    }

    /// Every slot name in global index order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.base.map(PropertyTable::names).unwrap_or_default();
        names.extend(self.names.iter().map(String::as_str));
        names
    }
}
