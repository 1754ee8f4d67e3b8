//! Per-class metadata
//!
//! One [`ClassMetadata`] exists per reflective class for the life of the
//! process. It names the class, links to the base class's metadata, owns the
//! class's [`PropertyTable`], and keeps diagnostic instance counters.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::property_table::PropertyTable;

/// Process-wide descriptor of a reflective class.
#[derive(Debug)]
pub struct ClassMetadata {
    class_name: &'static str,
    factory_name: &'static str,
    description: Option<&'static str>,
    table: PropertyTable,
    base: Option<&'static ClassMetadata>,
    /// Live instances
    count: AtomicUsize,
    /// High-water mark of `count`
    max_count: AtomicUsize,
    /// Instances ever constructed
    total_count: AtomicUsize,
}

impl ClassMetadata {
    pub fn new(
        class_name: &'static str,
        factory_name: &'static str,
        table: PropertyTable,
        base: Option<&'static ClassMetadata>,
    ) -> Self {
        Self {
            class_name,
            factory_name,
            description: None,
            table,
            base,
            count: AtomicUsize::new(0),
            max_count: AtomicUsize::new(0),
            total_count: AtomicUsize::new(0),
        }
    }

    pub fn with_description(mut self, description: Option<&'static str>) -> Self {
        self.description = description;
        self
    }

    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    pub fn factory_name(&self) -> &'static str {
        self.factory_name
    }

    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    pub fn property_table(&self) -> &PropertyTable {
        &self.table
    }

    pub fn base(&self) -> Option<&'static ClassMetadata> {
        self.base
    }

    /// This class followed by each ancestor, ending at the root.
    pub fn lineage(&self) -> impl Iterator<Item = &ClassMetadata> {
        std::iter::successors(Some(self), |meta| meta.base)
    }

    /// True if `other` is this class or one of its ancestors.
    pub fn is_class(&self, other: &ClassMetadata) -> bool {
        self.lineage().any(|meta| std::ptr::eq(meta, other))
    }

    pub fn is_class_named(&self, class_name: &str) -> bool {
        self.lineage().any(|meta| meta.class_name == class_name)
    }

    /// True if `name` is the factory name of this class or an ancestor.
    /// An empty name never matches.
    pub fn is_factory_name(&self, name: &str) -> bool {
        !name.is_empty() && self.lineage().any(|meta| meta.factory_name == name)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Instance bookkeeping
    // ─────────────────────────────────────────────────────────────────────────

    pub fn record_construction(&self) {
        let live = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        self.max_count.fetch_max(live, Ordering::Relaxed);
        self.total_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_destruction(&self) {
        let _ = self
            .count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn max_count(&self) -> usize {
        self.max_count.load(Ordering::Relaxed)
    }

    pub fn total_count(&self) -> usize {
        self.total_count.load(Ordering::Relaxed)
    }
}

/// Static access to a class's metadata, implemented by `#[mixr_class]`.
pub trait Class {
    fn class_metadata() -> &'static ClassMetadata;

    fn factory_name() -> &'static str {
        Self::class_metadata().factory_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static ROOT: LazyLock<ClassMetadata> = LazyLock::new(|| {
        ClassMetadata::new("Root", "root", PropertyTable::new(&["a"], None), None)
    });
    static MIDDLE: LazyLock<ClassMetadata> = LazyLock::new(|| {
        ClassMetadata::new(
            "Middle",
            "middle",
            PropertyTable::new(&["b"], Some(ROOT.property_table())),
            Some(&*ROOT),
        )
    });
    static LEAF: LazyLock<ClassMetadata> = LazyLock::new(|| {
        ClassMetadata::new(
            "Leaf",
            "",
            PropertyTable::new(&[], Some(MIDDLE.property_table())),
            Some(&*MIDDLE),
        )
    });
    static OTHER: LazyLock<ClassMetadata> = LazyLock::new(|| {
        ClassMetadata::new("Other", "other", PropertyTable::new(&[], None), None)
    });

    #[test]
    fn test_is_class_walks_ancestors() {
        assert!(LEAF.is_class(&LEAF));
        assert!(LEAF.is_class(&MIDDLE));
        assert!(LEAF.is_class(&ROOT));
        assert!(!LEAF.is_class(&OTHER));
        assert!(!ROOT.is_class(&LEAF));
        assert!(LEAF.is_class_named("Root"));
        assert!(!LEAF.is_class_named("Other"));
    }

    #[test]
    fn test_is_factory_name() {
        assert!(LEAF.is_factory_name("middle"));
        assert!(LEAF.is_factory_name("root"));
        assert!(!LEAF.is_factory_name(""));
        assert!(!LEAF.is_factory_name("other"));
    }

    #[test]
    fn test_lineage_terminates_at_root() {
        let names: Vec<_> = LEAF.lineage().map(ClassMetadata::class_name).collect();
        assert_eq!(names, vec!["Leaf", "Middle", "Root"]);
        assert!(ROOT.base().is_none());
        assert_eq!(LEAF.property_table().total_count(), 2);
    }

    #[test]
    fn test_instance_counters() {
        let meta = ClassMetadata::new("Counted", "counted", PropertyTable::new(&[], None), None);
        meta.record_construction();
        meta.record_construction();
        meta.record_destruction();
        meta.record_construction();
        meta.record_destruction();
        meta.record_destruction();
        meta.record_destruction();

        assert_eq!(meta.count(), 0);
        assert_eq!(meta.max_count(), 2);
        assert_eq!(meta.total_count(), 3);
    }
}
