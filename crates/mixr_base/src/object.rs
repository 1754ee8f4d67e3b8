//! Reflective objects
//!
//! Every reflective class embeds an [`ObjectBase`] (directly or through its
//! base class) and implements [`Object`]. The trait supplies class identity,
//! slot assignment by name or index, cloning, validation, and message
//! filtering on top of the class's [`ClassMetadata`].

use std::any::Any;
use std::sync::{Arc, Weak};

use mixr_macros::mixr_class;
use parking_lot::RwLock;
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::ObjectResult;
use crate::message::{MessageFilter, MessageType};
use crate::metadata::{Class, ClassMetadata};
use crate::property_table::PropertyTable;
use crate::referenced::RefCount;
use crate::value::{Value, ValueKind};

// ─────────────────────────────────────────────────────────────────────────────
// Slot Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// One locally declared slot handler.
///
/// Several handlers may share a local index to accept different value kinds
/// for the same slot; they are tried in declaration order.
pub struct SlotHandler<T> {
    pub index: usize,
    pub kind: ValueKind,
    pub handler: fn(&T, &Value) -> bool,
}

impl<T> SlotHandler<T> {
    pub const fn new(index: usize, kind: ValueKind, handler: fn(&T, &Value) -> bool) -> Self {
        Self {
            index,
            kind,
            handler,
        }
    }
}

/// Try each handler declared for `local_index` that accepts `value`'s kind,
/// stopping at the first one that consumes the value.
pub fn dispatch_slot<T>(
    handlers: &[SlotHandler<T>],
    this: &T,
    local_index: usize,
    value: &Value,
) -> bool {
    handlers
        .iter()
        .filter(|h| h.index == local_index && h.kind.matches(value))
        .any(|h| (h.handler)(this, value))
}

// ─────────────────────────────────────────────────────────────────────────────
// Object Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Behavior shared by every reflective class.
pub trait Object: Send + Sync + 'static {
    fn object_base(&self) -> &ObjectBase;

    fn as_any(&self) -> &dyn Any;

    /// Assign a slot by global 1-based index.
    ///
    /// Implementations delegate indexes owned by an ancestor table to their
    /// base class and dispatch local indexes to their own handlers.
    fn set_slot_by_index(&self, index: usize, value: &Value) -> bool {
        self.object_base().set_slot_by_index(index, value)
    }

    /// A copy of this object with a fresh identity; `None` for abstract classes.
    fn clone_object(&self) -> Option<Arc<dyn Object>> {
        None
    }

    /// Called once every slot from a configuration has been applied.
    fn is_valid(&self) -> bool {
        true
    }

    fn metadata(&self) -> &'static ClassMetadata {
        self.object_base().metadata()
    }

    fn property_table(&self) -> &'static PropertyTable {
        self.metadata().property_table()
    }

    fn id(&self) -> Uuid {
        self.object_base().id()
    }

    /// Take another reference, returning the new count.
    fn ref_(&self) -> ObjectResult<i32> {
        self.object_base().refs().increment()
    }

    /// Release a reference; `true` when this call took the count to zero.
    ///
    /// The object itself goes away once its last handle is dropped; see
    /// [`unref_handle`].
    fn unref(&self) -> ObjectResult<bool> {
        Ok(self.object_base().refs().decrement()? == 0)
    }

    fn ref_count(&self) -> i32 {
        self.object_base().refs().get()
    }

    /// True if `class` is this object's class or any ancestor class.
    fn is_class_type(&self, class: &ClassMetadata) -> bool {
        self.metadata().is_class(class)
    }

    fn is_class_name(&self, class_name: &str) -> bool {
        self.metadata().is_class_named(class_name)
    }

    fn is_factory_name(&self, name: &str) -> bool {
        self.metadata().is_factory_name(name)
    }

    /// Assign a slot by name.
    ///
    /// Numeric names are taken directly as 1-based indexes. Returns false if
    /// the name is unknown, the value is null, or no handler accepts it.
    fn set_slot_by_name(&self, name: &str, value: &Value) -> bool {
        if value.is_null() {
            return false;
        }

        let index = match name.parse::<usize>() {
            Ok(index) => index,
            Err(_) => self.slot_name_to_index(name),
        };

        if index == 0 {
            if self.is_message_enabled(MessageType::WARNING) {
                warn!(
                    "[set_slot_by_name] {}: unknown slot '{}'",
                    self.metadata().class_name(),
                    name
                );
            }
            return false;
        }

        let ok = self.set_slot_by_index(index, value);
        if !ok && self.is_message_enabled(MessageType::WARNING) {
            warn!(
                "[set_slot_by_name] {}: slot '{}' rejected {}",
                self.metadata().class_name(),
                name,
                value.type_name()
            );
        }
        ok
    }

    fn slot_index_to_name(&self, index: usize) -> Option<&'static str> {
        self.property_table().name_of(index)
    }

    fn slot_name_to_index(&self, name: &str) -> usize {
        self.property_table().index_of(name)
    }

    fn is_message_enabled(&self, kind: MessageType) -> bool {
        self.object_base().is_message_enabled(kind)
    }

    fn is_message_disabled(&self, kind: MessageType) -> bool {
        self.object_base().is_message_disabled(kind)
    }

    fn enable_message_types(&self, kind: MessageType) {
        self.object_base().messages().enable(kind);
    }

    fn disable_message_types(&self, kind: MessageType) {
        self.object_base().messages().disable(kind);
    }
}

impl dyn Object {
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Release one reference held through `handle`.
///
/// When the count reaches zero the handle is dropped and `None` comes back;
/// if it was the last handle the object is destroyed here. Otherwise the
/// handle is returned to the caller.
pub fn unref_handle<T>(handle: Arc<T>) -> ObjectResult<Option<Arc<T>>>
where
    T: Object + ?Sized,
{
    if handle.unref()? {
        drop(handle);
        return Ok(None);
    }
    Ok(Some(handle))
}

// ─────────────────────────────────────────────────────────────────────────────
// Object Base
// ─────────────────────────────────────────────────────────────────────────────

/// Root of the class hierarchy.
#[mixr_class(name = "Object", factory = "Object")]
#[derive(Debug)]
pub struct ObjectBase {
    metadata: &'static ClassMetadata,
    id: Uuid,
    refs: RefCount,
    messages: MessageFilter,
    /// Consulted for message types this object never set explicitly
    message_parent: RwLock<Option<Weak<dyn Object>>>,
}

impl ObjectBase {
    pub fn new() -> Self {
        Self::with_metadata(Self::class_metadata())
    }

    /// Construct the base part of an object whose most-derived class is
    /// described by `metadata`.
    pub fn with_metadata(metadata: &'static ClassMetadata) -> Self {
        metadata.record_construction();
        Self {
            metadata,
            id: Uuid::new_v4(),
            refs: RefCount::new(),
            messages: MessageFilter::new(),
            message_parent: RwLock::new(None),
        }
    }

    pub fn metadata(&self) -> &'static ClassMetadata {
        self.metadata
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn refs(&self) -> &RefCount {
        &self.refs
    }

    pub fn messages(&self) -> &MessageFilter {
        &self.messages
    }

    pub fn set_message_parent(&self, parent: Option<Weak<dyn Object>>) {
        *self.message_parent.write() = parent;
    }

    /// Error messages are always enabled. Types this object never enabled or
    /// disabled fall back to the message parent, if any.
    pub fn is_message_enabled(&self, kind: MessageType) -> bool {
        if self.messages.is_enabled(kind) {
            return true;
        }
        if !self.messages.is_untouched(kind) {
            return false;
        }
        let parent = self.message_parent.read().as_ref().and_then(Weak::upgrade);
        parent.is_some_and(|parent| parent.is_message_enabled(kind))
    }

    pub fn is_message_disabled(&self, kind: MessageType) -> bool {
        self.messages.is_disabled(kind)
    }

    /// The root class declares no slots.
    pub fn set_slot_by_index(&self, _index: usize, _value: &Value) -> bool {
        false
    }
}

impl Default for ObjectBase {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ObjectBase {
    /// Copies the message masks; identity, reference count and counters start fresh.
    fn clone(&self) -> Self {
        let copy = Self::with_metadata(self.metadata);
        copy.messages.copy_from(&self.messages);
        copy
    }
}

impl Drop for ObjectBase {
    fn drop(&mut self) {
        if let Err(err) = self.refs.check_release() {
            error!("[ObjectBase::drop] {}: {}", self.metadata.class_name(), err);
        }
        self.metadata.record_destruction();
    }
}

impl Object for ObjectBase {
    fn object_base(&self) -> &ObjectBase {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_object(&self) -> Option<Arc<dyn Object>> {
        Some(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObjectError;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Two-level test hierarchy: Shape -> Circle
    #[mixr_class(factory = "Shape", base = ObjectBase, slots = ["name", "scale"])]
    struct Shape {
        base: ObjectBase,
        name: Mutex<String>,
        scale: Mutex<f64>,
    }

    static SHAPE_SLOTS: [SlotHandler<Shape>; 3] = [
        SlotHandler::new(1, ValueKind::String, Shape::set_name),
        SlotHandler::new(2, ValueKind::Int, Shape::set_scale_int),
        SlotHandler::new(2, ValueKind::Number, Shape::set_scale),
    ];

    impl Shape {
        fn with_metadata(metadata: &'static ClassMetadata) -> Self {
            Self {
                base: ObjectBase::with_metadata(metadata),
                name: Mutex::new(String::new()),
                scale: Mutex::new(1.0),
            }
        }

        fn set_name(&self, value: &Value) -> bool {
            match value.as_str() {
                Some(name) if !name.is_empty() => {
                    *self.name.lock() = name.to_string();
                    true
                }
                _ => false,
            }
        }

        /// Only positive integers; other numbers fall through to `set_scale`
        fn set_scale_int(&self, value: &Value) -> bool {
            match value.as_i64() {
                Some(i) if i > 0 => {
                    *self.scale.lock() = i as f64 * 10.0;
                    true
                }
                _ => false,
            }
        }

        fn set_scale(&self, value: &Value) -> bool {
            match value.as_f64() {
                Some(x) if x > 0.0 => {
                    *self.scale.lock() = x;
                    true
                }
                _ => false,
            }
        }
    }

    impl Object for Shape {
        fn object_base(&self) -> &ObjectBase {
            &self.base
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn set_slot_by_index(&self, index: usize, value: &Value) -> bool {
            match Self::class_metadata().property_table().local_index(index) {
                Some(local) => dispatch_slot(&SHAPE_SLOTS, self, local, value),
                None => self.base.set_slot_by_index(index, value),
            }
        }

        fn is_valid(&self) -> bool {
            !self.name.lock().is_empty()
        }
    }

    #[mixr_class(factory = "Circle", base = Shape, slots = ["radius"])]
    struct Circle {
        shape: Shape,
        radius: Mutex<f64>,
    }

    static CIRCLE_SLOTS: [SlotHandler<Circle>; 1] =
        [SlotHandler::new(1, ValueKind::Number, Circle::set_radius)];

    impl Circle {
        fn new() -> Self {
            Self {
                shape: Shape::with_metadata(Self::class_metadata()),
                radius: Mutex::new(0.0),
            }
        }

        fn set_radius(&self, value: &Value) -> bool {
            value.as_f64().map(|r| *self.radius.lock() = r).is_some()
        }
    }

    impl Object for Circle {
        fn object_base(&self) -> &ObjectBase {
            &self.shape.base
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn set_slot_by_index(&self, index: usize, value: &Value) -> bool {
            match Self::class_metadata().property_table().local_index(index) {
                Some(local) => dispatch_slot(&CIRCLE_SLOTS, self, local, value),
                None => self.shape.set_slot_by_index(index, value),
            }
        }

        fn is_valid(&self) -> bool {
            self.shape.is_valid() && *self.radius.lock() > 0.0
        }
    }

    #[mixr_class(factory = "Unrelated", base = ObjectBase)]
    struct Unrelated;

    #[test]
    fn test_class_identity_walks_ancestors() {
        let circle = Circle::new();
        assert!(circle.is_class_type(Circle::class_metadata()));
        assert!(circle.is_class_type(Shape::class_metadata()));
        assert!(circle.is_class_type(ObjectBase::class_metadata()));
        assert!(!circle.is_class_type(Unrelated::class_metadata()));
        assert!(circle.is_class_name("Shape"));
        assert_eq!(circle.metadata().class_name(), "Circle");
    }

    #[test]
    fn test_factory_name_identity() {
        let circle = Circle::new();
        assert!(circle.is_factory_name("Circle"));
        assert!(circle.is_factory_name("Shape"));
        assert!(circle.is_factory_name("Object"));
        assert!(!circle.is_factory_name("Unrelated"));
        assert!(!circle.is_factory_name(""));
        assert_eq!(Circle::factory_name(), "Circle");
    }

    #[test]
    fn test_slot_indexes_are_global() {
        let circle = Circle::new();
        assert_eq!(circle.slot_name_to_index("name"), 1);
        assert_eq!(circle.slot_name_to_index("scale"), 2);
        assert_eq!(circle.slot_name_to_index("radius"), 3);
        assert_eq!(circle.slot_name_to_index("color"), 0);
        assert_eq!(circle.slot_index_to_name(3), Some("radius"));
        assert_eq!(circle.slot_index_to_name(4), None);
    }

    #[test]
    fn test_set_slot_by_name_delegates_to_base() {
        let circle = Circle::new();
        assert!(circle.set_slot_by_name("name", &Value::from("wheel")));
        assert!(circle.set_slot_by_name("radius", &Value::from(2.5)));
        assert_eq!(*circle.shape.name.lock(), "wheel");
        assert_eq!(*circle.radius.lock(), 2.5);
        assert!(circle.is_valid());
    }

    #[test]
    fn test_numeric_slot_names_are_indexes() {
        let circle = Circle::new();
        assert!(circle.set_slot_by_name("3", &Value::from(4)));
        assert_eq!(*circle.radius.lock(), 4.0);
        assert!(circle.set_slot_by_name("1", &Value::from("hub")));
        assert_eq!(*circle.shape.name.lock(), "hub");
        assert!(!circle.set_slot_by_name("9", &Value::from(1)));
    }

    #[test]
    fn test_rejected_slots_do_not_mutate() {
        let circle = Circle::new();
        assert!(!circle.set_slot_by_name("color", &Value::from("red")));
        assert!(!circle.set_slot_by_name("radius", &Value::from("big")));
        assert!(!circle.set_slot_by_name("radius", &Value::Null));
        assert_eq!(*circle.radius.lock(), 0.0);
        assert!(!circle.is_valid());
    }

    #[test]
    fn test_same_index_handlers_first_match_wins() {
        let circle = Circle::new();
        assert!(circle.set_slot_by_name("scale", &Value::from(3)));
        assert_eq!(*circle.shape.scale.lock(), 30.0);

        // Negative integer is refused by the integer handler, then by the number handler
        assert!(!circle.set_slot_by_name("scale", &Value::from(-3)));
        assert_eq!(*circle.shape.scale.lock(), 30.0);

        assert!(circle.set_slot_by_name("scale", &Value::from(0.5)));
        assert_eq!(*circle.shape.scale.lock(), 0.5);
    }

    #[test]
    fn test_instance_counters_follow_most_derived_class() {
        let meta = Circle::class_metadata();
        let before_total = meta.total_count();
        let circle = Circle::new();
        assert!(meta.count() >= 1);
        assert!(meta.total_count() > before_total);
        drop(circle);
        assert!(meta.total_count() > before_total);
    }

    #[test]
    fn test_clone_object_copies_masks_not_identity() {
        let object = ObjectBase::new();
        object.enable_message_types(MessageType::INFO);
        let copy = object.clone_object().unwrap();
        assert!(copy.is_message_enabled(MessageType::INFO));
        assert_ne!(copy.id(), object.id());
        assert!(copy.downcast_ref::<ObjectBase>().is_some());
    }

    #[test]
    fn test_abstract_clone_is_none() {
        assert!(Circle::new().clone_object().is_none());
    }

    /// Counts its own destruction
    #[mixr_class(factory = "Tracked", base = ObjectBase)]
    struct Tracked {
        base: ObjectBase,
        drops: Arc<AtomicUsize>,
    }

    impl Object for Tracked {
        fn object_base(&self) -> &ObjectBase {
            &self.base
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn tracked(drops: &Arc<AtomicUsize>) -> Arc<dyn Object> {
        Arc::new(Tracked {
            base: ObjectBase::with_metadata(Tracked::class_metadata()),
            drops: drops.clone(),
        })
    }

    #[test]
    fn test_new_objects_are_pre_referenced() {
        assert_eq!(Circle::new().ref_count(), 1);
        assert_eq!(ObjectBase::new().ref_count(), 1);

        let object = ObjectBase::new();
        object.ref_().unwrap();
        let copy = object.clone_object().unwrap();
        assert_eq!(copy.ref_count(), 1);
        assert_eq!(object.ref_count(), 2);
        object.unref().unwrap();
    }

    #[test]
    fn test_last_unref_destroys_object() {
        let drops = Arc::new(AtomicUsize::new(0));
        let object = tracked(&drops);

        assert_eq!(object.ref_().unwrap(), 2);
        assert_eq!(object.ref_().unwrap(), 3);

        let object = unref_handle(object).unwrap().unwrap();
        let object = unref_handle(object).unwrap().unwrap();
        assert_eq!(object.ref_count(), 1);
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        assert!(unref_handle(object).unwrap().is_none());
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_count_outlives_other_handles() {
        let drops = Arc::new(AtomicUsize::new(0));
        let object = tracked(&drops);
        let other = object.clone();

        assert!(unref_handle(object).unwrap().is_none());
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        assert_eq!(other.ref_count(), 0);
        assert_eq!(other.ref_(), Err(ObjectError::InvalidRefCount(0)));
        assert_eq!(other.unref(), Err(ObjectError::InvalidRefCount(0)));

        drop(other);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_corrupted_object_count_is_rejected() {
        let circle = Circle::new();
        circle.object_base().refs().corrupt(-1);
        assert_eq!(circle.ref_(), Err(ObjectError::InvalidRefCount(-1)));
        assert_eq!(circle.ref_count(), -1);
        circle.object_base().refs().corrupt(1);
    }

    #[test]
    fn test_outstanding_refs_are_reported_at_delete() {
        let circle = Circle::new();
        circle.ref_().unwrap();
        assert_eq!(
            circle.object_base().refs().check_release(),
            Err(ObjectError::InvalidRefCountAtDelete(2))
        );
        circle.unref().unwrap();
        assert!(circle.object_base().refs().check_release().is_ok());
    }

    #[test]
    fn test_message_parent_fallback() {
        let parent: Arc<dyn Object> = Arc::new(ObjectBase::new());
        parent.enable_message_types(MessageType::INFO | MessageType::DEBUG);

        let child = ObjectBase::new();
        assert!(!child.is_message_enabled(MessageType::INFO));
        child.set_message_parent(Some(Arc::downgrade(&parent)));
        assert!(child.is_message_enabled(MessageType::INFO));

        child.disable_message_types(MessageType::DEBUG);
        assert!(!child.is_message_enabled(MessageType::DEBUG));
        assert!(child.is_message_disabled(MessageType::DEBUG));
    }
}
