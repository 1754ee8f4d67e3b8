// Factory - Maps factory names to object constructors
//
// Configuration front ends create objects by factory name, then assign
// their slots. Components created here are bound to their own weak
// self-reference so they can adopt children.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::component::{share, Component, ComponentBase};
use crate::error::{ObjectError, ObjectResult};
use crate::metadata::Class;
use crate::object::{Object, ObjectBase};
use crate::value::Value;

/// Constructor stored for one factory name
pub type Constructor = Arc<dyn Fn() -> Value + Send + Sync>;

/// Entry in the factory
struct FactoryEntry {
    class_name: Option<&'static str>,
    constructor: Constructor,
}

/// Registry of constructible classes, keyed by factory name
pub struct Factory {
    entries: DashMap<String, FactoryEntry>,
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory {
    /// Create a new empty factory
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Create a factory with the base `Object` and `Component` classes registered
    pub fn with_builtins() -> Self {
        let factory = Self::new();
        factory.register_object::<ObjectBase>();
        factory.register_component::<ComponentBase>();
        factory
    }

    /// Register a plain object class under its factory name
    pub fn register_object<T>(&self)
    where
        T: Object + Class + Default,
    {
        let meta = T::class_metadata();
        self.insert(meta.factory_name(), Some(meta.class_name()), Arc::new(|| {
            Value::object(Arc::new(T::default()))
        }));
    }

    /// Register a component class under its factory name
    pub fn register_component<T>(&self)
    where
        T: Component + Class + Default,
    {
        let meta = T::class_metadata();
        self.insert(meta.factory_name(), Some(meta.class_name()), Arc::new(|| {
            Value::component(share(T::default()))
        }));
    }

    /// Register a constructor closure under an arbitrary name
    pub fn register_fn<F>(&self, factory_name: &str, func: F)
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.insert(factory_name, None, Arc::new(func));
    }

    fn insert(&self, factory_name: &str, class_name: Option<&'static str>, constructor: Constructor) {
        debug!("[Factory::register] {} -> {:?}", factory_name, class_name);
        self.entries.insert(
            factory_name.to_string(),
            FactoryEntry {
                class_name,
                constructor,
            },
        );
    }

    /// Construct a new instance by factory name
    pub fn create(&self, factory_name: &str) -> ObjectResult<Value> {
        // Clone the constructor out so the map shard is not held while it runs
        let constructor = self
            .entries
            .get(factory_name)
            .map(|entry| Arc::clone(&entry.constructor))
            .ok_or_else(|| ObjectError::UnknownFactory(factory_name.to_string()))?;
        Ok(constructor())
    }

    /// Construct a component by factory name
    pub fn create_component(&self, factory_name: &str) -> ObjectResult<Arc<dyn Component>> {
        match self.create(factory_name)? {
            Value::Component(component) => Ok(component),
            _ => Err(ObjectError::NotAComponent(factory_name.to_string())),
        }
    }

    /// Class name registered for a factory name, if known
    pub fn class_name(&self, factory_name: &str) -> Option<&'static str> {
        self.entries.get(factory_name).and_then(|entry| entry.class_name)
    }

    /// All registered factory names, sorted
    pub fn factory_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn contains(&self, factory_name: &str) -> bool {
        self.entries.contains_key(factory_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_factory() {
        let factory = Factory::new();
        assert!(factory.is_empty());
        assert_eq!(
            factory.create("Component").unwrap_err(),
            ObjectError::UnknownFactory("Component".to_string())
        );
    }

    #[test]
    fn test_builtins() {
        let factory = Factory::with_builtins();
        assert_eq!(factory.len(), 2);
        assert_eq!(factory.factory_names(), vec!["Component", "Object"]);
        assert_eq!(factory.class_name("Object"), Some("Object"));

        let object = factory.create("Object").unwrap();
        assert!(matches!(object, Value::Object(_)));
        assert_eq!(object.type_name(), "Object");

        let component = factory.create_component("Component").unwrap();
        assert!(component.is_factory_name("Component"));
        assert!(component.is_factory_name("Object"));
    }

    #[test]
    fn test_create_component_rejects_objects() {
        let factory = Factory::with_builtins();
        assert_eq!(
            factory.create_component("Object").err(),
            Some(ObjectError::NotAComponent("Object".to_string()))
        );
    }

    #[test]
    fn test_register_fn() {
        let factory = Factory::new();
        factory.register_fn("answer", || Value::Int(42));
        assert!(factory.contains("answer"));
        assert_eq!(factory.create("answer").unwrap(), Value::Int(42));
        assert_eq!(factory.class_name("answer"), None);
    }

    #[test]
    fn test_created_components_can_adopt_children() {
        let factory = Factory::with_builtins();
        let parent = factory.create_component("Component").unwrap();
        let child = factory.create_component("Component").unwrap();
        assert!(parent.component_base().add_component("child", child.clone()));
        let container = child.component_base().container().unwrap();
        assert!(std::ptr::addr_eq(Arc::as_ptr(&container), Arc::as_ptr(&parent)));
    }
}
