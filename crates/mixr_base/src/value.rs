//! Slot and event argument values
//!
//! [`Value`] is the closed set of variants that configuration front ends and
//! event senders hand to objects. Slot and event handlers declare the
//! [`ValueKind`] they accept instead of probing runtime types.

use std::fmt;
use std::sync::Arc;

use crate::component::Component;
use crate::object::Object;

// ─────────────────────────────────────────────────────────────────────────────
// Value
// ─────────────────────────────────────────────────────────────────────────────

/// A value assigned to a slot or carried by an event.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    /// A named value, e.g. one entry of a component list
    Pair(String, Box<Value>),
    Object(Arc<dyn Object>),
    Component(Arc<dyn Component>),
}

impl Value {
    pub fn pair(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Value::Pair(name.into(), Box::new(value.into()))
    }

    pub fn object<T: Object>(object: Arc<T>) -> Self {
        Value::Object(object)
    }

    pub fn component<T: Component>(component: Arc<T>) -> Self {
        Value::Component(component)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::List(_) => ValueKind::List,
            Value::Pair(..) => ValueKind::Pair,
            Value::Object(_) => ValueKind::Object,
            Value::Component(_) => ValueKind::Component,
        }
    }

    /// Name of the variant, or the class name for objects.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Object(object) => object.metadata().class_name(),
            Value::Component(component) => component.metadata().class_name(),
            other => other.kind().name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 (also converts from float if lossless)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Get as f64 (also converts from int)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(&str, &Value)> {
        match self {
            Value::Pair(name, value) => Some((name, value)),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<dyn Object>> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&Arc<dyn Component>> {
        match self {
            Value::Component(component) => Some(component),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Objects compare by identity, everything else by value.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Pair(na, va), Value::Pair(nb, vb)) => na == nb && va == vb,
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Value::Component(a), Value::Component(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Pair(name, value) => f.debug_tuple("Pair").field(name).field(value).finish(),
            Value::Object(object) => write!(f, "Object({})", object.metadata().class_name()),
            Value::Component(component) => {
                write!(f, "Component({})", component.metadata().class_name())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Pair(name, value) => write!(f, "{}: {}", name, value),
            Value::Object(_) | Value::Component(_) => write!(f, "<{}>", self.type_name()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Value Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of value a slot or event handler accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    /// Either `Int` or `Float`
    Number,
    String,
    List,
    Pair,
    /// Any object, components included
    Object,
    Component,
    Any,
}

impl ValueKind {
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (ValueKind::Any, _) => true,
            (ValueKind::Number, Value::Int(_) | Value::Float(_)) => true,
            (ValueKind::Object, Value::Object(_) | Value::Component(_)) => true,
            (kind, value) => kind == value.kind(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "Null",
            ValueKind::Bool => "Boolean",
            ValueKind::Int => "Integer",
            ValueKind::Float => "Float",
            ValueKind::Number => "Number",
            ValueKind::String => "String",
            ValueKind::List => "List",
            ValueKind::Pair => "Pair",
            ValueKind::Object => "Object",
            ValueKind::Component => "Component",
            ValueKind::Any => "Any",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// From Implementations
// ─────────────────────────────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Arc<dyn Object>> for Value {
    fn from(object: Arc<dyn Object>) -> Self {
        Value::Object(object)
    }
}

impl From<Arc<dyn Component>> for Value {
    fn from(component: Arc<dyn Component>) -> Self {
        Value::Component(component)
    }
}
