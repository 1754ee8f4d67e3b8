//! Component documents
//!
//! A document is a TOML or JSON table describing the root object. Any table
//! with a `type` key describes an object: `type` names its factory and the
//! remaining keys are slot assignments, applied in document order. Inside a
//! list, a description with a `name` key becomes a named pair, which is how
//! a `components` slot names its children. Tables without `type` become
//! lists of named pairs. The top-level `run` table is reserved for runner
//! settings and is not applied to the root object.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use crate::component::Component;
use crate::error::{ConfigError, ConfigResult};
use crate::factory::Factory;
use crate::value::Value;

const TYPE_KEY: &str = "type";
const NAME_KEY: &str = "name";
const RESERVED_ROOT_KEYS: &[&str] = &["run"];

/// Document syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// `.json` files are JSON; everything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Toml,
        }
    }
}

/// A parsed component document.
#[derive(Debug, Clone)]
pub struct Document {
    root: Map<String, Json>,
}

impl Document {
    pub fn parse(text: &str, format: Format) -> ConfigResult<Self> {
        let root = match format {
            Format::Toml => toml_to_json(toml::Value::Table(toml::from_str::<toml::Table>(text)?)),
            Format::Json => serde_json::from_str::<Json>(text)?,
        };
        match root {
            Json::Object(root) => Ok(Self { root }),
            _ => Err(ConfigError::MissingType),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("[Document::load] {}", path.display());
        Self::parse(&text, Format::from_path(path))
    }

    /// Deserialize a top-level table, or its default when absent.
    pub fn section<T>(&self, key: &str) -> ConfigResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.root.get(key) {
            Some(section) => Ok(serde_json::from_value(section.clone())?),
            None => Ok(T::default()),
        }
    }

    /// Build the root object, which must be a component.
    pub fn build_component(&self, factory: &Factory) -> ConfigResult<Arc<dyn Component>> {
        match build_object(&self.root, factory, RESERVED_ROOT_KEYS)? {
            Value::Component(component) => Ok(component),
            other => Err(ConfigError::RootNotComponent(other.type_name().to_string())),
        }
    }
}

pub fn load_component(path: impl AsRef<Path>, factory: &Factory) -> ConfigResult<Arc<dyn Component>> {
    Document::load(path)?.build_component(factory)
}

pub fn parse_component(text: &str, format: Format, factory: &Factory) -> ConfigResult<Arc<dyn Component>> {
    Document::parse(text, format)?.build_component(factory)
}

fn toml_to_json(value: toml::Value) -> Json {
    match value {
        toml::Value::String(s) => Json::String(s),
        toml::Value::Integer(i) => Json::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f).map_or(Json::Null, Json::Number),
        toml::Value::Boolean(b) => Json::Bool(b),
        toml::Value::Datetime(dt) => Json::String(dt.to_string()),
        toml::Value::Array(items) => Json::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Json::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

fn build_value(value: &Json, factory: &Factory) -> ConfigResult<Value> {
    Ok(match value {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::List(
            items
                .iter()
                .map(|item| build_list_item(item, factory))
                .collect::<ConfigResult<_>>()?,
        ),
        Json::Object(map) if map.contains_key(TYPE_KEY) => build_object(map, factory, &[])?,
        Json::Object(map) => Value::List(
            map.iter()
                .map(|(key, value)| Ok(Value::pair(key.clone(), build_value(value, factory)?)))
                .collect::<ConfigResult<_>>()?,
        ),
    })
}

fn build_list_item(item: &Json, factory: &Factory) -> ConfigResult<Value> {
    let Json::Object(map) = item else {
        return build_value(item, factory);
    };
    match map.get(NAME_KEY).and_then(Json::as_str) {
        Some(name) if map.contains_key(TYPE_KEY) => {
            Ok(Value::pair(name, build_object(map, factory, &[NAME_KEY])?))
        }
        _ => build_value(item, factory),
    }
}

fn build_object(map: &Map<String, Json>, factory: &Factory, skip: &[&str]) -> ConfigResult<Value> {
    let factory_name = map
        .get(TYPE_KEY)
        .and_then(Json::as_str)
        .ok_or(ConfigError::MissingType)?;
    let object = factory.create(factory_name)?;
    let class_name = object.type_name();

    for (key, raw) in map {
        if key == TYPE_KEY || skip.contains(&key.as_str()) {
            continue;
        }
        let value = build_value(raw, factory)?;
        if !set_slot(&object, key, &value) {
            warn!("[config] {}: slot '{}' rejected {}; skipped", class_name, key, value.type_name());
        }
    }

    if !is_valid(&object) {
        return Err(ConfigError::Invalid(class_name.to_string()));
    }
    Ok(object)
}

fn set_slot(object: &Value, name: &str, value: &Value) -> bool {
    match object {
        Value::Object(object) => object.set_slot_by_name(name, value),
        Value::Component(component) => component.set_slot_by_name(name, value),
        _ => false,
    }
}

fn is_valid(object: &Value) -> bool {
    match object {
        Value::Object(object) => object.is_valid(),
        Value::Component(component) => component.is_valid(),
        _ => true,
    }
}
