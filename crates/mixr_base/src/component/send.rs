//! Change-only event sending to named children

use std::sync::{Arc, Weak};

use tracing::warn;

use super::{Component, ComponentBase, EventToken};
use crate::value::Value;

/// Per-call-site cache used by [`ComponentBase::send`].
///
/// Holds the resolved target and the last value sent through this slot.
#[derive(Default)]
pub struct SendData {
    target: Option<Weak<dyn Component>>,
    past: Option<Value>,
}

impl SendData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the cached target and value; the next send always goes out.
    pub fn clear(&mut self) {
        self.target = None;
        self.past = None;
    }

    pub fn past_value(&self) -> Option<&Value> {
        self.past.as_ref()
    }

    /// Record `value`, returning it only if it differs from the last one.
    fn changed(&mut self, value: Value) -> Option<Value> {
        if self.past.as_ref() == Some(&value) {
            return None;
        }
        self.past = Some(value.clone());
        Some(value)
    }

    fn target(&mut self, from: &ComponentBase, id: &str) -> Option<Arc<dyn Component>> {
        if let Some(target) = self.target.as_ref().and_then(Weak::upgrade) {
            return Some(target);
        }
        let found = from.find_by_name(id)?.component().clone();
        self.target = Some(Arc::downgrade(&found));
        Some(found)
    }
}

/// Expand a numbered name pattern: `{}` is replaced by `index`, otherwise the
/// index is appended.
pub fn numbered_name(pattern: &str, index: usize) -> String {
    if pattern.contains("{}") {
        pattern.replacen("{}", &index.to_string(), 1)
    } else {
        format!("{}{}", pattern, index)
    }
}

impl ComponentBase {
    /// Send `event` with `value` to the child named `id`, but only when the
    /// value differs from the last one sent through `data`.
    pub fn send(
        &self,
        id: &str,
        event: EventToken,
        value: impl Into<Value>,
        data: &mut SendData,
    ) -> bool {
        let Some(value) = data.changed(value.into()) else {
            return false;
        };
        match data.target(self, id) {
            Some(target) => target.event(event, Some(&value)),
            None => false,
        }
    }

    /// Send one value per child; child names come from `pattern` numbered
    /// from 1, each paired with its own cache slot.
    pub fn send_array<V>(
        &self,
        pattern: &str,
        event: EventToken,
        values: &[V],
        data: &mut [SendData],
    ) -> bool
    where
        V: Clone + Into<Value>,
    {
        if values.len() != data.len() {
            warn!(
                "[send_array] '{}': {} values for {} cache slots; extra entries are skipped",
                pattern,
                values.len(),
                data.len()
            );
        }
        let mut used = false;
        for (i, (value, slot)) in values.iter().zip(data.iter_mut()).enumerate() {
            let id = numbered_name(pattern, i + 1);
            used |= self.send(&id, event, value.clone(), slot);
        }
        used
    }
}
