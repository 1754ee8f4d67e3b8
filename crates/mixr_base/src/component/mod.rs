//! Component tree and update engine
//!
//! A component owns an ordered list of named children and holds a weak
//! back-reference to its container. The tree is driven from outside: a
//! time-critical thread calls [`Component::tc_frame`] at a fixed rate and a
//! background thread calls [`Component::update_data`] at a lower rate.
//! Events are routed through per-class handler tables, falling back to the
//! base class and finally to [`ComponentBase::handle_event`].

mod event;
mod send;

pub use event::{
    dispatch_event, is_key_event, EventHandler, EventToken, FREEZE_EVENT, MAX_KEY_EVENT,
    RESET_EVENT, SELECT, SHUTDOWN_EVENT, UPDATE_VALUE, USER_EVENTS,
};
pub use send::{numbered_name, SendData};

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Instant;

use mixr_macros::mixr_class;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::message::MessageType;
use crate::metadata::{Class, ClassMetadata};
use crate::object::{dispatch_slot, Object, ObjectBase, SlotHandler};
use crate::statistic::Statistic;
use crate::value::{Value, ValueKind};

/// Timing samples between two printed timing reports
pub const TIMING_PRINT_INTERVAL: usize = 500;

// ─────────────────────────────────────────────────────────────────────────────
// Pairs and Selection
// ─────────────────────────────────────────────────────────────────────────────

/// A named child component.
#[derive(Clone)]
pub struct Pair {
    name: String,
    component: Arc<dyn Component>,
}

impl Pair {
    pub fn new(name: impl Into<String>, component: Arc<dyn Component>) -> Self {
        Self {
            name: name.into(),
            component,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component(&self) -> &Arc<dyn Component> {
        &self.component
    }

    /// Accepts a named component, or a bare component named by `position`.
    fn from_value(value: &Value, position: usize) -> Option<Pair> {
        match value {
            Value::Pair(name, inner) => inner
                .as_component()
                .map(|component| Pair::new(name.clone(), component.clone())),
            Value::Component(component) => Some(Pair::new(position.to_string(), component.clone())),
            _ => None,
        }
    }
}

impl fmt::Debug for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pair")
            .field("name", &self.name)
            .field("class", &self.component.metadata().class_name())
            .finish()
    }
}

fn same_component(a: &Arc<dyn Component>, b: &Arc<dyn Component>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Criterion used to pick the single child that gets updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Name(String),
    /// 1-based position in the child list
    Index(usize),
}

impl Selection {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) if !name.is_empty() => Some(Selection::Name(name.clone())),
            Value::Int(index) if *index > 0 => Some(Selection::Index(*index as usize)),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Component Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A node of the component tree.
///
/// Implementors embed a [`ComponentBase`] (directly or through their base
/// class) and override the update, reset and event hooks they need.
pub trait Component: Object {
    fn component_base(&self) -> &ComponentBase;

    /// Time-critical update; the default updates the selected child or
    /// every child, in list order.
    fn update_tc(&self, dt: f64) {
        self.component_base().update_tc(dt);
    }

    /// Background update with the same recursion as [`Component::update_tc`].
    fn update_data(&self, dt: f64) {
        self.component_base().update_data(dt);
    }

    /// Per-cycle driver called by the container: runs `update_tc` and feeds
    /// its wall-clock duration into the timing statistics when enabled.
    fn tc_frame(&self, dt: f64) {
        let base = self.component_base();
        if !base.is_timing_stats_enabled() {
            self.update_tc(dt);
            return;
        }

        let start = Instant::now();
        self.update_tc(dt);
        base.record_frame_time(start.elapsed().as_secs_f64() * 1000.0);

        if base.is_timing_stats_print_enabled() {
            self.print_timing_stats();
        }
    }

    /// Return to the initial configured state. Children are not reset.
    fn reset(&self) {}

    fn event(&self, token: EventToken, arg: Option<&Value>) -> bool {
        self.component_base().handle_event(self, token, arg)
    }

    /// Called when a shutdown event arrives, after the shutdown flag is set.
    /// Overrides release threads and circular references, then call the base.
    fn shutdown_notification(&self) -> bool {
        self.component_base().shutdown_notification()
    }

    fn print_timing_stats(&self) {
        self.component_base().print_timing_stats();
    }

    /// A copy of this component and its children; `None` if not copyable.
    fn clone_component(&self) -> Option<Arc<dyn Component>> {
        None
    }

    fn is_shutdown(&self) -> bool {
        self.component_base().is_shutdown()
    }

    fn is_not_shutdown(&self) -> bool {
        !self.is_shutdown()
    }

    fn is_frozen(&self) -> bool {
        self.component_base().is_frozen()
    }

    fn freeze(&self, frozen: bool) {
        self.component_base().freeze(frozen);
    }
}

impl dyn Component {
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Move a component into shared ownership and bind its self-reference, so
/// that it can adopt children.
pub fn share<T: Component>(component: T) -> Arc<T> {
    let shared = Arc::new(component);
    let weak: Weak<T> = Arc::downgrade(&shared);
    let this = SelfRef {
        component: weak.clone(),
        object: weak,
    };
    if shared.component_base().this.set(this).is_err() {
        warn!("[share] component was already shared");
    }
    shared
}

struct SelfRef {
    component: Weak<dyn Component>,
    object: Weak<dyn Object>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Component Base
// ─────────────────────────────────────────────────────────────────────────────

/// State and default behavior shared by every component.
///
/// The child list is not meant to be mutated while an update pass is
/// traversing it; configure the tree before driving it.
#[mixr_class(
    name = "Component",
    factory = "Component",
    base = ObjectBase,
    slots = [
        "components",
        "select",
        "enableMessageType",
        "disableMessageType",
        "enableTimingStats",
        "printTimingStats",
    ]
)]
pub struct ComponentBase {
    object: ObjectBase,
    this: OnceLock<SelfRef>,
    container: RwLock<Option<Weak<dyn Component>>>,
    components: RwLock<Vec<Pair>>,
    selection: RwLock<Option<Selection>>,
    selected: RwLock<Option<Arc<dyn Component>>>,
    timing: Mutex<Option<Statistic>>,
    print_timing: AtomicBool,
    frozen: AtomicBool,
    shutdown: AtomicBool,
}

static COMPONENT_SLOTS: [SlotHandler<ComponentBase>; 9] = [
    SlotHandler::new(1, ValueKind::List, ComponentBase::slot_components),
    SlotHandler::new(1, ValueKind::Pair, ComponentBase::slot_components),
    SlotHandler::new(1, ValueKind::Component, ComponentBase::slot_components),
    SlotHandler::new(2, ValueKind::String, ComponentBase::slot_select),
    SlotHandler::new(2, ValueKind::Int, ComponentBase::slot_select),
    SlotHandler::new(3, ValueKind::Any, ComponentBase::slot_enable_message_type),
    SlotHandler::new(4, ValueKind::Any, ComponentBase::slot_disable_message_type),
    SlotHandler::new(5, ValueKind::Bool, ComponentBase::slot_enable_timing_stats),
    SlotHandler::new(6, ValueKind::Bool, ComponentBase::slot_print_timing_stats),
];

impl ComponentBase {
    pub fn new() -> Self {
        Self::with_metadata(Self::class_metadata())
    }

    pub fn with_metadata(metadata: &'static ClassMetadata) -> Self {
        Self {
            object: ObjectBase::with_metadata(metadata),
            this: OnceLock::new(),
            container: RwLock::new(None),
            components: RwLock::new(Vec::new()),
            selection: RwLock::new(None),
            selected: RwLock::new(None),
            timing: Mutex::new(None),
            print_timing: AtomicBool::new(false),
            frozen: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        }
    }

    /// The shared component this base belongs to, once bound by [`share`].
    pub fn this(&self) -> Option<Arc<dyn Component>> {
        self.this.get().and_then(|this| this.component.upgrade())
    }

    /// Copy configuration from `other`: message masks, flags, selection
    /// criterion and copies of its children. Call on a shared component.
    pub fn copy_data(&self, other: &ComponentBase) {
        self.object.messages().copy_from(other.object.messages());
        self.freeze(other.is_frozen());
        self.set_timing_stats_enabled(other.is_timing_stats_enabled());
        self.set_print_timing_stats(other.print_timing.load(Ordering::Relaxed));

        let children: Vec<Value> = other
            .components()
            .into_iter()
            .filter_map(|pair| match pair.component.clone_component() {
                Some(copy) => Some(Value::pair(pair.name, copy)),
                None => {
                    warn!(
                        "[copy_data] child '{}' ({}) is not copyable",
                        pair.name,
                        pair.component.metadata().class_name()
                    );
                    None
                }
            })
            .collect();

        *self.selection.write() = other.selection();
        self.process_components(&children, None, None, None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Container
    // ─────────────────────────────────────────────────────────────────────────

    pub fn container(&self) -> Option<Arc<dyn Component>> {
        self.container.read().as_ref().and_then(Weak::upgrade)
    }

    fn set_container(&self, container: Option<Weak<dyn Component>>) {
        *self.container.write() = container;
    }

    fn is_container_of(&self, child: &ComponentBase) -> bool {
        let Some(this) = self.this.get() else {
            return false;
        };
        child
            .container
            .read()
            .as_ref()
            .is_some_and(|container| std::ptr::addr_eq(container.as_ptr(), this.component.as_ptr()))
    }

    /// True if `candidate` is this component or one of its containers.
    fn would_cycle(&self, candidate: &Arc<dyn Component>) -> bool {
        let candidate_ptr = Arc::as_ptr(candidate);
        if self
            .this
            .get()
            .is_some_and(|this| std::ptr::addr_eq(this.component.as_ptr(), candidate_ptr))
        {
            return true;
        }
        let mut current = self.container();
        while let Some(container) = current {
            if std::ptr::addr_eq(Arc::as_ptr(&container), candidate_ptr) {
                return true;
            }
            current = container.component_base().container();
        }
        false
    }

    /// Take `child` over; a child belongs to one container at a time, so it
    /// leaves any other container's list first.
    fn adopt(&self, child: &Arc<dyn Component>) {
        if let Some(previous) = child.component_base().container() {
            let is_self = self
                .this
                .get()
                .is_some_and(|this| std::ptr::addr_eq(this.component.as_ptr(), Arc::as_ptr(&previous)));
            if !is_self {
                previous.component_base().remove_child(child);
            }
        }

        let this = self.this.get();
        if this.is_none() {
            debug!("[adopt] container is not shared; child keeps no back-reference");
        }
        child
            .component_base()
            .set_container(this.map(|this| this.component.clone()));
        child
            .object_base()
            .set_message_parent(this.map(|this| this.object.clone()));
    }

    fn release(&self, child: &Arc<dyn Component>) {
        let base = child.component_base();
        if self.is_container_of(base) {
            base.set_container(None);
            child.object_base().set_message_parent(None);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Children
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a named child and take ownership of it.
    ///
    /// Fails if the child is this component or one of its containers.
    pub fn add_component(&self, name: impl Into<String>, child: Arc<dyn Component>) -> bool {
        let name = name.into();
        if self.would_cycle(&child) {
            error!("[add_component] '{}' would contain itself", name);
            return false;
        }
        self.adopt(&child);
        self.components.write().push(Pair::new(name, child));
        self.resolve_selection();
        true
    }

    /// Append a child given as a named component value or a bare component.
    pub fn add_component_value(&self, value: &Value) -> bool {
        let position = self.number_of_components() + 1;
        match Pair::from_value(value, position) {
            Some(pair) => self.add_component(pair.name, pair.component),
            None => {
                error!("[add_component] {} is not a component", value.type_name());
                false
            }
        }
    }

    /// Rebuild the child list from `list`.
    ///
    /// Entries that are not components, or whose class is not `filter` (or a
    /// subclass of it), are left out and returned to the caller so a derived
    /// class can hand them to its own handling. `add` is appended and the
    /// child named `remove` is dropped. Afterwards the stored selection is
    /// resolved again against the new list.
    pub fn process_components(
        &self,
        list: &[Value],
        filter: Option<&ClassMetadata>,
        add: Option<Pair>,
        remove: Option<&str>,
    ) -> Vec<Value> {
        let mut accepted = Vec::with_capacity(list.len() + 1);
        let mut rejected = Vec::new();

        for (i, item) in list.iter().enumerate() {
            match Pair::from_value(item, i + 1) {
                Some(pair) if self.would_cycle(pair.component()) => {
                    error!("[process_components] '{}' would contain itself", pair.name);
                    rejected.push(item.clone());
                }
                Some(pair) if filter.is_none_or(|class| pair.component.is_class_type(class)) => {
                    accepted.push(pair);
                }
                Some(pair) => {
                    if self.object.is_message_enabled(MessageType::WARNING) {
                        warn!(
                            "[process_components] '{}' is a {}, not a {}",
                            pair.name,
                            pair.component.metadata().class_name(),
                            filter.map_or("", ClassMetadata::class_name)
                        );
                    }
                    rejected.push(item.clone());
                }
                None => {
                    error!("[process_components] {} is not a component", item.type_name());
                    rejected.push(item.clone());
                }
            }
        }

        accepted.extend(add);
        if let Some(name) = remove {
            accepted.retain(|pair| pair.name != name);
        }

        for pair in &accepted {
            self.adopt(&pair.component);
        }
        let previous = std::mem::replace(&mut *self.components.write(), accepted);

        let current = self.components();
        for old in previous
            .iter()
            .filter(|old| !current.iter().any(|pair| same_component(&pair.component, &old.component)))
        {
            self.release(&old.component);
        }

        self.resolve_selection();
        rejected
    }

    /// Remove the child named `name`, releasing its back-reference.
    pub fn remove_component(&self, name: &str) -> bool {
        let removed = {
            let mut components = self.components.write();
            components
                .iter()
                .position(|pair| pair.name == name)
                .map(|index| components.remove(index))
        };
        match removed {
            Some(pair) => {
                self.release(&pair.component);
                self.resolve_selection();
                true
            }
            None => false,
        }
    }

    /// Remove every entry holding `child`, releasing its back-reference.
    pub fn remove_child(&self, child: &Arc<dyn Component>) -> bool {
        let removed = {
            let mut components = self.components.write();
            let before = components.len();
            components.retain(|pair| !same_component(&pair.component, child));
            components.len() != before
        };
        if removed {
            self.release(child);
            self.resolve_selection();
        }
        removed
    }

    /// Snapshot of the child list.
    pub fn components(&self) -> Vec<Pair> {
        self.components.read().clone()
    }

    pub fn number_of_components(&self) -> usize {
        self.components.read().len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    fn find_child(&self, name: &str) -> Option<Pair> {
        self.components
            .read()
            .iter()
            .find(|pair| pair.name == name)
            .cloned()
    }

    fn find_descendant(&self, name: &str) -> Option<Pair> {
        if let Some(pair) = self.find_child(name) {
            return Some(pair);
        }
        self.components()
            .iter()
            .find_map(|pair| pair.component.component_base().find_descendant(name))
    }

    /// Resolve a child by name.
    ///
    /// - `"xxx"`: a direct child, else the first match in each child's subtree
    /// - `".xxx"`: a direct child only
    /// - `"xxx.yyy"`: `xxx` as above, then `yyy` as a direct child of it
    pub fn find_by_name(&self, name: &str) -> Option<Pair> {
        let (direct_only, path) = match name.strip_prefix('.') {
            Some(rest) => (true, rest),
            None => (false, name),
        };

        let mut segments = path.split('.');
        let first = segments.next().filter(|segment| !segment.is_empty())?;
        let mut found = if direct_only {
            self.find_child(first)?
        } else {
            self.find_descendant(first)?
        };

        for segment in segments {
            found = found.component.component_base().find_child(segment)?;
        }
        Some(found)
    }

    /// 1-based lookup into the direct child list.
    pub fn find_by_index(&self, index: usize) -> Option<Pair> {
        index
            .checked_sub(1)
            .and_then(|i| self.components.read().get(i).cloned())
    }

    /// First descendant whose class is `class` or derives from it; direct
    /// children are checked before their subtrees.
    pub fn find_by_type(&self, class: &ClassMetadata) -> Option<Pair> {
        let components = self.components();
        if let Some(pair) = components
            .iter()
            .find(|pair| pair.component.is_class_type(class))
        {
            return Some(pair.clone());
        }
        components
            .iter()
            .find_map(|pair| pair.component.component_base().find_by_type(class))
    }

    /// Nearest container (walking upward) whose class is `class`.
    pub fn find_container_by_type(&self, class: &ClassMetadata) -> Option<Arc<dyn Component>> {
        let mut current = self.container();
        while let Some(container) = current {
            if container.is_class_type(class) {
                return Some(container);
            }
            current = container.component_base().container();
        }
        None
    }

    /// Dotted path of `target` relative to this component.
    pub fn find_name_of_component(&self, target: &dyn Component) -> Option<String> {
        let components = self.components();

        if let Some(pair) = components
            .iter()
            .find(|pair| std::ptr::addr_eq(Arc::as_ptr(&pair.component), target))
        {
            return Some(pair.name.clone());
        }

        components.iter().find_map(|pair| {
            pair.component
                .component_base()
                .find_name_of_component(target)
                .map(|sub| format!("{}.{}", pair.name, sub))
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a selection criterion and resolve it among the direct children.
    ///
    /// The criterion is kept even when it does not currently resolve, and is
    /// resolved again whenever the child list changes. `None` clears it.
    pub fn select(&self, selection: Option<Selection>) -> bool {
        *self.selection.write() = selection;
        self.resolve_selection()
    }

    pub fn select_by_name(&self, name: &str) -> bool {
        self.select(Some(Selection::Name(name.to_string())))
    }

    pub fn select_by_index(&self, index: usize) -> bool {
        self.select(Some(Selection::Index(index)))
    }

    fn resolve_selection(&self) -> bool {
        let selection = self.selection.read().clone();
        let resolved = match &selection {
            Some(Selection::Name(name)) => self.find_child(name),
            Some(Selection::Index(index)) => self.find_by_index(*index),
            None => None,
        }
        .map(|pair| pair.component);

        let found = resolved.is_some();
        if let (Some(selection), false) = (&selection, found) {
            debug!("[select] {:?} is not a child (yet)", selection);
        }
        *self.selected.write() = resolved;
        found
    }

    pub fn is_component_selected(&self) -> bool {
        self.selection.read().is_some()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection.read().clone()
    }

    pub fn selected_component(&self) -> Option<Arc<dyn Component>> {
        self.selected.read().clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Updates
    // ─────────────────────────────────────────────────────────────────────────

    pub fn update_tc(&self, dt: f64) {
        if let Some(selected) = self.selected_component() {
            selected.tc_frame(dt);
            return;
        }
        for pair in self.components() {
            pair.component.tc_frame(dt);
        }
    }

    pub fn update_data(&self, dt: f64) {
        if let Some(selected) = self.selected_component() {
            selected.update_data(dt);
            return;
        }
        for pair in self.components() {
            pair.component.update_data(dt);
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Relaxed)
    }

    /// Frozen components are still updated every frame; their update logic
    /// is expected to treat `dt` as zero.
    pub fn freeze(&self, frozen: bool) {
        self.frozen.store(frozen, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn is_not_shutdown(&self) -> bool {
        !self.is_shutdown()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Timing statistics
    // ─────────────────────────────────────────────────────────────────────────

    /// Enabling creates a fresh accumulator; disabling discards it.
    pub fn set_timing_stats_enabled(&self, enabled: bool) {
        let mut timing = self.timing.lock();
        match (enabled, timing.is_some()) {
            (true, false) => *timing = Some(Statistic::new()),
            (false, _) => *timing = None,
            _ => {}
        }
    }

    pub fn is_timing_stats_enabled(&self) -> bool {
        self.timing.lock().is_some()
    }

    pub fn set_print_timing_stats(&self, enabled: bool) {
        self.print_timing.store(enabled, Ordering::Relaxed);
    }

    pub fn is_timing_stats_print_enabled(&self) -> bool {
        self.print_timing.load(Ordering::Relaxed) && self.is_timing_stats_enabled()
    }

    /// Snapshot of the timing statistics, in milliseconds.
    pub fn timing_stats(&self) -> Option<Statistic> {
        self.timing.lock().clone()
    }

    pub fn record_frame_time(&self, millis: f64) {
        if let Some(stats) = self.timing.lock().as_mut() {
            stats.sigma(millis);
        }
    }

    /// Report the timing statistics once every [`TIMING_PRINT_INTERVAL`] samples.
    pub fn print_timing_stats(&self) {
        let timing = self.timing.lock();
        let Some(stats) = timing.as_ref() else {
            return;
        };
        if stats.n() % TIMING_PRINT_INTERVAL == 0 {
            info!(
                id = %self.object.id(),
                class = self.object.metadata().class_name(),
                dt_ms = stats.value(),
                mean_ms = stats.mean(),
                min_ms = stats.min(),
                max_ms = stats.max(),
                "timing"
            );
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Root of every component's event chain.
    ///
    /// Handles the reserved tokens, forwards unhandled key events to the
    /// container, and drops everything else. `this` is the most-derived
    /// component so overridden hooks are reached.
    pub fn handle_event<C>(&self, this: &C, token: EventToken, arg: Option<&Value>) -> bool
    where
        C: Component + ?Sized,
    {
        match token {
            SELECT => match arg {
                None => {
                    self.select(None);
                    true
                }
                Some(value) => self.slot_select(value),
            },
            RESET_EVENT => {
                this.reset();
                true
            }
            FREEZE_EVENT => match arg {
                None => {
                    this.freeze(!this.is_frozen());
                    true
                }
                Some(value) => match value.as_bool() {
                    Some(frozen) => {
                        this.freeze(frozen);
                        true
                    }
                    None => false,
                },
            },
            SHUTDOWN_EVENT => {
                self.shutdown.store(true, Ordering::SeqCst);
                if this.is_message_enabled(MessageType::INFO) {
                    info!("[shutdown] {} ({})", this.metadata().class_name(), this.id());
                }
                this.shutdown_notification()
            }
            token if is_key_event(token) => self
                .container()
                .is_some_and(|container| container.event(token, arg)),
            _ => false,
        }
    }

    /// Default shutdown hook: marks this component shut down and forwards
    /// the shutdown event to every child.
    pub fn shutdown_notification(&self) -> bool {
        self.shutdown.store(true, Ordering::SeqCst);
        for pair in self.components() {
            pair.component.event(SHUTDOWN_EVENT, None);
        }
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Slot handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn slot_components(&self, value: &Value) -> bool {
        let items = match value {
            Value::List(items) => items.clone(),
            other => vec![other.clone()],
        };
        self.process_components(&items, None, None, None).is_empty()
    }

    fn slot_select(&self, value: &Value) -> bool {
        match Selection::from_value(value) {
            Some(selection) => {
                self.select(Some(selection));
                true
            }
            None => false,
        }
    }

    fn slot_enable_message_type(&self, value: &Value) -> bool {
        message_types(value)
            .map(|kind| self.object.messages().enable(kind))
            .is_some()
    }

    fn slot_disable_message_type(&self, value: &Value) -> bool {
        message_types(value)
            .map(|kind| self.object.messages().disable(kind))
            .is_some()
    }

    fn slot_enable_timing_stats(&self, value: &Value) -> bool {
        value
            .as_bool()
            .map(|enabled| self.set_timing_stats_enabled(enabled))
            .is_some()
    }

    fn slot_print_timing_stats(&self, value: &Value) -> bool {
        value
            .as_bool()
            .map(|enabled| self.set_print_timing_stats(enabled))
            .is_some()
    }
}

/// Message types named by a string, given as a raw mask, or listed.
fn message_types(value: &Value) -> Option<MessageType> {
    match value {
        Value::String(name) => MessageType::from_name(name),
        Value::Int(bits) => u16::try_from(*bits).ok().map(MessageType::from_bits),
        Value::List(items) => items
            .iter()
            .try_fold(MessageType::NONE, |acc, item| Some(acc | message_types(item)?)),
        _ => None,
    }
}

impl Default for ComponentBase {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for ComponentBase {
    fn object_base(&self) -> &ObjectBase {
        &self.object
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn set_slot_by_index(&self, index: usize, value: &Value) -> bool {
        match Self::class_metadata().property_table().local_index(index) {
            Some(local) => dispatch_slot(&COMPONENT_SLOTS, self, local, value),
            None => self.object.set_slot_by_index(index, value),
        }
    }
}

impl Component for ComponentBase {
    fn component_base(&self) -> &ComponentBase {
        self
    }

    fn clone_component(&self) -> Option<Arc<dyn Component>> {
        let copy = share(ComponentBase::new());
        copy.copy_data(self);
        Some(copy)
    }
}
