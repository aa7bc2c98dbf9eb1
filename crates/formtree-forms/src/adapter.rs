//! [`ValueAccessorAdapter`] — embed a whole [`FormNode`] tree as one control.
//!
//! A parent form does not care whether a control is a single input or an
//! entire nested sub-form; it talks to the [`FormControl`] capability set
//! (read, write, change hook, touch hook, enable). The adapter implements
//! that set over one wrapped node, translating parent writes into silent
//! subtree state and forwarding the node's own changes upward through
//! hooks the parent registers after construction.
//!
//! Construction is two-phase by design: the adapter is built with no-op
//! hook slots and its node subscription is wired immediately and
//! permanently; the parent supplies real hooks afterwards. No circular
//! or lazy reference resolution is ever needed.

use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::node::{FormNode, SetOptions};

/// Hook invoked with the control's current value on every change.
pub type ChangeHook = Box<dyn Fn(&Value) + Send + Sync>;

/// Hook invoked when the control is touched.
pub type TouchHook = Box<dyn Fn() + Send + Sync>;

/// Structured token returned by [`FormControl::validate`] when the
/// control is invalid. Parents aggregate these into their own error set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlError {
    /// A short code naming the failure (e.g. `"invalid"`).
    pub code: String,
}

impl ControlError {
    /// Creates a new `ControlError` with the given code.
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// The minimal capability set a parent form tree composes over.
///
/// Anything implementing this trait — a single wrapped node, a dynamic
/// collection of sub-forms — is indistinguishable, from the parent's
/// perspective, from a plain input control.
pub trait FormControl: Send + Sync {
    /// Reads the control's current value.
    fn value(&self) -> Value;

    /// Writes a value originating from the parent.
    ///
    /// Silence is mandatory: this must never re-trigger the parent's own
    /// registered change hook, or parent and child would notify each other
    /// forever.
    fn write_value(&self, value: Value);

    /// Registers the change hook. Replaces any prior registration
    /// (single-parent attachment, last registration wins).
    fn register_on_change(&self, hook: ChangeHook);

    /// Registers the touch hook. Replaces any prior registration.
    fn register_on_touched(&self, hook: TouchHook);

    /// Enables or disables the control. A disabled control keeps its last
    /// value but is excluded from the parent's validity aggregation.
    fn set_disabled(&self, disabled: bool);

    /// Returns a structured error token when the control is invalid.
    fn validate(&self) -> Option<ControlError>;
}

pub(crate) struct Hooks {
    pub on_change: ChangeHook,
    pub on_touched: TouchHook,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            on_change: Box::new(|_| {}),
            on_touched: Box::new(|| {}),
        }
    }
}

/// Adapts one [`FormNode`] to the [`FormControl`] contract.
pub struct ValueAccessorAdapter {
    node: FormNode,
    hooks: Arc<RwLock<Hooks>>,
}

impl ValueAccessorAdapter {
    /// Wraps a node, wiring the internal subscription immediately.
    ///
    /// Every non-silent change of the wrapped node invokes the currently
    /// registered change hook with the node's value, then the touch hook —
    /// in that order, exactly once per discrete change. The wiring is
    /// permanent for the adapter's lifetime.
    pub fn new(node: FormNode) -> Self {
        let hooks: Arc<RwLock<Hooks>> = Arc::new(RwLock::new(Hooks::default()));
        let wired = Arc::clone(&hooks);
        node.subscribe(move |value| {
            let hooks = wired.read().expect("hook lock poisoned");
            (hooks.on_change)(value);
            (hooks.on_touched)();
        });
        Self { node, hooks }
    }

    /// Returns the wrapped node.
    pub fn node(&self) -> &FormNode {
        &self.node
    }

    /// Returns `true` if the wrapped node is valid.
    pub fn is_valid(&self) -> bool {
        self.node.is_valid()
    }

    /// Marks the wrapped node as touched.
    pub fn mark_touched(&self) {
        self.node.mark_touched();
    }
}

impl FormControl for ValueAccessorAdapter {
    fn value(&self) -> Value {
        self.node.value()
    }

    fn write_value(&self, value: Value) {
        tracing::debug!("silent write from parent");
        self.node.set_value(value, SetOptions { silent: true });
    }

    fn register_on_change(&self, hook: ChangeHook) {
        self.hooks.write().expect("hook lock poisoned").on_change = hook;
    }

    fn register_on_touched(&self, hook: TouchHook) {
        self.hooks.write().expect("hook lock poisoned").on_touched = hook;
    }

    fn set_disabled(&self, disabled: bool) {
        self.node.set_enabled(!disabled);
    }

    fn validate(&self) -> Option<ControlError> {
        if self.node.is_valid() {
            None
        } else {
            Some(ControlError::new("invalid"))
        }
    }
}
