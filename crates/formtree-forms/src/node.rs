//! The [`FormNode`] primitive — one addressable unit of form state.
//!
//! A node is either a leaf holding a single JSON value or a group of named
//! child nodes in declaration order. Groups aggregate their children's
//! values into an object (declaration order is preserved in the output)
//! and their validity bottom-up.
//!
//! Nodes are cheaply cloneable handles: cloning a `FormNode` shares the
//! underlying state, so a group and an adapter can address the same node.
//! All mutation is synchronous; change listeners fire on every non-silent
//! write, and silent writes update state without notifying anyone in the
//! subtree. Listeners must not write back into the node that invoked them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use serde_json::{Map, Value};

use formtree_core::ValidationError;

use crate::rules::Rule;

/// The type signature for a value-change listener.
///
/// Listeners receive the node's current (aggregated) value and must be
/// `Send + Sync` so trees can be shared across task boundaries.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by [`FormNode::subscribe`], used to deregister.
pub type SubscriptionId = u64;

/// Options controlling a [`FormNode::set_value`] call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetOptions {
    /// When `true`, the write updates state without firing any change
    /// listeners in the subtree. Used for writes originating from a parent
    /// so the parent's own change handler is never re-entered.
    pub silent: bool,
}

enum NodeKind {
    Leaf { value: Value },
    Group { children: Vec<(String, FormNode)> },
}

struct NodeState {
    kind: NodeKind,
    rules: Vec<Rule>,
    touched: bool,
    enabled: bool,
}

struct NodeInner {
    state: RwLock<NodeState>,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_listener_id: AtomicU64,
}

impl NodeInner {
    fn value_locked(state: &NodeState) -> Value {
        match &state.kind {
            NodeKind::Leaf { value } => value.clone(),
            NodeKind::Group { children } => {
                let mut map = Map::new();
                for (name, child) in children {
                    map.insert(name.clone(), child.value());
                }
                Value::Object(map)
            }
        }
    }

    fn current_value(&self) -> Value {
        let state = self.state.read().expect("form node lock poisoned");
        Self::value_locked(&state)
    }

    /// Invokes all listeners, in registration order, with the current value.
    ///
    /// The listener list is snapshotted first so listeners may subscribe or
    /// read the node without holding any lock it already owns.
    fn notify(&self) {
        let value = self.current_value();
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .expect("form node lock poisoned")
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&value);
        }
    }
}

/// A composable unit of form state: a leaf value or a named group of
/// child nodes, with a validity flag and a touched flag.
#[derive(Clone)]
pub struct FormNode {
    inner: Arc<NodeInner>,
}

impl std::fmt::Debug for FormNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormNode").finish_non_exhaustive()
    }
}

impl FormNode {
    fn from_state(state: NodeState) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                state: RwLock::new(state),
                listeners: RwLock::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a leaf node with no validation rules.
    pub fn leaf(value: impl Into<Value>) -> Self {
        Self::leaf_with_rules(value, Vec::new())
    }

    /// Creates a leaf node with the given validation rules.
    pub fn leaf_with_rules(value: impl Into<Value>, rules: Vec<Rule>) -> Self {
        Self::from_state(NodeState {
            kind: NodeKind::Leaf {
                value: value.into(),
            },
            rules,
            touched: false,
            enabled: true,
        })
    }

    /// Creates a group node from named children, in declaration order.
    ///
    /// Every declared child key exists from construction onward, so a
    /// missing key in an incoming value never means an absent node. The
    /// group subscribes to each child so that a direct child edit re-emits
    /// as one change of the group's aggregated value.
    pub fn group<S: Into<String>>(children: Vec<(S, FormNode)>) -> Self {
        let children: Vec<(String, FormNode)> = children
            .into_iter()
            .map(|(name, child)| (name.into(), child))
            .collect();
        let handles: Vec<FormNode> = children.iter().map(|(_, child)| child.clone()).collect();
        let node = Self::from_state(NodeState {
            kind: NodeKind::Group { children },
            rules: Vec::new(),
            touched: false,
            enabled: true,
        });

        // Child-to-parent wiring uses a weak reference; the strong edges
        // only point downward, so no reference cycle forms.
        let weak = Arc::downgrade(&node.inner);
        for child in handles {
            let weak = Weak::clone(&weak);
            child.subscribe(move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.notify();
                }
            });
        }
        node
    }

    /// Returns the node's current value.
    ///
    /// For a group this is an object aggregating all children in
    /// declaration order.
    pub fn value(&self) -> Value {
        self.inner.current_value()
    }

    /// Overwrites the node's value.
    ///
    /// A leaf replaces its value wholesale. A group distributes the fields
    /// of an incoming object to children by key; unmatched children keep
    /// their prior value and unknown incoming keys are ignored. Writing
    /// `null` to a group leaves it unchanged.
    ///
    /// Non-silent writes notify this node's listeners exactly once; the
    /// distribution to children is always silent so one discrete change
    /// emits one event. A non-silent write on a disabled node is rejected
    /// with no mutation (programmatic silent writes still apply).
    pub fn set_value(&self, value: Value, opts: SetOptions) {
        {
            let mut state = self.inner.state.write().expect("form node lock poisoned");
            if !state.enabled && !opts.silent {
                tracing::warn!("edit rejected: node is disabled");
                return;
            }
            match &mut state.kind {
                NodeKind::Leaf { value: current } => *current = value,
                NodeKind::Group { children } => match value {
                    Value::Object(map) => {
                        for (name, child) in children.iter() {
                            if let Some(incoming) = map.get(name) {
                                child.set_value(incoming.clone(), SetOptions { silent: true });
                            }
                        }
                    }
                    Value::Null => return,
                    other => {
                        tracing::debug!(?other, "non-object write to a group ignored");
                        return;
                    }
                },
            }
        }
        if !opts.silent {
            self.inner.notify();
        }
    }

    /// Convenience for the silent programmatic write (`writeValue` path).
    pub fn write(&self, value: Value) {
        self.set_value(value, SetOptions { silent: true });
    }

    /// Registers a listener invoked on every non-silent value change.
    ///
    /// Listeners are serviced in registration order. Returns a handle for
    /// [`FormNode::unsubscribe`].
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.inner
            .listeners
            .write()
            .expect("form node lock poisoned")
            .push((id, Arc::new(listener)));
        id
    }

    /// Deregisters a listener. Returns `true` if one was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .inner
            .listeners
            .write()
            .expect("form node lock poisoned");
        let len_before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() < len_before
    }

    /// Returns `true` if the node's own rules and every enabled child pass.
    ///
    /// A disabled node is vacuously valid, which excludes it from its
    /// parent's aggregation.
    pub fn is_valid(&self) -> bool {
        let state = self.inner.state.read().expect("form node lock poisoned");
        if !state.enabled {
            return true;
        }
        let value = NodeInner::value_locked(&state);
        if state.rules.iter().any(|rule| rule.check(&value).is_some()) {
            return false;
        }
        match &state.kind {
            NodeKind::Leaf { .. } => true,
            NodeKind::Group { children } => children.iter().all(|(_, child)| child.is_valid()),
        }
    }

    /// Returns the failures of this node's own rules (empty when disabled).
    pub fn own_errors(&self) -> Vec<ValidationError> {
        let state = self.inner.state.read().expect("form node lock poisoned");
        if !state.enabled {
            return Vec::new();
        }
        let value = NodeInner::value_locked(&state);
        state
            .rules
            .iter()
            .filter_map(|rule| rule.check(&value))
            .collect()
    }

    /// Returns per-child validation errors for a group, keyed by child name.
    ///
    /// Enabled children only; an invalid child group with no own-rule
    /// failures reports a single `"invalid"` token. For a leaf the map is
    /// empty — use [`FormNode::own_errors`].
    pub fn errors(&self) -> HashMap<String, Vec<ValidationError>> {
        let state = self.inner.state.read().expect("form node lock poisoned");
        let mut errors = HashMap::new();
        if let NodeKind::Group { children } = &state.kind {
            for (name, child) in children {
                if child.is_valid() {
                    continue;
                }
                let mut child_errors = child.own_errors();
                if child_errors.is_empty() {
                    child_errors.push(ValidationError::new("Contains invalid fields.", "invalid"));
                }
                errors.insert(name.clone(), child_errors);
            }
        }
        errors
    }

    /// Returns the named child of a group node.
    pub fn child(&self, name: &str) -> Option<FormNode> {
        let state = self.inner.state.read().expect("form node lock poisoned");
        match &state.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Group { children } => children
                .iter()
                .find(|(child_name, _)| child_name == name)
                .map(|(_, child)| child.clone()),
        }
    }

    /// Returns the child names of a group in declaration order.
    pub fn child_names(&self) -> Vec<String> {
        let state = self.inner.state.read().expect("form node lock poisoned");
        match &state.kind {
            NodeKind::Leaf { .. } => Vec::new(),
            NodeKind::Group { children } => {
                children.iter().map(|(name, _)| name.clone()).collect()
            }
        }
    }

    /// Returns `true` if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.inner
                .state
                .read()
                .expect("form node lock poisoned")
                .kind,
            NodeKind::Leaf { .. }
        )
    }

    /// Returns `true` if the node has been touched.
    pub fn touched(&self) -> bool {
        self.inner
            .state
            .read()
            .expect("form node lock poisoned")
            .touched
    }

    /// Marks this node as touched. Does not bubble or recurse.
    pub fn mark_touched(&self) {
        self.inner
            .state
            .write()
            .expect("form node lock poisoned")
            .touched = true;
    }

    /// Marks this node and its whole subtree as touched, in declaration
    /// order. Used before surfacing validation errors on submit.
    pub fn mark_all_touched(&self) {
        let children = {
            let mut state = self.inner.state.write().expect("form node lock poisoned");
            state.touched = true;
            match &state.kind {
                NodeKind::Leaf { .. } => Vec::new(),
                NodeKind::Group { children } => {
                    children.iter().map(|(_, child)| child.clone()).collect()
                }
            }
        };
        for child in children {
            child.mark_all_touched();
        }
    }

    /// Returns `true` if the node is enabled.
    pub fn is_enabled(&self) -> bool {
        self.inner
            .state
            .read()
            .expect("form node lock poisoned")
            .enabled
    }

    /// Enables or disables this node and its whole subtree.
    ///
    /// A disabled node keeps its last value, is excluded from its parent's
    /// validity aggregation, and rejects non-silent (user-edit) writes.
    pub fn set_enabled(&self, enabled: bool) {
        let children = {
            let mut state = self.inner.state.write().expect("form node lock poisoned");
            state.enabled = enabled;
            match &state.kind {
                NodeKind::Leaf { .. } => Vec::new(),
                NodeKind::Group { children } => {
                    children.iter().map(|(_, child)| child.clone()).collect()
                }
            }
        };
        for child in children {
            child.set_enabled(enabled);
        }
    }
}
