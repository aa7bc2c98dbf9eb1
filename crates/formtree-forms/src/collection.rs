//! [`DynamicCollectionAdapter`] — a resizable ordered sequence of sub-forms
//! presented to the parent as one control.
//!
//! Each element is a [`ValueAccessorAdapter`] built from an element factory,
//! so the collection nests arbitrarily deep sub-form trees. Element order is
//! insertion order and element identity is purely positional: removing index
//! 2 of `[a, b, c, d]` yields `[a, b, d]` with `d` now at position 2, and a
//! full rewrite discards every prior element even when some incoming values
//! are structurally identical (identity-preserving diffing is out of scope).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use formtree_core::{FormtreeError, FormtreeResult};

use crate::adapter::{ChangeHook, ControlError, FormControl, Hooks, TouchHook, ValueAccessorAdapter};
use crate::node::FormNode;

/// Builds a fresh element node, optionally seeded with an initial value.
pub type ElementFactory = Arc<dyn Fn(Option<&Value>) -> FormNode + Send + Sync>;

/// An ordered, runtime-resizable collection of sub-form controls.
pub struct DynamicCollectionAdapter {
    factory: ElementFactory,
    elements: Arc<RwLock<Vec<ValueAccessorAdapter>>>,
    hooks: Arc<RwLock<Hooks>>,
    disabled: AtomicBool,
}

impl DynamicCollectionAdapter {
    /// Creates an empty collection with the given element factory.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(Option<&Value>) -> FormNode + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            elements: Arc::new(RwLock::new(Vec::new())),
            hooks: Arc::new(RwLock::new(Hooks::default())),
            disabled: AtomicBool::new(false),
        }
    }

    fn build_element(&self, initial: Option<&Value>) -> ValueAccessorAdapter {
        let element = ValueAccessorAdapter::new((self.factory)(initial));
        if self.disabled.load(Ordering::SeqCst) {
            element.set_disabled(true);
        }

        // An edit inside any element surfaces as one change of the whole
        // collection, carrying the full ordered snapshot. Element-to-
        // collection wiring uses weak references; the strong edges only
        // point from the collection to its elements, so dropping the
        // collection frees every element form tree.
        let elements = Arc::downgrade(&self.elements);
        let hooks = Arc::downgrade(&self.hooks);
        element.register_on_change(Box::new(move |_| {
            if let (Some(elements), Some(hooks)) = (elements.upgrade(), hooks.upgrade()) {
                let snapshot = snapshot_of(&elements);
                (hooks.read().expect("hook lock poisoned").on_change)(&snapshot);
            }
        }));
        let hooks = Arc::downgrade(&self.hooks);
        element.register_on_touched(Box::new(move || {
            if let Some(hooks) = hooks.upgrade() {
                (hooks.read().expect("hook lock poisoned").on_touched)();
            }
        }));
        element
    }

    /// Appends a new element seeded with `initial` or the factory default,
    /// then fires the collection's change hook with the new snapshot.
    pub fn insert(&self, initial: Option<Value>) {
        let element = self.build_element(initial.as_ref());
        self.elements
            .write()
            .expect("collection lock poisoned")
            .push(element);
        self.emit_change();
    }

    /// Detaches and discards the element at `index`; subsequent elements
    /// shift down one position. Fires the change hook once.
    ///
    /// An out-of-range index returns [`FormtreeError::IndexOutOfRange`]
    /// and performs no mutation.
    pub fn remove_at(&self, index: usize) -> FormtreeResult<()> {
        {
            let mut elements = self.elements.write().expect("collection lock poisoned");
            let len = elements.len();
            if index >= len {
                return Err(FormtreeError::IndexOutOfRange { index, len });
            }
            elements.remove(index);
        }
        self.emit_change();
        Ok(())
    }

    /// Discards every element and rebuilds one per input value, in order.
    ///
    /// This is the path taken when the parent writes a complete new value,
    /// so it fires no change hook (silence invariant) and never preserves
    /// prior element identities.
    pub fn replace_all(&self, values: &[Value]) {
        let rebuilt: Vec<ValueAccessorAdapter> = values
            .iter()
            .map(|value| self.build_element(Some(value)))
            .collect();
        *self.elements.write().expect("collection lock poisoned") = rebuilt;
    }

    /// Returns the ordered sequence of element values.
    pub fn value(&self) -> Value {
        snapshot_of(&self.elements)
    }

    /// Returns the live element count.
    pub fn len(&self) -> usize {
        self.elements
            .read()
            .expect("collection lock poisoned")
            .len()
    }

    /// Returns `true` if the collection holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` iff every element is valid. An empty collection is
    /// vacuously valid; no minimum-length rule is assumed.
    pub fn is_valid(&self) -> bool {
        self.elements
            .read()
            .expect("collection lock poisoned")
            .iter()
            .all(ValueAccessorAdapter::is_valid)
    }

    /// Marks every element's subtree as touched.
    pub fn mark_all_touched(&self) {
        for element in self
            .elements
            .read()
            .expect("collection lock poisoned")
            .iter()
        {
            element.node().mark_all_touched();
        }
    }

    fn emit_change(&self) {
        let snapshot = snapshot_of(&self.elements);
        let hooks = self.hooks.read().expect("hook lock poisoned");
        (hooks.on_change)(&snapshot);
        (hooks.on_touched)();
    }
}

fn snapshot_of(elements: &Arc<RwLock<Vec<ValueAccessorAdapter>>>) -> Value {
    let elements = elements.read().expect("collection lock poisoned");
    Value::Array(
        elements
            .iter()
            .map(|element| element.node().value())
            .collect(),
    )
}

impl FormControl for DynamicCollectionAdapter {
    fn value(&self) -> Value {
        snapshot_of(&self.elements)
    }

    fn write_value(&self, value: Value) {
        match value {
            Value::Array(values) => self.replace_all(&values),
            Value::Null => {}
            other => tracing::debug!(?other, "non-array write to a collection ignored"),
        }
    }

    fn register_on_change(&self, hook: ChangeHook) {
        self.hooks.write().expect("hook lock poisoned").on_change = hook;
    }

    fn register_on_touched(&self, hook: TouchHook) {
        self.hooks.write().expect("hook lock poisoned").on_touched = hook;
    }

    fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
        for element in self
            .elements
            .read()
            .expect("collection lock poisoned")
            .iter()
        {
            element.set_disabled(disabled);
        }
    }

    fn validate(&self) -> Option<ControlError> {
        if self.is_valid() {
            None
        } else {
            Some(ControlError::new("invalid_elements"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SetOptions;
    use crate::rules::Rule;
    use crate::schema::FieldType;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn address_factory(initial: Option<&Value>) -> FormNode {
        let node = FormNode::group(vec![
            ("street", FormNode::leaf("")),
            ("city", FormNode::leaf("")),
        ]);
        if let Some(value) = initial {
            node.write(value.clone());
        }
        node
    }

    fn number_collection() -> DynamicCollectionAdapter {
        DynamicCollectionAdapter::new(|initial: Option<&Value>| {
            FormNode::group(vec![(
                "x",
                FormNode::leaf(
                    initial
                        .and_then(|v| v.get("x"))
                        .cloned()
                        .unwrap_or(json!(0)),
                ),
            )])
        })
    }

    #[test]
    fn test_insert_appends_in_order() {
        let collection = number_collection();
        collection.insert(Some(json!({"x": 1})));
        collection.insert(Some(json!({"x": 2})));
        assert_eq!(collection.value(), json!([{"x": 1}, {"x": 2}]));
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_insert_without_initial_uses_factory_default() {
        let collection = number_collection();
        collection.insert(None);
        assert_eq!(collection.value(), json!([{"x": 0}]));
    }

    #[test]
    fn test_insert_then_remove_last_restores_prior_sequence() {
        let collection = number_collection();
        collection.insert(Some(json!({"x": 1})));
        collection.insert(Some(json!({"x": 2})));
        let before = collection.value();

        collection.insert(Some(json!({"x": 3})));
        collection.remove_at(collection.len() - 1).unwrap();
        assert_eq!(collection.value(), before);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_remove_shifts_subsequent_elements_down() {
        let collection = number_collection();
        for x in 1..=4 {
            collection.insert(Some(json!({ "x": x })));
        }
        collection.remove_at(2).unwrap();
        assert_eq!(collection.value(), json!([{"x": 1}, {"x": 2}, {"x": 4}]));
    }

    #[test]
    fn test_remove_out_of_range_reports_error_without_mutation() {
        let collection = number_collection();
        collection.insert(Some(json!({"x": 1})));
        let before = serde_json::to_string(&collection.value()).unwrap();

        let err = collection.remove_at(5).unwrap_err();
        assert!(matches!(
            err,
            FormtreeError::IndexOutOfRange { index: 5, len: 1 }
        ));
        assert_eq!(serde_json::to_string(&collection.value()).unwrap(), before);
    }

    #[test]
    fn test_replace_all_then_insert_yields_ordered_sequence() {
        let collection = number_collection();
        collection.replace_all(&[json!({"x": 1}), json!({"x": 2})]);
        collection.insert(Some(json!({"x": 3})));
        assert_eq!(collection.value(), json!([{"x": 1}, {"x": 2}, {"x": 3}]));
    }

    #[test]
    fn test_structural_edits_fire_change_with_full_snapshot() {
        let collection = number_collection();
        let snapshots = Arc::new(RwLock::new(Vec::new()));
        let s = Arc::clone(&snapshots);
        collection.register_on_change(Box::new(move |value| {
            s.write().unwrap().push(value.clone());
        }));

        collection.insert(Some(json!({"x": 1})));
        collection.insert(Some(json!({"x": 2})));
        collection.remove_at(0).unwrap();

        let snapshots = snapshots.read().unwrap();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[1], json!([{"x": 1}, {"x": 2}]));
        assert_eq!(snapshots[2], json!([{"x": 2}]));
    }

    #[test]
    fn test_write_value_is_silent() {
        let collection = number_collection();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        collection.register_on_change(Box::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        collection.write_value(json!([{"x": 1}, {"x": 2}]));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_element_edit_bubbles_as_collection_change() {
        let collection = DynamicCollectionAdapter::new(address_factory);
        collection.insert(Some(json!({"street": "First", "city": "Lima"})));

        let snapshots = Arc::new(RwLock::new(Vec::new()));
        let s = Arc::clone(&snapshots);
        collection.register_on_change(Box::new(move |value| {
            s.write().unwrap().push(value.clone());
        }));

        // Edit the street leaf of element 0 directly, as a user would.
        let element_value = collection.value();
        assert_eq!(element_value[0]["street"], json!("First"));
        let street = {
            let elements = collection.elements.read().unwrap();
            elements[0].node().child("street").unwrap()
        };
        street.set_value(json!("Second"), SetOptions::default());

        let snapshots = snapshots.read().unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0][0]["street"], json!("Second"));
    }

    #[test]
    fn test_empty_collection_is_vacuously_valid() {
        let collection = number_collection();
        assert!(collection.is_valid());
        assert!(collection.validate().is_none());
    }

    #[test]
    fn test_validity_is_conjunction_of_elements() {
        let collection = DynamicCollectionAdapter::new(|initial: Option<&Value>| {
            let node = FormNode::group(vec![(
                "email",
                FormNode::leaf_with_rules(
                    "",
                    vec![Rule::Required(FieldType::Email), Rule::Email],
                ),
            )]);
            if let Some(value) = initial {
                node.write(value.clone());
            }
            node
        });

        collection.insert(Some(json!({"email": "a@b.com"})));
        assert!(collection.is_valid());

        collection.insert(None);
        assert!(!collection.is_valid());
        assert_eq!(
            collection.validate(),
            Some(ControlError::new("invalid_elements"))
        );
    }

    #[test]
    fn test_dropping_the_collection_frees_its_elements() {
        let collection = number_collection();
        collection.insert(Some(json!({"x": 1})));
        collection.insert(Some(json!({"x": 2})));

        // A sentinel held only by listeners on the element nodes: it stays
        // alive exactly as long as the element form trees do.
        let sentinel = Arc::new(());
        let alive = Arc::downgrade(&sentinel);
        {
            let elements = collection.elements.read().unwrap();
            for element in elements.iter() {
                let held = Arc::clone(&sentinel);
                element.node().subscribe(move |_| {
                    let _ = &held;
                });
            }
        }
        drop(sentinel);
        assert!(alive.upgrade().is_some());

        drop(collection);
        assert!(
            alive.upgrade().is_none(),
            "element nodes must be freed with the collection"
        );
    }

    #[test]
    fn test_disabled_collection_disables_new_elements_too() {
        let collection = number_collection();
        collection.insert(None);
        collection.set_disabled(true);
        collection.insert(None);

        let elements = collection.elements.read().unwrap();
        assert!(elements.iter().all(|e| !e.node().is_enabled()));
    }
}
