//! # formtree-forms
//!
//! The form-tree core of the formtree toolkit: composable [`FormNode`]
//! trees, [`ValueAccessorAdapter`] for embedding a whole sub-form as one
//! control, [`DynamicCollectionAdapter`] for runtime-resizable collections
//! of sub-forms, and schema-driven form building with derived validation.

pub mod adapter;
pub mod collection;
pub mod node;
pub mod rules;
pub mod schema;

pub use adapter::{ChangeHook, ControlError, FormControl, TouchHook, ValueAccessorAdapter};
pub use collection::{DynamicCollectionAdapter, ElementFactory};
pub use node::{FormNode, Listener, SetOptions, SubscriptionId};
pub use rules::Rule;
pub use schema::{
    build_form, default_value_for, form_errors, rules_for, to_canonical_json, FieldOption,
    FieldSchema, FieldType,
};
