//! Schema-driven form building.
//!
//! A form is described as a flat list of [`FieldSchema`] records — plain,
//! JSON-serializable data — and [`build_form`] turns that list into a group
//! [`FormNode`] with per-field defaults and validation rules derived from
//! the schema flags. Schema order determines child declaration order, which
//! in turn fixes the key order of the exported JSON document.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use formtree_core::{FormtreeError, FormtreeResult, ValidationError};

use crate::node::FormNode;
use crate::rules::Rule;

/// The field kinds a schema can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Date,
    Select,
    Checkbox,
    Radio,
}

/// One choice of a select or radio field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Display label for the choice.
    pub label: String,
    /// The value stored when the choice is picked.
    pub value: Value,
}

/// Declarative description of a single form field.
///
/// Serializes with the camelCase/`type` key layout used by the JSON schema
/// documents this builder consumes, and round-trips losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Field name — unique within the schema, keys one leaf node.
    pub name: String,
    /// Human-readable label.
    #[serde(default)]
    pub label: String,
    /// The field type, controlling defaults and derived rules.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Explicit default value; when absent a type-derived default is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Whether the field is required.
    #[serde(default)]
    pub required: bool,
    /// Placeholder text for rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Choices for select/radio fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
}

impl FieldSchema {
    /// Creates a new schema entry with the label derived from the name.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        let label = name.replace('_', " ");
        Self {
            name,
            label,
            field_type,
            default_value: None,
            required: false,
            placeholder: None,
            options: None,
        }
    }

    /// Sets whether this field is required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets an explicit default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the placeholder text.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the choices for a select/radio field.
    pub fn options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }
}

/// Builds a flat group node from a field schema list.
///
/// Each schema entry yields one leaf child keyed by its name, seeded with
/// the explicit default or a type-derived one, carrying rules derived from
/// the schema flags. Duplicate names abort the build with
/// [`FormtreeError::DuplicateField`] and no partial tree.
pub fn build_form(schema: &[FieldSchema]) -> FormtreeResult<FormNode> {
    let mut seen = HashSet::new();
    let mut children = Vec::with_capacity(schema.len());
    for field in schema {
        if !seen.insert(field.name.as_str()) {
            return Err(FormtreeError::DuplicateField(field.name.clone()));
        }
        let default = field
            .default_value
            .clone()
            .unwrap_or_else(|| default_value_for(field.field_type));
        children.push((
            field.name.clone(),
            FormNode::leaf_with_rules(default, rules_for(field)),
        ));
    }
    Ok(FormNode::group(children))
}

/// Returns the type-derived default value for a field type.
pub fn default_value_for(field_type: FieldType) -> Value {
    match field_type {
        FieldType::Checkbox => Value::Bool(false),
        FieldType::Number => Value::from(0),
        FieldType::Text
        | FieldType::Email
        | FieldType::Date
        | FieldType::Select
        | FieldType::Radio => Value::String(String::new()),
    }
}

/// Derives the validation rules for a schema entry.
pub fn rules_for(field: &FieldSchema) -> Vec<Rule> {
    let mut rules = Vec::new();
    if field.required {
        rules.push(Rule::Required(field.field_type));
    }
    match field.field_type {
        FieldType::Email => rules.push(Rule::Email),
        FieldType::Date => rules.push(Rule::Date),
        _ => {}
    }
    rules
}

/// Serializes the fully-resolved form value to a canonical JSON document.
///
/// Key order equals declaration (schema) order, so the artifact is stable
/// across exports and suitable for persistence or download.
pub fn to_canonical_json(node: &FormNode) -> FormtreeResult<String> {
    Ok(serde_json::to_string_pretty(&node.value())?)
}

/// Debugging helper: the per-field errors of a built form.
pub fn form_errors(node: &FormNode) -> HashMap<String, Vec<ValidationError>> {
    node.errors()
}
