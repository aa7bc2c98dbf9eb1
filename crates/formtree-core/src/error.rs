//! Core error types for the formtree toolkit.
//!
//! Two kinds of failure live here and they are deliberately separate:
//!
//! - [`FormtreeError`] — structural errors (bad collection index, duplicate
//!   schema field names, serialization failures). These are returned as
//!   typed `Err` values, abort the offending operation with no partial
//!   mutation, and never invalidate the rest of the tree.
//! - [`ValidationError`] — per-field rule failures. These are never thrown;
//!   they surface as node state and are consumed by the rendering layer.

use std::fmt;

use thiserror::Error;

/// A single validation rule failure on a form node.
///
/// Validation errors carry a human-readable message and a short machine
/// code (e.g. `"required"`, `"email"`) that rendering layers can key
/// error templates on.
///
/// # Examples
///
/// ```
/// use formtree_core::error::ValidationError;
///
/// let err = ValidationError::new("This field is required.", "required");
/// assert_eq!(err.code, "required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The human-readable error message.
    pub message: String,
    /// A short code identifying the type of validation failure.
    pub code: String,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for structural failures in the formtree toolkit.
///
/// Structural errors are local and non-fatal: the tree or collection that
/// reported one remains fully usable, and the failed operation performed
/// no partial mutation.
#[derive(Error, Debug)]
pub enum FormtreeError {
    /// A collection edit addressed an index outside the live element range.
    #[error("index {index} is out of range for a collection of length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The collection length at the time of the call.
        len: usize,
    },

    /// A schema declared the same field name more than once.
    #[error("duplicate field name in schema: {0}")]
    DuplicateField(String),

    /// An error occurred during serialization or deserialization.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A convenience type alias for `Result<T, FormtreeError>`.
pub type FormtreeResult<T> = Result<T, FormtreeError>;
