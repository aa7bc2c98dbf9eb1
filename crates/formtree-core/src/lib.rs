//! # formtree-core
//!
//! Core types for the formtree toolkit. This crate has no toolkit
//! dependencies and provides the foundation for the form-tree and store
//! crates.
//!
//! ## Modules
//!
//! - [`error`] - Structural error types, validation error values, result aliases
//! - [`settings`] - Toolkit configuration
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;

// Re-export the most commonly used types at the crate root.
pub use error::{FormtreeError, FormtreeResult, ValidationError};
pub use settings::Settings;
