//! # formtree
//!
//! A composable reactive form-tree toolkit.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `formtree` for the whole toolkit, or on individual
//! crates for finer-grained control.

/// Core types: error taxonomy, settings, and logging integration.
pub use formtree_core as core;

/// Form trees: nodes, value-accessor adapters, dynamic collections, and
/// schema-driven building.
#[cfg(feature = "forms")]
pub use formtree_forms as forms;

/// Loadable list store with switch-latest async semantics.
#[cfg(feature = "store")]
pub use formtree_store as store;
