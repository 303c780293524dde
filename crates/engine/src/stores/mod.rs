//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in the database:
//! - `DialogVarStore` - Free-text dialog answers per player and object

pub mod dialog_vars;

pub use dialog_vars::DialogVarStore;
