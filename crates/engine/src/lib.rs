//! iobj Engine library.
//!
//! State functions for interactive objects, plus the server that hosts them.
//!
//! ## Structure
//!
//! - `use_cases/` - state functions, their registry, and external writes
//! - `stores/` - in-memory session state (dialog variables)
//! - `infrastructure/` - ports and their adapters (SQLite, HTTP, WebSocket dialogs)
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
