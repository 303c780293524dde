//! Use cases - what hosts and outside parties can ask the engine to do.
//!
//! - `identify` - verifies who a player connection speaks for
//! - `registry` - lists and dispatches state functions
//! - `state_functions` - the FSM steps themselves
//! - `write_var` - external variable writes

pub mod identify;
pub mod registry;
pub mod state_functions;
pub mod write_var;

pub use identify::{IdentifyError, IdentifyPlayer};
pub use registry::StateFunctionRegistry;
pub use state_functions::{InvocationContext, Kwargs, StateFunction, StateFunctionError};
pub use write_var::WriteVar;
