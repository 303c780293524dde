//! iobj Domain - vocabulary of the state-function engine.
//!
//! Everything here is pure: no I/O, no clock, no RNG. Time and randomness are
//! passed in by the engine so the same inputs always give the same outputs.

pub mod error;
pub mod expr;
pub mod ids;
pub mod next_state;
pub mod otp;
pub mod state_function;
pub mod value_objects;

pub use error::DomainError;
pub use expr::{BoolExpr, ExprError};
pub use ids::{ExtensionId, ObjectId, PlayerId};
pub use next_state::{NextState, FSM_ERROR};
pub use otp::{OtpError, TotpSecret};
pub use state_function::StateFunctionInfo;

pub use value_objects::{
    encode_bool, DialogText, MapCoord, OptionMap, ProblemBank, ProblemEntry, ProblemOption,
    ScopeSet, StoredBool, TokenClaims, FALSE_VALUE, TRUE_VALUE,
};
