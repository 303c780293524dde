//! Value objects - Immutable objects defined by their attributes

mod bool_var;
mod dialog_text;
mod map_coord;
mod option_map;
mod problem;
mod scopes;

// Boolean convention over player variables
pub use bool_var::{encode_bool, StoredBool, FALSE_VALUE, TRUE_VALUE};

// Kwargs building blocks
pub use dialog_text::DialogText;
pub use map_coord::MapCoord;
pub use option_map::OptionMap;

// Quiz content
pub use problem::{ProblemBank, ProblemEntry, ProblemOption};

// Permission scopes
pub use scopes::{ScopeSet, TokenClaims};
