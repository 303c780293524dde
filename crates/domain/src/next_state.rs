//! The value every state function resolves to.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire token for [`NextState::Error`].
pub const FSM_ERROR: &str = "FSM_ERROR";

/// Next state of an interactive object's FSM.
///
/// `Error` tells the host FSM to treat the transition as a failure (replay,
/// freeze, or route to its error state).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NextState {
    State(String),
    Error,
}

impl NextState {
    pub fn state(name: impl Into<String>) -> Self {
        Self::State(name.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Token sent back to the host.
    pub fn as_token(&self) -> &str {
        match self {
            Self::State(name) => name,
            Self::Error => FSM_ERROR,
        }
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        if token == FSM_ERROR {
            Self::Error
        } else {
            Self::State(token)
        }
    }
}

impl fmt::Display for NextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl Serialize for NextState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_token())
    }
}

impl<'de> Deserialize<'de> for NextState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from_token)
    }
}
