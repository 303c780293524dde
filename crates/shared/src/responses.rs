//! Response bodies returned by the engine's HTTP surface.

use serde::{Deserialize, Serialize};

/// Outcome of one state function invocation.
///
/// `next_state` is a state name or the `FSM_ERROR` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResponse {
    pub next_state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteVarResponse {
    pub success: bool,
}
