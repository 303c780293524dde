//! Request bodies accepted by the engine's HTTP surface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Info of the calling object's state, as the host sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateFunctionInfoDto {
    pub name: String,
    pub visible_name: String,
}

/// Another extension asks which state functions this engine provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvideStateFunctionsRequest {
    pub caller: String,
}

/// Run one state function for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeRequest {
    pub caller: String,
    pub player_id: String,
    pub function_name: String,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
    pub sf_info: StateFunctionInfoDto,
}

/// External (e2s) write of a player variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteVarRequest {
    pub var_name: String,
    pub value: String,
    pub player_id: String,
    pub object_id: String,
}
