use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;

/// Identifies a state function entry.
///
/// In a registry listing `name` is the registered function name and
/// `visible_name` its label. When the host invokes a function it passes the
/// calling object's info instead: `name` is the owning object id and
/// `visible_name` is the title shown on dialogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateFunctionInfo {
    pub name: String,
    pub visible_name: String,
}

impl StateFunctionInfo {
    pub fn new(name: impl Into<String>, visible_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible_name: visible_name.into(),
        }
    }

    /// Owner of persistent and dialog variables touched by this invocation.
    pub fn owner(&self) -> ObjectId {
        ObjectId::new(self.name.clone())
    }
}
