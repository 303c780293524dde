//! State functions - one FSM step each.
//!
//! Every function reads its configuration from the invocation's kwargs, talks
//! to ports, and resolves to a [`NextState`]. Expected failures (bad kwargs,
//! dialog timeouts, refused writes) become `NextState::Error` with a log line;
//! only content and deployment faults surface as [`StateFunctionError`].

use std::time::Duration;

use async_trait::async_trait;
use iobj_domain::{ExtensionId, NextState, ObjectId, PlayerId, StateFunctionInfo};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::infrastructure::ports::RepoError;

pub mod check_key;
pub mod dialog;
pub mod pacing;
pub mod permission;
pub mod quiz;
pub mod teleport;
pub mod variables;

pub use check_key::{ShowDialogAndCheckKey, ShowDialogAndCheckTotp};
pub use dialog::{EditDialog, ShowDialog};
pub use pacing::Sleep;
pub use permission::CheckPermission;
pub use quiz::AnswerProblems;
pub use teleport::Teleport;
pub use variables::{FlipBoolVar, TestBooleanExpr};

/// Upper bound on every player dialog.
pub const DIALOG_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-invocation configuration, in the order the author wrote it.
pub type Kwargs = Map<String, Value>;

/// Everything a state function gets for one call.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Extension that asked for the step
    pub caller: ExtensionId,
    pub player_id: PlayerId,
    /// Registered name of the function being invoked
    pub function: String,
    pub kwargs: Kwargs,
    /// Calling object's info: `name` owns variables, `visible_name` titles dialogs
    pub info: StateFunctionInfo,
}

impl InvocationContext {
    pub fn owner(&self) -> ObjectId {
        self.info.owner()
    }

    /// Deserialize kwargs into a function's argument struct.
    ///
    /// Invalid configuration is logged; callers turn `None` into `FSM_ERROR`.
    pub fn args<T: DeserializeOwned>(&self) -> Option<T> {
        match serde_json::from_value(Value::Object(self.kwargs.clone())) {
            Ok(args) => Some(args),
            Err(e) => {
                tracing::error!(
                    function = %self.function,
                    player_id = %self.player_id,
                    owner = %self.info.name,
                    error = %e,
                    "Invalid state function configuration"
                );
                None
            }
        }
    }
}

/// Faults that the host cannot route through its FSM.
#[derive(Debug, thiserror::Error)]
pub enum StateFunctionError {
    #[error("Unknown state function: {0}")]
    UnknownFunction(String),
    #[error("Content error: {0}")]
    Content(#[from] RepoError),
}

#[async_trait]
pub trait StateFunction: Send + Sync {
    /// Name hosts invoke the function by.
    fn name(&self) -> &'static str;

    /// Label shown to content authors.
    fn visible_name(&self) -> &'static str;

    async fn call(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError>;
}
