//! Repository port traits for persistent data.

use async_trait::async_trait;
use iobj_domain::{ObjectId, PlayerId, ProblemBank};

use super::error::RepoError;

// =============================================================================
// Player Variables
// =============================================================================

/// String variables keyed by `(name, player, owning object)`.
///
/// Reads of a never-written variable return `Ok(None)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VariableRepo: Send + Sync {
    async fn read_var(
        &self,
        name: &str,
        player_id: &PlayerId,
        owner: &ObjectId,
    ) -> Result<Option<String>, RepoError>;

    async fn write_var(
        &self,
        name: &str,
        player_id: &PlayerId,
        owner: &ObjectId,
        value: &str,
    ) -> Result<(), RepoError>;
}

// =============================================================================
// Content
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProblemBankRepo: Send + Sync {
    /// Load a problem bank by file name relative to the content root.
    async fn load(&self, file: &str) -> Result<ProblemBank, RepoError>;
}
