//! External write entry point for persistent player variables.

use std::sync::Arc;

use iobj_domain::{ObjectId, PlayerId};

use crate::infrastructure::ports::{RepoError, VariableRepo};

/// Lets an authenticated outside party set a player variable.
///
/// No validation happens here; the HTTP layer checks the API key.
pub struct WriteVar {
    vars: Arc<dyn VariableRepo>,
}

impl WriteVar {
    pub fn new(vars: Arc<dyn VariableRepo>) -> Self {
        Self { vars }
    }

    pub async fn execute(
        &self,
        var_name: &str,
        value: &str,
        player_id: &PlayerId,
        object_id: &ObjectId,
    ) -> Result<(), RepoError> {
        self.vars
            .write_var(var_name, player_id, object_id, value)
            .await?;
        tracing::info!(
            var = %var_name,
            player_id = %player_id,
            object_id = %object_id,
            "Variable written by external party"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::ports::MockVariableRepo;
    use crate::infrastructure::variables::SqliteVariableRepo;

    #[tokio::test]
    async fn written_value_reads_back_identically() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vars.db");
        let vars = Arc::new(
            SqliteVariableRepo::new(&path.to_string_lossy(), Arc::new(SystemClock::new()))
                .await
                .expect("open sqlite"),
        );
        let player = PlayerId::from("alice");
        let object = ObjectId::from("vault_door");

        WriteVar::new(vars.clone())
            .execute("motto", "  ünïcode & spaces ", &player, &object)
            .await
            .expect("write");

        let stored = vars.read_var("motto", &player, &object).await.expect("read");
        assert_eq!(stored.as_deref(), Some("  ünïcode & spaces "));
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let mut vars = MockVariableRepo::new();
        vars.expect_write_var()
            .returning(|_, _, _, _| Err(RepoError::database("write_var", "disk full")));

        let result = WriteVar::new(Arc::new(vars))
            .execute("x", "1", &PlayerId::from("p"), &ObjectId::from("o"))
            .await;
        assert!(matches!(result, Err(RepoError::Database { .. })));
    }
}
