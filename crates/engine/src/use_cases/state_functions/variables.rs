//! State functions over persistent boolean player variables.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use iobj_domain::{encode_bool, BoolExpr, NextState, StoredBool};
use serde::Deserialize;

use super::{InvocationContext, StateFunction, StateFunctionError};
use crate::infrastructure::ports::VariableRepo;

/// Read a variable with the `"0"`/`"1"` convention.
///
/// Unreadable, missing and malformed values are false and logged.
async fn read_bool(vars: &dyn VariableRepo, ctx: &InvocationContext, name: &str) -> bool {
    let raw = match vars.read_var(name, &ctx.player_id, &ctx.owner()).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(
                var = %name,
                player_id = %ctx.player_id,
                error = %e,
                "Failed to read variable, assuming 0"
            );
            None
        }
    };

    let stored = StoredBool::from_stored(raw.as_deref());
    match &stored {
        StoredBool::Missing => {
            tracing::warn!(var = %name, player_id = %ctx.player_id, "Variable not set, assuming 0");
        }
        StoredBool::Malformed(value) => {
            tracing::warn!(
                var = %name,
                player_id = %ctx.player_id,
                value = %value,
                "Variable is not boolean, assuming 0"
            );
        }
        StoredBool::Set(_) => {}
    }
    stored.value()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlipBoolVarArgs {
    var: String,
    true_state: String,
    false_state: String,
}

pub struct FlipBoolVar {
    vars: Arc<dyn VariableRepo>,
}

impl FlipBoolVar {
    pub fn new(vars: Arc<dyn VariableRepo>) -> Self {
        Self { vars }
    }
}

#[async_trait]
impl StateFunction for FlipBoolVar {
    fn name(&self) -> &'static str {
        "flipBoolVar"
    }

    fn visible_name(&self) -> &'static str {
        "Flip Boolean Variable"
    }

    async fn call(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError> {
        let Some(args) = ctx.args::<FlipBoolVarArgs>() else {
            return Ok(NextState::Error);
        };

        let flipped = !read_bool(self.vars.as_ref(), ctx, &args.var).await;
        if let Err(e) = self
            .vars
            .write_var(&args.var, &ctx.player_id, &ctx.owner(), encode_bool(flipped))
            .await
        {
            tracing::error!(
                var = %args.var,
                player_id = %ctx.player_id,
                error = %e,
                "Failed to write flipped variable"
            );
            return Ok(NextState::Error);
        }

        Ok(NextState::state(if flipped {
            args.true_state
        } else {
            args.false_state
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestBooleanExprArgs {
    #[serde(default)]
    boolean_vars: Vec<String>,
    expr: String,
    true_state: String,
    false_state: String,
}

pub struct TestBooleanExpr {
    vars: Arc<dyn VariableRepo>,
}

impl TestBooleanExpr {
    pub fn new(vars: Arc<dyn VariableRepo>) -> Self {
        Self { vars }
    }
}

#[async_trait]
impl StateFunction for TestBooleanExpr {
    fn name(&self) -> &'static str {
        "testBooleanExpr"
    }

    fn visible_name(&self) -> &'static str {
        "Test Boolean Expression"
    }

    async fn call(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError> {
        let Some(args) = ctx.args::<TestBooleanExprArgs>() else {
            return Ok(NextState::Error);
        };

        let expr = match BoolExpr::parse(&args.expr) {
            Ok(expr) => expr,
            Err(e) => {
                tracing::error!(expr = %args.expr, error = %e, "Invalid boolean expression");
                return Ok(NextState::Error);
            }
        };

        let mut bindings = HashMap::with_capacity(args.boolean_vars.len());
        for name in &args.boolean_vars {
            let value = read_bool(self.vars.as_ref(), ctx, name).await;
            bindings.insert(name.clone(), value);
        }

        match expr.eval(&bindings) {
            Ok(true) => Ok(NextState::state(args.true_state)),
            Ok(false) => Ok(NextState::state(args.false_state)),
            Err(e) => {
                tracing::error!(expr = %args.expr, error = %e, "Failed to evaluate boolean expression");
                Ok(NextState::Error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::ports::{MockVariableRepo, RepoError};
    use crate::infrastructure::variables::SqliteVariableRepo;
    use crate::use_cases::state_functions::test_support::context;
    use iobj_domain::{ObjectId, PlayerId};
    use serde_json::json;

    fn flip_ctx() -> InvocationContext {
        context(
            "flipBoolVar",
            json!({"var": "lever", "trueState": "s_on", "falseState": "s_off"}),
        )
    }

    async fn sqlite(dir: &tempfile::TempDir) -> Arc<SqliteVariableRepo> {
        let path = dir.path().join("vars.db");
        Arc::new(
            SqliteVariableRepo::new(&path.to_string_lossy(), Arc::new(SystemClock::new()))
                .await
                .expect("open sqlite"),
        )
    }

    #[tokio::test]
    async fn flipping_twice_restores_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vars = sqlite(&dir).await;
        let player = PlayerId::from("alice");
        let owner = ObjectId::from("vault_door");
        vars.write_var("lever", &player, &owner, "0")
            .await
            .expect("seed");

        let sf = FlipBoolVar::new(vars.clone());
        assert_eq!(sf.call(&flip_ctx()).await.expect("call"), NextState::state("s_on"));
        assert_eq!(sf.call(&flip_ctx()).await.expect("call"), NextState::state("s_off"));

        let stored = vars.read_var("lever", &player, &owner).await.expect("read");
        assert_eq!(stored.as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn missing_variable_flips_to_true() {
        let mut vars = MockVariableRepo::new();
        vars.expect_read_var().returning(|_, _, _| Ok(None));
        vars.expect_write_var()
            .withf(|name, player, owner, value| {
                name == "lever"
                    && player.as_str() == "alice"
                    && owner.as_str() == "vault_door"
                    && value == "1"
            })
            .returning(|_, _, _, _| Ok(()));

        let sf = FlipBoolVar::new(Arc::new(vars));
        assert_eq!(sf.call(&flip_ctx()).await.expect("call"), NextState::state("s_on"));
    }

    #[tokio::test]
    async fn malformed_and_unreadable_values_count_as_false() {
        for read in [
            Ok(Some("yes".to_string())),
            Err(RepoError::database("read_var", "locked")),
        ] {
            let mut vars = MockVariableRepo::new();
            let read = std::sync::Mutex::new(Some(read));
            vars.expect_read_var().returning(move |_, _, _| {
                read.lock()
                    .expect("lock")
                    .take()
                    .unwrap_or(Ok(None))
            });
            vars.expect_write_var()
                .withf(|_, _, _, value| value == "1")
                .returning(|_, _, _, _| Ok(()));

            let sf = FlipBoolVar::new(Arc::new(vars));
            assert_eq!(sf.call(&flip_ctx()).await.expect("call"), NextState::state("s_on"));
        }
    }

    #[tokio::test]
    async fn write_failure_is_fsm_error() {
        let mut vars = MockVariableRepo::new();
        vars.expect_read_var()
            .returning(|_, _, _| Ok(Some("1".to_string())));
        vars.expect_write_var()
            .returning(|_, _, _, _| Err(RepoError::database("write_var", "read-only")));

        let sf = FlipBoolVar::new(Arc::new(vars));
        assert_eq!(sf.call(&flip_ctx()).await.expect("call"), NextState::Error);
    }

    fn vars_with(values: &'static [(&'static str, Option<&'static str>)]) -> MockVariableRepo {
        let mut vars = MockVariableRepo::new();
        vars.expect_read_var().returning(move |name, _, _| {
            Ok(values
                .iter()
                .find(|(n, _)| *n == name)
                .and_then(|(_, v)| v.map(String::from)))
        });
        vars
    }

    fn expr_ctx(expr: &str) -> InvocationContext {
        context(
            "testBooleanExpr",
            json!({
                "booleanVars": ["a", "b"],
                "expr": expr,
                "trueState": "s_yes",
                "falseState": "s_no"
            }),
        )
    }

    #[tokio::test]
    async fn expression_over_bound_variables() {
        let sf = TestBooleanExpr::new(Arc::new(vars_with(&[("a", Some("1")), ("b", Some("0"))])));

        assert_eq!(
            sf.call(&expr_ctx("return this.a && !this.b;")).await.expect("call"),
            NextState::state("s_yes")
        );
        assert_eq!(
            sf.call(&expr_ctx("a and b")).await.expect("call"),
            NextState::state("s_no")
        );
    }

    #[tokio::test]
    async fn missing_and_malformed_variables_are_false() {
        let sf = TestBooleanExpr::new(Arc::new(vars_with(&[("a", None), ("b", Some("2"))])));

        assert_eq!(
            sf.call(&expr_ctx("a || b")).await.expect("call"),
            NextState::state("s_no")
        );
    }

    #[tokio::test]
    async fn unknown_identifier_is_fsm_error() {
        let sf = TestBooleanExpr::new(Arc::new(vars_with(&[("a", Some("1")), ("b", Some("1"))])));

        assert_eq!(
            sf.call(&expr_ctx("a && c")).await.expect("call"),
            NextState::Error
        );
    }

    #[tokio::test]
    async fn unparsable_expression_is_fsm_error() {
        let sf = TestBooleanExpr::new(Arc::new(MockVariableRepo::new()));

        assert_eq!(
            sf.call(&expr_ctx("process.exit(1)")).await.expect("call"),
            NextState::Error
        );
    }

    #[tokio::test]
    async fn oversized_expression_is_fsm_error() {
        let sf = TestBooleanExpr::new(Arc::new(MockVariableRepo::new()));
        let chain = vec!["a"; 20_000].join("&&");

        assert_eq!(
            sf.call(&expr_ctx(&chain)).await.expect("call"),
            NextState::Error
        );
    }
}
