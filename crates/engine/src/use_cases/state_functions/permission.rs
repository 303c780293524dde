//! Branch on the scopes of the player's access token.

use std::sync::Arc;

use async_trait::async_trait;
use iobj_domain::{NextState, OptionMap, ScopeSet};
use serde::Deserialize;

use super::{InvocationContext, StateFunction, StateFunctionError};
use crate::infrastructure::ports::TokenPort;

/// Option key used when no scope matches.
pub const DEFAULT_OPTION: &str = "default";

#[derive(Debug, Deserialize)]
struct CheckPermissionArgs {
    /// `scope -> nextState`, first granted scope wins
    options: OptionMap,
}

pub struct CheckPermission {
    tokens: Arc<dyn TokenPort>,
}

impl CheckPermission {
    pub fn new(tokens: Arc<dyn TokenPort>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl StateFunction for CheckPermission {
    fn name(&self) -> &'static str {
        "checkPermission"
    }

    fn visible_name(&self) -> &'static str {
        "Check Permission"
    }

    async fn call(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError> {
        let Some(args) = ctx.args::<CheckPermissionArgs>() else {
            return Ok(NextState::Error);
        };

        let scopes = match self.tokens.get_token(&ctx.player_id).await {
            Ok(claims) => ScopeSet::from_claims(&claims),
            Err(e) => {
                tracing::warn!(
                    player_id = %ctx.player_id,
                    error = %e,
                    "Failed to fetch token, treating as no scopes"
                );
                ScopeSet::default()
            }
        };

        if let Some(next_state) = scopes.first_granted(&args.options) {
            return Ok(NextState::state(next_state));
        }
        match args.options.get(DEFAULT_OPTION) {
            Some(next_state) => Ok(NextState::state(next_state)),
            None => {
                tracing::warn!(
                    player_id = %ctx.player_id,
                    owner = %ctx.info.name,
                    "No scope matched and checkPermission has no default option"
                );
                Ok(NextState::Error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockTokenPort, TokenError};
    use crate::use_cases::state_functions::test_support::context;
    use iobj_domain::TokenClaims;
    use serde_json::{json, Value};

    fn token_with(claims: Value) -> MockTokenPort {
        let claims: TokenClaims = serde_json::from_value(claims).expect("claims");
        let mut tokens = MockTokenPort::new();
        tokens
            .expect_get_token()
            .withf(|player| player.as_str() == "alice")
            .returning(move |_| Ok(claims.clone()));
        tokens
    }

    fn admin_or_default() -> InvocationContext {
        context(
            "checkPermission",
            json!({"options": {"admin": "S1", "default": "S2"}}),
        )
    }

    #[tokio::test]
    async fn granted_scope_selects_its_state() {
        let sf = CheckPermission::new(Arc::new(token_with(json!({"scp": ["user", "admin"]}))));
        assert_eq!(
            sf.call(&admin_or_default()).await.expect("call"),
            NextState::state("S1")
        );
    }

    #[tokio::test]
    async fn no_granted_scope_falls_back_to_default() {
        let sf = CheckPermission::new(Arc::new(token_with(json!({"scp": ["user"]}))));
        assert_eq!(
            sf.call(&admin_or_default()).await.expect("call"),
            NextState::state("S2")
        );
    }

    #[tokio::test]
    async fn space_delimited_scope_string_is_accepted() {
        let sf = CheckPermission::new(Arc::new(token_with(json!({"scope": "user admin"}))));
        assert_eq!(
            sf.call(&admin_or_default()).await.expect("call"),
            NextState::state("S1")
        );
    }

    #[tokio::test]
    async fn first_option_in_configuration_order_wins() {
        let sf = CheckPermission::new(Arc::new(token_with(json!({"scp": ["staff", "admin"]}))));
        let ctx = context(
            "checkPermission",
            json!({"options": {"admin": "S_admin", "staff": "S_staff", "default": "S2"}}),
        );
        assert_eq!(sf.call(&ctx).await.expect("call"), NextState::state("S_admin"));
    }

    #[tokio::test]
    async fn token_failure_uses_default() {
        let mut tokens = MockTokenPort::new();
        tokens
            .expect_get_token()
            .returning(|_| Err(TokenError::RequestFailed("connection refused".into())));
        let sf = CheckPermission::new(Arc::new(tokens));
        assert_eq!(
            sf.call(&admin_or_default()).await.expect("call"),
            NextState::state("S2")
        );
    }

    #[tokio::test]
    async fn missing_default_is_fsm_error() {
        let sf = CheckPermission::new(Arc::new(token_with(json!({"scp": ["user"]}))));
        let ctx = context("checkPermission", json!({"options": {"admin": "S1"}}));
        assert_eq!(sf.call(&ctx).await.expect("call"), NextState::Error);
    }
}
