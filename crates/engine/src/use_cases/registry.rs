//! State function registry and dispatcher.

use std::collections::HashMap;
use std::sync::Arc;

use iobj_domain::{ExtensionId, NextState, StateFunctionInfo};

use super::state_functions::{InvocationContext, StateFunction, StateFunctionError};

/// Name-keyed table of every state function this engine offers.
pub struct StateFunctionRegistry {
    functions: HashMap<String, Arc<dyn StateFunction>>,
}

impl StateFunctionRegistry {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Register a function under its own name, replacing any previous one.
    pub fn register(&mut self, function: Arc<dyn StateFunction>) {
        let name = function.name().to_string();
        if self.functions.insert(name.clone(), function).is_some() {
            tracing::warn!(function = %name, "State function registered twice");
        }
    }

    pub fn with(mut self, function: Arc<dyn StateFunction>) -> Self {
        self.register(function);
        self
    }

    /// Every registered function, ordered by name.
    pub fn state_functions(&self) -> Vec<StateFunctionInfo> {
        let mut listing: Vec<StateFunctionInfo> = self
            .functions
            .values()
            .map(|f| StateFunctionInfo::new(f.name(), f.visible_name()))
            .collect();
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        listing
    }

    /// Hand the listing to `register`, on behalf of `caller`.
    pub fn provide_state_functions<T>(
        &self,
        caller: &ExtensionId,
        register: impl FnOnce(&ExtensionId, Vec<StateFunctionInfo>) -> T,
    ) -> T {
        let listing = self.state_functions();
        tracing::debug!(caller = %caller, count = listing.len(), "Providing state functions");
        register(caller, listing)
    }

    pub async fn invoke(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError> {
        let function = self
            .functions
            .get(&ctx.function)
            .ok_or_else(|| StateFunctionError::UnknownFunction(ctx.function.clone()))?;

        let result = function.call(ctx).await;
        match &result {
            Ok(next) => tracing::debug!(
                caller = %ctx.caller,
                player_id = %ctx.player_id,
                function = %ctx.function,
                next_state = %next,
                "State function finished"
            ),
            Err(e) => tracing::error!(
                caller = %ctx.caller,
                player_id = %ctx.player_id,
                function = %ctx.function,
                error = %e,
                "State function failed"
            ),
        }
        result
    }
}

impl Default for StateFunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
