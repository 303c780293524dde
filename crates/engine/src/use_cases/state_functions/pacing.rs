//! Pause an FSM for a while.

use std::time::Duration;

use async_trait::async_trait;
use iobj_domain::NextState;
use serde::Deserialize;
use serde_json::Value;

use super::{InvocationContext, StateFunction, StateFunctionError};

/// Longest pause a single step may take.
pub const MAX_SLEEP: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SleepArgs {
    /// Milliseconds
    delay: Value,
    next_state: String,
}

/// Delay to actually wait, and whether it had to be shortened.
fn clamp_delay(delay_ms: f64) -> (Duration, bool) {
    if delay_ms > MAX_SLEEP.as_millis() as f64 {
        (MAX_SLEEP, true)
    } else {
        (Duration::from_secs_f64(delay_ms / 1000.0), false)
    }
}

pub struct Sleep;

impl Sleep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Sleep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateFunction for Sleep {
    fn name(&self) -> &'static str {
        "sleep"
    }

    fn visible_name(&self) -> &'static str {
        "Sleep"
    }

    async fn call(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError> {
        let Some(args) = ctx.args::<SleepArgs>() else {
            return Ok(NextState::Error);
        };
        let Some(delay_ms) = args.delay.as_f64().filter(|ms| ms.is_finite() && *ms >= 0.0) else {
            tracing::error!(owner = %ctx.info.name, delay = %args.delay, "Invalid sleep delay");
            return Ok(NextState::Error);
        };

        let (delay, clamped) = clamp_delay(delay_ms);
        if clamped {
            tracing::warn!(
                owner = %ctx.info.name,
                delay_ms,
                "Sleep delay clamped to ten minutes"
            );
        }

        tokio::time::sleep(delay).await;
        Ok(NextState::state(args.next_state))
    }
}
