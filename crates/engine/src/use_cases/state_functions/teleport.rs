//! Move the player somewhere else on the world map.

use std::sync::Arc;

use async_trait::async_trait;
use iobj_domain::{MapCoord, NextState};
use serde::Deserialize;
use serde_json::Value;

use super::{InvocationContext, StateFunction, StateFunctionError};
use crate::infrastructure::ports::MapPort;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeleportArgs {
    map_coord: MapCoord,
    next_state: String,
    /// Anything but an explicit `false` allows overlapping other players
    #[serde(default)]
    allow_overlap: Option<Value>,
}

pub struct Teleport {
    map: Arc<dyn MapPort>,
}

impl Teleport {
    pub fn new(map: Arc<dyn MapPort>) -> Self {
        Self { map }
    }
}

#[async_trait]
impl StateFunction for Teleport {
    fn name(&self) -> &'static str {
        "teleport"
    }

    fn visible_name(&self) -> &'static str {
        "Teleport"
    }

    async fn call(&self, ctx: &InvocationContext) -> Result<NextState, StateFunctionError> {
        let Some(args) = ctx.args::<TeleportArgs>() else {
            return Ok(NextState::Error);
        };
        let allow_overlap = args.allow_overlap != Some(Value::Bool(false));

        match self
            .map
            .teleport(&ctx.player_id, &args.map_coord, allow_overlap)
            .await
        {
            Ok(true) => Ok(NextState::state(args.next_state)),
            Ok(false) => {
                tracing::warn!(
                    player_id = %ctx.player_id,
                    map = %args.map_coord.map_name,
                    x = args.map_coord.x,
                    y = args.map_coord.y,
                    "Player cannot go to the place"
                );
                Ok(NextState::Error)
            }
            Err(e) => {
                tracing::warn!(player_id = %ctx.player_id, error = %e, "Teleport failed");
                Ok(NextState::Error)
            }
        }
    }
}
