//! Check a player's claimed identity before their connection gets dialogs.

use std::sync::Arc;

use iobj_domain::PlayerId;

use crate::infrastructure::ports::{TokenError, TokenPort};

#[derive(Debug, thiserror::Error)]
pub enum IdentifyError {
    #[error("Player id is empty")]
    EmptyPlayer,
    #[error("Access token rejected")]
    Rejected,
    #[error("Token issuer unavailable: {0}")]
    Unavailable(#[from] TokenError),
}

pub struct IdentifyPlayer {
    tokens: Arc<dyn TokenPort>,
}

impl IdentifyPlayer {
    pub fn new(tokens: Arc<dyn TokenPort>) -> Self {
        Self { tokens }
    }

    /// Accept `player_id` only if the issuer vouches for `access_token`.
    pub async fn execute(
        &self,
        player_id: &str,
        access_token: &str,
    ) -> Result<PlayerId, IdentifyError> {
        if player_id.trim().is_empty() {
            return Err(IdentifyError::EmptyPlayer);
        }
        if access_token.is_empty() {
            return Err(IdentifyError::Rejected);
        }

        let player_id = PlayerId::new(player_id);
        if self
            .tokens
            .verify_access_token(&player_id, access_token)
            .await?
        {
            Ok(player_id)
        } else {
            tracing::warn!(player_id = %player_id, "Rejected identify with invalid access token");
            Err(IdentifyError::Rejected)
        }
    }
}
