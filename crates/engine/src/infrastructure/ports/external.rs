//! External service port traits (player dialogs, token issuer, world map).

use std::time::Duration;

use async_trait::async_trait;
use iobj_domain::{MapCoord, PlayerId, TokenClaims};
use iobj_shared::DialogChoice;

use super::error::{DialogError, MapError, TokenError};

// =============================================================================
// Dialog Types
// =============================================================================

/// Multiple-choice dialog request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultichoiceDialog {
    /// How long to wait for the player before giving up
    pub timeout: Duration,
    pub title: String,
    pub body: String,
    pub choices: Vec<DialogChoice>,
}

/// Free-text dialog request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDialog {
    pub timeout: Duration,
    pub title: String,
    pub body: String,
    /// Label of the submit button; the client picks one when absent
    pub button_text: Option<String>,
}

/// Player's answer to a multiple-choice dialog. `None` if dismissed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceReply {
    pub token: Option<String>,
}

/// Player's answer to a prompt. `None` if dismissed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptReply {
    pub msg: Option<String>,
}

/// Bounded-time requests to one player's client.
///
/// Implementations must resolve within the request's `timeout`, returning
/// `DialogError::Timeout` rather than waiting longer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DialogPort: Send + Sync {
    async fn show_multichoice(
        &self,
        player_id: &PlayerId,
        dialog: MultichoiceDialog,
    ) -> Result<ChoiceReply, DialogError>;

    async fn show_prompt(
        &self,
        player_id: &PlayerId,
        dialog: PromptDialog,
    ) -> Result<PromptReply, DialogError>;
}

// =============================================================================
// Token Issuer
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenPort: Send + Sync {
    /// Claims of the player's current access token.
    async fn get_token(&self, player_id: &PlayerId) -> Result<TokenClaims, TokenError>;

    /// Whether `access_token` is a live token issued to this player.
    async fn verify_access_token(
        &self,
        player_id: &PlayerId,
        access_token: &str,
    ) -> Result<bool, TokenError>;
}

// =============================================================================
// World Map
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MapPort: Send + Sync {
    /// Move a player. `Ok(false)` means the map refused (blocked cell, unknown map).
    async fn teleport(
        &self,
        player_id: &PlayerId,
        coord: &MapCoord,
        allow_overlap: bool,
    ) -> Result<bool, MapError>;
}
