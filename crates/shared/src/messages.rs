//! WebSocket message types for engine-to-player dialog traffic
//!
//! The engine pushes dialog requests to a connected player's client and the
//! client answers with a `DialogResponse` carrying the same `request_id`.
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Renaming variants is a breaking change
//! - Unknown enum variants deserialize to `Unknown` variant for forward compatibility

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Client Messages (Player → Engine)
// =============================================================================

/// Messages from a player's client to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Bind this connection to a player; must be sent before dialogs can arrive.
    /// `access_token` is the player's token from the issuer and is checked before binding.
    Identify {
        player_id: String,
        access_token: String,
    },
    /// Answer to a dialog request. Both fields absent means the player dismissed it.
    DialogResponse {
        request_id: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        msg: Option<String>,
    },
    /// Heartbeat
    Ping,
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Server Messages (Engine → Player)
// =============================================================================

/// One selectable answer in a multiple-choice dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogChoice {
    /// Returned verbatim in `DialogResponse.token` when picked
    pub token: String,
    /// Text shown on the button
    pub display: String,
}

impl DialogChoice {
    pub fn new(token: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            display: display.into(),
        }
    }
}

/// Messages from the engine to a player's client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Connection is now bound to the player
    Identified { player_id: String },
    /// Show a dialog with a fixed set of choices
    ShowDialogWithMultichoice {
        request_id: Uuid,
        timeout_ms: u64,
        title: String,
        body: String,
        choices: Vec<DialogChoice>,
    },
    /// Show a dialog with a free-text input
    ShowDialogWithPrompt {
        request_id: Uuid,
        timeout_ms: u64,
        title: String,
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        button_text: Option<String>,
    },
    /// Heartbeat reply
    Pong,
    /// Protocol error
    Error { code: String, message: String },
    #[serde(other)]
    Unknown,
}
