//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Player variables (SQLite today, could be the host's variable service)
//! - Problem banks (files under the content root)
//! - Player dialogs (WebSocket clients)
//! - Token issuer and world map (HTTP services)
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{ProblemBankRepo, VariableRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    ChoiceReply, DialogPort, MapPort, MultichoiceDialog, PromptDialog, PromptReply, TokenPort,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockProblemBankRepo, MockVariableRepo};

#[cfg(test)]
pub use external::{MockDialogPort, MockMapPort, MockTokenPort};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{DialogError, MapError, RepoError, TokenError};
