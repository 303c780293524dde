//! iobj Shared - wire types between the engine, its host and player clients
//!
//! - Service-to-service request/response DTOs (provide, invoke)
//! - External write DTO
//! - WebSocket dialog messages (ClientMessage, ServerMessage)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json and uuid
//! 2. **No business logic** - Pure data types and serialization
//! 3. **No domain IDs** - raw strings in DTOs; the engine converts

pub mod messages;
pub mod requests;
pub mod responses;

pub use messages::{ClientMessage, DialogChoice, ServerMessage};
pub use requests::{
    InvokeRequest, ProvideStateFunctionsRequest, StateFunctionInfoDto, WriteVarRequest,
};
pub use responses::{InvokeResponse, WriteVarResponse};
