//! HTTP routes.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use iobj_domain::{ExtensionId, ObjectId, PlayerId, StateFunctionInfo};
use iobj_shared::{
    InvokeRequest, InvokeResponse, ProvideStateFunctionsRequest, StateFunctionInfoDto,
    WriteVarRequest, WriteVarResponse,
};
use std::sync::Arc;

use crate::app::App;
use crate::use_cases::{InvocationContext, StateFunctionError};

/// Header carrying the external caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/s2s/provide", post(provide_state_functions))
        .route("/s2s/invoke", post(invoke_state_function))
        .route("/e2s/writeVar", post(write_var))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Service-to-service
// =============================================================================

async fn provide_state_functions(
    State(app): State<Arc<App>>,
    Json(request): Json<ProvideStateFunctionsRequest>,
) -> Json<Vec<StateFunctionInfoDto>> {
    let caller = ExtensionId::new(request.caller);
    let listing = app
        .use_cases
        .state_functions
        .provide_state_functions(&caller, |_, listing| {
            listing
                .into_iter()
                .map(|info| StateFunctionInfoDto {
                    name: info.name,
                    visible_name: info.visible_name,
                })
                .collect()
        });
    Json(listing)
}

async fn invoke_state_function(
    State(app): State<Arc<App>>,
    Json(request): Json<InvokeRequest>,
) -> Result<Json<InvokeResponse>, ApiError> {
    let ctx = InvocationContext {
        caller: ExtensionId::new(request.caller),
        player_id: PlayerId::new(request.player_id),
        function: request.function_name,
        kwargs: request.kwargs,
        info: StateFunctionInfo::new(request.sf_info.name, request.sf_info.visible_name),
    };

    let next = app.use_cases.state_functions.invoke(&ctx).await?;
    Ok(Json(InvokeResponse {
        next_state: next.as_token().to_string(),
    }))
}

// =============================================================================
// External
// =============================================================================

async fn write_var(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Json(request): Json<WriteVarRequest>,
) -> Result<Json<WriteVarResponse>, ApiError> {
    let authorized = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|key| app.accepts_api_key(key));
    if !authorized {
        tracing::warn!(var = %request.var_name, "Rejected writeVar with bad API key");
        return Err(ApiError::Unauthorized);
    }

    let result = app
        .use_cases
        .write_var
        .execute(
            &request.var_name,
            &request.value,
            &PlayerId::new(request.player_id),
            &ObjectId::new(request.object_id),
        )
        .await;

    match result {
        Ok(()) => Ok(Json(WriteVarResponse { success: true })),
        Err(e) => {
            tracing::error!(var = %request.var_name, error = %e, "External writeVar failed");
            Ok(Json(WriteVarResponse { success: false }))
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Unauthorized,
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::Unauthorized => {
                (axum::http::StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error",
                )
                    .into_response()
            }
        }
    }
}

impl From<StateFunctionError> for ApiError {
    fn from(e: StateFunctionError) -> Self {
        match e {
            StateFunctionError::UnknownFunction(name) => {
                ApiError::NotFound(format!("Unknown state function: {name}"))
            }
            StateFunctionError::Content(e) => ApiError::Internal(e.to_string()),
        }
    }
}
