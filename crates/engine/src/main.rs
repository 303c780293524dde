//! iobj Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iobj_engine::api::{self, http::API_KEY_HEADER, websocket::WsState, ConnectionManager};
use iobj_engine::app::{App, AppPorts};
use iobj_engine::infrastructure::{
    clock::{SystemClock, SystemRandom},
    config::EngineConfig,
    dialog::WsDialogClient,
    map::HttpMapClient,
    ports::ClockPort,
    problem_bank::FileProblemBank,
    token::HttpTokenClient,
    variables::SqliteVariableRepo,
};
use iobj_engine::stores::DialogVarStore;

/// How often expired dialog variables are swept.
const DIALOG_VAR_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine is often run from `crates/engine`).
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iobj_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting iobj Engine");

    let config = EngineConfig::from_env();
    if config.e2s_api_keys.is_empty() {
        tracing::warn!("E2S_API_KEYS is empty, external writeVar calls will be rejected");
    }

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    tracing::info!(path = %config.variable_db, "Opening player variable store");
    let variables = Arc::new(SqliteVariableRepo::new(&config.variable_db, clock.clone()).await?);
    let problems = Arc::new(FileProblemBank::new(config.content_root.clone()));
    let tokens = Arc::new(HttpTokenClient::new(&config.auth_url));
    let map = Arc::new(HttpMapClient::new(&config.world_url));

    let connections = Arc::new(ConnectionManager::new());
    let dialogs = Arc::new(WsDialogClient::new(connections.clone()));
    let dialog_vars = Arc::new(DialogVarStore::new(
        config.dialog_var_ttl,
        config.dialog_var_capacity,
    ));

    let app = Arc::new(App::new(
        AppPorts {
            variables,
            problems,
            dialog: dialogs.clone(),
            tokens,
            map,
            clock,
            random: Arc::new(SystemRandom::new()),
        },
        dialog_vars.clone(),
        config.e2s_api_keys.clone(),
    ));

    let ws_state = Arc::new(WsState {
        app: app.clone(),
        connections,
        dialogs,
    });

    // Sweep expired dialog variables
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(DIALOG_VAR_SWEEP_INTERVAL).await;
            let removed = dialog_vars.cleanup_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Swept expired dialog variables");
            }
        }
    });

    // Build router with separate states for HTTP and WebSocket
    let mut router = api::http::routes()
        .with_state(app)
        .route("/ws", get(api::websocket::ws_handler).with_state(ws_state))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static(API_KEY_HEADER),
            axum::http::header::CONTENT_TYPE,
        ]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
