//! Engine configuration from environment variables.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::map::DEFAULT_WORLD_URL;
use crate::infrastructure::token::DEFAULT_AUTH_URL;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    /// SQLite file holding persistent player variables
    pub variable_db: String,
    /// Directory problem banks are resolved against
    pub content_root: PathBuf,
    pub auth_url: String,
    pub world_url: String,
    /// Keys accepted on the external write endpoint. Empty rejects every call.
    pub e2s_api_keys: HashSet<String>,
    pub dialog_var_ttl: Duration,
    pub dialog_var_capacity: usize,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let server_port = lookup("SERVER_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(3000);
        let e2s_api_keys = lookup("E2S_API_KEYS")
            .map(|keys| {
                keys.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let dialog_var_ttl_secs = lookup("DIALOG_VAR_TTL_SECS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(3600);
        let dialog_var_capacity = lookup("DIALOG_VAR_CAPACITY")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(10_000);

        Self {
            server_host: var("SERVER_HOST", "0.0.0.0"),
            server_port,
            variable_db: var("VARIABLE_DB", "vars.db"),
            content_root: PathBuf::from(var("CONTENT_ROOT", "run/items")),
            auth_url: var("AUTH_URL", DEFAULT_AUTH_URL),
            world_url: var("WORLD_URL", DEFAULT_WORLD_URL),
            e2s_api_keys,
            dialog_var_ttl: Duration::from_secs(dialog_var_ttl_secs),
            dialog_var_capacity,
        }
    }
}
