//! HTTP client for the world map service.

use std::time::Duration;

use async_trait::async_trait;
use iobj_domain::{MapCoord, PlayerId};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{MapError, MapPort};

/// Default world service base URL.
pub const DEFAULT_WORLD_URL: &str = "http://localhost:5000/world";

#[derive(Clone)]
pub struct HttpMapClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TeleportRequest<'a> {
    map_coord: &'a MapCoord,
    allow_overlap: bool,
}

#[derive(Deserialize)]
struct TeleportResponse {
    #[serde(default)]
    success: bool,
}

impl HttpMapClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn teleport_url(&self, player_id: &PlayerId) -> Result<Url, MapError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| MapError::RequestFailed(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| MapError::RequestFailed(format!("Bad base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["players", player_id.as_str(), "teleport"]);
        Ok(url)
    }
}

impl Default for HttpMapClient {
    fn default() -> Self {
        Self::new(DEFAULT_WORLD_URL)
    }
}

#[async_trait]
impl MapPort for HttpMapClient {
    async fn teleport(
        &self,
        player_id: &PlayerId,
        coord: &MapCoord,
        allow_overlap: bool,
    ) -> Result<bool, MapError> {
        let response = self
            .client
            .post(self.teleport_url(player_id)?)
            .json(&TeleportRequest {
                map_coord: coord,
                allow_overlap,
            })
            .send()
            .await
            .map_err(|e| MapError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MapError::RequestFailed(format!(
                "Map service returned {}",
                response.status()
            )));
        }

        let body: TeleportResponse = response
            .json()
            .await
            .map_err(|e| MapError::InvalidResponse(e.to_string()))?;
        Ok(body.success)
    }
}
