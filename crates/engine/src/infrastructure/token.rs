//! HTTP client for the player token issuer.

use std::time::Duration;

use async_trait::async_trait;
use iobj_domain::{PlayerId, TokenClaims};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{TokenError, TokenPort};

/// Default token issuer base URL.
pub const DEFAULT_AUTH_URL: &str = "http://localhost:5000/auth";

#[derive(Clone)]
pub struct HttpTokenClient {
    client: Client,
    base_url: String,
}

impl HttpTokenClient {
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

    /// `{base}/players/{playerId}/token[/{suffix}]` with the player id escaped as one segment.
    fn token_url(&self, player_id: &PlayerId, suffix: Option<&str>) -> Result<Url, TokenError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| TokenError::RequestFailed(e.to_string()))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TokenError::RequestFailed(format!("Bad base URL: {}", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(["players", player_id.as_str(), "token"]);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    valid: bool,
}

impl Default for HttpTokenClient {
    fn default() -> Self {
        Self::new(DEFAULT_AUTH_URL)
    }
}

#[async_trait]
impl TokenPort for HttpTokenClient {
    async fn get_token(&self, player_id: &PlayerId) -> Result<TokenClaims, TokenError> {
        let response = self
            .client
            .get(self.token_url(player_id, None)?)
            .send()
            .await
            .map_err(|e| TokenError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TokenError::RequestFailed(format!(
                "Token issuer returned {}",
                response.status()
            )));
        }

        response
            .json::<TokenClaims>()
            .await
            .map_err(|e| TokenError::InvalidResponse(e.to_string()))
    }

    async fn verify_access_token(
        &self,
        player_id: &PlayerId,
        access_token: &str,
    ) -> Result<bool, TokenError> {
        let response = self
            .client
            .post(self.token_url(player_id, Some("verify"))?)
            .json(&VerifyRequest {
                token: access_token,
            })
            .send()
            .await
            .map_err(|e| TokenError::RequestFailed(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                return Ok(false)
            }
            status if !status.is_success() => {
                return Err(TokenError::RequestFailed(format!(
                    "Token issuer returned {status}"
                )))
            }
            _ => {}
        }

        response
            .json::<VerifyResponse>()
            .await
            .map(|body| body.valid)
            .map_err(|e| TokenError::InvalidResponse(e.to_string()))
    }
}
