//! Amadeus REST client implementation.
//!
//! Authenticates with the OAuth2 client-credentials flow. The bearer token
//! is cached behind an async `RwLock` and renewed shortly before expiry so
//! concurrent searches share one token.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::config::AmadeusConfig;
use crate::models::search::SearchQuery;

use super::types::{AirlinesResponse, FlightOffer, FlightOffersResponse, TokenResponse};
use super::{AmadeusError, FlightProvider};

/// Renew the cached token this many seconds before it actually expires.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 30;

// =============================================================================
// AmadeusClient
// =============================================================================

/// Client for the Amadeus self-service APIs.
///
/// Cheap to clone; all clones share the HTTP connection pool and the cached
/// OAuth token.
#[derive(Clone)]
pub struct AmadeusClient {
    inner: Arc<AmadeusClientInner>,
}

struct AmadeusClientInner {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    token: RwLock<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl AmadeusClient {
    /// Create a new Amadeus API client.
    #[must_use]
    pub fn new(config: &AmadeusConfig) -> Self {
        Self {
            inner: Arc::new(AmadeusClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_owned(),
                token: RwLock::new(None),
            }),
        }
    }

    /// Get a valid bearer token, refreshing the cached one if needed.
    async fn bearer_token(&self) -> Result<String, AmadeusError> {
        if let Some(token) = self.inner.token.read().await.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.access_token.clone());
        }

        let mut guard = self.inner.token.write().await;

        // Another request may have refreshed while we waited for the lock
        if let Some(token) = guard.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.access_token.clone());
        }

        let response = self
            .inner
            .client
            .post(format!("{}/v1/security/oauth2/token", self.inner.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.inner.client_id.as_str()),
                ("client_secret", self.inner.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Amadeus token request rejected"
            );
            return Err(AmadeusError::Auth(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            )));
        }

        let token: TokenResponse = serde_json::from_str(&response_text)?;

        let lifetime = token.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        let access_token = token.access_token.clone();
        *guard = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        Ok(access_token)
    }

    /// Execute an authenticated GET request and parse the JSON response.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, AmadeusError> {
        let token = self.bearer_token().await?;

        let response = self
            .inner
            .client
            .get(format!("{}{path}", self.inner.base_url))
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(AmadeusError::RateLimited(retry_after));
        }

        // Read the body as text so failures can quote it
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Amadeus API returned non-success status"
            );
            return Err(AmadeusError::Api {
                status: status.as_u16(),
                detail: response_text.chars().take(200).collect::<String>(),
            });
        }

        match serde_json::from_str(&response_text) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Amadeus response"
                );
                Err(AmadeusError::Parse(e))
            }
        }
    }
}

#[async_trait]
impl FlightProvider for AmadeusClient {
    #[instrument(skip(self))]
    async fn search_offers(
        &self,
        query: &SearchQuery,
        currency: &str,
        max: u32,
    ) -> Result<Vec<FlightOffer>, AmadeusError> {
        let max = max.to_string();

        let response: FlightOffersResponse = self
            .get_json(
                "/v2/shopping/flight-offers",
                &[
                    ("originLocationCode", query.origin.as_str()),
                    ("destinationLocationCode", query.destination.as_str()),
                    ("departureDate", query.date.as_str()),
                    ("adults", query.travelers.as_str()),
                    ("currencyCode", currency),
                    ("max", max.as_str()),
                ],
            )
            .await?;

        Ok(response.data)
    }

    #[instrument(skip(self))]
    async fn airline_name(&self, carrier_code: &str) -> Result<String, AmadeusError> {
        let response: AirlinesResponse = self
            .get_json("/v1/reference-data/airlines", &[("airlineCodes", carrier_code)])
            .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|airline| airline.business_name)
            .ok_or_else(|| AmadeusError::UnknownAirline(carrier_code.to_owned()))
    }
}
