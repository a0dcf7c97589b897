//! Test helpers for integration tests
//!
//! Provides a self-contained server on the in-memory backend, token minting,
//! and response assertions.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use messenger_api::{create_app, create_app_state};
use messenger_common::{AppConfig, JwtService};
use messenger_core::Principal;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{ErrorEnvelope, TestUser};

/// Signing secret shared by the server and the token minter
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Token lifetime for minted test tokens
const TOKEN_TTL_SECS: i64 = 300;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    jwt: JwtService,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new server with its own empty in-memory store
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let jwt = JwtService::new(&config.identity.jwt_secret, config.identity.jwt_issuer.clone());

        let state = create_app_state(config).await?;
        let app = create_app(state)?;

        // Port 0 lets the OS pick, so parallel tests never collide
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            jwt,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Mint a bearer token for a principal
    pub fn token_for(&self, user: &TestUser) -> Result<String> {
        let principal = Principal {
            external_id: user.external_id.clone(),
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            picture: None,
        };
        Ok(self.jwt.issue(&principal, TOKEN_TTL_SECS)?)
    }

    /// Provision a user through the auth callback and return its token and id
    pub async fn sign_in(&self, user: &TestUser) -> Result<(String, String)> {
        let token = self.token_for(user)?;
        let response = self
            .post_auth("/api/auth/callback", &token, &serde_json::json!({}))
            .await?;
        let body: serde_json::Value = assert_json(response, StatusCode::OK).await?;
        let id = body["id"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("callback response has no id: {body}"))?
            .to_string();
        Ok((token, id))
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).bearer_auth(token).send().await?)
    }

    /// Make a POST request with JSON body and no credentials
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }
}

/// Development config on the in-memory backend with a permissive rate limit
pub fn test_config() -> Result<AppConfig> {
    let lookup = |key: &str| -> Option<String> {
        match key {
            "APP_ENV" => Some("development".to_string()),
            "API_PORT" => Some("0".to_string()),
            "IDENTITY_JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
            "RATE_LIMIT_REQUESTS_PER_SECOND" => Some("1000".to_string()),
            "RATE_LIMIT_BURST" => Some("1000".to_string()),
            _ => None,
        }
    };

    AppConfig::from_lookup(lookup).map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

/// Assert an error status and return the stable error code
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let envelope: ErrorEnvelope = assert_json(response, expected_status).await?;
    Ok(envelope.error.code)
}
