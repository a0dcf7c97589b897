//! Identity provider clients
//!
//! The resolver only calls these the first time a principal is seen.

use std::time::Duration;

use async_trait::async_trait;
use messenger_core::traits::{IdentityProvider, RepoResult};
use messenger_core::{DomainError, IdentityProfile, Principal};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// User resource as returned by the provider's REST API
#[derive(Debug, Deserialize)]
struct ProviderUser {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email_addresses: Vec<ProviderEmail>,
    #[serde(default)]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderEmail {
    email_address: String,
}

impl From<ProviderUser> for IdentityProfile {
    fn from(user: ProviderUser) -> Self {
        Self {
            first_name: user.first_name,
            last_name: user.last_name,
            emails: user
                .email_addresses
                .into_iter()
                .map(|e| e.email_address)
                .collect(),
            image_url: user.image_url.filter(|u| !u.is_empty()),
        }
    }
}

/// Fetches profiles from `GET {base_url}/users/{external_id}`
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpIdentityProvider {
    /// Build a client with a per-request timeout
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialized
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn user_url(&self, external_id: &str) -> String {
        format!("{}/users/{}", self.base_url, external_id)
    }
}

fn status_error(status: StatusCode, external_id: &str) -> DomainError {
    if status == StatusCode::NOT_FOUND {
        DomainError::UnknownPrincipal(external_id.to_string())
    } else {
        DomainError::IdentityProviderUnavailable(format!("provider answered {status}"))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip(self, principal), fields(external_id = %principal.external_id))]
    async fn fetch_profile(&self, principal: &Principal) -> RepoResult<IdentityProfile> {
        let mut request = self.client.get(self.user_url(&principal.external_id));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "identity provider request failed");
            DomainError::IdentityProviderUnavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, &principal.external_id));
        }

        let user = response
            .json::<ProviderUser>()
            .await
            .map_err(|e| {
                DomainError::IdentityProviderUnavailable(format!("bad profile body: {e}"))
            })?;

        debug!("fetched profile from identity provider");
        Ok(user.into())
    }
}

impl std::fmt::Debug for HttpIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIdentityProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Derives the profile from the verified token's own claims
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimsIdentityProvider;

#[async_trait]
impl IdentityProvider for ClaimsIdentityProvider {
    async fn fetch_profile(&self, principal: &Principal) -> RepoResult<IdentityProfile> {
        let (first_name, last_name) = match principal.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => match name.split_once(' ') {
                Some((first, last)) => (Some(first.to_string()), Some(last.trim().to_string())),
                None => (Some(name.to_string()), None),
            },
            _ => (None, None),
        };

        Ok(IdentityProfile {
            first_name,
            last_name,
            emails: principal.email.iter().cloned().collect(),
            image_url: principal.picture.clone(),
        })
    }
}
