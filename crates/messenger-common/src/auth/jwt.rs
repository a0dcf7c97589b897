//! JWT utilities for principal verification
//!
//! Tokens are issued by the external identity provider and signed with a
//! shared HS256 secret. Only verification is needed in production; `issue`
//! exists for tests and local tooling.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use messenger_core::Principal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (external principal id)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl Claims {
    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    #[must_use]
    pub fn into_principal(self) -> Principal {
        Principal {
            external_id: self.sub,
            name: self.name.filter(|n| !n.trim().is_empty()),
            email: self.email.filter(|e| !e.is_empty()),
            picture: self.picture.filter(|p| !p.is_empty()),
        }
    }
}

/// JWT service for verifying (and, in tests, minting) principal tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
}

impl JwtService {
    /// Create a new JWT service with the shared secret and optional expected issuer
    #[must_use]
    pub fn new(secret: &str, issuer: Option<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Mint a token for `principal` valid for `ttl_secs`
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue(&self, principal: &Principal, ttl_secs: i64) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.external_id.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iss: self.issuer.clone(),
            name: principal.name.clone(),
            email: principal.email.clone(),
            picture: principal.picture.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    /// Decode and validate a JWT token
    ///
    /// # Errors
    /// Returns an error if the token is invalid or expired
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(AppError::InvalidToken);
        }

        Ok(token_data.claims)
    }

    /// Verify a bearer token and return the principal it names
    ///
    /// # Errors
    /// Returns an error if the token is invalid or expired
    pub fn verify(&self, token: &str) -> Result<Principal, AppError> {
        self.decode_token(token).map(Claims::into_principal)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    fn create_test_service() -> JwtService {
        JwtService::new(SECRET, None)
    }

    fn principal() -> Principal {
        Principal {
            external_id: "user_2abc".to_string(),
            name: Some("Ada Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            picture: None,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let service = create_test_service();
        let token = service.issue(&principal(), 900).unwrap();

        let verified = service.verify(&token).unwrap();
        assert_eq!(verified, principal());
    }

    #[test]
    fn test_expired_token() {
        let service = create_test_service();
        // Past the default 60s leeway
        let token = service.issue(&principal(), -600).unwrap();

        assert!(matches!(service.verify(&token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();

        let result = service.decode_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = JwtService::new("another-secret", None)
            .issue(&principal(), 900)
            .unwrap();

        assert!(matches!(
            create_test_service().verify(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_issuer_is_checked() {
        let expected = JwtService::new(SECRET, Some("https://id.example.com".to_string()));
        let foreign = JwtService::new(SECRET, Some("https://evil.example.com".to_string()));
        let token = foreign.issue(&principal(), 900).unwrap();

        assert!(matches!(expected.verify(&token), Err(AppError::InvalidToken)));

        let own = expected.issue(&principal(), 900).unwrap();
        assert!(expected.verify(&own).is_ok());
    }

    #[test]
    fn test_empty_subject_is_rejected() {
        let service = create_test_service();
        let token = service.issue(&Principal::new(" "), 900).unwrap();

        assert!(matches!(service.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_blank_claims_become_none() {
        let claims = Claims {
            sub: "u1".to_string(),
            iat: 0,
            exp: i64::MAX,
            iss: None,
            name: Some("  ".to_string()),
            email: Some(String::new()),
            picture: Some("https://img".to_string()),
        };

        let principal = claims.into_principal();
        assert_eq!(principal.name, None);
        assert_eq!(principal.email, None);
        assert_eq!(principal.picture.as_deref(), Some("https://img"));
    }
}
