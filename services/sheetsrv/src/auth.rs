//! Request authorization
//!
//! Two mechanisms: the shared secret the sheet script sends in its payload,
//! and HS256 session tokens issued by the identity provider for dashboard
//! users.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use errors::{SummitError, SummitResult};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app_state::AppState;

/// Compare without short-circuiting on the first differing byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Check the sheet script's shared secret
///
/// An empty configured secret matches nothing.
pub fn verify_sync_secret(configured: &str, provided: Option<&str>) -> SummitResult<()> {
    match provided {
        Some(provided)
            if !configured.is_empty()
                && constant_time_eq(configured.as_bytes(), provided.as_bytes()) =>
        {
            Ok(())
        },
        _ => Err(SummitError::Unauthorized("sync secret mismatch".to_string())),
    }
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
}

/// Verifies dashboard session tokens
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> SummitResult<Claims> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| SummitError::Unauthorized(format!("Invalid session token: {}", e)))
    }

    /// Verify the `Authorization: Bearer <token>` header value
    pub fn verify_header(&self, header: Option<&str>) -> SummitResult<Claims> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SummitError::Unauthorized("Missing bearer token".to_string()))?;
        self.verify(token)
    }
}

/// Authenticated dashboard user; rejects the request with 401 otherwise
#[derive(Debug, Clone)]
pub struct SessionUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = SummitError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let claims = state.sessions.verify_header(header)?;
        debug!("Session verified for {}", claims.sub);
        Ok(SessionUser(claims))
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: "user-1".to_string(),
            email: Some("ops@example.org".to_string()),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
            iat: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_sync_secret() {
        assert!(verify_sync_secret("s3cret", Some("s3cret")).is_ok());
        assert!(verify_sync_secret("s3cret", Some("s3cre")).is_err());
        assert!(verify_sync_secret("s3cret", None).is_err());
        // Unconfigured secret never matches, not even an empty one
        assert!(verify_sync_secret("", Some("")).is_err());
        assert!(verify_sync_secret("", None).is_err());
    }

    #[test]
    fn test_valid_session() {
        let verifier = SessionVerifier::new("session-key");
        let header = format!("Bearer {}", token("session-key", 3600));
        let claims = verifier.verify_header(Some(&header)).unwrap();
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn test_rejected_sessions() {
        let verifier = SessionVerifier::new("session-key");

        let wrong_key = format!("Bearer {}", token("other-key", 3600));
        assert!(verifier.verify_header(Some(&wrong_key)).is_err());

        let expired = format!("Bearer {}", token("session-key", -3600));
        assert!(verifier.verify_header(Some(&expired)).is_err());

        assert!(verifier.verify_header(None).is_err());
        assert!(verifier.verify_header(Some("Basic abc")).is_err());
        assert!(verifier.verify_header(Some("Bearer ")).is_err());
    }
}
