//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs whose `sub` is the database user id. The middleware
//! resolves the token to a stored user once per request, and handlers receive
//! that user through the [`AuthUser`] extractor.

use crate::{
    api::AppState,
    core::user,
    entities::user::Model as UserModel,
    errors::{Error, Result},
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Database user id
    pub sub: i64,
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens.
///
/// One instance is built at startup from `JWT_SECRET` and shared through
/// [`AppState`]. The secret never leaves this type.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl TokenService {
    /// Creates a service signing with `secret`; tokens live `ttl_hours`.
    #[must_use]
    pub fn new(secret: &str, ttl_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds: i64::try_from(ttl_hours.saturating_mul(3600)).unwrap_or(i64::MAX),
        }
    }

    /// Signs a token for `user_id`.
    ///
    /// # Errors
    /// Returns `Error::Jwt` if encoding fails.
    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verifies signature and expiry and returns the claims.
    ///
    /// # Errors
    /// Returns `Error::Unauthorized` for any invalid, tampered or expired token.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {e}");
                Error::Unauthorized {
                    message: "Token is not valid".to_string(),
                }
            })
    }
}

/// Middleware resolving `Authorization: Bearer <token>` to a user.
///
/// A missing header, a bad signature, an expired token and a token for a
/// deleted user all stop the request with `401`; the handler never runs.
/// On success the [`UserModel`] is stored in the request extensions for
/// [`AuthUser`] to pick up.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::Unauthorized {
            message: "No token, authorization denied".to_string(),
        })?;

    let claims = state.tokens.verify(token)?;

    let user = user::get_user_by_id(&state.database, claims.sub)
        .await?
        .ok_or_else(|| {
            warn!(user_id = claims.sub, "Token for unknown user");
            Error::Unauthorized {
                message: "User not found".to_string(),
            }
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extractor for the authenticated caller.
///
/// Only valid on routes behind [`require_auth`]; elsewhere it rejects with
/// `401` instead of panicking.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserModel);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<UserModel>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| Error::Unauthorized {
                message: "Missing user authentication".to_string(),
            })
    }
}
