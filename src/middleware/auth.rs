//! Authentication middleware
//!
//! Extracts the caller's asserted email identity from a JWT bearer token.
//! Session management lives with the external auth collaborator; this
//! service trusts the token's identity and runs its own authorization
//! checks against stored donor/requester emails.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims carried by an access token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Email identity asserted by the auth collaborator
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Keys and settings for token verification
#[derive(Clone)]
pub struct AuthKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    token_ttl: Duration,
}

impl AuthKeys {
    pub fn new(secret: &str, token_ttl_hours: i64) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }
}

/// Issue a signed token for an authenticated email
pub fn issue_token(keys: &AuthKeys, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp(),
        exp: (now + keys.token_ttl).timestamp(),
    };
    encode(&Header::default(), &claims, &keys.encoding)
}

fn verify_token(keys: &AuthKeys, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(token, &keys.decoding, &Validation::default())?;
    Ok(data.claims)
}

/// Authenticated caller extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
}

/// Error response for authentication failures
#[derive(Debug, Serialize)]
struct AuthError {
    error: AuthErrorDetails,
}

#[derive(Debug, Serialize)]
struct AuthErrorDetails {
    code: String,
    message: String,
}

impl AuthError {
    fn new(message: &str) -> Self {
        Self {
            error: AuthErrorDetails {
                code: "UNAUTHORIZED".to_string(),
                message: message.to_string(),
            },
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AuthKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::new("Missing or malformed Authorization header").into_response())?;

        let keys = AuthKeys::from_ref(state);

        let claims = verify_token(&keys, bearer.token())
            .map_err(|_| AuthError::new("Invalid or expired token").into_response())?;

        Ok(AuthenticatedUser { email: claims.sub })
    }
}
