use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Identity;

/// How bearer tokens are trusted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// HS256 signature checked against the shared secret
    Verify { secret: String },
    /// A gateway in front of this service already verified the token;
    /// only its payload is read. Unsigned tokens are accepted.
    TrustUpstream,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Malformed bearer token")]
    MalformedToken,

    #[error("Invalid bearer token: {0}")]
    InvalidToken(String),
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Claims {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            email: claims.email,
            first_name: claims.first_name,
            last_name: claims.last_name,
        }
    }
}

/// The caller's raw token, forwarded to the events backend
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

fn bearer_token(req: &Request) -> Result<String, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedToken)?;

    // The scheme name is case-insensitive
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedToken);
    }

    Some(token.trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(AuthError::MalformedToken)
}

pub fn decode_verified(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

pub fn decode_unverified(token: &str) -> Result<Claims, AuthError> {
    let payload = token.split('.').nth(1).ok_or(AuthError::MalformedToken)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| AuthError::MalformedToken)?;

    serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidToken(e.to_string()))
}

impl AuthMode {
    pub fn decode_identity(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = match self {
            AuthMode::Verify { secret } => decode_verified(token, secret)?,
            AuthMode::TrustUpstream => decode_unverified(token)?,
        };
        Ok(claims.into())
    }
}

/// Resolves the caller from the `Authorization` header and stores the
/// `Identity` and `BearerToken` as request extensions.
pub async fn auth_middleware(
    State(mode): State<AuthMode>,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = bearer_token(&req).and_then(|token| {
        mode.decode_identity(&token)
            .map(|identity| (identity, BearerToken(token)))
    });

    match identity {
        Ok((identity, token)) => {
            debug!("Authenticated request from {}", identity.email);
            req.extensions_mut().insert(identity);
            req.extensions_mut().insert(token);
            next.run(req).await
        }
        Err(e) => {
            warn!("Rejecting request to {}: {}", req.uri(), e);
            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// An unsigned token carrying the given claims, as issued upstream in tests
#[cfg(any(test, feature = "test_utils"))]
pub fn create_test_token(email: &str, first_name: Option<&str>, last_name: Option<&str>) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let claims = Claims {
        email: email.to_string(),
        first_name: first_name.map(str::to_string),
        last_name: last_name.map(str::to_string),
        exp: None,
    };
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
    format!("{}.{}.", header, payload)
}

/// An HS256 token signed with `secret`, valid for an hour
#[cfg(any(test, feature = "test_utils"))]
pub fn create_signed_test_token(email: &str, secret: &str) -> String {
    let claims = Claims {
        email: email.to_string(),
        first_name: None,
        last_name: None,
        exp: Some(chrono::Utc::now().timestamp() as usize + 3600),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Builds an authenticated request for router tests
#[cfg(any(test, feature = "test_utils"))]
pub fn create_test_request(
    method: &str,
    path: &str,
    email: &str,
    body: Option<serde_json::Value>,
) -> Request {
    let token = create_test_token(email, None, None);
    build_request(method, path, Some(&token), body)
}

#[cfg(any(test, feature = "test_utils"))]
pub fn build_request(
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request {
    let mut builder = axum::http::Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    }
}
