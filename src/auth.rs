// Authentication utilities: JWT verification, bot secret check, caller identity

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-discord-id";
pub const USER_NAME_HEADER: &str = "x-user-discord-name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    None,
    Bot,
    Jwt,
}

/// Who is calling. Set on every request by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub is_authenticated: bool,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub auth_source: AuthSource,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            user_id: None,
            user_name: None,
            auth_source: AuthSource::None,
        }
    }

    /// Id of the authenticated user, or `Unauthorized`.
    pub fn require_user(&self) -> Result<&str, ApiError> {
        match &self.user_id {
            Some(user_id) if self.is_authenticated => Ok(user_id.as_str()),
            _ => Err(ApiError::Unauthorized),
        }
    }
}

/// Claims read from a bearer JWT. Tokens are issued elsewhere.
#[derive(Debug, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: Option<String>,
    pub exp: i64,
}

/// Verifies HS256 tokens against the shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn verify_token(&self, token: &str) -> Result<TokenData<Claims>, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| ApiError::Unauthorized)
    }
}

/// Resolves an [`AuthContext`] from request headers. Never rejects.
#[derive(Clone, Default)]
pub struct Authenticator {
    bot_api_secret: Option<String>,
    jwt: Option<JwtVerifier>,
}

impl Authenticator {
    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self {
            bot_api_secret: cfg.bot_api_secret.clone().filter(|s| !s.is_empty()),
            jwt: cfg
                .jwt_secret
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(JwtVerifier::new),
        }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> AuthContext {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let Some(token) = token else {
            return AuthContext::anonymous();
        };

        if let Some(secret) = &self.bot_api_secret {
            if constant_time_eq(token.as_bytes(), secret.as_bytes()) {
                return AuthContext {
                    is_authenticated: true,
                    user_id: header_value(headers, USER_ID_HEADER),
                    user_name: header_value(headers, USER_NAME_HEADER),
                    auth_source: AuthSource::Bot,
                };
            }
        }

        let Some(jwt) = &self.jwt else {
            return AuthContext::anonymous();
        };

        match jwt.verify_token(token) {
            Ok(data) => AuthContext {
                is_authenticated: true,
                user_id: Some(data.claims.sub),
                user_name: data.claims.username,
                auth_source: AuthSource::Jwt,
            },
            Err(_) => {
                tracing::warn!("Rejected bearer token: not a valid JWT");
                AuthContext::anonymous()
            }
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
