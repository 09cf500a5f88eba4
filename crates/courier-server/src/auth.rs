use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use courier_types::EntityId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Header carrying the caller's token.
pub const AUTH_HEADER: &str = "Auth-Token";

/// The authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: EntityId,
    pub root_admin: bool,
}

impl Identity {
    pub fn user(user_id: EntityId) -> Self {
        Self {
            user_id,
            root_admin: false,
        }
    }

    pub fn root(user_id: EntityId) -> Self {
        Self {
            user_id,
            root_admin: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    Anonymous,
}

impl Credentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(AUTH_HEADER).and_then(|v| v.to_str().ok()) {
            Some(token) if !token.is_empty() => Self::Token(token.to_string()),
            _ => Self::Anonymous,
        }
    }
}

/// Resolves request credentials to an [`Identity`] and mints the tokens
/// handed out by `POST /v1/auth`.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity>;

    fn issue(&self, identity: &Identity) -> ServerResult<String>;
}

/// Claims carried by a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Hex user id.
    pub id: String,
    /// Root admin flag.
    pub root: bool,
    /// Issued at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

/// HS256 session tokens signed with a shared secret.
#[derive(Clone)]
pub struct TokenAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenAuth {
    pub fn new(secret: &str, ttl: Duration) -> ServerResult<Self> {
        if secret.is_empty() {
            return Err(ServerError::Config("token secret must not be empty".into()));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        Self::new(&config.token_secret, config.token_ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn sign(&self, claims: &TokenClaims) -> ServerResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ServerError::Internal(format!("token signing failed: {e}")))
    }

    /// Verify signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> ServerResult<TokenClaims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ServerError::AuthFailed("token expired".into()),
                _ => ServerError::AuthFailed("invalid token".into()),
            }
        })?;
        Ok(data.claims)
    }
}

impl fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuth").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for TokenAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        let token = match credentials {
            Credentials::Token(token) => token,
            Credentials::Anonymous => {
                return Err(ServerError::AuthFailed(format!("missing {AUTH_HEADER} header")))
            }
        };
        let claims = self.verify(token)?;
        let user_id = match EntityId::parse(&claims.id) {
            Ok(Some(id)) => id,
            _ => return Err(ServerError::AuthFailed("invalid token".into())),
        };
        Ok(Identity {
            user_id,
            root_admin: claims.root,
        })
    }

    fn issue(&self, identity: &Identity) -> ServerResult<String> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        self.sign(&TokenClaims {
            id: identity.user_id.to_hex(),
            root: identity.root_admin,
            iat: now,
            exp: now.saturating_add(ttl),
        })
    }
}

/// Extractor for handlers that require an authenticated caller.
#[derive(Clone, Debug)]
pub struct Caller(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credentials = Credentials::from_headers(&parts.headers);
        let identity = state.auth.authenticate(&credentials).await?;
        tracing::trace!(user_id = %identity.user_id, "caller authenticated");
        Ok(Self(identity))
    }
}
