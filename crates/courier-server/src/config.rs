use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use courier_db::StoreConfig;
use courier_types::User;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Upper bound on each storage call, in seconds.
    pub op_timeout_secs: u64,
    pub max_body_bytes: usize,
    /// HS256 key for session tokens.
    pub token_secret: String,
    /// Lifetime of tokens issued by `POST /v1/auth`, in seconds.
    pub token_ttl_secs: u64,
    /// Created at startup when no user exists yet.
    pub root_admin: Option<RootAdmin>,
}

/// Placeholder secret; `courier serve` warns while it is in use.
pub const DEFAULT_TOKEN_SECRET: &str = "change-this-secret";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            op_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
            token_secret: DEFAULT_TOKEN_SECRET.to_string(),
            token_ttl_secs: 24 * 60 * 60,
            root_admin: None,
        }
    }
}

impl ServerConfig {
    /// Read a TOML config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> ServerResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::with_timeout(Duration::from_secs(self.op_timeout_secs))
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

/// Credentials of the account bootstrapped into an empty database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

impl RootAdmin {
    pub fn to_user(&self) -> User {
        User {
            username: Some(self.username.clone()),
            email: Some(self.email.clone()),
            password: Some(self.password.clone()),
            phone: Some(self.phone.clone()),
            root_admin: true,
            ..Default::default()
        }
    }
}
