//! Replica configuration from the environment.

use thiserror::Error;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5678";
pub const DEFAULT_NAMING_ADDR: &str = "localhost:5678";
pub const DEFAULT_ALIAS: &str = "storage";
pub const DEFAULT_STORAGE_ROOT: &str = "storage";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The replica cannot announce a reachable endpoint without it.
    #[error("PUBLIC_HOSTNAME must be set")]
    MissingPublicHostname,

    #[error("cannot parse a port out of ADDRESS {0:?}")]
    BadListenAddress(String),
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bind address, from `ADDRESS`.
    pub listen_addr: String,
    /// Coordinator endpoint, from `NAMING_SERVER_ADDRESS`.
    pub naming_addr: String,
    /// Hostname announced for client traffic, from `PUBLIC_HOSTNAME`.
    pub public_hostname: String,
    /// Unique replica identifier, from `ALIAS`.
    pub alias: String,
    /// Mirror directory under the working directory.
    pub storage_root: String,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("ADDRESS").ok(),
            std::env::var("NAMING_SERVER_ADDRESS").ok(),
            std::env::var("PUBLIC_HOSTNAME").ok(),
            std::env::var("ALIAS").ok(),
        )
    }

    fn from_vars(
        address: Option<String>,
        naming_addr: Option<String>,
        public_hostname: Option<String>,
        alias: Option<String>,
    ) -> Result<Self, ConfigError> {
        let listen_addr = match address {
            Some(a) if !a.is_empty() => a,
            _ => {
                tracing::warn!("ADDRESS not specified; falling back to {DEFAULT_LISTEN_ADDR}");
                DEFAULT_LISTEN_ADDR.to_string()
            }
        };
        let naming_addr = match naming_addr {
            Some(a) if !a.is_empty() => a,
            _ => {
                tracing::warn!(
                    "NAMING_SERVER_ADDRESS not specified; falling back to {DEFAULT_NAMING_ADDR}"
                );
                DEFAULT_NAMING_ADDR.to_string()
            }
        };
        let public_hostname = match public_hostname {
            Some(h) if !h.is_empty() => h,
            _ => return Err(ConfigError::MissingPublicHostname),
        };
        let alias = match alias {
            Some(a) if !a.is_empty() => a,
            _ => {
                tracing::warn!("ALIAS not specified; falling back to {DEFAULT_ALIAS}");
                DEFAULT_ALIAS.to_string()
            }
        };

        Ok(Self {
            listen_addr,
            naming_addr,
            public_hostname,
            alias,
            storage_root: DEFAULT_STORAGE_ROOT.to_string(),
        })
    }

    /// The advertised port: the piece of the listen address after the last
    /// colon.
    pub fn port(&self) -> Result<u16, ConfigError> {
        self.listen_addr
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| ConfigError::BadListenAddress(self.listen_addr.clone()))
    }
}
