//! Coordinator configuration from the environment.

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5678";

#[derive(Debug, Clone)]
pub struct NamingConfig {
    /// Bind address, from `ADDRESS`.
    pub listen_addr: String,
}

impl NamingConfig {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::var("ADDRESS").ok())
    }

    fn from_vars(address: Option<String>) -> Self {
        let listen_addr = match address {
            Some(a) if !a.is_empty() => a,
            _ => {
                tracing::warn!("ADDRESS not specified; falling back to {DEFAULT_LISTEN_ADDR}");
                DEFAULT_LISTEN_ADDR.to_string()
            }
        };
        Self { listen_addr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_address() {
        let cfg = NamingConfig::from_vars(Some("0.0.0.0:9000".into()));
        assert_eq!(cfg.listen_addr, "0.0.0.0:9000");
    }

    #[test]
    fn test_default_address() {
        assert_eq!(NamingConfig::from_vars(None).listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(
            NamingConfig::from_vars(Some(String::new())).listen_addr,
            DEFAULT_LISTEN_ADDR
        );
    }
}
