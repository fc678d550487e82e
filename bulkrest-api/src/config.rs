//! API Configuration Module
//!
//! Server-level settings loaded from environment variables with defaults
//! suitable for local development. Per-resource bulk behaviour lives in
//! [`bulkrest_core::BulkConfig`].

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Host or IP to bind.
    pub bind: String,

    /// TCP port.
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `BULKREST_API_BIND`: Host to bind (default: 0.0.0.0)
    /// - `PORT`, then `BULKREST_API_PORT`: Port to listen on (default: 3000)
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = lookup("BULKREST_API_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let port = match lookup("PORT").or_else(|| lookup("BULKREST_API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => DEFAULT_PORT,
        };
        Ok(Self { bind, port })
    }

    /// Resolve the socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() -> ApiResult<()> {
        let config = ApiConfig::from_lookup(lookup_from(&[]))?;
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.bind_addr()?.port(), 3000);
        Ok(())
    }

    #[test]
    fn test_port_prefers_platform_variable() -> ApiResult<()> {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("BULKREST_API_PORT", "9090"),
        ]))?;
        assert_eq!(config.port, 8080);

        let config = ApiConfig::from_lookup(lookup_from(&[("BULKREST_API_PORT", "9090")]))?;
        assert_eq!(config.port, 9090);
        Ok(())
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = ApiConfig::from_lookup(lookup_from(&[("PORT", "eighty")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_bind_address() {
        let config = ApiConfig {
            bind: "not an address".to_string(),
            port: 1,
        };
        assert!(config.bind_addr().is_err());
    }
}
