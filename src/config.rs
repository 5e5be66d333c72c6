use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::errors::config_error::ConfigError;

pub const PORT_VAR: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Config {
    /// Reads the port the Functions host assigned to this worker.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(value) = lookup(PORT_VAR) else {
            return Ok(Self::default());
        };
        let port = value
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort {
                var: PORT_VAR,
                value: value.clone(),
            })?;
        Ok(Self { port })
    }

    /// Candidate listen addresses, tried in order: the IPv6 wildcard (dual-stack
    /// where the OS allows it), then the IPv4 wildcard for hosts without IPv6.
    pub fn listen_addrs(&self) -> [SocketAddr; 2] {
        [
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, self.port)),
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port)),
        ]
    }
}
