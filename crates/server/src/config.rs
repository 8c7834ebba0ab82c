//! Server configuration.

use carchain_chain::LedgerConfig;
use carchain_consensus::{PowError, RegistrationPolicy, DEFAULT_DIFFICULTY_PREFIX};
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Command-line and environment configuration for the API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "carchain-server")]
#[command(about = "HTTP API for the carchain vehicle ledger", long_about = None)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "CARCHAIN_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "CARCHAIN_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Proof of work difficulty prefix (lowercase hex)
    #[arg(short, long, env = "CARCHAIN_DIFFICULTY", default_value = DEFAULT_DIFFICULTY_PREFIX)]
    pub difficulty: String,

    /// Give up a mining request after this many seconds
    #[arg(long, env = "CARCHAIN_MINING_TIMEOUT_SECS", default_value_t = 60)]
    pub mining_timeout_secs: u64,

    /// Accept registrations for VINs that are already registered
    #[arg(long, env = "CARCHAIN_ALLOW_REREGISTRATION")]
    pub allow_reregistration: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            difficulty: DEFAULT_DIFFICULTY_PREFIX.to_string(),
            mining_timeout_secs: 60,
            allow_reregistration: false,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn mining_timeout(&self) -> Duration {
        Duration::from_secs(self.mining_timeout_secs)
    }

    /// Build the ledger configuration, rejecting invalid difficulty prefixes.
    pub fn ledger_config(&self) -> Result<LedgerConfig, PowError> {
        let registration_policy = if self.allow_reregistration {
            RegistrationPolicy::AllowReset
        } else {
            RegistrationPolicy::Reject
        };

        Ok(LedgerConfig {
            registration_policy,
            ..LedgerConfig::with_difficulty(&self.difficulty)?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["carchain-server"]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.difficulty, "0000");
        assert_eq!(config.mining_timeout(), Duration::from_secs(60));
        assert!(!config.allow_reregistration);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_flags() {
        let config = ServerConfig::try_parse_from([
            "carchain-server",
            "--port",
            "8080",
            "--difficulty",
            "00",
            "--allow-reregistration",
        ])
        .unwrap();

        let ledger = config.ledger_config().unwrap();
        assert_eq!(ledger.pow.difficulty_prefix(), "00");
        assert_eq!(ledger.registration_policy, RegistrationPolicy::AllowReset);
    }

    #[test]
    fn test_invalid_difficulty() {
        let config = ServerConfig {
            difficulty: "zz".into(),
            ..ServerConfig::default()
        };
        assert!(config.ledger_config().is_err());
    }
}
