//! Configuration management for the Seed Bank Accession Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SEEDBANK_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::WithdrawalPurpose;

const MIN_SECRET_LEN: usize = 32;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Bearer token verification
    pub auth: AuthConfig,

    /// Seed bank workflow settings
    pub seedbank: SeedbankConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Secret shared with the identity service that issues tokens
    pub token_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedbankConfig {
    /// New accessions wait for a physical check-in before data entry
    pub require_check_in: bool,

    /// Prefix of generated accession numbers (e.g. "SB" in SB-2024-00001)
    pub accession_prefix: String,

    /// Purpose recorded by "withdraw all remaining" when none is given
    pub default_withdrawal_purpose: WithdrawalPurpose,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SEEDBANK_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("seedbank.require_check_in", true)?
            .set_default("seedbank.accession_prefix", "SB")?
            .set_default("seedbank.default_withdrawal_purpose", "other")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SEEDBANK_ prefix)
            .add_source(
                Environment::with_prefix("SEEDBANK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Config>()?.checked()
    }

    /// Reject settings the server must not start with
    fn checked(self) -> Result<Self, ConfigError> {
        if self.seedbank.accession_prefix.trim().is_empty() {
            return Err(ConfigError::Message(
                "seedbank.accession_prefix must not be empty".to_string(),
            ));
        }
        if !self.is_development() && self.auth.token_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "auth.token_secret must be at least {} characters outside development",
                MIN_SECRET_LEN
            )));
        }
        Ok(self)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(environment: &str, secret: &str, prefix: &str) -> Config {
        Config {
            environment: environment.to_string(),
            server: ServerConfig {
                port: 3000,
                host: "127.0.0.1".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/seedbank".to_string(),
                max_connections: 10,
                min_connections: 2,
            },
            auth: AuthConfig {
                token_secret: secret.to_string(),
            },
            seedbank: SeedbankConfig {
                require_check_in: true,
                accession_prefix: prefix.to_string(),
                default_withdrawal_purpose: WithdrawalPurpose::Other,
            },
        }
    }

    #[test]
    fn test_short_secret_allowed_in_development() {
        assert!(config("development", "dev", "SB").checked().is_ok());
    }

    #[test]
    fn test_short_secret_rejected_in_production() {
        assert!(config("production", "dev", "SB").checked().is_err());
        let secret = "x".repeat(MIN_SECRET_LEN);
        assert!(config("production", &secret, "SB").checked().is_ok());
    }

    #[test]
    fn test_blank_prefix_rejected() {
        assert!(config("development", "dev", "  ").checked().is_err());
    }
}
