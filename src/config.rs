//! Configuration management for the coffee API.
//!
//! Settings come from command-line arguments via clap, with environment
//! variable fallbacks under the `COFFEE_` prefix and defaults for
//! everything except the token secret.
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use coffee_api::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `COFFEE_HOST` - Server bind address (default: 0.0.0.0)
//! - `COFFEE_PORT` - Server port (default: 3000)
//! - `COFFEE_JWT_SECRET` - HMAC secret for session tokens (required)
//! - `COFFEE_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)
//! - `COFFEE_BODY_LIMIT` - Maximum request body size in bytes (default: 65536)

use clap::Parser;

use crate::server::{RouterConfig, DEFAULT_BODY_LIMIT};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Coffee API - counts drinks per user behind signed session tokens.
#[derive(Parser, Debug, Clone)]
#[command(name = "coffee-api")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "COFFEE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "COFFEE_PORT")]
    pub port: u16,

    /// Maximum request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_BODY_LIMIT, env = "COFFEE_BODY_LIMIT")]
    pub body_limit: usize,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Secret key for HMAC-SHA256 session tokens.
    ///
    /// Required; the server refuses to start without it.
    #[arg(long, env = "COFFEE_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "COFFEE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        match self.jwt_secret.as_deref() {
            None => {
                return Err(
                    "No token secret provided. Set --jwt-secret or COFFEE_JWT_SECRET".to_string(),
                )
            }
            Some(secret) if secret.trim().is_empty() => {
                return Err("Token secret must not be blank".to_string())
            }
            Some(_) => {}
        }

        if self.body_limit == 0 {
            return Err("body_limit must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the token secret, or an empty string if unset (call validate() first).
    pub fn jwt_secret_or_empty(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or("")
    }

    /// Router settings derived from this configuration.
    pub fn router_config(&self) -> RouterConfig {
        let config = RouterConfig::new()
            .with_body_limit(self.body_limit)
            .with_tracing(!self.no_tracing);

        match &self.cors_origins {
            Some(origins) => config.with_cors_origins(origins.clone()),
            None => config,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
