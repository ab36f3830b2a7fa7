//! Application configuration, loaded from environment variables.
//!
//! Uses the `envy` crate to deserialize the environment into a typed
//! struct; a local `.env` file is honored when present.

use serde::Deserialize;

/// Runtime configuration.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `TOKEN_TTL_HOURS` (optional): bearer token lifetime, defaults to 24
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_port() -> u16 {
    3000
}

fn default_token_ttl_hours() -> i64 {
    24
}

impl Config {
    /// Load configuration from the environment (and `.env`, if present).
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value
    /// cannot be parsed into its field type.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
    }
}
