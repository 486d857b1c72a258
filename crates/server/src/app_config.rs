//! Application configuration builders.
//!
//! Loads `.env`, resolves the active profile, and applies CLI overrides.

use userlake_bigquery::BigQueryConfig;
use userlake_core::Config;

use crate::cli::Cli;

/// Load configuration from `.env`, environment variables, and CLI flags.
///
/// CLI flags win over environment variables for the values they cover.
pub fn load_config(cli: &Cli) -> (Config, BigQueryConfig) {
    userlake_core::config::load_dotenv();

    let profile = cli
        .profile
        .clone()
        .unwrap_or_else(userlake_core::config::active_profile)
        .to_uppercase();

    let mut config = Config::for_profile(&profile);
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let bigquery = BigQueryConfig::from_env_profiled(&profile);
    (config, bigquery)
}
