//! CLI argument parsing.

use clap::Parser;

/// userlake HTTP server: paginated users listing over BigQuery.
#[derive(Parser, Debug, Default)]
#[command(name = "userlake-server", version, about)]
pub struct Cli {
    /// Bind address (overrides HOST).
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// Config profile; `{PROFILE}_{KEY}` env vars take precedence over `{KEY}`.
    #[arg(long, env = "USERLAKE_PROFILE")]
    pub profile: Option<String>,
}
