use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
}

impl Config {
    /// Build config for a named profile (empty string = default); call
    /// `load_dotenv()` first. With a profile set (e.g. `PROD`), every key is
    /// first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        Self {
            server: ServerConfig::from_env_profiled(&p),
            profile: p,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  cors:        {}",
            if self.server.allowed_origins.is_empty() {
                "disabled".to_string()
            } else {
                self.server.allowed_origins.join(",")
            }
        );
        tracing::info!(
            "  deadline:    {}",
            self.server
                .query_timeout
                .map(|d| format!("{}s", d.as_secs()))
                .unwrap_or_else(|| "none".to_string())
        );
    }
}

/// Upper-cased value of `USERLAKE_PROFILE`, or empty for the default profile.
pub fn active_profile() -> String {
    env_opt("USERLAKE_PROFILE")
        .map(|s| s.to_uppercase())
        .unwrap_or_default()
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Parsed `ALLOWED_ORIGINS`. Empty disables cross-origin access, `["*"]`
    /// allows any origin.
    pub allowed_origins: Vec<String>,
    /// Deadline for one warehouse round trip; `None` when `QUERY_TIMEOUT_SECONDS=0`.
    pub query_timeout: Option<Duration>,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        let timeout_secs = profiled_env_u64(p, "QUERY_TIMEOUT_SECONDS", 60);
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 8080),
            allowed_origins: parse_origins(&profiled_env_or(p, "ALLOWED_ORIGINS", "")),
            query_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────
