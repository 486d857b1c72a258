use std::env;

use serde::{Deserialize, Serialize};

use crate::identifier::{IdentifierError, TableRef};

const DEFAULT_PROJECT_ID: &str = "soil-report-486813";
const DEFAULT_DATASET: &str = "crm";
const DEFAULT_TABLE: &str = "users";

/// Server-side wait per `jobs.query` / `getQueryResults` round trip.
const DEFAULT_POLL_TIMEOUT_MS: u32 = 10_000;

// ── Env helpers (mirrors core/config.rs) ──

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
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

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── BigQueryConfig ─────────────────────────────────────────────────

/// Where the users table lives and how long to wait on BigQuery.
///
/// Identifiers are kept raw here; they are validated on every request via
/// [`BigQueryConfig::table_ref`] so a bad deployment value fails loudly at
/// query time instead of silently at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigQueryConfig {
    /// GCP project that owns the table and is billed for the job.
    pub project_id: String,
    pub dataset: String,
    pub table: String,
    /// Job location (e.g. `US`, `europe-west1`); `None` lets BigQuery infer it.
    pub location: Option<String>,
    pub poll_timeout_ms: u32,
}

impl Default for BigQueryConfig {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
            table: DEFAULT_TABLE.to_string(),
            location: None,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
        }
    }
}

impl BigQueryConfig {
    /// Build config for a specific named profile.
    pub fn from_env_profiled(profile: &str) -> Self {
        Self {
            project_id: profiled_env_or(profile, "BQ_PROJECT_ID", DEFAULT_PROJECT_ID),
            dataset: profiled_env_or(profile, "BQ_DATASET", DEFAULT_DATASET),
            table: profiled_env_or(profile, "BQ_TABLE", DEFAULT_TABLE),
            location: profiled_env_opt(profile, "BQ_LOCATION"),
            poll_timeout_ms: profiled_env_u32(
                profile,
                "BQ_POLL_TIMEOUT_MS",
                DEFAULT_POLL_TIMEOUT_MS,
            ),
        }
    }

    /// Validate the configured identifiers into a [`TableRef`].
    pub fn table_ref(&self) -> Result<TableRef, IdentifierError> {
        TableRef::new(&self.project_id, &self.dataset, &self.table)
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!(
            "  bigquery:    table={}.{}.{}, location={}",
            self.project_id,
            self.dataset,
            self.table,
            self.location.as_deref().unwrap_or("(auto)")
        );
    }
}

// ── Tests ────────────────────────────────────────────────────────
