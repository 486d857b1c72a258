//! HTTP endpoint modules.
//!
//! Each sub-module owns a single responsibility area.
//! Shared response types live here in mod.rs.

pub mod doc;
mod error;
mod health;
mod users;

#[cfg(test)]
mod tests;

use serde::Serialize;

pub use error::ApiError;

// ── Shared types ─────────────────────────────────────────────────

/// Body of a 400 response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QueryErrorResponse {
    pub error: String,
}

/// RFC 7807 body for 5xx responses. Title and detail are fixed strings;
/// nothing request- or deployment-specific ends up here.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProblemDetails {
    pub title: &'static str,
    pub status: u16,
    pub detail: &'static str,
}

// ── Re-exports ───────────────────────────────────────────────────
// Keeps flat `api::foo` import paths for route registration.

pub use health::health;
pub use users::list_users;
