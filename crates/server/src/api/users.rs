//! Paginated users listing backed by BigQuery.
//!
//! SRP: request → validated query → warehouse → mapped records.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use userlake_bigquery::{build_users_query, map_rows, WarehouseError};
use userlake_core::UserRecord;

use crate::params::{LIMIT, OFFSET};
use crate::state::AppState;

use super::{ApiError, ProblemDetails, QueryErrorResponse};

// ── Request types ────────────────────────────────────────────────

/// Raw query string. Kept as text so validation can echo the exact input.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsersQuery {
    /// Page size, 1–1000 (default 200).
    pub limit: Option<String>,
    /// Rows to skip, 0–100000 (default 0).
    pub offset: Option<String>,
}

// ── Handler ──────────────────────────────────────────────────────

/// List users
///
/// Returns one page of users ordered by `created_at` descending (nulls last).
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(UsersQuery),
    responses(
        (status = 200, description = "One page of users", body = [UserRecord]),
        (status = 400, description = "Invalid limit, offset, or query string", body = QueryErrorResponse),
        (status = 499, description = "Client closed the request or the deadline passed"),
        (status = 500, description = "Configuration error or BigQuery failure", body = ProblemDetails)
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    params: Result<Query<UsersQuery>, QueryRejection>,
) -> Result<Json<Vec<UserRecord>>, ApiError> {
    let Query(params) = params?;
    let limit = LIMIT.parse(params.limit.as_deref())?;
    let offset = OFFSET.parse(params.offset.as_deref())?;

    let table = state.bigquery.table_ref().map_err(|e| {
        error!(
            error = %e,
            project_id = %state.bigquery.project_id,
            dataset = %state.bigquery.dataset,
            table = %state.bigquery.table,
            "Invalid BigQuery identifiers in configuration"
        );
        ApiError::Configuration
    })?;

    let sql = build_users_query(&table, limit, offset);

    // Cancelled when this future is dropped (client disconnect) or when the
    // deadline task fires, whichever comes first.
    let cancel = CancellationToken::new();
    let _disconnect = cancel.clone().drop_guard();
    if let Some(deadline) = state.config.server.query_timeout {
        spawn_deadline(cancel.clone(), deadline);
    }

    let rows = state
        .warehouse
        .execute_query(&sql, &cancel)
        .await
        .map_err(|e| match e {
            WarehouseError::Cancelled => {
                info!(limit, offset, "Users query cancelled");
                ApiError::ClientClosed
            }
            other => {
                error!(error = %other, table = %table, "BigQuery query failed");
                ApiError::Upstream
            }
        })?;

    let users = map_rows(&rows);
    debug!(count = users.len(), limit, offset, "Listed users");
    Ok(Json(users))
}

/// Cancel `token` after `deadline` unless it is cancelled first.
fn spawn_deadline(token: CancellationToken, deadline: Duration) {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(deadline) => {
                debug!(deadline_ms = deadline.as_millis() as u64, "Request deadline reached");
                token.cancel();
            }
        }
    });
}
