//! Mapping of request failures onto HTTP responses.
//!
//! Only [`ApiError::Validation`] carries text back to the client. The 5xx
//! variants deliberately hold no payload so identifiers, SQL, and upstream
//! error chains cannot leak; callers log those before converting.

use axum::extract::rejection::QueryRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::debug;

use crate::params::ParamError;

use super::{ProblemDetails, QueryErrorResponse};

pub const CONFIGURATION_ERROR_TITLE: &str = "Configuration error";
pub const QUERY_FAILED_TITLE: &str = "BigQuery query failed";

/// Non-standard "client closed request" status.
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad `limit` / `offset`; message goes back verbatim.
    #[error("{0}")]
    Validation(String),

    /// Configured warehouse identifiers failed validation.
    #[error("server configuration error")]
    Configuration,

    /// The warehouse call failed for any reason other than cancellation.
    #[error("upstream query failed")]
    Upstream,

    /// The client went away or the request deadline passed.
    #[error("client closed request")]
    ClientClosed,
}

impl From<ParamError> for ApiError {
    fn from(e: ParamError) -> Self {
        debug!(error = %e, "Rejected query parameters");
        ApiError::Validation(e.to_string())
    }
}

/// Malformed query strings (e.g. `?limit=1&limit=2`) get the same JSON 400
/// shape as range and integer failures.
impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        debug!(error = %e, "Rejected query string");
        ApiError::Validation(e.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration | ApiError::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ClientClosed => {
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::REQUEST_TIMEOUT)
            }
        }
    }
}

fn problem(status: StatusCode, title: &'static str, detail: &'static str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/problem+json")],
        Json(ProblemDetails {
            title,
            status: status.as_u16(),
            detail,
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(error) => (status, Json(QueryErrorResponse { error })).into_response(),
            ApiError::Configuration => problem(
                status,
                CONFIGURATION_ERROR_TITLE,
                "The server's data source is not configured correctly.",
            ),
            ApiError::Upstream => problem(
                status,
                QUERY_FAILED_TITLE,
                "An error occurred while querying BigQuery.",
            ),
            ApiError::ClientClosed => status.into_response(),
        }
    }
}
