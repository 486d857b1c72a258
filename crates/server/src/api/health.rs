//! Liveness endpoint.

/// Liveness probe
///
/// Always `200 OK`; touches neither configuration nor BigQuery.
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = String, content_type = "text/plain"))
)]
pub async fn health() -> &'static str {
    "OK"
}
