//! OpenAPI documentation aggregator.
//!
//! Collects the `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI 3.1 document, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "userlake API",
        version = "0.1.0",
        description = "Read-only, paginated access to the BigQuery users table.",
    ),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Users", description = "Paginated user listing"),
    ),
    paths(
        crate::api::health::health,
        crate::api::users::list_users,
    ),
    components(schemas(
        userlake_core::UserRecord,
        crate::api::QueryErrorResponse,
        crate::api::ProblemDetails,
    ))
)]
pub struct ApiDoc;
