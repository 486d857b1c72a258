use serde::{Deserialize, Serialize};

/// One row of the `/users` listing.
///
/// Field names are part of the public JSON contract and stay snake_case.
/// `user_id` and `email` are always present (empty string when the source
/// column was NULL); every other field serializes as `null` when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserRecord {
    pub user_id: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<i32>,
    /// UTC, ISO-8601 with seven fractional digits, e.g. `2024-01-02T03:04:05.0000000Z`.
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
