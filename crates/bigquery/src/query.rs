use crate::identifier::TableRef;

/// Columns projected by the users listing, in output order.
pub const USER_COLUMNS: [&str; 7] = [
    "user_id",
    "email",
    "phone_number",
    "full_name",
    "role",
    "created_at",
    "updated_at",
];

/// Compose the paginated users query.
///
/// Nothing here is bound as a parameter: the table reference can only come
/// from a validated [`TableRef`] and `limit` / `offset` are plain integers,
/// so direct interpolation cannot carry client text into the statement.
pub fn build_users_query(table: &TableRef, limit: u32, offset: u32) -> String {
    format!(
        "SELECT {columns}\nFROM `{table}`\nORDER BY created_at DESC NULLS LAST\nLIMIT {limit} OFFSET {offset}",
        columns = USER_COLUMNS.join(", "),
    )
}
