/// Database row types — these map directly to SQLite rows.
/// Distinct from smartlinks-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub slug: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct LinkRow {
    pub id: i64,
    pub owner_id: String,
    pub title: String,
    pub url: String,
    pub created_at: String,
}
