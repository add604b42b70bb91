use crate::Database;
use crate::models::{LinkRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, Row};

/// Outcome of a user insert. The UNIQUE constraints on `users` decide which
/// one applies, so concurrent registrations cannot both win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertUser {
    Created,
    EmailTaken,
    SlugTaken,
}

const USER_COLUMNS: &str = "id, email, password, slug, created_at";
const LINK_COLUMNS: &str = "id, owner_id, title, url, created_at";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        slug: &str,
    ) -> Result<InsertUser> {
        self.with_conn(|conn| {
            let res = conn.execute(
                "INSERT INTO users (id, email, password, slug) VALUES (?1, ?2, ?3, ?4)",
                (id, email, password_hash, slug),
            );

            match res {
                Ok(_) => Ok(InsertUser::Created),
                Err(rusqlite::Error::SqliteFailure(err, Some(msg)))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    // "UNIQUE constraint failed: users.email"
                    if msg.contains("users.email") {
                        Ok(InsertUser::EmailTaken)
                    } else if msg.contains("users.slug") {
                        Ok(InsertUser::SlugTaken)
                    } else {
                        Err(anyhow::anyhow!("constraint violation: {}", msg))
                    }
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_slug(&self, slug: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "slug", slug))
    }

    // -- Links --

    pub fn insert_link(&self, owner_id: &str, title: &str, url: &str) -> Result<LinkRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO links (owner_id, title, url) VALUES (?1, ?2, ?3) RETURNING {}",
                    LINK_COLUMNS
                ),
                (owner_id, title, url),
                link_from_row,
            )?;
            Ok(row)
        })
    }

    /// All links of one owner, oldest first.
    pub fn get_links_by_owner(&self, owner_id: &str) -> Result<Vec<LinkRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM links WHERE owner_id = ?1 ORDER BY id ASC",
                LINK_COLUMNS
            ))?;

            let rows = stmt
                .query_map([owner_id], link_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Returns `None` when the link does not exist or belongs to someone else.
    pub fn update_link(
        &self,
        id: i64,
        owner_id: &str,
        title: &str,
        url: &str,
    ) -> Result<Option<LinkRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "UPDATE links SET title = ?3, url = ?4 WHERE id = ?1 AND owner_id = ?2 RETURNING {}",
                    LINK_COLUMNS
                ),
                rusqlite::params![id, owner_id, title, url],
                link_from_row,
            )
            .optional()
        })
    }

    /// Returns false when the link does not exist or belongs to someone else.
    pub fn delete_link(&self, id: i64, owner_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM links WHERE id = ?1 AND owner_id = ?2",
                rusqlite::params![id, owner_id],
            )?;
            Ok(n > 0)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users WHERE {} = ?1",
        USER_COLUMNS, column
    ))?;

    stmt.query_row([value], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            email: row.get(1)?,
            password: row.get(2)?,
            slug: row.get(3)?,
            created_at: row.get(4)?,
        })
    })
    .optional()
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<LinkRow> {
    Ok(LinkRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        url: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
