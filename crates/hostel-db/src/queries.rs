use crate::models::{ComplaintChanges, ComplaintRow, NewUser, UserRow};
use crate::Database;
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};

const USER_COLUMNS: &str =
    "id, name, email, roll_number, password_hash, role, hostel_name, room_number";

const COMPLAINT_COLUMNS: &str =
    "id, user_id, category, title, description, status, created_at, updated_at";

impl Database {
    // -- Users --

    /// Inserts a user and returns its id, or `None` when the email or roll
    /// number is already taken.
    pub fn create_user(&self, user: &NewUser<'_>) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (name, email, roll_number, password_hash, role, hostel_name, room_number)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    user.name,
                    user.email,
                    user.roll_number,
                    user.password_hash,
                    user.role,
                    user.hostel_name,
                    user.room_number,
                ],
            );

            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", &id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", &email))
    }

    pub fn get_user_by_roll_number(&self, roll_number: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "roll_number", &roll_number))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Removes a user together with the complaints they own.
    /// Returns false if no such user existed.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM complaints WHERE user_id = ?1", [id])?;
            let removed = tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(removed > 0)
        })
    }

    // -- Complaints --

    pub fn insert_complaint(
        &self,
        user_id: i64,
        category: &str,
        title: &str,
        description: Option<&str>,
        status: &str,
        now: DateTime<Utc>,
    ) -> Result<ComplaintRow> {
        let ts = format_timestamp(now);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO complaints (user_id, category, title, description, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                rusqlite::params![user_id, category, title, description, status, ts],
            )?;
            let id = conn.last_insert_rowid();
            query_complaint(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("complaint {} vanished after insert", id))
        })
    }

    pub fn get_complaint(&self, id: i64) -> Result<Option<ComplaintRow>> {
        self.with_conn(|conn| query_complaint(conn, id))
    }

    pub fn list_complaints(&self) -> Result<Vec<ComplaintRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COMPLAINT_COLUMNS} FROM complaints ORDER BY id"
            ))?;
            let rows = stmt
                .query_map([], complaint_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_complaints_for_user(&self, user_id: i64) -> Result<Vec<ComplaintRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE user_id = ?1 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map([user_id], complaint_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Applies `changes` in one statement and refreshes `updated_at`.
    /// Returns the updated row, or `None` if the complaint does not exist.
    pub fn update_complaint(
        &self,
        id: i64,
        changes: &ComplaintChanges<'_>,
        now: DateTime<Utc>,
    ) -> Result<Option<ComplaintRow>> {
        let ts = format_timestamp(now);
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE complaints SET
                    category    = COALESCE(?2, category),
                    title       = COALESCE(?3, title),
                    description = CASE WHEN ?4 THEN ?5 ELSE description END,
                    status      = COALESCE(?6, status),
                    updated_at  = ?7
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    changes.category,
                    changes.title,
                    changes.description.is_some(),
                    changes.description.flatten(),
                    changes.status,
                    ts,
                ],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_complaint(conn, id)
        })
    }

    pub fn delete_complaint(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM complaints WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_user(
    conn: &Connection,
    column: &str,
    value: &dyn rusqlite::types::ToSql,
) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"
    ))?;
    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn query_complaint(conn: &Connection, id: i64) -> Result<Option<ComplaintRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE id = ?1"
    ))?;
    let row = stmt.query_row([id], complaint_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        roll_number: row.get(3)?,
        password_hash: row.get(4)?,
        role: row.get(5)?,
        hostel_name: row.get(6)?,
        room_number: row.get(7)?,
    })
}

fn complaint_from_row(row: &Row<'_>) -> rusqlite::Result<ComplaintRow> {
    Ok(ComplaintRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
