//! Database row types. These map directly to SQLite rows and stay distinct
//! from the hostel-types API models; the `TryFrom` impls are the only bridge.

use anyhow::{Context, Error, Result};
use chrono::{DateTime, Utc};

use hostel_types::models::{Complaint, ComplaintStatus, Hostel, Role, User};

pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub roll_number: String,
    pub password_hash: String,
    pub role: String,
    pub hostel_name: Option<String>,
    pub room_number: Option<String>,
}

/// Insert parameters for a new account.
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub roll_number: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub hostel_name: Option<&'a str>,
    pub room_number: Option<&'a str>,
}

pub struct ComplaintRow {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Column values a complaint update may touch. `None` keeps the stored value;
/// `description: Some(None)` clears it.
#[derive(Default)]
pub struct ComplaintChanges<'a> {
    pub category: Option<&'a str>,
    pub title: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub status: Option<&'a str>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        let role = row
            .role
            .parse::<Role>()
            .with_context(|| format!("corrupt role on user {}", row.id))?;
        let hostel_name = row
            .hostel_name
            .as_deref()
            .map(str::parse::<Hostel>)
            .transpose()
            .with_context(|| format!("corrupt hostel_name on user {}", row.id))?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            roll_number: row.roll_number,
            role,
            hostel_name,
            room_number: row.room_number,
        })
    }
}

impl TryFrom<ComplaintRow> for Complaint {
    type Error = Error;

    fn try_from(row: ComplaintRow) -> Result<Self> {
        let status = row
            .status
            .parse::<ComplaintStatus>()
            .with_context(|| format!("corrupt status on complaint {}", row.id))?;

        Ok(Complaint {
            id: row.id,
            user_id: row.user_id,
            category: row.category,
            title: row.title,
            description: row.description,
            status,
            created_at: parse_timestamp(&row.created_at)
                .with_context(|| format!("corrupt created_at on complaint {}", row.id))?,
            updated_at: parse_timestamp(&row.updated_at)
                .with_context(|| format!("corrupt updated_at on complaint {}", row.id))?,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}
