//! Complaint lifecycle rules.
//!
//! Every read-single and mutating operation checks existence first and
//! permission second, so probing a missing id always yields `NotFound`.
//! Status may move between any two values; only admins may move it.

use chrono::Utc;
use tracing::info;

use hostel_db::Database;
use hostel_db::models::ComplaintChanges;
use hostel_types::api::{CreateComplaintRequest, UpdateComplaintRequest};
use hostel_types::models::{Complaint, ComplaintStatus, User};

use crate::error::ApiError;
use crate::middleware::{require_admin, require_owner_or_admin};

fn not_found() -> ApiError {
    ApiError::NotFound("Complaint not found".into())
}

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Files a new complaint for `owner_id`. Status always starts at `Pending`.
pub fn create(
    db: &Database,
    owner_id: i64,
    req: &CreateComplaintRequest,
) -> Result<Complaint, ApiError> {
    require_text("Category", &req.category)?;
    require_text("Title", &req.title)?;

    let row = db.insert_complaint(
        owner_id,
        &req.category,
        &req.title,
        req.description.as_deref(),
        ComplaintStatus::Pending.as_str(),
        Utc::now(),
    )?;
    let complaint = Complaint::try_from(row)?;

    info!(complaint_id = complaint.id, user_id = owner_id, "Complaint created");
    Ok(complaint)
}

pub fn get(db: &Database, id: i64) -> Result<Complaint, ApiError> {
    let row = db.get_complaint(id)?.ok_or_else(not_found)?;
    Ok(Complaint::try_from(row)?)
}

/// A single complaint as seen by `caller`.
pub fn get_for(db: &Database, id: i64, caller: &User) -> Result<Complaint, ApiError> {
    let complaint = get(db, id)?;
    require_owner_or_admin(caller, complaint.user_id, "access")?;
    Ok(complaint)
}

pub fn list_for_user(db: &Database, owner_id: i64) -> Result<Vec<Complaint>, ApiError> {
    collect(db.list_complaints_for_user(owner_id)?)
}

pub fn list_all(db: &Database, caller: &User) -> Result<Vec<Complaint>, ApiError> {
    require_admin(caller)?;
    collect(db.list_complaints()?)
}

/// Admins see every complaint, students only their own.
pub fn list_visible(db: &Database, caller: &User) -> Result<Vec<Complaint>, ApiError> {
    if caller.role.is_admin() {
        list_all(db, caller)
    } else {
        list_for_user(db, caller.id)
    }
}

pub fn update(
    db: &Database,
    id: i64,
    patch: &UpdateComplaintRequest,
    caller: &User,
) -> Result<Complaint, ApiError> {
    let existing = get(db, id)?;
    require_owner_or_admin(caller, existing.user_id, "update")?;

    if !caller.role.is_admin() && patch.status.is_some() {
        return Err(ApiError::Forbidden(
            "Students cannot update complaint status".into(),
        ));
    }
    if let Some(category) = &patch.category {
        require_text("Category", category)?;
    }
    if let Some(title) = &patch.title {
        require_text("Title", title)?;
    }

    let changes = ComplaintChanges {
        category: patch.category.as_deref(),
        title: patch.title.as_deref(),
        description: patch.description.as_ref().map(Option::as_deref),
        status: patch.status.map(|s| s.as_str()),
    };

    // Deleted between the read and the write.
    let row = db
        .update_complaint(id, &changes, Utc::now())?
        .ok_or_else(not_found)?;
    let complaint = Complaint::try_from(row)?;

    info!(
        complaint_id = id,
        user_id = caller.id,
        status = complaint.status.as_str(),
        "Complaint updated"
    );
    Ok(complaint)
}

pub fn delete(db: &Database, id: i64, caller: &User) -> Result<(), ApiError> {
    let existing = get(db, id)?;
    require_owner_or_admin(caller, existing.user_id, "delete")?;

    if !db.delete_complaint(id)? {
        return Err(not_found());
    }

    info!(complaint_id = id, user_id = caller.id, "Complaint deleted");
    Ok(())
}

fn collect(rows: Vec<hostel_db::models::ComplaintRow>) -> Result<Vec<Complaint>, ApiError> {
    rows.into_iter()
        .map(|row| Complaint::try_from(row).map_err(ApiError::from))
        .collect()
}
