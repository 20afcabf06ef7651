use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{ComplaintStatus, Hostel, Role};

// -- JWT Claims --

/// Session token claims. `sub` carries the user id as a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

// -- Users --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub roll_number: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    pub hostel_name: Option<Hostel>,
    pub room_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub role: Role,
}

// -- Complaints --

/// Body of a complaint creation. Unknown fields (a client-supplied `status`,
/// for one) are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateComplaintRequest {
    pub category: String,
    pub title: String,
    pub description: Option<String>,
}

/// Partial update; every omitted field is left unchanged. `description` is
/// tri-state: omitted keeps it, `null` clears it, a string replaces it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateComplaintRequest {
    pub category: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub status: Option<ComplaintStatus>,
}

/// Marks a field as present, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_distinguishes_omitted_null_and_value() {
        let omitted: UpdateComplaintRequest = serde_json::from_str(r#"{"title":"Leak"}"#).unwrap();
        assert_eq!(omitted.description, None);

        let cleared: UpdateComplaintRequest =
            serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: UpdateComplaintRequest =
            serde_json::from_str(r#"{"description":"Under the sink"}"#).unwrap();
        assert_eq!(set.description, Some(Some("Under the sink".to_string())));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let login: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"pw","remember":true}"#).unwrap();
        assert_eq!(login.email, "a@x.com");

        let patch: UpdateComplaintRequest =
            serde_json::from_str(r#"{"status":"Resolved","id":3,"user_id":9}"#).unwrap();
        assert_eq!(patch.status, Some(ComplaintStatus::Resolved));
    }
}
