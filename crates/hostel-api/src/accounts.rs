//! Registration and credential checks.

use std::sync::OnceLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::SaltString,
};
use rand_core::OsRng;
use tracing::{info, warn};

use hostel_db::Database;
use hostel_db::models::NewUser;
use hostel_types::api::{LoginRequest, LoginResponse, RegisterRequest};
use hostel_types::models::{Role, User};

use crate::error::ApiError;
use crate::token::{Identity, TokenService};

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Unparseable password hash in store: {}", e);
            false
        }
    }
}

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Hash checked against when the email is unknown, so both login failure
/// paths do the same work. Computed once, normally at startup via [`init`].
fn dummy_hash() -> Result<&'static str, ApiError> {
    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash.as_str());
    }
    let hash = hash_password("hostel-dummy-password")?;
    Ok(DUMMY_HASH.get_or_init(|| hash).as_str())
}

/// Prepares credential checking. Call once before serving requests.
pub fn init() -> Result<(), ApiError> {
    dummy_hash().map(|_| ())
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Name must not be empty".into()));
    }
    if !is_email(req.email.trim()) {
        return Err(ApiError::Validation("Invalid email address".into()));
    }
    if req.roll_number.trim().is_empty() {
        return Err(ApiError::Validation("Roll number must not be empty".into()));
    }
    if req.password.is_empty() {
        return Err(ApiError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

fn is_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !s.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Creates an account. Email uniqueness is checked before roll number.
pub fn register(db: &Database, req: RegisterRequest) -> Result<User, ApiError> {
    validate_registration(&req)?;

    let email = req.email.trim();
    let roll_number = req.roll_number.trim();

    if db.get_user_by_email(email)?.is_some() {
        return Err(ApiError::Conflict("Email already registered".into()));
    }
    if db.get_user_by_roll_number(roll_number)?.is_some() {
        return Err(ApiError::Conflict("Roll number already registered".into()));
    }

    let password_hash = hash_password(&req.password)?;

    let id = db
        .create_user(&NewUser {
            name: req.name.trim(),
            email,
            roll_number,
            password_hash: &password_hash,
            role: req.role.as_str(),
            hostel_name: req.hostel_name.map(|h| h.as_str()),
            room_number: req.room_number.as_deref(),
        })?
        // Lost a race with a concurrent registration.
        .ok_or_else(|| ApiError::Conflict("Email or roll number already registered".into()))?;

    info!(user_id = id, role = req.role.as_str(), "User registered");

    Ok(User {
        id,
        name: req.name.trim().to_string(),
        email: email.to_string(),
        roll_number: roll_number.to_string(),
        role: req.role,
        hostel_name: req.hostel_name,
        room_number: req.room_number,
    })
}

/// Unknown email and wrong password fail identically.
pub fn login(
    db: &Database,
    tokens: &TokenService,
    req: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let email = req.email.trim();

    let Some(row) = db.get_user_by_email(email)? else {
        verify_password(&req.password, dummy_hash()?);
        info!("Login failed: unknown account");
        return Err(ApiError::Unauthenticated);
    };

    if !verify_password(&req.password, &row.password_hash) {
        info!(user_id = row.id, "Login failed: bad password");
        return Err(ApiError::Unauthenticated);
    }

    let user = User::try_from(row)?;
    let access_token = tokens.issue(&Identity {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    })?;

    info!(user_id = user.id, role = user.role.as_str(), "Login successful");

    Ok(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        role: user.role,
    })
}

/// Makes sure an admin account with `email` exists. Returns false if the
/// email was already registered, in which case the account is left untouched.
pub fn ensure_admin(
    db: &Database,
    name: &str,
    email: &str,
    roll_number: &str,
    password: &str,
) -> Result<bool, ApiError> {
    if db.get_user_by_email(email)?.is_some() {
        info!("Admin user already exists");
        return Ok(false);
    }

    register(
        db,
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            roll_number: roll_number.to_string(),
            password: password.to_string(),
            role: Role::Admin,
            hostel_name: None,
            room_number: None,
        },
    )?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use hostel_types::models::Hostel;

    use super::*;

    fn request(email: &str, roll: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Asha".into(),
            email: email.into(),
            roll_number: roll.into(),
            password: "hunter22".into(),
            role: Role::Student,
            hostel_name: Some(Hostel::NewRuby),
            room_number: Some("B-12".into()),
        }
    }

    fn tokens() -> TokenService {
        TokenService::new("accounts-test-secret", Duration::hours(2))
    }

    #[test]
    fn register_stores_a_hash_not_the_password() {
        let db = Database::open_in_memory().unwrap();
        let user = register(&db, request("a@x.com", "A1")).unwrap();

        assert_eq!(user.role, Role::Student);
        assert_eq!(user.hostel_name, Some(Hostel::NewRuby));

        let row = db.get_user_by_id(user.id).unwrap().unwrap();
        assert_ne!(row.password_hash, "hunter22");
        assert!(verify_password("hunter22", &row.password_hash));
    }

    #[test]
    fn duplicate_email_conflicts_regardless_of_other_fields() {
        let db = Database::open_in_memory().unwrap();
        register(&db, request("a@x.com", "A1")).unwrap();

        let err = register(&db, request("a@x.com", "ZZ9")).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(ref m) if m == "Email already registered"));
    }

    #[test]
    fn duplicate_roll_number_conflicts() {
        let db = Database::open_in_memory().unwrap();
        register(&db, request("a@x.com", "A1")).unwrap();

        let err = register(&db, request("b@x.com", "A1")).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(ref m) if m == "Roll number already registered"));
    }

    #[test]
    fn email_is_checked_before_roll_number() {
        let db = Database::open_in_memory().unwrap();
        register(&db, request("a@x.com", "A1")).unwrap();

        let err = register(&db, request("a@x.com", "A1")).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(ref m) if m == "Email already registered"));
    }

    #[test]
    fn malformed_email_is_a_validation_error() {
        let db = Database::open_in_memory().unwrap();
        let err = register(&db, request("not-an-email", "A1")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn login_failures_are_indistinguishable() {
        let db = Database::open_in_memory().unwrap();
        register(&db, request("a@x.com", "A1")).unwrap();
        let tokens = tokens();

        let wrong_password = login(
            &db,
            &tokens,
            &LoginRequest {
                email: "a@x.com".into(),
                password: "wrong".into(),
            },
        )
        .unwrap_err();
        let unknown_email = login(
            &db,
            &tokens,
            &LoginRequest {
                email: "nobody@x.com".into(),
                password: "hunter22".into(),
            },
        )
        .unwrap_err();

        assert!(matches!(wrong_password, ApiError::Unauthenticated));
        assert!(matches!(unknown_email, ApiError::Unauthenticated));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.status(), unknown_email.status());
    }

    #[test]
    fn login_issues_token_for_the_account() {
        let db = Database::open_in_memory().unwrap();
        let user = register(&db, request("a@x.com", "A1")).unwrap();
        let tokens = tokens();

        let resp = login(
            &db,
            &tokens,
            &LoginRequest {
                email: "a@x.com".into(),
                password: "hunter22".into(),
            },
        )
        .unwrap();

        assert_eq!(resp.token_type, "bearer");
        assert_eq!(resp.role, Role::Student);
        assert_eq!(tokens.validate(&resp.access_token).unwrap().user_id, user.id);
    }

    #[test]
    fn dummy_hash_is_a_real_argon2_hash() {
        init().unwrap();
        let hash = dummy_hash().unwrap();
        assert!(PasswordHash::new(hash).is_ok());
        assert!(!verify_password("anything", hash));
    }

    #[test]
    fn ensure_admin_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(ensure_admin(&db, "Admin User", "admin@example.com", "ADMIN001", "pw").unwrap());
        assert!(!ensure_admin(&db, "Admin User", "admin@example.com", "ADMIN001", "pw").unwrap());

        let row = db.get_user_by_email("admin@example.com").unwrap().unwrap();
        assert_eq!(row.role, "admin");
    }
}
