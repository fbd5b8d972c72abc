//! User accounts - registration, password verification and lookup.
//!
//! Passwords are stored as Argon2id PHC strings. Login failures never reveal
//! whether the email exists.

use crate::{
    entities::{User, user},
    errors::{Error, FieldError, Result},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use regex::Regex;
use sea_orm::{Set, SqlErr, prelude::*};
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{info, instrument, warn};

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;
/// Longest accepted display name, in characters.
pub const MAX_USER_NAME_LEN: usize = 50;

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Registration request body.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RegisterInput {
    /// Display name
    pub name: Option<String>,
    /// Login email
    pub email: Option<String>,
    /// Plain-text password
    pub password: Option<String>,
}

/// Login request body.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginInput {
    /// Login email
    pub email: Option<String>,
    /// Plain-text password
    pub password: Option<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hashes a password with Argon2id and a random salt.
///
/// # Errors
/// Returns `Error::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Checks `password` against a stored PHC hash.
///
/// # Errors
/// Returns `Error::PasswordHash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Finds a user by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by email, case-insensitively.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Validates and stores a new user.
///
/// # Errors
/// Returns `Error::Validation` for a missing or malformed field or an email that
/// is already registered, `Error::PasswordHash` if hashing fails, or a database error.
#[instrument(skip(db, input))]
pub async fn register_user(db: &DatabaseConnection, input: RegisterInput) -> Result<user::Model> {
    let mut errors = Vec::new();

    let name = input.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if name.chars().count() > MAX_USER_NAME_LEN {
        errors.push(FieldError::new(
            "name",
            format!("Name must be at most {MAX_USER_NAME_LEN} characters"),
        ));
    }

    let email = input.email.as_deref().map(normalize_email).unwrap_or_default();
    if !EMAIL_RE.is_match(&email) {
        errors.push(FieldError::new("email", "Please provide a valid email"));
    }

    let password = input.password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }

    if !errors.is_empty() {
        return Err(Error::Validation { errors });
    }

    if get_user_by_email(db, &email).await?.is_some() {
        return Err(Error::field("email", "Email is already registered"));
    }

    let user = insert_user(db, name, email, hash_password(&password)?).await?;

    info!(user_id = user.id, "Registered user");
    Ok(user)
}

/// Inserts a user row. The unique index on `email` is the final arbiter when
/// two registrations for the same address race past the lookup above.
async fn insert_user(
    db: &DatabaseConnection,
    name: &str,
    email: String,
    password_hash: String,
) -> Result<user::Model> {
    let now = chrono::Utc::now().naive_utc();
    user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email),
        password_hash: Set(password_hash),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            warn!("Registration lost a race on a duplicate email");
            Error::field("email", "Email is already registered")
        }
        _ => e.into(),
    })
}

/// Verifies a login attempt and returns the matching user.
///
/// # Errors
/// Returns `Error::InvalidCredentials` for an unknown email or a wrong password,
/// or a database error.
#[instrument(skip(db, input))]
pub async fn authenticate_user(db: &DatabaseConnection, input: LoginInput) -> Result<user::Model> {
    let (Some(email), Some(password)) = (input.email, input.password) else {
        return Err(Error::InvalidCredentials);
    };

    let Some(user) = get_user_by_email(db, &email).await? else {
        warn!("Login attempt for unknown email");
        return Err(Error::InvalidCredentials);
    };

    if verify_password(&password, &user.password_hash)? {
        Ok(user)
    } else {
        warn!(user_id = user.id, "Login attempt with wrong password");
        Err(Error::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn register_input(name: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_normalizes_email() -> Result<()> {
        let db = setup_test_db().await?;
        let user = register_user(&db, register_input(" Ada ", " Ada@Example.COM ", "secret1")).await?;

        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password_hash, "secret1");

        let found = get_user_by_email(&db, "ADA@example.com").await?.unwrap();
        assert_eq!(found.id, user.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_register_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let result = register_user(&db, register_input("", "not-an-email", "123")).await;

        match result {
            Err(Error::Validation { errors }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email", "password"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicate_email() -> Result<()> {
        let (db, user) = setup_with_user().await?;
        let result = register_user(&db, register_input("Other", &user.email, "password")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_insert_maps_to_email_error() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        // Skips the lookup, as a concurrent registration would
        let result = insert_user(&db, "Twin", user.email.clone(), "hash".to_string()).await;
        match result {
            Err(Error::Validation { errors }) => {
                assert_eq!(
                    errors,
                    vec![FieldError::new("email", "Email is already registered")]
                );
            }
            other => panic!("expected email validation error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_authenticate_user() -> Result<()> {
        let (db, user) = setup_with_user().await?;

        let login = |email: &str, password: &str| LoginInput {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };

        let ok = authenticate_user(&db, login(&user.email, TEST_PASSWORD)).await?;
        assert_eq!(ok.id, user.id);

        assert!(matches!(
            authenticate_user(&db, login(&user.email, "nope-nope")).await,
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate_user(&db, login("ghost@example.com", TEST_PASSWORD)).await,
            Err(Error::InvalidCredentials)
        ));
        Ok(())
    }
}
