//! User accounts: creation and the credential check behind session login.
//!
//! Passwords are stored as `argon2id$<salt hex>$<key hex>`: an Argon2id key
//! derived with a random 16-byte salt per account.

pub mod handlers;

use argon2::Argon2;
use rand::RngCore;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub user_name: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewAccount {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.user_name.trim().is_empty() {
            return Err(AppError::Validation("user_name cannot be blank".to_string()));
        }
        if self.password.is_empty() {
            return Err(AppError::Validation("password cannot be empty".to_string()));
        }
        Ok(())
    }
}

const PASSWORD_SCHEME: &str = "argon2id";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

fn derive_key(password: &str, salt: &[u8]) -> Result<[u8; KEY_LEN], AppError> {
    let mut key = [0u8; KEY_LEN];
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Argon2 key derivation failed: {e}")))?;
    Ok(key)
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    let key = derive_key(password, &salt)?;
    Ok(format!(
        "{PASSWORD_SCHEME}${}${}",
        hex::encode(salt),
        hex::encode(key)
    ))
}

/// Checks `password` against a value produced by `hash_password`.
/// Malformed stored values never match.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AppError> {
    let mut parts = stored.split('$');
    let (Some(PASSWORD_SCHEME), Some(salt), Some(expected), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Ok(false);
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return Ok(false);
    };
    if salt.len() != SALT_LEN || expected.len() != KEY_LEN {
        return Ok(false);
    }
    let key = derive_key(password, &salt)?;
    let diff = key
        .iter()
        .zip(&expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));
    Ok(diff == 0)
}

/// Runs CPU-bound key derivation on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}

pub async fn create_account(pool: &PgPool, account: &NewAccount) -> Result<User, AppError> {
    account.validate()?;
    let user_name = account.user_name.trim();
    let password = account.password.clone();
    let password_hash = blocking(move || hash_password(&password)).await?;

    let inserted = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (user_id, user_name, user_password, full_name, email, phone)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING user_id, user_name, user_password, full_name, email, phone
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_name)
    .bind(password_hash)
    .bind(blank_to_none(&account.full_name))
    .bind(blank_to_none(&account.email))
    .bind(blank_to_none(&account.phone))
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(user) => {
            info!("Created account {} ({})", user.user_name, user.user_id);
            Ok(user)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
            format!("user name '{user_name}' is already taken"),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Returns the user id when `password` matches the stored hash.
pub async fn verify_credentials(
    pool: &PgPool,
    user_name: &str,
    password: &str,
) -> Result<Uuid, AppError> {
    let row: Option<(Uuid, String)> =
        sqlx::query_as("SELECT user_id, user_password FROM users WHERE user_name = $1")
            .bind(user_name.trim())
            .fetch_optional(pool)
            .await?;

    if let Some((user_id, stored)) = row {
        let password = password.to_string();
        if blocking(move || verify_password(&password, &stored)).await? {
            return Ok(user_id);
        }
    }
    warn!("Failed login for user name '{}'", user_name.trim());
    Err(AppError::Unauthorized)
}

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_password_hashes_differently_per_salt() {
        let first = hash_password("password").unwrap();
        let second = hash_password("password").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("argon2id$"));
        assert!(!first.contains("password"));
    }

    #[test]
    fn test_verify_password_accepts_only_the_original() {
        let stored = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &stored).unwrap());
        assert!(!verify_password("correct horsf", &stored).unwrap());
        assert!(!verify_password("", &stored).unwrap());
    }

    #[test]
    fn test_malformed_stored_hash_never_matches() {
        let sha256_of_password = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
        assert!(!verify_password("password", sha256_of_password).unwrap());
        assert!(!verify_password("password", "argon2id$zz$00").unwrap());
        assert!(!verify_password("password", "argon2id$00$11$extra").unwrap());
        let short_salt = format!("argon2id$00${}", "11".repeat(KEY_LEN));
        assert!(!verify_password("password", &short_salt).unwrap());
    }

    #[test]
    fn test_blank_user_name_is_rejected() {
        let account = NewAccount {
            user_name: "  ".to_string(),
            password: "secret".to_string(),
            full_name: None,
            email: None,
            phone: None,
        };
        assert!(matches!(account.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_blank_optional_fields_become_null() {
        assert_eq!(blank_to_none(&Some(" ".to_string())), None);
        assert_eq!(blank_to_none(&Some(" jane@example.com ".to_string())), Some("jane@example.com"));
        assert_eq!(blank_to_none(&None), None);
    }
}
