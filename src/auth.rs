//! Authentication
//!
//! Password hashing (Argon2id PHC strings) and HS256 access tokens whose
//! subject is the user's email.
//!
//! ```text
//! register → hash_password → Store::create_user
//! login    → authenticate → TokenKeys::issue → {access_token, "bearer"}
//! request  → Bearer token → TokenKeys::decode → Store::get_user_by_email
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::store::{NewUser, Store, StoreError, User};

/// Authentication failures
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("User not found")]
    UnknownUser,

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Signing material and lifetime for access tokens
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes.max(1)),
        }
    }

    /// Issue an access token for `email`
    pub fn issue(&self, email: &str) -> AuthResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify signature and expiry; any failure is `InvalidToken`
    pub fn decode(&self, token: &str) -> AuthResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                AuthError::InvalidToken
            })
    }
}

pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Constant-time check of `password` against a stored PHC string
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Password rule for changes: 8+ chars with a letter, a digit and a symbol
pub fn check_password_strength(password: &str) -> AuthResult<()> {
    let long_enough = password.chars().count() >= 8;
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

    if long_enough && has_letter && has_digit && has_symbol {
        Ok(())
    } else {
        Err(AuthError::WeakPassword(
            "Password must be at least 8 characters long and contain a letter, a digit and a special character"
                .to_string(),
        ))
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Look up the account and check its password
pub fn authenticate(store: &Store, email: &str, password: &str) -> AuthResult<User> {
    let user = store
        .get_user_by_email(email)?
        .ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(user)
}

/// Hash the password and create the account
pub fn register(
    store: &Store,
    email: &str,
    full_name: &str,
    phone: Option<String>,
    password: &str,
    is_admin: bool,
) -> AuthResult<User> {
    let password_hash = hash_password(password)?;
    let user = store.create_user(NewUser {
        email: email.to_string(),
        full_name: full_name.to_string(),
        phone,
        password_hash,
        is_admin,
    })?;
    tracing::info!(user_id = user.user_id, is_admin, "Registered user");
    Ok(user)
}

/// Resolve a bearer token to its account
pub fn user_from_token(store: &Store, keys: &TokenKeys, token: &str) -> AuthResult<User> {
    let claims = keys.decode(token)?;
    store
        .get_user_by_email(&claims.sub)?
        .ok_or(AuthError::UnknownUser)
}

/// Verify the current password, check the new one, store its hash
pub fn change_password(
    store: &Store,
    user: &User,
    current_password: &str,
    new_password: &str,
) -> AuthResult<()> {
    if !verify_password(current_password, &user.password_hash) {
        return Err(AuthError::WrongPassword);
    }
    check_password_strength(new_password)?;
    let hash = hash_password(new_password)?;
    store.set_password_hash(user.user_id, &hash)?;
    tracing::info!(user_id = user.user_id, "Password changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
        assert!(!verify_password("secret123", "not a phc string"));
    }

    #[test]
    fn test_token_roundtrip_and_tamper() {
        let keys = TokenKeys::new("test-secret", 60);
        let token = keys.issue("reader@example.com").unwrap();

        let claims = keys.decode(&token).unwrap();
        assert_eq!(claims.sub, "reader@example.com");
        assert!(claims.exp > claims.iat);

        let other = TokenKeys::new("other-secret", 60);
        assert!(matches!(other.decode(&token), Err(AuthError::InvalidToken)));
        assert!(matches!(keys.decode("garbage"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = TokenKeys::new("test-secret", 60);
        let claims = Claims {
            sub: "reader@example.com".to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();
        assert!(matches!(keys.decode(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_password_strength() {
        assert!(check_password_strength("abc123!x").is_ok());
        assert!(check_password_strength("пароль1!").is_ok());
        assert!(check_password_strength("short1!").is_err());
        assert!(check_password_strength("abcdefgh1").is_err());
        assert!(check_password_strength("abcdefgh!").is_err());
        assert!(check_password_strength("12345678!").is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email(" reader@example.com "));
        assert!(!is_valid_email("reader@example"));
        assert!(!is_valid_email("no spaces@example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_register_authenticate_change_password() {
        let store = Store::open_in_memory().unwrap();
        let user = register(&store, "Reader@Example.com", "Reader", None, "secret123", false).unwrap();

        assert!(matches!(
            authenticate(&store, "reader@example.com", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&store, "nobody@example.com", "secret123"),
            Err(AuthError::InvalidCredentials)
        ));
        let logged_in = authenticate(&store, "READER@example.com", "secret123").unwrap();
        assert_eq!(logged_in.user_id, user.user_id);

        assert!(change_password(&store, &logged_in, "wrong", "n3w-password").is_err());
        assert!(change_password(&store, &logged_in, "secret123", "weak").is_err());
        change_password(&store, &logged_in, "secret123", "n3w-password").unwrap();
        assert!(authenticate(&store, "reader@example.com", "n3w-password").is_ok());
    }

    #[test]
    fn test_user_from_token() {
        let store = Store::open_in_memory().unwrap();
        let keys = TokenKeys::new("test-secret", 60);
        register(&store, "a@example.com", "A", None, "secret123", false).unwrap();

        let token = keys.issue("a@example.com").unwrap();
        assert_eq!(user_from_token(&store, &keys, &token).unwrap().email, "a@example.com");

        let orphan = keys.issue("ghost@example.com").unwrap();
        assert!(matches!(
            user_from_token(&store, &keys, &orphan),
            Err(AuthError::UnknownUser)
        ));
    }
}
