//! Admin login gate
//!
//! One fixed credential pair. No sessions, lockout or expiry: the outcome
//! is a boolean held by the admin view until it logs out.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::{info, warn};

use crate::error::{Error, Result};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";

/// Shown inline on a failed login
pub const LOGIN_FAILED_MESSAGE: &str = "用户名或密码错误";

/// Login state of one admin view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub username: Option<String>,
}

/// Checks the configured admin credentials
#[derive(Debug, Clone)]
pub struct AdminGate {
    username: String,
    password_hash: String,
}

impl AdminGate {
    /// Build a gate from a plain password, hashing it once
    pub fn new(username: impl Into<String>, password: &str) -> Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Config(format!("Failed to hash admin password: {}", e)))?
            .to_string();

        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }

    /// Build a gate from a stored PHC hash string
    pub fn from_hash(username: impl Into<String>, password_hash: impl Into<String>) -> Result<Self> {
        let password_hash = password_hash.into();
        PasswordHash::new(&password_hash)
            .map_err(|e| Error::Config(format!("Invalid admin password hash: {}", e)))?;

        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether the pair matches
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username != self.username {
            return false;
        }
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Log a view in; on mismatch the state is left untouched
    pub fn login(&self, state: &mut AuthState, username: &str, password: &str) -> Result<()> {
        if !self.verify(username, password) {
            warn!(username, "Admin login failed");
            return Err(Error::Authentication(LOGIN_FAILED_MESSAGE.to_string()));
        }

        info!(username, "Admin logged in");
        state.is_authenticated = true;
        state.username = Some(username.to_string());
        Ok(())
    }

    pub fn logout(&self, state: &mut AuthState) {
        *state = AuthState::default();
    }
}
