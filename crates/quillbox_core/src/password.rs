//! Password hashing and verification.
//!
//! # Responsibility
//! - One-way transformation of plaintext passwords into storable hashes.
//! - Verification of candidate passwords against stored hashes.
//!
//! # Invariants
//! - Hashes are salted per call; equal inputs produce different outputs.
//! - Verification never errors on malformed input; it yields `false`.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error raised when the hashing primitive itself fails.
#[derive(Debug)]
pub enum PasswordHashError {
    Hash(argon2::password_hash::Error),
}

impl Display for PasswordHashError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash(err) => write!(f, "password hashing failed: {err}"),
        }
    }
}

impl Error for PasswordHashError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Hash(err) => Some(err),
        }
    }
}

impl From<argon2::password_hash::Error> for PasswordHashError {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::Hash(value)
    }
}

/// Hashes a plaintext password into an Argon2id PHC string.
///
/// The salt is drawn from the OS RNG per call, so callers must not assume
/// determinism: hashing the same input twice yields different strings.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

/// Verifies a candidate password against a stored PHC hash string.
///
/// Returns `true` iff `plaintext`, hashed with the salt embedded in
/// `stored_hash`, matches it. A malformed `stored_hash` yields `false`.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}
