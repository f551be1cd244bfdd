//! Password hashing and session token helpers.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::ApiError;

/// Hash `password` into an argon2id PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// `true` when `password` matches the PHC string `hash`. A malformed hash
/// never matches.
pub fn verify_password(hash: &str, password: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// `len` random bytes from the OS, hex-encoded.
pub fn random_hex(len: usize) -> String {
  let mut buf = vec![0u8; len];
  OsRng.fill_bytes(&mut buf);
  hex::encode(buf)
}

/// A new opaque session token for the client's cookie.
pub fn new_session_token() -> String { random_hex(32) }

/// What the store keeps instead of the raw session token.
pub fn session_digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }
