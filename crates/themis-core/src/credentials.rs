//! Password hashing and generated visitor credentials.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::{OsRng, RngCore as _};
use serde::Serialize;

use crate::{Error, Result};

const MAX_USERNAME_BASE: usize = 15;
const GENERATED_PASSWORD_LEN: usize = 12;
const ALPHABET: &[u8] =
  b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Plaintext credentials, returned exactly once to the caller that caused
/// them to be created.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCredentials {
  pub username: String,
  pub password: String,
}

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Credentials(e.to_string()))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .map(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}

/// A random alphanumeric password drawn from the OS RNG.
pub fn generate_password() -> String {
  // Rejection sampling keeps the distribution uniform over the alphabet.
  let limit = 256 - (256 % ALPHABET.len());
  let mut out = String::with_capacity(GENERATED_PASSWORD_LEN);
  let mut buf = [0u8; 32];
  while out.len() < GENERATED_PASSWORD_LEN {
    OsRng.fill_bytes(&mut buf);
    for &b in &buf {
      if (b as usize) < limit && out.len() < GENERATED_PASSWORD_LEN {
        out.push(ALPHABET[b as usize % ALPHABET.len()] as char);
      }
    }
  }
  out
}

/// First initial plus last name, lower-cased ASCII alphanumerics, at most 15
/// characters. Falls back to `visitor` when nothing usable remains.
pub fn base_username(first_name: &str, last_name: &str) -> String {
  let clean = |s: &str| -> String {
    s.chars()
      .filter(char::is_ascii_alphanumeric)
      .map(|c| c.to_ascii_lowercase())
      .collect()
  };
  let first = clean(first_name);
  let last = clean(last_name);

  let mut base: String = first.chars().take(1).chain(last.chars()).collect();
  base.truncate(MAX_USERNAME_BASE);
  if base.is_empty() { "visitor".to_owned() } else { base }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn base_username_from_names() {
    assert_eq!(base_username("Maria", "Santos"), "msantos");
    assert_eq!(base_username("José", "De la Cruz"), "jdelacruz");
    assert_eq!(base_username("A", "Abcdefghijklmnopqrstuv"), "aabcdefghijklmn");
    assert_eq!(base_username("", "Smith"), "smith");
    assert_eq!(base_username("李", "王"), "visitor");
  }

  #[test]
  fn generated_passwords_are_alphanumeric() {
    let a = generate_password();
    let b = generate_password();
    assert_eq!(a.len(), GENERATED_PASSWORD_LEN);
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(a, b);
  }

  #[test]
  fn hash_then_verify() {
    let phc = hash_password("correct horse").unwrap();
    assert!(verify_password("correct horse", &phc));
    assert!(!verify_password("wrong", &phc));
    assert!(!verify_password("correct horse", "not-a-phc-string"));
  }
}
