//! JWT bearer tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use twig_core::model::UserId;

#[derive(Debug, Error)]
pub enum TokenError {
  #[error("jwt error: {0}")]
  Jwt(#[from] jsonwebtoken::errors::Error),

  #[error("token subject is not a user id: {0:?}")]
  Subject(String),

  #[error("token lifetime overflows the clock")]
  Lifetime,
}

/// Claims carried by a Twig bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// The user id, as a decimal string.
  pub sub: String,
  pub iat: i64,
  pub exp: i64,
}

/// Issues and verifies HS256 tokens with a shared secret.
pub struct TokenIssuer {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        Duration,
}

impl TokenIssuer {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation: Validation::default(),
      ttl,
    }
  }

  pub fn issue(&self, user: UserId) -> Result<String, TokenError> {
    let now = Utc::now();
    let exp = now.checked_add_signed(self.ttl).ok_or(TokenError::Lifetime)?;
    let claims = Claims {
      sub: user.to_string(),
      iat: now.timestamp(),
      exp: exp.timestamp(),
    };
    Ok(encode(&Header::default(), &claims, &self.encoding)?)
  }

  /// Check signature and expiry and return the user the token was issued to.
  pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
    let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
    data
      .claims
      .sub
      .parse()
      .map(UserId)
      .map_err(|_| TokenError::Subject(data.claims.sub.clone()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn issued_tokens_verify() {
    let issuer = TokenIssuer::new(b"test-secret", Duration::hours(1));
    let token = issuer.issue(UserId(42)).unwrap();
    assert_eq!(issuer.verify(&token).unwrap(), UserId(42));
  }

  #[test]
  fn foreign_secret_is_rejected() {
    let ours = TokenIssuer::new(b"ours", Duration::hours(1));
    let theirs = TokenIssuer::new(b"theirs", Duration::hours(1));
    let token = theirs.issue(UserId(1)).unwrap();
    assert!(matches!(ours.verify(&token), Err(TokenError::Jwt(_))));
  }

  #[test]
  fn expired_tokens_are_rejected() {
    let issuer = TokenIssuer::new(b"secret", Duration::hours(-2));
    let token = issuer.issue(UserId(1)).unwrap();
    assert!(issuer.verify(&token).is_err());
  }

  #[test]
  fn lifetime_past_the_end_of_time_is_an_error() {
    let issuer = TokenIssuer::new(b"secret", Duration::MAX);
    assert!(matches!(issuer.issue(UserId(1)), Err(TokenError::Lifetime)));
  }

  #[test]
  fn garbage_is_rejected() {
    let issuer = TokenIssuer::new(b"secret", Duration::hours(1));
    assert!(issuer.verify("not.a.jwt").is_err());
  }
}
