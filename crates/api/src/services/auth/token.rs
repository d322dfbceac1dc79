//! Personal access token format.
//!
//! A token handed to clients looks like `"{id}|{secret}"`, where `id` is the
//! `personal_access_tokens` row and `secret` is 40 random alphanumerics.
//! Only the sha256 hex digest of the secret is persisted.

use std::str::FromStr;

use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};

use storedesk_core::TokenId;

/// Length of the random secret half of a token.
pub const SECRET_LENGTH: usize = 40;

/// Generate a fresh token secret.
#[must_use]
pub fn generate_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect()
}

/// Hex-encoded sha256 digest of a token secret.
#[must_use]
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// A bearer token as presented by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken {
    pub id: TokenId,
    pub secret: String,
}

impl BearerToken {
    /// The string handed to the client.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        format!("{}|{}", self.id, self.secret)
    }
}

/// The presented value is not of the form `"{id}|{secret}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed bearer token")]
pub struct MalformedToken;

impl FromStr for BearerToken {
    type Err = MalformedToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, secret) = s.split_once('|').ok_or(MalformedToken)?;
        let id = id.parse::<TokenId>().map_err(|_| MalformedToken)?;

        if secret.is_empty() {
            return Err(MalformedToken);
        }

        Ok(Self {
            id,
            secret: secret.to_owned(),
        })
    }
}
