//! API credentials, validated when they are created.
//!
//! An `ApiKey` or `SharedKey` that exists is a valid one: the only ways to
//! obtain one go through the length and charset checks, so nothing downstream
//! has to re-check before signing.

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

pub const API_KEY_LEN: usize = 20;
pub const SHARED_KEY_LEN: usize = 64;

fn is_alnum_of_len(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Public identifier sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ApiKey {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_alnum_of_len(s, API_KEY_LEN) {
            return Err(ApiError::InvalidApiKey);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<&str> for ApiKey {
    type Error = ApiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// HMAC secret paired with an `ApiKey`. Never transmitted, never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedKey(String);

impl SharedKey {
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for SharedKey {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_alnum_of_len(s, SHARED_KEY_LEN) {
            return Err(ApiError::InvalidSharedKey);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<&str> for SharedKey {
    type Error = ApiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedKey(<redacted>)")
    }
}

/// A validated API key / shared key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: ApiKey,
    shared_key: SharedKey,
}

impl Credentials {
    /// Validate both keys. The API key is checked first.
    pub fn new(api_key: &str, shared_key: &str) -> Result<Self, ApiError> {
        Ok(Self {
            api_key: api_key.parse()?,
            shared_key: shared_key.parse()?,
        })
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    pub(crate) fn shared_key(&self) -> &SharedKey {
        &self.shared_key
    }
}
