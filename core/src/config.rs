//! Client configuration.
//!
//! Where the values come from (env, file, secret store) is up to the caller;
//! this type only describes what a client needs and is serde-friendly so it
//! can be embedded in a larger configuration document.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::error::ApiError;

/// Production API host.
pub const DEFAULT_HOST: &str = "https://api.pdfrepro.de";

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_key: String,
    pub shared_key: String,
    /// Alternate API host. `None` or empty means `DEFAULT_HOST`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key)
            .field("shared_key", &"<redacted>")
            .field("host", &self.host)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: &str, shared_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            shared_key: shared_key.to_string(),
            host: None,
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    pub fn credentials(&self) -> Result<Credentials, ApiError> {
        Credentials::new(&self.api_key, &self.shared_key)
    }

    pub fn host(&self) -> &str {
        match self.host.as_deref() {
            Some(host) if !host.is_empty() => host,
            _ => DEFAULT_HOST,
        }
    }
}
