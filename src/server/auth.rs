//! HTTP Basic authentication for the UI boundary.
//!
//! Credentials are loaded from the environment once at startup; requests are
//! checked against sha256 digests with a constant-time comparison so the
//! check leaks no prefix-length timing signal.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Environment variable holding the expected UI username.
pub const USERNAME_ENV: &str = "CRONVISOR_UI_USERNAME";

/// Environment variable holding the expected UI password.
pub const PASSWORD_ENV: &str = "CRONVISOR_UI_PASSWORD";

/// Errors configuring or running the UI server.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UiError {
    /// Required credential environment variable is not set.
    #[error("missing credential environment variable {var}")]
    MissingCredential {
        /// Name of the variable.
        var: &'static str,
    },

    /// Credential environment variable is set but empty.
    #[error("credential environment variable {var} is empty")]
    EmptyCredential {
        /// Name of the variable.
        var: &'static str,
    },

    /// Could not bind the listen address.
    #[error("failed to bind {addr}")]
    Bind {
        /// The requested address.
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server failed while serving.
    #[error("ui server error")]
    Serve(#[source] std::io::Error),
}

/// Verifier for `Authorization: Basic` credentials.
///
/// Holds digests only; the plaintext credentials are dropped after
/// construction.
#[derive(Clone)]
pub struct BasicAuth {
    user_digest: [u8; 32],
    pass_digest: [u8; 32],
}

impl BasicAuth {
    /// Builds a verifier for the given credentials.
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            user_digest: Sha256::digest(username).into(),
            pass_digest: Sha256::digest(password).into(),
        }
    }

    /// Loads credentials from [`USERNAME_ENV`] and [`PASSWORD_ENV`].
    pub fn from_env() -> Result<Self, UiError> {
        Self::from_values(
            std::env::var(USERNAME_ENV).ok(),
            std::env::var(PASSWORD_ENV).ok(),
        )
    }

    fn from_values(user: Option<String>, pass: Option<String>) -> Result<Self, UiError> {
        let user = require(USERNAME_ENV, user)?;
        let pass = require(PASSWORD_ENV, pass)?;
        Ok(Self::new(&user, &pass))
    }

    /// Decides whether an `Authorization` header value grants access.
    ///
    /// Both username and password digests are always compared, so a wrong
    /// username costs the same as a wrong password.
    pub fn authorize(&self, header: Option<&str>) -> bool {
        let Some((user, pass)) = header.and_then(decode_basic) else {
            return false;
        };
        let user_ok = constant_time_eq(&self.user_digest, Sha256::digest(&user).as_slice());
        let pass_ok = constant_time_eq(&self.pass_digest, Sha256::digest(&pass).as_slice());
        user_ok & pass_ok
    }
}

fn require(var: &'static str, value: Option<String>) -> Result<String, UiError> {
    match value {
        Some(v) if v.is_empty() => Err(UiError::EmptyCredential { var }),
        Some(v) => Ok(v),
        None => Err(UiError::MissingCredential { var }),
    }
}

/// Parses `Basic <base64(user:pass)>` into its parts.
fn decode_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Equality over fixed-size digests without short-circuiting.
fn constant_time_eq(expected: &[u8; 32], got: &[u8]) -> bool {
    if got.len() != expected.len() {
        return false;
    }
    let mut diff = 0u8;
    for (a, b) in expected.iter().zip(got) {
        diff |= a ^ b;
    }
    diff == 0
}
