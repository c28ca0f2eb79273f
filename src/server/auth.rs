//! Password authentication for every request.
//!
//! The service is protected by a single password supplied at startup. The
//! password itself is never kept: it is turned into a salted SHA-256
//! [`PasswordHash`] once, and each request's HTTP Basic credential is checked
//! against that hash. The username part of the credential is ignored.
//!
//! # Hash Format
//!
//! ```text
//! stored = hex(salt[16]) ‖ hex(sha256(hex(salt[16]) ‖ password))
//!          └─ 32 chars ─┘  └──────────────── 64 chars ──────────┘
//! ```
//!
//! Verification takes the first 32 characters as the salt, recomputes the
//! digest for the presented password and compares the reconstruction with
//! the stored string in constant time.
//!
//! # Example
//!
//! ```rust
//! use nvgl8r::server::auth::PasswordHash;
//!
//! let hash = PasswordHash::generate("secret123");
//! assert!(hash.verify("secret123"));
//! assert!(!hash.verify("secret124"));
//! ```

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

// =============================================================================
// Constants
// =============================================================================

/// Realm presented in the authentication challenge.
pub const REALM: &str = "Nvgl8r";

/// Salt length in bytes (hex-encoded to twice as many characters).
pub const SALT_LEN: usize = 16;

const SALT_HEX_LEN: usize = SALT_LEN * 2;

// =============================================================================
// Password Hash
// =============================================================================

/// Salted SHA-256 password hash, stored as one 96-character hex string.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `password` with a fresh random salt.
    pub fn generate(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self::with_salt(&hex::encode(salt), password)
    }

    /// Wrap an already-computed hash string.
    pub fn from_stored(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    fn with_salt(salt: &str, password: &str) -> Self {
        Self(format!("{}{}", salt, digest(salt, password)))
    }

    /// Check `password` against this hash.
    pub fn verify(&self, password: &str) -> bool {
        verify_password(&self.0, password)
    }

    /// The stored `salt ‖ digest` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Verify `password` against a stored `salt ‖ digest` string.
///
/// An empty or truncated stored value never verifies.
pub fn verify_password(stored: &str, password: &str) -> bool {
    let Some(salt) = stored.get(..SALT_HEX_LEN) else {
        return false;
    };

    let expected = format!("{}{}", salt, digest(salt, password));
    expected.as_bytes().ct_eq(stored.as_bytes()).into()
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// Errors
// =============================================================================

/// Authentication failure. Every variant answers 401 with a Basic challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header
    MissingCredentials,

    /// Header present but not a decodable `Basic user:password` credential
    MalformedCredentials,

    /// Password does not match
    InvalidPassword,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Missing Authorization header"),
            AuthError::MalformedCredentials => write!(f, "Malformed Authorization header"),
            AuthError::InvalidPassword => write!(f, "Invalid password"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // A wrong password could be someone guessing; missing ones are just
        // browsers probing before the challenge.
        match &self {
            AuthError::MissingCredentials => {
                debug!(status = 401, "Authentication required: {}", self)
            }
            _ => warn!(status = 401, "Authentication failed: {}", self),
        }

        let challenge = format!("Basic realm=\"{}\"", REALM);
        let mut response = StatusCode::UNAUTHORIZED.into_response();
        if let Ok(value) = HeaderValue::from_str(&challenge) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

// =============================================================================
// Basic Credentials
// =============================================================================

/// Decoded `Authorization: Basic` credential.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Parse an `Authorization` header value of the form `Basic base64(user:pass)`.
///
/// The password is everything after the first `:`.
pub fn parse_basic_credentials(value: &str) -> Result<BasicCredentials, AuthError> {
    let mut parts = value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::MalformedCredentials)?;
    let encoded = parts.next().ok_or(AuthError::MalformedCredentials)?;
    if !scheme.eq_ignore_ascii_case("basic") || parts.next().is_some() {
        return Err(AuthError::MalformedCredentials);
    }

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| AuthError::MalformedCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or(AuthError::MalformedCredentials)?;

    Ok(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Build a `Basic` header value for `username:password`.
pub fn basic_auth_header(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", username, password))
    )
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// Shared verifier handed to the middleware.
#[derive(Clone)]
pub struct BasicAuth {
    hash: Arc<PasswordHash>,
}

impl BasicAuth {
    pub fn new(hash: PasswordHash) -> Self {
        Self {
            hash: Arc::new(hash),
        }
    }

    /// Check a raw `Authorization` header value.
    pub fn check(&self, header: Option<&HeaderValue>) -> Result<(), AuthError> {
        let header = header.ok_or(AuthError::MissingCredentials)?;
        let value = header
            .to_str()
            .map_err(|_| AuthError::MalformedCredentials)?;
        let credentials = parse_basic_credentials(value)?;

        if self.hash.verify(&credentials.password) {
            Ok(())
        } else {
            Err(AuthError::InvalidPassword)
        }
    }
}

/// Axum middleware rejecting any request without a valid Basic credential.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware};
/// use nvgl8r::server::auth::{BasicAuth, PasswordHash, basic_auth_middleware};
///
/// let auth = BasicAuth::new(PasswordHash::generate("secret"));
/// let app = Router::new()
///     .fallback(static_handler)
///     .layer(middleware::from_fn_with_state(auth, basic_auth_middleware));
/// ```
pub async fn basic_auth_middleware(
    State(auth): State<BasicAuth>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    auth.check(request.headers().get(header::AUTHORIZATION))?;
    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
