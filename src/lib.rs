//! # Nvgl8r
//!
//! A small password-protected photo drop.
//!
//! Clients (typically a capture page on a phone) upload JPEGs; the service
//! keeps only the most recent few on disk and serves them, along with a
//! couple of static pages, to anyone holding the password. An instance can
//! instead relay every upload to another instance, which lets a publicly
//! reachable front forward photos to a private back.
//!
//! ## Features
//!
//! - **Bounded retention**: the newest N photos are kept, older ones are deleted as new ones arrive
//! - **Password gate**: HTTP Basic authentication against a salted SHA-256 hash
//! - **Path guard**: only `.html`, `.js` and `.jpg` files under the served roots are readable
//! - **Relay mode**: uploads are forwarded to a peer instead of being stored
//!
//! ## Architecture
//!
//! - [`photos`] - Bounded photo buffer backed by a directory of files
//! - [`relay`] - Upload forwarding to a peer instance
//! - [`server`] - Axum-based HTTP server, authentication and path validation
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use nvgl8r::{create_router, AppState, PhotoBuffer, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let photos = PhotoBuffer::with_capacity("photos", 5);
//!     photos.clear_all().await;
//!
//!     let state = AppState::new("static", photos);
//!     let router = create_router(state, RouterConfig::with_password("secret123"));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8888").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod photos;
pub mod relay;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, PhotoError, RelayError, RequestError};
pub use photos::{PhotoBuffer, PhotoEntry, DEFAULT_PHOTO_CAPACITY, PHOTO_EXTENSION};
pub use relay::{RelayForwarder, RelayTarget, DEFAULT_RELAY_TIMEOUT};
pub use server::{
    basic_auth_header, basic_auth_middleware, create_router, is_valid_path, verify_password,
    AppState, AuthError, BasicAuth, ErrorResponse, PasswordHash, PathValidator, RouterConfig,
    UploadResponse, ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_SIZE, REALM,
};
