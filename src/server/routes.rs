//! Router configuration.
//!
//! # Route Structure
//!
//! ```text
//! /photos/{n}.jpg     - Retained photo by position (GET)
//! /photos/            - No position given (400)
//! /upload             - Photo upload (POST)
//! /*                  - Static files (GET)
//! ```
//!
//! Every route, including the fallback, sits behind Basic authentication.
//!
//! # Example
//!
//! ```ignore
//! use nvgl8r::photos::PhotoBuffer;
//! use nvgl8r::server::{create_router, AppState, RouterConfig};
//!
//! let state = AppState::new("static", PhotoBuffer::new("photos"));
//! let router = create_router(state, RouterConfig::with_password("secret123"));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8888").await?;
//! axum::serve(listener, router).await?;
//! ```

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::auth::{basic_auth_middleware, BasicAuth, PasswordHash};
use super::handlers::{
    empty_photo_handler, fallback_handler, not_found_handler, photo_handler, static_handler,
    upload_handler, AppState,
};

/// Default upload body limit (20 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 20 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Hash every request's password is checked against
    pub password_hash: PasswordHash,

    /// Maximum accepted upload body in bytes
    pub max_upload_size: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a configuration from an existing password hash.
    ///
    /// By default:
    /// - Uploads are limited to 20 MiB
    /// - Tracing is enabled
    pub fn new(password_hash: PasswordHash) -> Self {
        Self {
            password_hash,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            enable_tracing: true,
        }
    }

    /// Hash `password` and create a configuration from it.
    pub fn with_password(password: &str) -> Self {
        Self::new(PasswordHash::generate(password))
    }

    /// Set the upload body limit in bytes.
    pub fn with_max_upload_size(mut self, bytes: usize) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// Unsupported methods on `/photos/...` and `/upload` answer 404, as does
/// any non-GET request to an unrouted path. `GET /upload` is treated as a
/// static lookup like any other path.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let auth = BasicAuth::new(config.password_hash);

    let router = Router::new()
        .route(
            "/photos/",
            get(empty_photo_handler).fallback(not_found_handler),
        )
        .route(
            "/photos/{*rest}",
            get(photo_handler).fallback(not_found_handler),
        )
        .route(
            "/upload",
            post(upload_handler)
                .get(static_handler)
                .fallback(not_found_handler),
        )
        .fallback(fallback_handler)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .layer(middleware::from_fn_with_state(auth, basic_auth_middleware));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

// =============================================================================
// Tests
// =============================================================================
