//! HTTP server layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │     GET /photos/{n}.jpg    POST /upload    GET /{static}        │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────┐  ┌───────────┐   │
//! │  │    auth     │  │  handlers   │  │  paths  │  │  routes   │   │
//! │  │ (Basic/hash)│  │ (requests)  │  │ (guard) │  │ (router)  │   │
//! │  └─────────────┘  └─────────────┘  └─────────┘  └───────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod paths;
pub mod routes;

pub use auth::{
    basic_auth_header, basic_auth_middleware, parse_basic_credentials, verify_password, AuthError,
    BasicAuth, BasicCredentials, PasswordHash, REALM,
};
pub use handlers::{
    empty_photo_handler, fallback_handler, not_found_handler, parse_photo_position, photo_handler,
    static_handler, upload_handler, AppState, ErrorResponse, UploadResponse,
};
pub use paths::{is_valid_path, resolve_path, PathValidator, ALLOWED_EXTENSIONS};
pub use routes::{create_router, RouterConfig, DEFAULT_MAX_UPLOAD_SIZE};
