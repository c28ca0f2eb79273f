//! HTTP request handlers.
//!
//! # Endpoints
//!
//! - `GET /photos/{n}.jpg` - Photo at buffer position `n` (0 = newest)
//! - `POST /upload` - Store (or relay) a JPEG sent as the raw body
//! - `GET /{path}` - Static file under the static root
//!
//! Authentication is enforced by the middleware in [`super::auth`] before any
//! of these run.

use std::io;
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{PhotoError, RelayError, RequestError};
use crate::photos::PhotoBuffer;
use crate::relay::RelayForwarder;

use super::paths::PathValidator;

// =============================================================================
// Application State
// =============================================================================

/// Shared state handed to every handler.
///
/// The photo buffer is the only mutable piece; it carries its own lock.
#[derive(Clone)]
pub struct AppState {
    /// Retained photos (unused for uploads in relay mode)
    pub photos: Arc<PhotoBuffer>,

    /// Relay forwarder; when set, uploads go to the peer instead of `photos`
    pub relay: Option<RelayForwarder>,

    /// Validator admitting the static and photos roots
    pub paths: Arc<PathValidator>,

    /// Directory static files are served from
    pub static_root: PathBuf,
}

impl AppState {
    /// Create state serving `static_root` and storing uploads in `photos`.
    pub fn new(static_root: impl Into<PathBuf>, photos: PhotoBuffer) -> Self {
        let static_root = static_root.into();
        let paths = PathValidator::new([static_root.as_path(), photos.root()]);

        Self {
            photos: Arc::new(photos),
            relay: None,
            paths: Arc::new(paths),
            static_root,
        }
    }

    /// Forward uploads to a peer instead of storing them.
    pub fn with_relay(mut self, relay: RelayForwarder) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Whether uploads are relayed.
    pub fn is_relay(&self) -> bool {
        self.relay.is_some()
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "forbidden")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Acknowledgment for a successful upload: `{"status":"ok"}`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: String,
}

impl UploadResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert RequestError to HTTP response.
///
/// 5xx errors are logged at ERROR, 404s at DEBUG and other 4xx at WARN.
impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            RequestError::InvalidPhotoNumber(_) => (StatusCode::BAD_REQUEST, "invalid_photo_number"),
            RequestError::LengthRequired => (StatusCode::BAD_REQUEST, "length_required"),
            RequestError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            RequestError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            RequestError::EndpointNotFound => (StatusCode::NOT_FOUND, "endpoint_not_found"),
            RequestError::Photo(PhotoError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "photo_not_found")
            }
            RequestError::Photo(PhotoError::Write { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "write_error")
            }
            RequestError::Read { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "read_error"),
            RequestError::Relay(RelayError::Status(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "relay_rejected")
            }
            RequestError::Relay(_) => (StatusCode::INTERNAL_SERVER_ERROR, "relay_error"),
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle photo requests.
///
/// # Endpoint
///
/// `GET /photos/{n}.jpg`
///
/// The last path segment, minus its extension, is the buffer position.
///
/// # Response
///
/// - `200 OK`: JPEG bytes with `Cache-Control: no-cache`
/// - `400 Bad Request`: position is not a non-negative integer
/// - `404 Not Found`: position outside the buffer, or file vanished
/// - `403 Forbidden`: resolved file outside the allowed roots
pub async fn photo_handler(
    State(state): State<AppState>,
    Path(rest): Path<String>,
) -> Result<Response, RequestError> {
    let position = parse_photo_position(&rest)?;
    let entry = state.photos.get(position).await?;
    let path = state.photos.root().join(&entry.filename);

    let mut response = serve_file(&state.paths, &path, &rest).await?;
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-cache"),
    );
    Ok(response)
}

/// `GET /photos/` carries no position at all.
pub async fn empty_photo_handler() -> RequestError {
    RequestError::InvalidPhotoNumber(String::new())
}

/// Parse the buffer position out of `{n}.ext` (any directories are ignored).
pub fn parse_photo_position(rest: &str) -> Result<usize, RequestError> {
    let name = rest.rsplit('/').next().unwrap_or(rest);
    let stem = FsPath::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("");

    stem.parse()
        .map_err(|_| RequestError::InvalidPhotoNumber(name.to_string()))
}

/// Handle static file requests.
///
/// # Endpoint
///
/// `GET /{path}` for any path without a dedicated route, including
/// `/monitor.html` and `/capture.html`.
///
/// The path is percent-decoded and joined under the static root, then
/// validated before anything is read.
pub async fn static_handler(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, RequestError> {
    let decoded = urlencoding::decode(uri.path()).map_err(|_| RequestError::Forbidden)?;
    let relative = decoded.trim_start_matches('/');
    let path = state.static_root.join(relative);

    serve_file(&state.paths, &path, relative).await
}

/// Handle photo uploads.
///
/// # Endpoint
///
/// `POST /upload` with the raw JPEG as body and `Content-Length` set.
///
/// In relay mode the body is forwarded to the peer along with the caller's
/// `Authorization` header; otherwise it becomes the newest photo.
///
/// # Response
///
/// - `200 OK`: `{"status":"ok"}`
/// - `400 Bad Request`: no `Content-Length`
/// - `413 Payload Too Large`: body over the configured limit
/// - `500 Internal Server Error`: write or relay failure, with the cause
pub async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, RequestError> {
    if !headers.contains_key(header::CONTENT_LENGTH) {
        return Err(RequestError::LengthRequired);
    }

    match &state.relay {
        Some(relay) => {
            let size = body.len();
            relay
                .forward(body, headers.get(header::AUTHORIZATION))
                .await?;
            info!(peer = %relay.target(), bytes = size, "Relayed upload");
        }
        None => {
            let size = body.len();
            let filename = state.photos.store(body).await?;
            info!(filename = %filename, bytes = size, "Stored upload");
        }
    }

    Ok(Json(UploadResponse::ok()))
}

/// Fallback for paths without a dedicated route.
///
/// `GET`/`HEAD` look up a static file; anything else is 404.
pub async fn fallback_handler(
    state: State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response, RequestError> {
    if method == Method::GET || method == Method::HEAD {
        static_handler(state, uri).await
    } else {
        Err(RequestError::EndpointNotFound)
    }
}

/// Reject unsupported methods on known paths.
pub async fn not_found_handler() -> RequestError {
    RequestError::EndpointNotFound
}

/// Validate `path`, then read and return the resolved file.
async fn serve_file(
    paths: &PathValidator,
    path: &FsPath,
    label: &str,
) -> Result<Response, RequestError> {
    let resolved = paths.resolve(path).ok_or(RequestError::Forbidden)?;

    let data = tokio::fs::read(&resolved).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RequestError::NotFound(label.to_string()),
        _ => RequestError::Read {
            path: label.to_string(),
            message: e.to_string(),
        },
    })?;

    let mime = mime_guess::from_path(&resolved).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.as_ref())], data).into_response())
}

// =============================================================================
// Tests
// =============================================================================
