//! Test utilities for integration tests.
//!
//! Provides a scratch directory layout with static and photo roots, request
//! builders that carry credentials, and helpers for running a live instance.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::body::{Body, Bytes};
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;

use nvgl8r::photos::PhotoBuffer;
use nvgl8r::relay::{RelayForwarder, RelayTarget};
use nvgl8r::server::{basic_auth_header, create_router, AppState, RouterConfig};

pub const TEST_PASSWORD: &str = "secret123";

pub const MONITOR_HTML: &str = "<html><body>monitor</body></html>";
pub const CAPTURE_HTML: &str = "<html><body>capture</body></html>";
pub const APP_JS: &str = "console.log('capture');";

// =============================================================================
// Test Environment
// =============================================================================

/// Scratch layout:
///
/// ```text
/// {tmp}/static/{monitor.html, capture.html, app.js, notes.txt}
/// {tmp}/photos/
/// {tmp}/secret.html
/// ```
pub struct TestEnv {
    _dir: TempDir,
    pub base: PathBuf,
    pub static_root: PathBuf,
    pub photos_root: PathBuf,
    pub state: AppState,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_capacity(5)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let dir = TempDir::new().unwrap();
        let base = dir.path().to_path_buf();
        let static_root = base.join("static");
        let photos_root = base.join("photos");

        std::fs::create_dir_all(&static_root).unwrap();
        std::fs::create_dir_all(&photos_root).unwrap();
        std::fs::write(static_root.join("monitor.html"), MONITOR_HTML).unwrap();
        std::fs::write(static_root.join("capture.html"), CAPTURE_HTML).unwrap();
        std::fs::write(static_root.join("app.js"), APP_JS).unwrap();
        std::fs::write(static_root.join("notes.txt"), "not served").unwrap();
        std::fs::write(base.join("secret.html"), "outside the root").unwrap();

        let photos = PhotoBuffer::with_capacity(&photos_root, capacity);
        let state = AppState::new(&static_root, photos);

        Self {
            _dir: dir,
            base,
            static_root,
            photos_root,
            state,
        }
    }

    /// Same layout, but uploads are relayed to `target`.
    pub fn relaying_to(target: RelayTarget) -> Self {
        let mut env = Self::new();
        let relay = RelayForwarder::new(target, std::time::Duration::from_secs(5)).unwrap();
        env.state = env.state.with_relay(relay);
        env
    }

    pub fn router(&self) -> Router {
        create_router(
            self.state.clone(),
            RouterConfig::with_password(TEST_PASSWORD).with_tracing(false),
        )
    }

    /// Sorted names of `.jpg` files currently in the photos root.
    pub fn photo_files(&self) -> Vec<String> {
        jpg_files(&self.photos_root)
    }
}

pub fn jpg_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".jpg"))
        .collect();
    names.sort();
    names
}

// =============================================================================
// Requests
// =============================================================================

pub fn auth_header() -> String {
    basic_auth_header("camera", TEST_PASSWORD)
}

/// Authenticated GET.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, auth_header())
        .body(Body::empty())
        .unwrap()
}

/// GET without credentials.
pub fn get_anonymous(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Authenticated upload of `data`.
pub fn upload(data: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::AUTHORIZATION, auth_header())
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .unwrap()
}

/// A small fake JPEG whose payload identifies it.
pub fn jpeg_payload(id: u8) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend(std::iter::repeat(id).take(32));
    data.extend([0xFF, 0xD9]);
    data
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

// =============================================================================
// Live Servers
// =============================================================================

/// Serve `router` on an ephemeral local port.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A local port with nothing listening on it.
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
