//! Static file integration tests.
//!
//! Tests verify:
//! - The monitor and capture pages and other allowed files are served
//! - Traversal out of the static root is forbidden
//! - Disallowed extensions are forbidden
//! - Missing files and unknown endpoints return 404

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use super::test_utils::{
    auth_header, body_bytes, get, jpeg_payload, upload, TestEnv, APP_JS, CAPTURE_HTML,
    MONITOR_HTML,
};

// =============================================================================
// Served Files
// =============================================================================

#[tokio::test]
async fn test_monitor_and_capture_pages() {
    let env = TestEnv::new();

    for (uri, expected) in [("/monitor.html", MONITOR_HTML), ("/capture.html", CAPTURE_HTML)] {
        let response = env.router().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert_eq!(body_bytes(response).await, expected.as_bytes());
    }
}

#[tokio::test]
async fn test_javascript_served_with_js_type() {
    let env = TestEnv::new();

    let response = env.router().oneshot(get("/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("javascript"));
    assert_eq!(body_bytes(response).await, APP_JS.as_bytes());
}

#[tokio::test]
async fn test_nested_static_file() {
    let env = TestEnv::new();
    std::fs::create_dir_all(env.static_root.join("js")).unwrap();
    std::fs::write(env.static_root.join("js/p2p-crypto.js"), "// crypto").unwrap();

    let response = env.router().oneshot(get("/js/p2p-crypto.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, "// crypto".as_bytes());
}

#[tokio::test]
async fn test_percent_encoded_name() {
    let env = TestEnv::new();
    std::fs::write(env.static_root.join("my page.html"), "spaced").unwrap();

    let response = env.router().oneshot(get("/my%20page.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, "spaced".as_bytes());
}

// =============================================================================
// Forbidden
// =============================================================================

#[tokio::test]
async fn test_traversal_out_of_static_root_forbidden() {
    let env = TestEnv::new();
    assert!(env.base.join("secret.html").exists());

    for uri in [
        "/%2e%2e/secret.html",
        "/..%2fsecret.html",
        "/%2e%2e/%2e%2e/etc/passwd",
    ] {
        let response = env.router().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);

        let body = body_bytes(response).await;
        assert!(!String::from_utf8_lossy(&body).contains("outside the root"));
    }
}

#[tokio::test]
async fn test_disallowed_extension_forbidden() {
    let env = TestEnv::new();

    for uri in ["/notes.txt", "/", "/static", "/upload"] {
        let response = env.router().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn test_static_path_can_reach_photos_root() {
    let env = TestEnv::new();
    env.router().oneshot(upload(jpeg_payload(3))).await.unwrap();
    let name = env.photo_files().remove(0);

    // The photos root is an allowed root too
    let uri = format!("/%2e%2e/photos/{}", name);
    let response = env.router().oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, jpeg_payload(3));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_escape_forbidden() {
    let env = TestEnv::new();
    std::os::unix::fs::symlink(
        env.base.join("secret.html"),
        env.static_root.join("shortcut.html"),
    )
    .unwrap();

    let response = env.router().oneshot(get("/shortcut.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// =============================================================================
// Not Found
// =============================================================================

#[tokio::test]
async fn test_missing_file_returns_404() {
    let env = TestEnv::new();

    let response = env.router().oneshot(get("/missing.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_bytes(response).await;
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "not_found");
}

#[tokio::test]
async fn test_post_to_unknown_path_returns_404() {
    let env = TestEnv::new();

    let request = Request::builder()
        .method("POST")
        .uri("/monitor.html")
        .header(header::AUTHORIZATION, auth_header())
        .header(header::CONTENT_LENGTH, 0)
        .body(Body::empty())
        .unwrap();

    let response = env.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_bytes(response).await;
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "endpoint_not_found");
}
