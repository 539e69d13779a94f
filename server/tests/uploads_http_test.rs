//! HTTP tests for the admin upload endpoints and static file serving.
//!
//! None of these touch the database: the auth middleware validates tokens
//! without a lookup and the upload handlers only use the filesystem.

mod helpers;

use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use http_body_util::BodyExt;

use charity_server::db::AdminRole;
use helpers::{bearer, body_json, json_body, MultipartBuilder, TestApp, PNG_BYTES};

fn upload_request(app: &TestApp, form: MultipartBuilder) -> axum::http::Request<Body> {
    let token = app.token(1, AdminRole::Editor);
    form.into_request(
        TestApp::request(Method::POST, "/api/admin/upload")
            .header(header::AUTHORIZATION, bearer(&token)),
    )
}

#[tokio::test]
async fn test_upload_requires_token() {
    let app = TestApp::new();
    let request = MultipartBuilder::new()
        .file("image", "logo.png", "image/png", PNG_BYTES)
        .into_request(TestApp::request(Method::POST, "/api/admin/upload"));

    let response = app.oneshot(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "MISSING_AUTH");
    assert_eq!(app.file_count("general"), 0);
}

#[tokio::test]
async fn test_upload_rejects_bad_token() {
    let app = TestApp::new();
    let request = MultipartBuilder::new()
        .file("image", "logo.png", "image/png", PNG_BYTES)
        .into_request(
            TestApp::request(Method::POST, "/api/admin/upload")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt"),
        );

    let response = app.oneshot(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_upload_valid_png_defaults_to_general() {
    let app = TestApp::new();
    let form = MultipartBuilder::new().file("image", "Team Photo.PNG", "image/png", PNG_BYTES);

    let response = app.oneshot(upload_request(&app, form)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Image uploaded successfully");

    let url = body["url"].as_str().unwrap();
    let filename = body["filename"].as_str().unwrap();
    assert!(url.starts_with("/uploads/general/general-"), "{url}");
    assert!(url.ends_with(filename));
    assert!(filename.ends_with(".png"), "extension is lowercased: {filename}");

    let stored = std::fs::read(app.stored_path(url)).unwrap();
    assert_eq!(stored, PNG_BYTES);
}

#[tokio::test]
async fn test_upload_into_named_folder() {
    let app = TestApp::new();
    let form = MultipartBuilder::new()
        .text("folder", "events")
        .file("image", "banner.png", "image/png", PNG_BYTES);

    let response = app.oneshot(upload_request(&app, form)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["url"].as_str().unwrap().starts_with("/uploads/events/"));
    assert_eq!(app.file_count("events"), 1);
}

#[tokio::test]
async fn test_upload_unknown_folder_rejected() {
    let app = TestApp::new();
    let form = MultipartBuilder::new()
        .text("folder", "../secrets")
        .file("image", "banner.png", "image/png", PNG_BYTES);

    let response = app.oneshot(upload_request(&app, form)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "INVALID_UPLOAD");
}

#[tokio::test]
async fn test_upload_spoofed_content_rejected() {
    let app = TestApp::new();
    let form = MultipartBuilder::new().file(
        "image",
        "innocent.png",
        "image/png",
        b"MZ\x90\x00this is really an executable",
    );

    let response = app.oneshot(upload_request(&app, form)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "CONTENT_MISMATCH");
    assert_eq!(
        body["message"],
        "File content does not match declared type. Possible file type mismatch or malicious file."
    );
    assert_eq!(app.file_count("general"), 0);
}

#[tokio::test]
async fn test_upload_disallowed_extension_rejected() {
    let app = TestApp::new();
    let form = MultipartBuilder::new().file("image", "payload.exe", "image/png", PNG_BYTES);

    let response = app.oneshot(upload_request(&app, form)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "INVALID_EXTENSION");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid file extension. Allowed:"));
}

#[tokio::test]
async fn test_upload_document_mime_rejected_for_images() {
    let app = TestApp::new();
    let form = MultipartBuilder::new().file("image", "scan.png", "application/pdf", b"%PDF-1.7");

    let response = app.oneshot(upload_request(&app, form)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "INVALID_MIME_TYPE");
}

#[tokio::test]
async fn test_upload_without_file() {
    let app = TestApp::new();
    let form = MultipartBuilder::new().text("folder", "team");

    let response = app.oneshot(upload_request(&app, form)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "NO_FILE");
    assert_eq!(body["message"], "No file provided");
}

#[tokio::test]
async fn test_uploaded_file_is_served() {
    let app = TestApp::new();
    let form = MultipartBuilder::new().file("image", "photo.png", "image/png", PNG_BYTES);
    let body = body_json(app.oneshot(upload_request(&app, form)).await).await;
    let url = body["url"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            TestApp::request(Method::GET, &url)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], PNG_BYTES);
}

#[tokio::test]
async fn test_delete_image_is_idempotent() {
    let app = TestApp::new();
    let token = app.token(1, AdminRole::Admin);
    let form = MultipartBuilder::new().file("image", "photo.png", "image/png", PNG_BYTES);
    let body = body_json(app.oneshot(upload_request(&app, form)).await).await;
    let url = body["url"].as_str().unwrap().to_string();
    assert!(app.stored_path(&url).exists());

    for _ in 0..2 {
        let response = app
            .oneshot(
                TestApp::request(Method::DELETE, "/api/admin/upload/image")
                    .header(header::AUTHORIZATION, bearer(&token))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(json_body(&serde_json::json!({ "path": url })))
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Image deleted successfully");
    }

    assert!(!app.stored_path(&url).exists());
}

#[tokio::test]
async fn test_delete_image_rejects_traversal() {
    let app = TestApp::new();
    let token = app.token(1, AdminRole::Admin);

    for path in [
        "/uploads/../../etc/passwd",
        "/uploads/general/../../../etc/passwd",
        "/etc/passwd",
        "/uploads/..",
    ] {
        let response = app
            .oneshot(
                TestApp::request(Method::DELETE, "/api/admin/upload/image")
                    .header(header::AUTHORIZATION, bearer(&token))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(json_body(&serde_json::json!({ "path": path })))
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
        let body = body_json(response).await;
        assert_eq!(body["error"], "PATH_TRAVERSAL", "{path}");
        assert_eq!(body["message"], "Invalid file path: Path traversal detected");
    }
}

#[tokio::test]
async fn test_delete_image_rejects_directory() {
    let app = TestApp::new();
    let token = app.token(1, AdminRole::Admin);

    let response = app
        .oneshot(
            TestApp::request(Method::DELETE, "/api/admin/upload/image")
                .header(header::AUTHORIZATION, bearer(&token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(json_body(&serde_json::json!({ "path": "/uploads/" })))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "NOT_A_FILE");
    assert!(app.upload_dir.path().exists());
}

#[tokio::test]
async fn test_policy_summary() {
    let app = TestApp::new();
    let token = app.token(1, AdminRole::Editor);

    let response = app
        .oneshot(
            TestApp::request(Method::GET, "/api/admin/upload/policy")
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["image"]["maxSizeBytes"], 5 * 1024 * 1024);
    assert_eq!(body["document"]["maxSizeBytes"], 10 * 1024 * 1024);
    assert!(body["folders"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f == "payment-proofs"));
}
